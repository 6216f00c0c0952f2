use clap::{Parser, Subcommand};
use folio::{config, logging, output, pipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static blog generator for Markdown content")]
#[command(long_about = "\
Static blog generator for Markdown content

Documents under the content root become pages at a path derived from where
they live. Front-matter tags become tag pages.

Project structure:

  my-site/
  ├── folio.toml                   # Site config (optional)
  └── content/blog/                # content_root
      ├── my-post/
      │   └── index.md             # → /my-post/
      ├── other-post/
      │   └── index.mdx            # → /other-post/
      └── notes.md                 # → /notes/

Front-matter:

  ---
  title: My Post
  date: 2020-07-17
  tags: [Data Engineering, Python]   # → /tags/data-engineering/, /tags/python/
  ---

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (holds folio.toml and the content root)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (routes.json)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    /// Log debug detail (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List documents, tags and front-matter warnings
    Scan,
    /// Print the route list as JSON and save it to the temp directory
    Routes,
    /// Run the full pipeline: scan → routes → render
    Build,
    /// Validate content and routes without writing output
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Scan => {
            let plan = pipeline::plan(&cli.source)?;
            output::print_scan_output(&plan.site, &plan.config);
        }
        Command::Routes => {
            let plan = pipeline::plan(&cli.source)?;
            let path = pipeline::write_routes(&plan.site.routes, &cli.temp_dir)?;
            println!("{}", serde_json::to_string_pretty(&plan.site.routes)?);
            log::info!("wrote {}", path.display());
        }
        Command::Build => {
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = pipeline::build(&cli.source, &cli.output)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let plan = pipeline::plan(&cli.source)?;
            output::print_routes(&plan.site.routes);
            println!("{}", output::format_check_summary(&plan.site));
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
