//! Build orchestration.
//!
//! Runs the stages in order, each an explicit call:
//!
//! ```text
//! 1. Config    folio.toml        →  SiteConfig
//! 2. Source    content_root/     →  Vec<ContentNode>
//! 3. Routes    nodes             →  SiteIndex   (enrich, tags, post + tag routes)
//! 4. Listing   SiteIndex         →  + /, /articles/, [pages], /404/, re-checked for collisions
//! 5. Render    SiteIndex         →  output_dir/**/index.html
//! ```
//!
//! Steps 1-4 are [`plan`]; `check` and `routes` stop there. Warnings from
//! enrichment are logged and kept on the index; only errors stop a build.

use crate::config::{self, ConfigError, SiteConfig};
use crate::render::{self, RenderError, RenderedPage};
use crate::routes::{self, RouteError, SiteIndex};
use crate::source::{ContentSource, FsContentSource, SourceError};
use crate::types::{DuplicateRouteError, Route};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// File name of the route dump written to the temp directory.
pub const ROUTES_FILENAME: &str = "routes.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateRouteError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// The route collision behind this error, if that is what stopped the build.
    pub fn duplicate(&self) -> Option<&DuplicateRouteError> {
        match self {
            Self::Duplicate(dup) => Some(dup),
            Self::Route(err) => err.duplicate(),
            _ => None,
        }
    }
}

/// A validated route set plus the config it was computed with.
#[derive(Debug, Clone)]
pub struct Plan {
    pub config: SiteConfig,
    pub site: SiteIndex,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub site: SiteIndex,
    pub pages: Vec<RenderedPage>,
    pub elapsed: Duration,
}

/// Load `folio.toml` from `project_root` and plan the site from its content
/// directory.
pub fn plan(project_root: &Path) -> Result<Plan, BuildError> {
    let config = config::load_config(project_root)?;
    let source = FsContentSource::new(project_root, &config.content_root);
    log::info!("scanning {}", source.root_dir().display());
    let site = plan_from_source(&source, &config)?;
    Ok(Plan { config, site })
}

/// Route generation over any content source, listing pages included.
pub fn plan_from_source(
    source: &dyn ContentSource,
    config: &SiteConfig,
) -> Result<SiteIndex, BuildError> {
    let nodes = source.list_nodes()?;
    log::debug!("found {} documents", nodes.len());

    let mut site = routes::build_all_routes(nodes, config)?;
    for warning in &site.warnings {
        log::warn!("{warning}");
    }

    site.routes.extend(routes::build_listing_routes(config));
    routes::ensure_unique(&site.routes)?;

    log::info!(
        "planned {} routes from {} documents and {} tags",
        site.routes.len(),
        site.nodes.len(),
        site.tags.len()
    );
    Ok(site)
}

/// Full pipeline: plan, then render into `output_dir`.
///
/// Sizes the render pool from `processing.max_processes` on first use.
pub fn build(project_root: &Path, output_dir: &Path) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let Plan { config, site } = plan(project_root)?;
    init_thread_pool(&config.processing);
    log::info!("rendering into {}", output_dir.display());
    let pages = render::render_site(&site, &config, output_dir)?;
    Ok(BuildReport {
        site,
        pages,
        elapsed: started.elapsed(),
    })
}

/// Write the route list as pretty JSON to `<dir>/routes.json`.
pub fn write_routes(routes: &[Route], dir: &Path) -> Result<PathBuf, BuildError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(ROUTES_FILENAME);
    fs::write(&path, serde_json::to_string_pretty(routes)?)?;
    Ok(path)
}

/// Size the global rayon pool from `processing.max_processes`.
///
/// Only the first call in a process takes effect.
pub fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
