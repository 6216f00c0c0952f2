//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output leads with what the reader cares about (a document's title, a
//! tag's name, a route's path) and shows files as indented `Source:`
//! context lines underneath.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Documents
//! 001 Automatically deploying with GitHub Actions → /ci/
//!     Source: content/blog/ci/index.md
//!     Date: 17 July, 2020
//!     Tags: CI, GitHub
//!
//! Tags
//! 001 CI (1 post) → /tags/ci/
//! 002 GitHub (1 post) → /tags/github/
//!
//! Warnings
//!     content/blog/draft/index.md: missing front-matter field `date`
//! ```
//!
//! ## Routes
//!
//! ```text
//! /ci/               post       node `3f2a…`
//! /tags/ci/          tag        tag `CI`
//! /                  index      page `index`
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Automatically deploying with GitHub Actions → ci/index.html
//!
//! Tags
//! 001 CI → tags/ci/index.html
//!
//! Generated 1 post, 1 tag page, 3 site pages in 12ms
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::logging::format_elapsed;
use crate::pipeline::BuildReport;
use crate::render::{self, RenderedPage};
use crate::routes::{self, SiteIndex};
use crate::types::{ContentNode, Route, Template};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`; `noun` is the singular.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn page_file(page: &RenderedPage) -> String {
    page.file.to_string_lossy().replace('\\', "/")
}

fn document_header(index: usize, node: &ContentNode) -> String {
    format!(
        "{} {} → {}",
        format_index(index),
        node.display_title(),
        node.slug().unwrap_or("?")
    )
}

// ============================================================================
// Scan output
// ============================================================================

/// Format discovered documents, tag groups and warnings.
pub fn format_scan_output(site: &SiteIndex, config: &crate::config::SiteConfig) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Documents".to_string());
    if site.nodes.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, node) in site.nodes.iter().enumerate() {
        lines.push(document_header(i + 1, node));
        lines.push(format!("{}Source: {}", indent(1), node.file_path));
        if let Some(date) = node.fields.date {
            lines.push(format!("{}Date: {}", indent(1), render::long_date(&date)));
        }
        if !node.frontmatter.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), node.frontmatter.tags.join(", ")));
        }
        if let Some(desc) = &node.frontmatter.description {
            let truncated = truncate_desc(desc.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}{}", indent(1), truncated));
            }
        }
    }

    if !site.tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (i, group) in site.tags.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}) → {}",
                format_index(i + 1),
                group.tag,
                plural(group.total_count(), "post"),
                routes::tag_path(&group.tag, config)
            ));
        }
    }

    if !site.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in &site.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }

    lines
}

pub fn print_scan_output(site: &SiteIndex, config: &crate::config::SiteConfig) {
    for line in format_scan_output(site, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Route table
// ============================================================================

/// One aligned line per route: path, template, producer.
pub fn format_routes(routes: &[Route]) -> Vec<String> {
    let path_width = routes.iter().map(|r| r.path.len()).max().unwrap_or(0);
    let template_width = routes
        .iter()
        .map(|r| r.template.as_str().len())
        .max()
        .unwrap_or(0);

    routes
        .iter()
        .map(|route| {
            format!(
                "{:<pw$}  {:<tw$}  {}",
                route.path,
                route.template.as_str(),
                route.source(),
                pw = path_width,
                tw = template_width
            )
        })
        .collect()
}

pub fn print_routes(routes: &[Route]) {
    for line in format_routes(routes) {
        println!("{}", line);
    }
}

/// One-line summary used by `check`.
pub fn format_check_summary(site: &SiteIndex) -> String {
    format!(
        "{}, {}, {}, {}",
        plural(site.nodes.len(), "document"),
        plural(site.tags.len(), "tag"),
        plural(site.routes.len(), "route"),
        plural(site.warnings.len(), "warning")
    )
}

// ============================================================================
// Build output
// ============================================================================

/// Format the rendered pages grouped by kind, with a closing summary line.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    let mut posts = 0;
    let mut tag_pages = Vec::new();
    let mut site_pages = 0;

    for page in &report.pages {
        match page.template {
            Template::Post => {
                posts += 1;
                let title = report
                    .site
                    .route(&page.path)
                    .and_then(|r| r.context_str("id"))
                    .and_then(|id| report.site.node(id))
                    .map(|n| n.display_title())
                    .unwrap_or(page.path.as_str());
                lines.push(format!("{} {} → {}", format_index(posts), title, page_file(page)));
            }
            Template::Tag => tag_pages.push(page),
            Template::Index => {
                site_pages += 1;
                lines.insert(0, format!("Home → {}", page_file(page)));
            }
            Template::Articles | Template::About | Template::Contact | Template::NotFound => {
                site_pages += 1
            }
        }
    }

    if !tag_pages.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (i, page) in tag_pages.iter().enumerate() {
            let tag = report
                .site
                .route(&page.path)
                .and_then(|r| r.context_str("tag"))
                .unwrap_or(page.path.as_str());
            lines.push(format!("{} {} → {}", format_index(i + 1), tag, page_file(page)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {} in {}",
        plural(posts, "post"),
        plural(tag_pages.len(), "tag page"),
        plural(site_pages, "site page"),
        format_elapsed(report.elapsed)
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::plan_from_source;
    use crate::test_helpers::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scenario_site() -> SiteIndex {
        let mut first =
            dated_node("a", "content/blog/post-one/index.md", "2020-07-17", &["Python", "SQL"]);
        first.frontmatter.description = Some("A first post.".to_string());
        let nodes = vec![
            first,
            titled_node("b", "content/blog/post-two/index.md", &["Python"]),
        ];
        plan_from_source(&nodes, &test_config()).unwrap()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(999), "999");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "post"), "1 post");
        assert_eq!(plural(0, "post"), "0 posts");
        assert_eq!(plural(2, "tag page"), "2 tag pages");
    }

    #[test]
    fn truncate_desc_long() {
        assert_eq!(truncate_desc("abcdefghij", 4), "abcd...");
        assert_eq!(truncate_desc("abc", 4), "abc");
    }

    #[test]
    fn truncate_desc_respects_char_boundaries() {
        assert_eq!(truncate_desc("éééééé", 3), "ééé...");
    }

    // =========================================================================
    // Scan
    // =========================================================================

    #[test]
    fn scan_output_lists_documents_tags_and_warnings() {
        let lines = format_scan_output(&scenario_site(), &test_config());

        assert_eq!(lines[0], "Documents");
        assert_eq!(lines[1], "001 Title a → /post-one/");
        assert_eq!(lines[2], "    Source: content/blog/post-one/index.md");
        assert_eq!(lines[3], "    Date: 17 July, 2020");
        assert_eq!(lines[4], "    Tags: Python, SQL");
        assert_eq!(lines[5], "    A first post.");
        assert!(lines.contains(&"001 Python (2 posts) → /tags/python/".to_string()));
        assert!(lines.contains(&"002 SQL (1 post) → /tags/sql/".to_string()));
        assert!(lines.contains(&"Warnings".to_string()));
        assert!(lines.iter().any(|l| l.contains("missing front-matter field `date`")));
    }

    #[test]
    fn scan_output_empty_site() {
        let site = plan_from_source(&Vec::<ContentNode>::new(), &test_config()).unwrap();
        let lines = format_scan_output(&site, &test_config());
        assert_eq!(lines, vec!["Documents", "    (none)"]);
    }

    // =========================================================================
    // Routes
    // =========================================================================

    #[test]
    fn routes_are_aligned() {
        let routes = vec![
            Route::new("/post-one/", Template::Post).with("id", "a"),
            Route::new("/", Template::Index),
        ];
        let lines = format_routes(&routes);
        assert_eq!(lines[0], "/post-one/  post   node `a`");
        assert_eq!(lines[1], "/           index  page `index`");
    }

    #[test]
    fn check_summary_counts() {
        assert_eq!(
            format_check_summary(&scenario_site()),
            "2 documents, 2 tags, 7 routes, 1 warning"
        );
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn build_output_groups_pages() {
        let site = scenario_site();
        let pages: Vec<RenderedPage> = site
            .routes
            .iter()
            .map(|r| RenderedPage {
                path: r.path.clone(),
                template: r.template,
                file: render::output_file(r).unwrap(),
            })
            .collect();
        let report = BuildReport {
            site,
            pages,
            elapsed: Duration::from_millis(12),
        };

        let lines = format_build_output(&report);

        assert_eq!(lines[0], "Home → index.html");
        assert!(lines.contains(&"001 Title a → post-one/index.html".to_string()));
        assert!(lines.contains(&"002 Title b → post-two/index.html".to_string()));
        assert!(lines.contains(&"001 Python → tags/python/index.html".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 2 posts, 2 tag pages, 3 site pages in 12ms"
        );
        assert_eq!(report.pages[0].file, PathBuf::from("post-one/index.html"));
    }
}
