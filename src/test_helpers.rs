//! Shared test utilities for the folio test suite.
//!
//! Node builders for in-memory sources, a content-tree writer for
//! filesystem tests, and route lookups that panic with the available
//! choices on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let nodes = vec![
//!     dated_node("a", "content/blog/post-one/index.md", "2020-07-17", &["Python"]),
//!     titled_node("b", "content/blog/post-two/index.md", &[]),
//! ];
//! let index = build_all_routes(nodes, &test_config()).unwrap();
//! assert_eq!(find_route(&index.routes, "/post-one/").template, Template::Post);
//! ```

use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::types::{ContentKind, ContentNode, FrontMatter, Route};

// =========================================================================
// Node builders
// =========================================================================

/// Stock config; content root `content/blog`, base path `/`.
pub fn test_config() -> SiteConfig {
    SiteConfig::default()
}

/// A node with a title and tags but no date.
pub fn titled_node(id: &str, file_path: &str, tags: &[&str]) -> ContentNode {
    let frontmatter = FrontMatter {
        title: Some(format!("Title {id}")),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..FrontMatter::default()
    };
    ContentNode::new(id, file_path, ContentKind::Markdown, frontmatter, format!("Body of {id}."))
}

/// A titled node with a raw front-matter date.
pub fn dated_node(id: &str, file_path: &str, date: &str, tags: &[&str]) -> ContentNode {
    let mut node = titled_node(id, file_path, tags);
    node.frontmatter.date = Some(date.to_string());
    node
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write a document with a YAML front-matter block under `root`.
pub fn write_post(root: &Path, rel: &str, front_matter: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("---\n{front_matter}\n---\n{body}")).unwrap();
}

// =========================================================================
// Route lookups, panicking with the available paths on a miss
// =========================================================================

/// All route paths in order.
pub fn route_paths(routes: &[Route]) -> Vec<&str> {
    routes.iter().map(|r| r.path.as_str()).collect()
}

/// Find a route by path. Panics if not found.
pub fn find_route<'a>(routes: &'a [Route], path: &str) -> &'a Route {
    routes.iter().find(|r| r.path == path).unwrap_or_else(|| {
        let paths = route_paths(routes);
        panic!("route '{path}' not found. Available: {paths:?}")
    })
}
