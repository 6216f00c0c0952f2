//! Node enrichment: slugs, front-matter validation and date derivation.
//!
//! Stage 2 of the folio pipeline. Every node gets a canonical route path
//! derived from where its file lives:
//!
//! ```text
//! content_root = "content/blog", base_path = "/"
//!
//! content/blog/my-post/index.md      →  /my-post/
//! content/blog/2020/ci/index.mdx     →  /2020/ci/
//! content/blog/notes.md              →  /notes/
//!
//! content_root = "content/blog", base_path = "/blog"
//!
//! content/blog/my-post/index.md      →  /blog/my-post/
//! ```
//!
//! Documents named `index.*` take the name of their directory; any other
//! file contributes its stem as the final segment.
//!
//! Enrichment is all-or-nothing for slugs: if two files land on the same
//! path nothing is attached and the build fails. Front-matter problems are
//! only warnings. A node of a dated content type with a missing or
//! unparseable `date` keeps its post page but gets no `date`/`year`, which
//! keeps it out of date-based listings.

use crate::config::SiteConfig;
use crate::types::{BuildWarning, ContentNode, DuplicateRouteError, RouteSource};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateRouteError),
    #[error("{file_path} is not under content root {content_root}")]
    OutsideContentRoot {
        file_path: String,
        content_root: String,
    },
}

/// Derive the canonical route path for a document.
pub fn derive_slug(
    file_path: &str,
    content_root: &str,
    base_path: &str,
) -> Result<String, EnrichError> {
    let outside = || EnrichError::OutsideContentRoot {
        file_path: file_path.to_string(),
        content_root: content_root.to_string(),
    };

    let file_segments = path_segments(file_path);
    let root_segments = path_segments(content_root);

    if file_segments.len() <= root_segments.len()
        || !file_segments.starts_with(&root_segments)
    {
        return Err(outside());
    }

    let relative = &file_segments[root_segments.len()..];
    let (filename, dirs) = relative.split_last().ok_or_else(outside)?;
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(*filename);

    let mut segments = path_segments(base_path);
    segments.extend_from_slice(dirs);
    if stem != "index" && !stem.is_empty() {
        segments.push(stem);
    }

    Ok(join_route(&segments))
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn join_route(segments: &[&str]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Attach slugs and derived fields to every node.
///
/// Nodes that already carry a slug keep it. Returns the warnings collected
/// while validating front-matter; fails without touching any node when a
/// slug can't be derived or two nodes share one.
pub fn enrich(
    nodes: &mut [ContentNode],
    config: &SiteConfig,
) -> Result<Vec<BuildWarning>, EnrichError> {
    let mut slugs = Vec::with_capacity(nodes.len());
    for node in nodes.iter() {
        let slug = match node.slug() {
            Some(existing) => existing.to_string(),
            None => derive_slug(&node.file_path, &config.content_root, &config.base_path)?,
        };
        slugs.push(slug);
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (slug, node) in slugs.iter().zip(nodes.iter()) {
        if let Some(first) = seen.insert(slug, &node.id) {
            return Err(DuplicateRouteError {
                path: slug.clone(),
                first: RouteSource::Node(first.to_string()),
                second: RouteSource::Node(node.id.clone()),
            }
            .into());
        }
    }

    let mut warnings = Vec::new();
    for (node, slug) in nodes.iter_mut().zip(slugs) {
        node.set_slug(slug);
        warnings.extend(derive_fields(node, config));
    }
    Ok(warnings)
}

/// Validate front-matter and fill in `fields.date` / `fields.year`.
fn derive_fields(node: &mut ContentNode, config: &SiteConfig) -> Vec<BuildWarning> {
    let mut warnings = Vec::new();

    let has_title = node
        .frontmatter
        .title
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_title {
        warnings.push(missing(node, "title"));
    }

    let content_type = node.content_type(&config.posts.default_type);
    if !config.posts.is_dated(content_type) {
        return warnings;
    }

    let parsed = match node.frontmatter.date.as_deref().map(str::trim) {
        None | Some("") => {
            warnings.push(missing(node, "date"));
            None
        }
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                warnings.push(BuildWarning::MalformedDate {
                    node_id: node.id.clone(),
                    file_path: node.file_path.clone(),
                    value: raw.to_string(),
                });
            }
            parsed
        }
    };

    node.fields.date = parsed;
    node.fields.year = parsed.map(|d| d.year());
    warnings
}

fn missing(node: &ContentNode, field: &'static str) -> BuildWarning {
    BuildWarning::MissingField {
        node_id: node.id.clone(),
        file_path: node.file_path.clone(),
        field,
    }
}

/// Parse a front-matter date.
///
/// Accepts RFC 3339 (`2020-07-17T10:00:00+02:00`), `2020-07-17T10:00:00`,
/// `2020-07-17 10:00:00`, `2020-07-17` and `2020/07/17`. Offsets are
/// dropped, keeping the wall-clock time the author wrote.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
