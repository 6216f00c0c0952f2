//! Tag aggregation and URL-safe tag names.
//!
//! Tags are grouped by their exact front-matter spelling: `Python` and
//! `python` are two groups. Case folding only happens when a tag becomes a
//! path segment through [`url_safe`], so two spellings that fold together
//! surface as a route collision instead of being merged silently.

use crate::types::ContentNode;
use serde::Serialize;
use std::collections::BTreeMap;

/// All nodes sharing one tag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub tag: String,
    /// Distinct member node ids, in the order they were first seen.
    pub node_ids: Vec<String>,
}

impl TagGroup {
    pub fn total_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|id| id == node_id)
    }
}

/// Group nodes by tag.
///
/// A node listing the same tag twice is counted once. Groups come back
/// sorted by tag value.
pub fn aggregate_tags(nodes: &[ContentNode]) -> Vec<TagGroup> {
    let mut groups: BTreeMap<&str, TagGroup> = BTreeMap::new();
    for node in nodes {
        for tag in &node.frontmatter.tags {
            let group = groups
                .entry(tag.as_str())
                .or_insert_with(|| TagGroup {
                    tag: tag.clone(),
                    node_ids: Vec::new(),
                });
            if !group.contains(&node.id) {
                group.node_ids.push(node.id.clone());
            }
        }
    }
    groups.into_values().collect()
}

/// Order groups for display: most used first, ties alphabetical.
pub fn sort_by_count(groups: &mut [TagGroup]) {
    groups.sort_by(|a, b| {
        b.total_count()
            .cmp(&a.total_count())
            .then_with(|| a.tag.cmp(&b.tag))
    });
}

/// Kebab-case a tag for use as a path segment.
///
/// Transliterates to ASCII with `deunicode` (accents and other combining
/// marks disappear), lowercases, turns every run of other characters into a
/// single `-`, and strips leading/trailing dashes.
/// `url_safe(url_safe(x)) == url_safe(x)`.
///
/// - `"Data Engineering"` → `"data-engineering"`
/// - `"  C++ / Rust!"` → `"c-rust"`
/// - `"İstanbul"` → `"istanbul"`
pub fn url_safe(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut pending_dash = false;
    let ascii = tag
        .chars()
        .flat_map(|c| deunicode::deunicode_char(c).unwrap_or("-").chars());
    for c in ascii {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
