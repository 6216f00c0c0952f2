//! Content discovery: turning files on disk into [`ContentNode`]s.
//!
//! Stage 1 of the folio pipeline. The rest of the pipeline only sees the
//! [`ContentSource`] trait, so tests (and anything else that already holds
//! documents in memory) can skip the filesystem entirely.
//!
//! ## Directory Structure
//!
//! ```text
//! my-site/                         # Project root
//! ├── folio.toml
//! └── content/blog/                # content_root
//!     ├── post-one/
//!     │   ├── index.md             # → /post-one/
//!     │   └── diagram.png          # Ignored (not a document)
//!     ├── post-two/
//!     │   └── index.mdx            # → /post-two/
//!     ├── notes.md                 # → /notes/
//!     └── .drafts/                 # Hidden, skipped
//! ```
//!
//! ## Front-matter
//!
//! Documents may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Automatically deploying a site with GitHub Actions
//! date: 2020-07-17
//! tags: [CI, GitHub]
//! description: Build and publish on every push.
//! ---
//! Body text in Markdown...
//! ```
//!
//! A document without a front-matter block gets an empty [`FrontMatter`];
//! the enricher reports the missing fields. A block that isn't valid YAML is
//! a hard error naming the file.

use crate::types::{ContentKind, ContentNode, FrontMatter};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content root not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Invalid front-matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Anything that can hand the pipeline a snapshot of content nodes.
pub trait ContentSource {
    fn list_nodes(&self) -> Result<Vec<ContentNode>, SourceError>;
}

impl ContentSource for Vec<ContentNode> {
    fn list_nodes(&self) -> Result<Vec<ContentNode>, SourceError> {
        Ok(self.clone())
    }
}

/// Filesystem scanner over `<project_root>/<content_root>`.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    project_root: PathBuf,
    content_root: PathBuf,
}

impl FsContentSource {
    pub fn new(project_root: impl Into<PathBuf>, content_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            content_root: content_root.into(),
        }
    }

    /// Absolute (or cwd-relative) directory that gets walked.
    pub fn root_dir(&self) -> PathBuf {
        self.project_root.join(&self.content_root)
    }
}

impl ContentSource for FsContentSource {
    fn list_nodes(&self) -> Result<Vec<ContentNode>, SourceError> {
        let root = self.root_dir();
        if !root.is_dir() {
            return Err(SourceError::MissingRoot(root));
        }

        let mut nodes = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(kind) = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ContentKind::from_extension)
            else {
                continue;
            };

            let rel = path.strip_prefix(&self.project_root).unwrap_or(path);
            let file_path = to_slash_path(rel);
            let content = fs::read_to_string(path)?;
            let (frontmatter, body) =
                parse_document(&content).map_err(|source| SourceError::FrontMatter {
                    path: path.to_path_buf(),
                    source,
                })?;

            nodes.push(ContentNode::new(
                node_id(&file_path),
                file_path,
                kind,
                frontmatter,
                body,
            ));
        }

        Ok(nodes)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Render a relative path with `/` separators regardless of platform.
fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Stable node id: first 16 hex chars of SHA-256 over the reported file path.
pub fn node_id(file_path: &str) -> String {
    let digest = Sha256::digest(file_path.as_bytes());
    let mut id = format!("{:x}", digest);
    id.truncate(16);
    id
}

/// Split a document into its front-matter and body.
///
/// The opening fence must be the first line (a UTF-8 BOM is tolerated). An
/// unterminated fence is treated as "no front-matter" and the whole text is
/// the body.
pub fn parse_document(content: &str) -> Result<(FrontMatter, String), serde_yaml::Error> {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some((yaml, body)) = split_front_matter(text) else {
        return Ok((FrontMatter::default(), text.to_string()));
    };
    let frontmatter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    Ok((frontmatter, body.to_string()))
}

fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let first_line_end = text.find('\n')?;
    if text[..first_line_end].trim_end() != "---" {
        return None;
    }
    let rest = &text[first_line_end + 1..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    None
}
