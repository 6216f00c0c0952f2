//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. The file lives at
//! the project root, next to the content directory:
//!
//! ```text
//! my-site/
//! ├── folio.toml               # Site config (optional)
//! └── content/
//!     └── blog/
//!         ├── post-one/
//!         │   └── index.md
//!         └── post-two/
//!             └── index.mdx
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content/blog"  # Directory scanned for posts, relative to the project
//! base_path = "/"                # Prefix for every post slug
//!
//! [site]
//! title = "My Site"
//! description = ""
//! author = ""
//!
//! [posts]
//! dated_types = ["post"]     # Content types that get date/year derivation
//! default_type = "post"      # Type assumed when front-matter has no `type`
//! latest_limit = 5           # Posts shown on the home page
//!
//! [tags]
//! path_prefix = "tags"       # Tag pages live at /<path_prefix>/<tag>/
//!
//! [processing]
//! max_processes = 4          # Max parallel render workers (omit for auto = CPU cores)
//!
//! [pages]
//! about = "..."              # Markdown body of /about/ (omit for no page)
//! contact = "..."            # Markdown body of /contact/ (omit for no page)
//!
//! [[projects]]               # Listed under "Open Source" on the home page
//! name = "folio"
//! description = "Static blog generator"
//! topics = ["rust", "cli"]
//! home_url = "https://github.com/me/folio"
//! links = [{ text = "Docs", url = "https://docs.rs/folio" }]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [site]
//! title = "Andrew's Notes"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the content documents, relative to the project root.
    pub content_root: String,
    /// Prefix prepended to every post slug. Must start with `/`.
    pub base_path: String,
    /// Site metadata shown in page titles and the header.
    pub site: SiteMeta,
    /// Which documents count as dated posts, and how many the home page lists.
    pub posts: PostsConfig,
    /// Tag page routing.
    pub tags: TagsConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
    /// Standalone about/contact pages.
    pub pages: PagesConfig,
    /// Open source projects shown on the home page.
    pub projects: Vec<ProjectConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content/blog".to_string(),
            base_path: "/".to_string(),
            site: SiteMeta::default(),
            posts: PostsConfig::default(),
            tags: TagsConfig::default(),
            processing: ProcessingConfig::default(),
            pages: PagesConfig::default(),
            projects: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_root must not be empty".into(),
            ));
        }
        if !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "base_path must start with '/'".into(),
            ));
        }
        if self.tags.path_prefix.is_empty()
            || crate::tags::url_safe(&self.tags.path_prefix) != self.tags.path_prefix
        {
            return Err(ConfigError::Validation(
                "tags.path_prefix must be a non-empty lowercase kebab-case segment".into(),
            ));
        }
        if self.posts.latest_limit == 0 {
            return Err(ConfigError::Validation(
                "posts.latest_limit must be greater than zero".into(),
            ));
        }
        if self.posts.dated_types.is_empty() {
            return Err(ConfigError::Validation(
                "posts.dated_types must not be empty".into(),
            ));
        }
        for (i, project) in self.projects.iter().enumerate() {
            if project.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "projects[{i}].name must not be empty"
                )));
            }
            if project.links.iter().any(|l| l.text.is_empty() || l.url.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "projects[{i}] ({}) has a link without text or url",
                    project.name
                )));
            }
        }
        Ok(())
    }
}

/// Site-wide metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub author: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: String::new(),
            author: String::new(),
        }
    }
}

/// Post classification and listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// Content types whose `date` is parsed and whose `year` is derived.
    pub dated_types: Vec<String>,
    /// Content type assumed when a document's front-matter has no `type`.
    pub default_type: String,
    /// Number of posts listed under "Latest" on the home page.
    pub latest_limit: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            dated_types: vec!["post".to_string()],
            default_type: "post".to_string(),
            latest_limit: 5,
        }
    }
}

impl PostsConfig {
    /// Whether documents of this content type get date-based derivations.
    pub fn is_dated(&self, content_type: &str) -> bool {
        self.dated_types.iter().any(|t| t == content_type)
    }
}

/// Tag page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagsConfig {
    /// First path segment of every tag page.
    pub path_prefix: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            path_prefix: "tags".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Markdown bodies for the standalone pages. A page without a body is not
/// generated and gets no navigation link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    pub about: Option<String>,
    pub contact: Option<String>,
}

/// One entry of the home page's "Open Source" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Where the project name links to.
    #[serde(default)]
    pub home_url: Option<String>,
    /// Extra links shown after the description.
    #[serde(default)]
    pub links: Vec<ProjectLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectLink {
    pub text: String,
    pub url: String,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `folio.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `folio.toml` in the given project directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(project_root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(project_root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory holding the Markdown/MDX documents, relative to this file.
content_root = "content/blog"

# Prefix for every post URL. "/" gives /my-post/, "/blog" gives /blog/my-post/.
base_path = "/"

# ---------------------------------------------------------------------------
# Site metadata
# ---------------------------------------------------------------------------
[site]
title = "My Site"
description = ""
author = ""

# ---------------------------------------------------------------------------
# Posts
# ---------------------------------------------------------------------------
[posts]
# Content types (front-matter `type`) that carry a publication date.
# Only these get a derived year and appear in dated listings.
dated_types = ["post"]

# Type assumed when a document has no `type` in its front-matter.
default_type = "post"

# Number of posts listed under "Latest" on the home page.
latest_limit = 5

# ---------------------------------------------------------------------------
# Tags
# ---------------------------------------------------------------------------
[tags]
# Tag pages are generated at /<path_prefix>/<kebab-case-tag>/
path_prefix = "tags"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Standalone pages
# ---------------------------------------------------------------------------
[pages]
# Markdown body of /about/. Leave unset to skip the page and its nav link.
# about = """
# ## About me
#
# I write about data engineering.
#
# ## About this site
#
# Built with folio.
# """

# Markdown body of /contact/.
# contact = "Say hello at [me@example.com](mailto:me@example.com)."

# ---------------------------------------------------------------------------
# Projects
# ---------------------------------------------------------------------------
# Each [[projects]] entry is listed under "Open Source" on the home page.
#
# [[projects]]
# name = "folio"
# description = "Static blog generator"
# topics = ["rust", "static-site"]
# home_url = "https://github.com/me/folio"
# links = [{ text = "Docs", url = "https://docs.rs/folio" }]
"##
}
