//! Shared types passed between pipeline stages.
//!
//! Content nodes flow from the source through the enricher into the route
//! builder; routes flow out to the renderer (and to `routes.json`). All of
//! them serialize with serde so intermediate state can be inspected.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Source markup flavour, taken from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Markdown,
    Mdx,
}

impl ContentKind {
    /// Map a file extension (case-insensitive, without the dot) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "mdx" => Some(Self::Mdx),
            _ => None,
        }
    }
}

/// Front-matter fields recognized on every document.
///
/// `date` is kept as the raw text from the document; the enricher parses it
/// and records the result in [`DerivedFields`], warning when it can't.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content type (`post`, `page`, ...). Falls back to `posts.default_type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Values computed from front-matter by the enricher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// One source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    /// Path as reported by the content source, `/`-separated.
    pub file_path: String,
    pub kind: ContentKind,
    pub frontmatter: FrontMatter,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    #[serde(default)]
    pub fields: DerivedFields,
}

impl ContentNode {
    pub fn new(
        id: impl Into<String>,
        file_path: impl Into<String>,
        kind: ContentKind,
        frontmatter: FrontMatter,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
            kind,
            frontmatter,
            body: body.into(),
            slug: None,
            fields: DerivedFields::default(),
        }
    }

    /// Canonical route path, once the enricher has run.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Attach the slug. A slug is computed once; later calls are ignored.
    pub(crate) fn set_slug(&mut self, slug: String) {
        if self.slug.is_none() {
            self.slug = Some(slug);
        }
    }

    /// Front-matter `type`, or the configured default.
    pub fn content_type<'a>(&'a self, default_type: &'a str) -> &'a str {
        self.frontmatter.content_type.as_deref().unwrap_or(default_type)
    }

    /// Display title: front-matter title, else the last slug segment, else the id.
    pub fn display_title(&self) -> &str {
        let title = self.frontmatter.title.as_deref();
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            return title;
        }
        self.slug()
            .and_then(|s| s.trim_matches('/').rsplit('/').next())
            .filter(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// Renderer that consumes a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    Post,
    Tag,
    Index,
    Articles,
    About,
    Contact,
    NotFound,
}

impl Template {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Tag => "tag",
            Self::Index => "index",
            Self::Articles => "articles",
            Self::About => "about",
            Self::Contact => "contact",
            Self::NotFound => "not-found",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value data handed to the renderer alongside the template.
pub type RouteContext = BTreeMap<String, serde_json::Value>;

/// A generated page descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub template: Template,
    pub context: RouteContext,
}

impl Route {
    pub fn new(path: impl Into<String>, template: Template) -> Self {
        Self {
            path: path.into(),
            template,
            context: RouteContext::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// String value from the context, if present.
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(|v| v.as_str())
    }

    /// What produced this route, read back from its template and context.
    pub fn source(&self) -> RouteSource {
        match self.template {
            Template::Post => RouteSource::Node(self.context_str("id").unwrap_or_default().into()),
            Template::Tag => RouteSource::Tag(self.context_str("tag").unwrap_or_default().into()),
            other => RouteSource::Page(other),
        }
    }
}

/// Origin of a route, used to name both sides of a path collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    Node(String),
    Tag(String),
    Page(Template),
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node `{id}`"),
            Self::Tag(tag) => write!(f, "tag `{tag}`"),
            Self::Page(template) => write!(f, "page `{template}`"),
        }
    }
}

/// Two routes computed to the same path. Fatal for the whole build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate route {path}: produced by {first} and {second}")]
pub struct DuplicateRouteError {
    pub path: String,
    pub first: RouteSource,
    pub second: RouteSource,
}

/// Recoverable problems found while enriching nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    #[error("{file_path}: missing front-matter field `{field}`")]
    MissingField {
        node_id: String,
        file_path: String,
        field: &'static str,
    },
    #[error("{file_path}: unparseable date {value:?}, treating it as absent")]
    MalformedDate {
        node_id: String,
        file_path: String,
        value: String,
    },
}

impl BuildWarning {
    pub fn node_id(&self) -> &str {
        match self {
            Self::MissingField { node_id, .. } | Self::MalformedDate { node_id, .. } => node_id,
        }
    }
}
