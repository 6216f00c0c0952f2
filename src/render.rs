//! HTML rendering.
//!
//! Final stage of the folio pipeline. Every route in the [`SiteIndex`] becomes
//! one HTML document, chosen by the route's template and filled from its
//! context.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.html                 # Home: latest posts + tag cloud
//! ├── 404.html                   # Not-found page
//! ├── .folio-pages.json         # Pages written by the last build
//! ├── articles/
//! │   └── index.html             # All posts grouped by year
//! ├── about/
//! │   └── index.html             # Only with [pages] about
//! ├── my-post/
//! │   └── index.html             # One per content node, at its slug
//! └── tags/
//!     └── data-engineering/
//!         └── index.html         # One per tag group
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so
//! titles, tags and descriptions from front-matter are escaped. Post bodies
//! go through `pulldown-cmark` and are inserted as-is.
//!
//! Routes are independent of each other once the route set is validated, so
//! they render on the rayon pool.
//!
//! ## Stale Pages
//!
//! Every build records the files it wrote in `.folio-pages.json`. The next
//! build deletes recorded files it no longer produces, so a renamed post or a
//! dropped tag does not leave its old page behind. Files folio never wrote
//! (a `CNAME`, hand-placed assets) are left alone.

use crate::collections;
use crate::config::{ProjectConfig, SiteConfig};
use crate::routes::{self, ABOUT_PATH, ARTICLES_PATH, CONTACT_PATH, INDEX_PATH, SiteIndex};
use crate::tags::{self, TagGroup};
use crate::types::{ContentNode, Route, Template};
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, TagEnd, html as md_html};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("route {path} refers to unknown node `{id}`")]
    UnknownNode { path: String, id: String },
    #[error("route {path} refers to unknown tag `{tag}`")]
    UnknownTag { path: String, tag: String },
    #[error("route {path} has no `{key}` in its context")]
    MissingContext { path: String, key: &'static str },
    #[error("route path {0} cannot be mapped to an output file")]
    UnsafePath(String),
    #[error("page manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// One written document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub path: String,
    pub template: Template,
    /// Relative to the output directory.
    pub file: PathBuf,
}

const CSS: &str = include_str!("../static/style.css");

/// Name of the page manifest within the output directory.
pub const MANIFEST_FILENAME: &str = ".folio-pages.json";

/// Meta descriptions generated from a post body stop at this many characters.
const EXCERPT_LENGTH: usize = 140;

/// Render every route in `site` into `output_dir`, then remove pages the
/// previous build wrote that this one did not.
///
/// Pages come back in route order.
pub fn render_site(
    site: &SiteIndex,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<Vec<RenderedPage>, RenderError> {
    fs::create_dir_all(output_dir)?;
    let previous = PageManifest::load(output_dir);

    let pages: Vec<RenderedPage> = site
        .routes
        .par_iter()
        .map(|route| {
            let markup = render_route(route, site, config)?;
            let file = output_file(route)?;
            let dest = output_dir.join(&file);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, markup.into_string())?;
            log::debug!("rendered {} -> {}", route.path, dest.display());
            Ok(RenderedPage {
                path: route.path.clone(),
                template: route.template,
                file,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let current = PageManifest::from_pages(&pages);
    let removed = remove_stale_pages(output_dir, &previous, &current)?;
    if removed > 0 {
        log::info!("removed {removed} stale pages from {}", output_dir.display());
    }
    current.save(output_dir)?;
    Ok(pages)
}

/// Files written by one build, relative to the output directory.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PageManifest {
    files: BTreeSet<PathBuf>,
}

impl PageManifest {
    fn from_pages(pages: &[RenderedPage]) -> Self {
        Self {
            files: pages.iter().map(|p| p.file.clone()).collect(),
        }
    }

    /// A missing or unreadable manifest means nothing is known to be stale.
    fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable {}: {e}", path.display());
            Self::default()
        })
    }

    fn save(&self, output_dir: &Path) -> Result<(), RenderError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(output_dir.join(MANIFEST_FILENAME), json)?;
        Ok(())
    }
}

/// Delete files listed in `previous` but not in `current`, then any
/// directories that left empty. Returns the number of files removed.
fn remove_stale_pages(
    output_dir: &Path,
    previous: &PageManifest,
    current: &PageManifest,
) -> Result<usize, RenderError> {
    let mut removed = 0;
    for file in previous.files.difference(&current.files) {
        // Entries come from disk; never follow one out of the output tree.
        if !file.components().all(|c| matches!(c, Component::Normal(_))) {
            continue;
        }
        let dest = output_dir.join(file);
        match fs::remove_file(&dest) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
        log::debug!("removed stale {}", dest.display());
        let mut dir = dest.parent();
        while let Some(d) = dir.filter(|d| *d != output_dir) {
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
    Ok(removed)
}

/// Where a route's document lands, relative to the output directory.
///
/// `/a/b/` becomes `a/b/index.html`; the not-found page is `404.html` so
/// static hosts pick it up.
pub fn output_file(route: &Route) -> Result<PathBuf, RenderError> {
    if route.template == Template::NotFound {
        return Ok(PathBuf::from("404.html"));
    }
    let mut file = PathBuf::new();
    for segment in route.path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(RenderError::UnsafePath(route.path.clone()));
        }
        file.push(segment);
    }
    file.push("index.html");
    Ok(file)
}

/// Render a single route without touching the filesystem.
pub fn render_route(
    route: &Route,
    site: &SiteIndex,
    config: &SiteConfig,
) -> Result<Markup, RenderError> {
    let markup = match route.template {
        Template::Post => {
            let id = context(route, "id")?;
            let node = site.node(id).ok_or_else(|| RenderError::UnknownNode {
                path: route.path.clone(),
                id: id.to_string(),
            })?;
            render_post(node, config)
        }
        Template::Tag => {
            let tag = context(route, "tag")?;
            let group = site.tag(tag).ok_or_else(|| RenderError::UnknownTag {
                path: route.path.clone(),
                tag: tag.to_string(),
            })?;
            render_tag_page(group, &site.nodes, config)
        }
        Template::Index => render_index(site, config),
        Template::Articles => render_articles(site, config),
        Template::About => {
            let body = config.pages.about.as_deref().unwrap_or_default();
            render_standalone("About", ABOUT_PATH, body, config)
        }
        Template::Contact => {
            let body = config.pages.contact.as_deref().unwrap_or_default();
            render_standalone("Contact", CONTACT_PATH, body, config)
        }
        Template::NotFound => render_not_found(config),
    };
    Ok(markup)
}

fn context<'a>(route: &'a Route, key: &'static str) -> Result<&'a str, RenderError> {
    route
        .context_str(key)
        .ok_or_else(|| RenderError::MissingContext {
            path: route.path.clone(),
            key,
        })
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// `description` is the page's own meta description; pages without one get
/// the site description.
fn base_document(
    page_title: Option<&str>,
    description: Option<&str>,
    current: &str,
    config: &SiteConfig,
    content: Markup,
) -> Markup {
    let title = match page_title {
        Some(page) => format!("{page} | {}", config.site.title),
        None => config.site.title.clone(),
    };
    let description = description
        .or(Some(config.site.description.as_str()))
        .filter(|d| !d.is_empty());

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = description {
                    meta name="description" content=(description);
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                (site_header(current, config))
                main { (content) }
                (site_footer(config))
            }
        }
    }
}

/// Site title plus the navigation; about and contact only when configured
fn site_header(current: &str, config: &SiteConfig) -> Markup {
    let mut nav = vec![(INDEX_PATH, "Home"), (ARTICLES_PATH, "Articles")];
    if config.pages.about.is_some() {
        nav.push((ABOUT_PATH, "About"));
    }
    if config.pages.contact.is_some() {
        nav.push((CONTACT_PATH, "Contact"));
    }

    html! {
        header.site-header {
            a.site-title href=(INDEX_PATH) { (config.site.title) }
            nav.site-nav {
                ul {
                    @for (href, label) in nav {
                        li class=[(current == href).then_some("current")] {
                            a href=(href) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(config: &SiteConfig) -> Markup {
    html! {
        footer.site-footer {
            @if !config.site.author.is_empty() {
                "© " (config.site.author)
            }
        }
    }
}

/// Tag chips linking to their tag pages, optionally with member counts
fn render_tag_chips(groups: &[TagGroup], with_counts: bool, config: &SiteConfig) -> Markup {
    html! {
        ul.tags {
            @for group in groups {
                li {
                    a.tag href=(routes::tag_path(&group.tag, config)) {
                        "#" (group.tag)
                        @if with_counts {
                            sup { (group.total_count()) }
                        }
                    }
                }
            }
        }
    }
}

fn render_post_list(posts: &[&ContentNode]) -> Markup {
    html! {
        ul.post-list {
            @for post in posts {
                li {
                    a href=(post.slug().unwrap_or(INDEX_PATH)) { (post.display_title()) }
                    @if let Some(date) = post.fields.date {
                        " " (render_date(&date))
                    }
                    @if let Some(description) = &post.frontmatter.description {
                        p { (description) }
                    }
                }
            }
        }
    }
}

fn render_date(date: &NaiveDateTime) -> Markup {
    html! {
        time datetime=(date.format("%Y-%m-%d")) { (long_date(date)) }
    }
}

/// `17 July, 2020`
pub fn long_date(date: &NaiveDateTime) -> String {
    date.format("%-d %B, %Y").to_string()
}

fn count_label(count: usize) -> String {
    match count {
        1 => "1 post".to_string(),
        n => format!("{n} posts"),
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// Plain text of a Markdown body, cut at a word boundary to at most
/// `max_chars` characters with `…` appended when anything was dropped.
/// Raw HTML and MDX components contribute nothing.
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }

    let mut out = String::new();
    let mut len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let sep = usize::from(!out.is_empty());
        if len + sep + word_len > max_chars {
            if out.is_empty() {
                out.extend(word.chars().take(max_chars));
            }
            out.push('…');
            return out;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(word);
        len += sep + word_len;
    }
    out
}

/// The "Open Source" project cards on the home page
fn render_projects(projects: &[ProjectConfig]) -> Markup {
    html! {
        ul.projects {
            @for project in projects {
                li.project {
                    h3 {
                        @if let Some(url) = &project.home_url {
                            a href=(url) { (project.name) }
                        } @else {
                            (project.name)
                        }
                    }
                    @if !project.description.is_empty() {
                        p { (project.description) }
                    }
                    @if !project.topics.is_empty() {
                        ul.topics {
                            @for topic in &project.topics {
                                li { (topic) }
                            }
                        }
                    }
                    @if !project.links.is_empty() {
                        p.links {
                            @for link in &project.links {
                                a href=(link.url) { (link.text) } " "
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_post(node: &ContentNode, config: &SiteConfig) -> Markup {
    let title = node.display_title();
    let slug = node.slug().unwrap_or_default();

    let content = html! {
        article.post {
            header {
                h1 { (title) }
                @if let Some(date) = node.fields.date {
                    (render_date(&date))
                }
                @if !node.frontmatter.tags.is_empty() {
                    ul.tags {
                        @for tag in &node.frontmatter.tags {
                            li {
                                a.tag href=(routes::tag_path(tag, config)) { "#" (tag) }
                            }
                        }
                    }
                }
            }
            div.post-body {
                (PreEscaped(markdown_to_html(&node.body)))
            }
        }
    };

    let description = match node.frontmatter.description.as_deref() {
        Some(d) if !d.trim().is_empty() => d.to_string(),
        _ => excerpt(&node.body, EXCERPT_LENGTH),
    };
    base_document(Some(title), Some(&description), slug, config, content)
}

fn render_tag_page(group: &TagGroup, nodes: &[ContentNode], config: &SiteConfig) -> Markup {
    let posts = collections::posts_tagged(nodes, group);

    let content = html! {
        section.tag-page {
            h1 { "#" (group.tag) }
            p.count { (count_label(group.total_count())) }
            (render_post_list(&posts))
        }
    };

    let path = routes::tag_path(&group.tag, config);
    base_document(Some(&group.tag), None, &path, config, content)
}

fn render_index(site: &SiteIndex, config: &SiteConfig) -> Markup {
    let latest = collections::latest_posts(&site.nodes, config);
    let mut tags = site.tags.clone();
    tags::sort_by_count(&mut tags);

    let content = html! {
        section.intro {
            h1 { (config.site.title) }
            @if !config.site.description.is_empty() {
                p { (config.site.description) }
            }
        }
        section.latest {
            h2 { "Latest" }
            (render_post_list(&latest))
            a href=(ARTICLES_PATH) { "All articles" }
        }
        @if !config.projects.is_empty() {
            section.open-source {
                h2 { "Open Source" }
                (render_projects(&config.projects))
            }
        }
        @if !tags.is_empty() {
            section.tag-cloud {
                h2 { "Tags" }
                (render_tag_chips(&tags, true, config))
            }
        }
    };

    base_document(None, None, INDEX_PATH, config, content)
}

fn render_articles(site: &SiteIndex, config: &SiteConfig) -> Markup {
    let years = collections::group_by_year(&site.nodes, config);

    let content = html! {
        h1 { "Articles" }
        @if !site.tags.is_empty() {
            (render_tag_chips(&site.tags, false, config))
        }
        @for group in &years {
            section.year {
                h2 { (group.year) }
                (render_post_list(&group.posts))
            }
        }
    };

    base_document(Some("Articles"), None, ARTICLES_PATH, config, content)
}

/// About and contact: a heading plus the configured Markdown body.
fn render_standalone(title: &str, path: &str, body: &str, config: &SiteConfig) -> Markup {
    let content = html! {
        article.page {
            h1 { (title) }
            div.page-body {
                (PreEscaped(markdown_to_html(body)))
            }
        }
    };

    base_document(Some(title), None, path, config, content)
}

fn render_not_found(config: &SiteConfig) -> Markup {
    let content = html! {
        section.not-found {
            h1 { "Page not found" }
            p { "Nothing lives at this address." }
            a href=(INDEX_PATH) { "Back to the home page" }
        }
    };

    base_document(Some("Page not found"), None, "", config, content)
}

// ============================================================================
// Tests
// ============================================================================
