//! # Folio
//!
//! A static blog generator. Markdown and MDX documents with YAML
//! front-matter go in; a directory of HTML pages comes out, one per post,
//! one per tag, plus a home page (with an optional open source project
//! list), an archive, optional about and contact pages and a not-found page.
//!
//! # Architecture: Sequential Pipeline
//!
//! ```text
//! 1. Source   content/blog/  →  ContentNode snapshot   (files → typed front-matter)
//! 2. Enrich   nodes          →  slug, date, year       (+ warnings)
//! 3. Tags     nodes          →  TagGroup list          (tag → members, count)
//! 4. Routes   nodes + tags   →  Route list             (path, template, context)
//! 5. Render   routes         →  public/                (HTML via Maud)
//! ```
//!
//! Each stage is a plain function call from [`pipeline`]; there are no hooks
//! or callbacks. Stages 1-4 never write anything, and the route list they
//! produce can be dumped as JSON (`folio routes`) for inspection.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | `ContentSource` trait and the filesystem walker that parses front-matter |
//! | [`enrich`] | Slug derivation, front-matter validation, date/year fields |
//! | [`tags`] | Tag grouping and the kebab-case `url_safe` transform |
//! | [`routes`] | Post, tag and listing routes; site-wide path uniqueness |
//! | [`collections`] | Date-ordered views (latest, by year, by tag) for listing pages |
//! | [`render`] | Maud templates and parallel HTML output |
//! | [`pipeline`] | Orchestration: config → source → routes → render |
//! | [`config`] | `folio.toml` loading, stock defaults, validation |
//! | [`types`] | Shared types: `ContentNode`, `Route`, errors and warnings |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `env_logger` setup for the binary |
//!
//! # Design Decisions
//!
//! ## Route Paths Are Global
//!
//! Post slugs, tag pages and site pages share one namespace. Two producers
//! landing on the same path is a build failure that names both, never a
//! silent overwrite. Tags keep their exact spelling for grouping, so
//! `Machine Learning` and `machine-learning` are reported as a collision on
//! `/tags/machine-learning/` instead of being merged.
//!
//! ## Warnings Versus Errors
//!
//! A missing title or an unparseable date is logged and the document is
//! still published; only problems that would make the output ambiguous
//! (duplicate paths, invalid YAML, a file outside the content root) stop
//! the build.

pub mod collections;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod source;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
