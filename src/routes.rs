//! Route generation.
//!
//! Stage 3 of the folio pipeline. Turns enriched nodes and tag groups into a
//! flat list of [`Route`]s, one output document each:
//!
//! | Route              | Template    | Context            |
//! |--------------------|-------------|--------------------|
//! | `<node slug>`      | `post`      | `{ id }`           |
//! | `/tags/<tag>/`     | `tag`       | `{ tag }`          |
//! | `/`                | `index`     | `{}`               |
//! | `/articles/`       | `articles`  | `{}`               |
//! | `/about/`          | `about`     | `{}`               |
//! | `/contact/`        | `contact`   | `{}`               |
//! | `/404/`            | `not-found` | `{}`               |
//!
//! The about and contact pages only exist when `[pages]` gives them a body.
//!
//! Route paths must be unique across the whole site. A collision aborts the
//! build with both producers named; there is no partial route set.

use crate::config::SiteConfig;
use crate::enrich::{self, EnrichError};
use crate::tags::{self, TagGroup};
use crate::types::{BuildWarning, ContentNode, DuplicateRouteError, Route, Template};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateRouteError),
    #[error("node `{0}` has no slug; run enrichment first")]
    MissingSlug(String),
}

impl RouteError {
    /// The path collision behind this error, whether it was found while
    /// deriving slugs or while combining routes.
    pub fn duplicate(&self) -> Option<&DuplicateRouteError> {
        match self {
            Self::Duplicate(dup) | Self::Enrich(EnrichError::Duplicate(dup)) => Some(dup),
            _ => None,
        }
    }
}

/// Everything one route-generation pass produced.
#[derive(Debug, Clone)]
pub struct SiteIndex {
    pub nodes: Vec<ContentNode>,
    pub tags: Vec<TagGroup>,
    pub routes: Vec<Route>,
    pub warnings: Vec<BuildWarning>,
}

impl SiteIndex {
    pub fn node(&self, id: &str) -> Option<&ContentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn tag(&self, tag: &str) -> Option<&TagGroup> {
        self.tags.iter().find(|g| g.tag == tag)
    }

    pub fn route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }
}

/// One `post` route per node, at the node's slug.
pub fn build_content_routes(nodes: &[ContentNode]) -> Result<Vec<Route>, RouteError> {
    nodes
        .iter()
        .map(|node| {
            let slug = node
                .slug()
                .ok_or_else(|| RouteError::MissingSlug(node.id.clone()))?;
            Ok(Route::new(slug, Template::Post).with("id", node.id.as_str()))
        })
        .collect()
}

/// One `tag` route per group, at `/<prefix>/<url_safe(tag)>/`.
pub fn build_tag_routes(groups: &[TagGroup], config: &SiteConfig) -> Vec<Route> {
    groups
        .iter()
        .map(|group| {
            Route::new(tag_path(&group.tag, config), Template::Tag).with("tag", group.tag.as_str())
        })
        .collect()
}

/// Path of the tag page for a tag value.
///
/// A tag with no alphanumeric characters maps to the tag prefix itself.
pub fn tag_path(tag: &str, config: &SiteConfig) -> String {
    let segment = tags::url_safe(tag);
    if segment.is_empty() {
        format!("/{}/", config.tags.path_prefix)
    } else {
        format!("/{}/{}/", config.tags.path_prefix, segment)
    }
}

pub const INDEX_PATH: &str = "/";
pub const ARTICLES_PATH: &str = "/articles/";
pub const ABOUT_PATH: &str = "/about/";
pub const CONTACT_PATH: &str = "/contact/";
pub const NOT_FOUND_PATH: &str = "/404/";

/// Site-level pages: home, archive, the configured standalone pages and 404.
pub fn build_listing_routes(config: &SiteConfig) -> Vec<Route> {
    let mut routes = vec![
        Route::new(INDEX_PATH, Template::Index),
        Route::new(ARTICLES_PATH, Template::Articles),
    ];
    if config.pages.about.is_some() {
        routes.push(Route::new(ABOUT_PATH, Template::About));
    }
    if config.pages.contact.is_some() {
        routes.push(Route::new(CONTACT_PATH, Template::Contact));
    }
    routes.push(Route::new(NOT_FOUND_PATH, Template::NotFound));
    routes
}

/// Fail on the first path produced twice.
pub fn ensure_unique(routes: &[Route]) -> Result<(), DuplicateRouteError> {
    let mut seen: HashMap<&str, &Route> = HashMap::with_capacity(routes.len());
    for route in routes {
        if let Some(first) = seen.insert(&route.path, route) {
            return Err(DuplicateRouteError {
                path: route.path.clone(),
                first: first.source(),
                second: route.source(),
            });
        }
    }
    Ok(())
}

/// Enrich, aggregate tags, build post and tag routes, and check that no two
/// routes share a path.
///
/// Takes ownership of the node snapshot and hands it back enriched inside
/// the [`SiteIndex`]. Nothing is returned on error.
pub fn build_all_routes(
    mut nodes: Vec<ContentNode>,
    config: &SiteConfig,
) -> Result<SiteIndex, RouteError> {
    let warnings = enrich::enrich(&mut nodes, config)?;
    let tags = tags::aggregate_tags(&nodes);

    let mut routes = build_content_routes(&nodes)?;
    routes.extend(build_tag_routes(&tags, config));
    ensure_unique(&routes)?;

    Ok(SiteIndex {
        nodes,
        tags,
        routes,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteSource;
    use crate::test_helpers::*;

    fn scenario_nodes() -> Vec<ContentNode> {
        vec![
            titled_node("a", "content/blog/post-one/index.md", &["Python", "SQL"]),
            titled_node("b", "content/blog/post-two/index.md", &["Python"]),
        ]
    }

    // =========================================================================
    // build_content_routes
    // =========================================================================

    #[test]
    fn one_post_route_per_node() {
        let mut nodes = scenario_nodes();
        enrich::enrich(&mut nodes, &test_config()).unwrap();
        let routes = build_content_routes(&nodes).unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes[0],
            Route::new("/post-one/", Template::Post).with("id", "a")
        );
        assert_eq!(
            routes[1],
            Route::new("/post-two/", Template::Post).with("id", "b")
        );
    }

    #[test]
    fn unenriched_node_is_error() {
        let nodes = scenario_nodes();
        let result = build_content_routes(&nodes);
        assert_eq!(result, Err(RouteError::MissingSlug("a".into())));
    }

    #[test]
    fn distinct_files_give_distinct_paths() {
        let mut nodes: Vec<ContentNode> = (0..25)
            .map(|i| titled_node(&format!("n{i}"), &format!("content/blog/p{i}/index.md"), &[]))
            .collect();
        nodes.push(titled_node("flat", "content/blog/flat.md", &[]));
        nodes.push(titled_node("deep", "content/blog/p1/deeper/index.md", &[]));
        enrich::enrich(&mut nodes, &test_config()).unwrap();

        let routes = build_content_routes(&nodes).unwrap();
        assert_eq!(routes.len(), nodes.len());
        assert!(ensure_unique(&routes).is_ok());
    }

    // =========================================================================
    // build_tag_routes
    // =========================================================================

    #[test]
    fn tag_routes_use_kebab_case_path_and_exact_tag_context() {
        let nodes = [titled_node("a", "content/blog/a/index.md", &["Data Engineering"])];
        let groups = tags::aggregate_tags(&nodes);
        let routes = build_tag_routes(&groups, &test_config());

        let expected = Route::new("/tags/data-engineering/", Template::Tag)
            .with("tag", "Data Engineering");
        assert_eq!(routes, vec![expected]);
    }

    #[test]
    fn tag_prefix_is_configurable() {
        let mut config = test_config();
        config.tags.path_prefix = "topics".into();
        assert_eq!(tag_path("Rust", &config), "/topics/rust/");
    }

    #[test]
    fn punctuation_only_tag_maps_to_prefix() {
        assert_eq!(tag_path("???", &test_config()), "/tags/");
    }

    // =========================================================================
    // ensure_unique
    // =========================================================================

    #[test]
    fn ensure_unique_names_both_producers() {
        let routes = vec![
            Route::new("/tags/c/", Template::Tag).with("tag", "C"),
            Route::new("/tags/python/", Template::Tag).with("tag", "Python"),
            Route::new("/tags/c/", Template::Tag).with("tag", "C++"),
        ];
        let err = ensure_unique(&routes).unwrap_err();
        assert_eq!(err.path, "/tags/c/");
        assert_eq!(err.first, RouteSource::Tag("C".into()));
        assert_eq!(err.second, RouteSource::Tag("C++".into()));
    }

    #[test]
    fn listing_routes_are_unique() {
        assert!(ensure_unique(&build_listing_routes(&test_config())).is_ok());
    }

    #[test]
    fn standalone_pages_need_a_body() {
        let mut config = test_config();
        assert_eq!(
            route_paths(&build_listing_routes(&config)),
            vec!["/", "/articles/", "/404/"]
        );

        config.pages.about = Some("Hi.".into());
        config.pages.contact = Some("Write to me.".into());
        let routes = build_listing_routes(&config);
        assert_eq!(
            route_paths(&routes),
            vec!["/", "/articles/", "/about/", "/contact/", "/404/"]
        );
        assert_eq!(find_route(&routes, ABOUT_PATH).template, Template::About);
        assert_eq!(find_route(&routes, CONTACT_PATH).template, Template::Contact);
        assert!(ensure_unique(&routes).is_ok());
    }

    // =========================================================================
    // build_all_routes
    // =========================================================================

    #[test]
    fn end_to_end_scenario() {
        let index = build_all_routes(scenario_nodes(), &test_config()).unwrap();

        assert_eq!(
            index.routes,
            vec![
                Route::new("/post-one/", Template::Post).with("id", "a"),
                Route::new("/post-two/", Template::Post).with("id", "b"),
                Route::new("/tags/python/", Template::Tag).with("tag", "Python"),
                Route::new("/tags/sql/", Template::Tag).with("tag", "SQL"),
            ]
        );
        assert_eq!(index.tag("Python").unwrap().total_count(), 2);
        assert_eq!(index.tag("SQL").unwrap().total_count(), 1);
        assert_eq!(index.node("a").unwrap().slug(), Some("/post-one/"));
    }

    #[test]
    fn colliding_slugs_fail_without_output() {
        let nodes = vec![
            titled_node("a", "content/blog/same/index.md", &["x"]),
            titled_node("b", "content/blog/same/index.mdx", &["y"]),
        ];
        let err = build_all_routes(nodes, &test_config()).unwrap_err();
        let dup = err.duplicate().expect("duplicate route error");
        assert_eq!(dup.path, "/same/");
        assert_eq!(dup.first, RouteSource::Node("a".into()));
        assert_eq!(dup.second, RouteSource::Node("b".into()));
    }

    #[test]
    fn tag_collision_after_kebab_case_is_fatal() {
        let nodes = vec![
            titled_node("a", "content/blog/one/index.md", &["Machine Learning"]),
            titled_node("b", "content/blog/two/index.md", &["machine-learning"]),
        ];
        let err = build_all_routes(nodes, &test_config()).unwrap_err();
        let dup = err.duplicate().expect("duplicate route error");
        assert_eq!(dup.path, "/tags/machine-learning/");
        assert_eq!(dup.first, RouteSource::Tag("Machine Learning".into()));
        assert_eq!(dup.second, RouteSource::Tag("machine-learning".into()));
    }

    #[test]
    fn post_colliding_with_tag_page_is_fatal() {
        let nodes = vec![
            titled_node("a", "content/blog/tags/rust/index.md", &[]),
            titled_node("b", "content/blog/other/index.md", &["Rust"]),
        ];
        let err = build_all_routes(nodes, &test_config()).unwrap_err();
        let dup = err.duplicate().expect("duplicate route error");
        assert_eq!(dup.path, "/tags/rust/");
        assert_eq!(dup.first, RouteSource::Node("a".into()));
        assert_eq!(dup.second, RouteSource::Tag("Rust".into()));
    }

    #[test]
    fn undated_node_still_gets_post_route() {
        let nodes = vec![titled_node("a", "content/blog/undated/index.md", &["x"])];
        let index = build_all_routes(nodes, &test_config()).unwrap();

        assert!(index.route("/undated/").is_some());
        assert_eq!(index.warnings.len(), 1);
        assert_eq!(index.warnings[0].node_id(), "a");
    }

    #[test]
    fn empty_input_yields_empty_index() {
        let index = build_all_routes(Vec::new(), &test_config()).unwrap();
        assert!(index.routes.is_empty());
        assert!(index.tags.is_empty());
    }
}
