//! Date-ordered views over enriched nodes.
//!
//! These back the listing pages: "Latest" on the home page, the year-grouped
//! archive on `/articles/`, and the post list on each tag page. Only nodes of
//! a dated content type with a parsed date take part in date-based views;
//! the enricher already warned about the rest.

use crate::config::SiteConfig;
use crate::tags::TagGroup;
use crate::types::ContentNode;
use std::cmp::Ordering;

/// Posts published in one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub posts: Vec<&'a ContentNode>,
}

/// Newest first; undated nodes sink to the end; slug breaks ties.
fn newest_first(a: &ContentNode, b: &ContentNode) -> Ordering {
    match (a.fields.date, b.fields.date) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug().cmp(&b.slug()))
}

/// Dated posts of a listed content type, newest first.
pub fn dated_posts<'a>(nodes: &'a [ContentNode], config: &SiteConfig) -> Vec<&'a ContentNode> {
    let mut posts: Vec<&ContentNode> = nodes
        .iter()
        .filter(|n| config.posts.is_dated(n.content_type(&config.posts.default_type)))
        .filter(|n| n.fields.date.is_some())
        .collect();
    posts.sort_by(|a, b| newest_first(a, b));
    posts
}

/// The `posts.latest_limit` most recent posts.
pub fn latest_posts<'a>(nodes: &'a [ContentNode], config: &SiteConfig) -> Vec<&'a ContentNode> {
    let mut posts = dated_posts(nodes, config);
    posts.truncate(config.posts.latest_limit);
    posts
}

/// Dated posts grouped by year, most recent year first.
pub fn group_by_year<'a>(nodes: &'a [ContentNode], config: &SiteConfig) -> Vec<YearGroup<'a>> {
    let mut groups: Vec<YearGroup<'a>> = Vec::new();
    for post in dated_posts(nodes, config) {
        let Some(year) = post.fields.year else {
            continue;
        };
        match groups.last_mut() {
            Some(group) if group.year == year => group.posts.push(post),
            _ => groups.push(YearGroup {
                year,
                posts: vec![post],
            }),
        }
    }
    groups
}

/// Members of a tag group, newest first, undated members last.
pub fn posts_tagged<'a>(nodes: &'a [ContentNode], group: &TagGroup) -> Vec<&'a ContentNode> {
    let mut posts: Vec<&ContentNode> = nodes.iter().filter(|n| group.contains(&n.id)).collect();
    posts.sort_by(|a, b| newest_first(a, b));
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::tags::aggregate_tags;
    use crate::test_helpers::*;

    fn enriched(mut nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        enrich(&mut nodes, &test_config()).unwrap();
        nodes
    }

    fn ids<'a>(nodes: &[&'a ContentNode]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn latest_posts_newest_first_and_limited() {
        let nodes = enriched(
            (1..=7)
                .map(|i| {
                    dated_node(
                        &format!("p{i}"),
                        &format!("content/blog/p{i}/index.md"),
                        &format!("2021-0{i}-01"),
                        &[],
                    )
                })
                .collect(),
        );
        let latest = latest_posts(&nodes, &test_config());
        assert_eq!(ids(&latest), vec!["p7", "p6", "p5", "p4", "p3"]);
    }

    #[test]
    fn undated_and_undated_types_excluded_from_latest() {
        let mut page = dated_node("about", "content/blog/about/index.md", "2022-01-01", &[]);
        page.frontmatter.content_type = Some("page".into());
        let nodes = enriched(vec![
            dated_node("a", "content/blog/a/index.md", "2020-01-01", &[]),
            titled_node("undated", "content/blog/undated/index.md", &[]),
            dated_node("bad", "content/blog/bad/index.md", "someday", &[]),
            page,
        ]);
        let latest = latest_posts(&nodes, &test_config());
        assert_eq!(ids(&latest), vec!["a"]);
    }

    #[test]
    fn group_by_year_descending() {
        let nodes = enriched(vec![
            dated_node("old", "content/blog/old/index.md", "2019-05-01", &[]),
            dated_node("new", "content/blog/new/index.md", "2021-02-01", &[]),
            dated_node("newer", "content/blog/newer/index.md", "2021-11-01", &[]),
            dated_node("mid", "content/blog/mid/index.md", "2020-06-01", &[]),
        ]);
        let groups = group_by_year(&nodes, &test_config());

        let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
        assert_eq!(years, vec![2021, 2020, 2019]);
        assert_eq!(ids(&groups[0].posts), vec!["newer", "new"]);
    }

    #[test]
    fn group_by_year_skips_undated() {
        let nodes = enriched(vec![
            titled_node("undated", "content/blog/undated/index.md", &[]),
            dated_node("a", "content/blog/a/index.md", "2020-01-01", &[]),
        ]);
        let groups = group_by_year(&nodes, &test_config());
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0].posts), vec!["a"]);
    }

    #[test]
    fn posts_tagged_keeps_undated_members_last() {
        let nodes = enriched(vec![
            titled_node("undated", "content/blog/undated/index.md", &["Rust"]),
            dated_node("old", "content/blog/old/index.md", "2019-01-01", &["Rust"]),
            dated_node("new", "content/blog/new/index.md", "2022-01-01", &["Rust"]),
            dated_node("other", "content/blog/other/index.md", "2023-01-01", &["Go"]),
        ]);
        let groups = aggregate_tags(&nodes);
        let rust = groups.iter().find(|g| g.tag == "Rust").unwrap();
        assert_eq!(ids(&posts_tagged(&nodes, rust)), vec!["new", "old", "undated"]);
    }

    #[test]
    fn same_date_tiebreak_by_slug() {
        let nodes = enriched(vec![
            dated_node("b", "content/blog/b/index.md", "2020-01-01", &[]),
            dated_node("a", "content/blog/a/index.md", "2020-01-01", &[]),
        ]);
        assert_eq!(ids(&dated_posts(&nodes, &test_config())), vec!["a", "b"]);
    }
}
