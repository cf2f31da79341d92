//! Route-group aggregation.
//!
//! Collapses the denormalized snapshot rows into one group per resource and
//! path/rewrite variant. Groups are held in an ordered map keyed by
//! [`RouteKey`], so iteration order, and therefore the emitted document, is
//! stable across calls.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, error};

use super::path::validate_path_rewrite;
use super::rule::DEFAULT_PRIORITY;
use crate::domain::{
    DomainRef, PathRewrite, Resource, ResourceId, RouteRow, Site, Target, TransportProtocol,
};

/// Identity of a route group: one resource, one path/rewrite variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub resource_id: ResourceId,
    pub path: PathRewrite,
}

impl RouteKey {
    pub fn new(resource_id: ResourceId, path: PathRewrite) -> Self {
        Self { resource_id, path }
    }

    /// Name fragment used for every document key derived from this group.
    ///
    /// Only `[A-Za-z0-9_-]` survive; other characters become `-`, runs of `-`
    /// collapse and leading/trailing `-` are trimmed.
    pub fn slug(&self) -> String {
        let mut parts = vec![self.resource_id.to_string()];
        parts.extend(self.path.path.clone());
        parts.extend(self.path.match_type.map(|m| m.as_str().to_string()));
        parts.extend(self.path.rewrite_path.clone());
        parts.extend(self.path.rewrite_type.map(|r| r.as_str().to_string()));
        sanitize(&parts.join("-"))
    }
}

/// Replace characters the data plane does not accept in names.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// A target together with the site it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTarget {
    pub target: Target,
    pub site: Site,
}

/// Emission shape of a group, decided from the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    Http(HttpRoute),
    Raw(RawRoute),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRoute {
    pub full_domain: String,
    pub domain: DomainRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRoute {
    pub protocol: TransportProtocol,
    pub port: u16,
}

/// Aggregation unit: one resource, one path/rewrite variant, all its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub key: RouteKey,
    /// Sanitized, collision-free form of `key` used in document names
    pub slug: String,
    pub resource: Resource,
    /// Ordered by descending priority, then ascending target id
    pub targets: Vec<GroupTarget>,
}

impl RouteGroup {
    /// Decide the emission shape; `None` when the resource cannot be emitted
    /// yet (missing domain for HTTP, missing port for raw).
    pub fn route_kind(&self) -> Option<RouteKind> {
        let resource = &self.resource;
        if resource.http {
            let full_domain = resource.full_domain.as_deref().filter(|d| !d.is_empty())?;
            let domain = resource.domain.clone()?;
            Some(RouteKind::Http(HttpRoute { full_domain: full_domain.to_string(), domain }))
        } else {
            let port = resource.proxy_port.filter(|p| *p != 0)?;
            Some(RouteKind::Raw(RawRoute { protocol: resource.protocol, port }))
        }
    }

    /// Priority override of the group, taken from its highest-priority target.
    pub fn priority_override(&self) -> Option<i32> {
        self.targets.first().and_then(|t| t.target.priority)
    }
}

/// Result of aggregating one snapshot.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub groups: Vec<RouteGroup>,
    /// Keys rejected by path/rewrite validation
    pub invalid: Vec<RouteKey>,
}

/// Group rows by [`RouteKey`], validating each key on first sighting.
pub fn aggregate(rows: Vec<RouteRow>) -> Aggregation {
    let mut builders: BTreeMap<RouteKey, (Resource, Vec<GroupTarget>)> = BTreeMap::new();
    let mut invalid: BTreeSet<RouteKey> = BTreeSet::new();

    for row in rows {
        let key = RouteKey::new(row.resource.resource_id, row.target.path.clone());

        if invalid.contains(&key) {
            continue;
        }

        if !builders.contains_key(&key) {
            if let Err(e) = validate_path_rewrite(&key.path) {
                error!(
                    resource_id = %key.resource_id,
                    group_key = %key.slug(),
                    error = %e,
                    "Invalid path rewrite configuration, dropping route group"
                );
                invalid.insert(key);
                continue;
            }
        }

        let entry = builders.entry(key).or_insert_with(|| (row.resource.clone(), Vec::new()));
        entry.1.push(GroupTarget { target: row.target, site: row.site });
    }

    let mut taken: HashSet<String> = HashSet::new();
    let groups = builders
        .into_iter()
        .map(|(key, (resource, mut targets))| {
            targets.sort_by_key(|t| {
                (std::cmp::Reverse(t.target.priority.unwrap_or(DEFAULT_PRIORITY)), t.target.target_id)
            });

            let slug = unique_slug(&key, &mut taken);
            debug!(group_key = %slug, targets = targets.len(), "Aggregated route group");
            RouteGroup { key, slug, resource, targets }
        })
        .collect();

    Aggregation { groups, invalid: invalid.into_iter().collect() }
}

fn unique_slug(key: &RouteKey, taken: &mut HashSet<String>) -> String {
    let base = key.slug();
    let mut slug = base.clone();
    let mut suffix = 2;
    while !taken.insert(slug.clone()) {
        slug = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PathMatchType, RewritePathType};
    use crate::routing::test_support::{http_row, local_site};

    #[test]
    fn slug_joins_present_parts_only() {
        let key = RouteKey::new(ResourceId::new(7), PathRewrite::default());
        assert_eq!(key.slug(), "7");

        let key = RouteKey::new(
            ResourceId::new(7),
            PathRewrite::new(
                Some("/api/v1".into()),
                Some(PathMatchType::Prefix),
                Some("/".into()),
                Some(RewritePathType::StripPrefix),
            ),
        );
        assert_eq!(key.slug(), "7-api-v1-prefix-stripPrefix");
    }

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize("1-/a..b/-"), "1-a-b");
        assert_eq!(sanitize("__ok__"), "__ok__");
    }

    #[test]
    fn rows_with_same_key_share_a_group() {
        let rows = vec![http_row(1, 10, local_site(1, true)), http_row(1, 11, local_site(2, true))];
        let aggregation = aggregate(rows);
        assert_eq!(aggregation.groups.len(), 1);
        assert_eq!(aggregation.groups[0].targets.len(), 2);
        assert_eq!(aggregation.groups[0].slug, "1");
    }

    #[test]
    fn distinct_paths_form_distinct_groups() {
        let mut api = http_row(1, 11, local_site(1, true));
        api.target.path = PathRewrite::new(Some("/api".into()), Some(PathMatchType::Prefix), None, None);
        let rows = vec![http_row(1, 10, local_site(1, true)), api];

        let aggregation = aggregate(rows);
        let slugs: Vec<_> = aggregation.groups.iter().map(|g| g.slug.as_str()).collect();
        assert_eq!(slugs, vec!["1", "1-api-prefix"]);
    }

    #[test]
    fn invalid_group_is_dropped_entirely() {
        let mut a = http_row(1, 10, local_site(1, true));
        a.target.path = PathRewrite::new(None, None, Some("/v2".into()), Some(RewritePathType::Prefix));
        let mut b = a.clone();
        b.target.target_id = crate::domain::TargetId::new(11);
        let rows = vec![a, b, http_row(2, 12, local_site(1, true))];

        let aggregation = aggregate(rows);
        assert_eq!(aggregation.groups.len(), 1);
        assert_eq!(aggregation.groups[0].key.resource_id, ResourceId::new(2));
        assert_eq!(aggregation.invalid.len(), 1);
    }

    #[test]
    fn targets_ordered_by_priority_then_id() {
        let mut low = http_row(1, 5, local_site(1, true));
        low.target.priority = Some(50);
        let mut high_b = http_row(1, 9, local_site(1, true));
        high_b.target.priority = Some(200);
        let mut high_a = http_row(1, 8, local_site(1, true));
        high_a.target.priority = Some(200);

        let aggregation = aggregate(vec![low, high_b, high_a]);
        let ids: Vec<i64> =
            aggregation.groups[0].targets.iter().map(|t| t.target.target_id.get()).collect();
        assert_eq!(ids, vec![8, 9, 5]);
        assert_eq!(aggregation.groups[0].priority_override(), Some(200));
    }

    #[test]
    fn colliding_slugs_are_disambiguated() {
        let mut dotted = http_row(1, 10, local_site(1, true));
        dotted.target.path = PathRewrite::new(Some("/a.b".into()), Some(PathMatchType::Exact), None, None);
        let mut dashed = http_row(1, 11, local_site(1, true));
        dashed.target.path = PathRewrite::new(Some("/a-b".into()), Some(PathMatchType::Exact), None, None);

        let aggregation = aggregate(vec![dotted, dashed]);
        let mut slugs: Vec<_> = aggregation.groups.iter().map(|g| g.slug.clone()).collect();
        slugs.sort();
        assert_eq!(slugs, vec!["1-a-b-exact".to_string(), "1-a-b-exact-2".to_string()]);
    }

    #[test]
    fn route_kind_requires_domain_for_http() {
        let mut row = http_row(1, 10, local_site(1, true));
        row.resource.domain = None;
        let aggregation = aggregate(vec![row]);
        assert_eq!(aggregation.groups[0].route_kind(), None);
    }

    #[test]
    fn route_kind_requires_port_for_raw() {
        let mut row = http_row(1, 10, local_site(1, true));
        row.resource.http = false;
        row.resource.proxy_port = None;
        let aggregation = aggregate(vec![row.clone()]);
        assert_eq!(aggregation.groups[0].route_kind(), None);

        row.resource.proxy_port = Some(2222);
        let aggregation = aggregate(vec![row]);
        assert_eq!(
            aggregation.groups[0].route_kind(),
            Some(RouteKind::Raw(RawRoute { protocol: TransportProtocol::Tcp, port: 2222 }))
        );
    }
}
