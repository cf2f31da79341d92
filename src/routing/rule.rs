//! Router match rules and priorities.
//!
//! Host comes first, path second. Priorities order overlapping rules on the
//! same host: more specific path matches win, and a bare `/` catch-all sinks
//! to the bottom.

use crate::domain::{normalize_path, PathMatchType, PathRewrite};

/// Neutral priority; an override equal to this counts as "not overridden"
pub const DEFAULT_PRIORITY: i32 = 100;

/// Priority of maintenance routers, above every computed priority
pub const MAINTENANCE_PRIORITY: i32 = 2000;

/// Priority of a `/` catch-all
pub const CATCH_ALL_PRIORITY: i32 = 1;

const PATH_BONUS: i32 = 10;

/// Host-only match expression.
pub fn host_rule(full_domain: &str) -> String {
    format!("Host(`{}`)", full_domain)
}

/// Host match plus the group's path match, if any.
pub fn build_rule(full_domain: &str, path: &PathRewrite) -> String {
    let mut rule = host_rule(full_domain);
    if let Some((path, match_type)) = path.path_match() {
        let path_rule = match match_type {
            PathMatchType::Exact => format!("Path(`{}`)", normalize_path(path)),
            PathMatchType::Prefix => format!("PathPrefix(`{}`)", normalize_path(path)),
            PathMatchType::Regex => format!("PathRegexp(`{}`)", path),
        };
        rule.push_str(" && ");
        rule.push_str(&path_rule);
    }
    rule
}

/// Router priority for a group.
pub fn compute_priority(priority_override: Option<i32>, path: &PathRewrite) -> i32 {
    if let Some(priority) = priority_override.filter(|p| *p != DEFAULT_PRIORITY) {
        return priority;
    }

    let Some((path, match_type)) = path.path_match() else {
        return DEFAULT_PRIORITY;
    };

    if path == "/" {
        return CATCH_ALL_PRIORITY;
    }

    DEFAULT_PRIORITY + PATH_BONUS + match_type_bonus(match_type)
}

fn match_type_bonus(match_type: PathMatchType) -> i32 {
    match match_type {
        PathMatchType::Exact => 5,
        PathMatchType::Prefix => 3,
        PathMatchType::Regex => 2,
    }
}
