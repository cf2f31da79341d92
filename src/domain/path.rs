//! Path match and rewrite specification carried by each target row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a request path is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMatchType {
    Exact,
    Prefix,
    Regex,
}

impl PathMatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMatchType::Exact => "exact",
            PathMatchType::Prefix => "prefix",
            PathMatchType::Regex => "regex",
        }
    }
}

impl fmt::Display for PathMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PathMatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(PathMatchType::Exact),
            "prefix" => Ok(PathMatchType::Prefix),
            "regex" => Ok(PathMatchType::Regex),
            _ => Err(format!("Invalid path match type: {}", s)),
        }
    }
}

/// How a matched path is rewritten before it reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewritePathType {
    Exact,
    Prefix,
    Regex,
    StripPrefix,
}

impl RewritePathType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewritePathType::Exact => "exact",
            RewritePathType::Prefix => "prefix",
            RewritePathType::Regex => "regex",
            RewritePathType::StripPrefix => "stripPrefix",
        }
    }
}

impl fmt::Display for RewritePathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RewritePathType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(RewritePathType::Exact),
            "prefix" => Ok(RewritePathType::Prefix),
            "regex" => Ok(RewritePathType::Regex),
            "stripPrefix" => Ok(RewritePathType::StripPrefix),
            _ => Err(format!("Invalid rewrite path type: {}", s)),
        }
    }
}

/// Path match plus optional rewrite, as stored on a target.
///
/// Empty strings coming from the store are normalised to `None` so that a
/// blank path and an absent path land in the same route group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathRewrite {
    pub path: Option<String>,
    pub match_type: Option<PathMatchType>,
    pub rewrite_path: Option<String>,
    pub rewrite_type: Option<RewritePathType>,
}

impl PathRewrite {
    pub fn new(
        path: Option<String>,
        match_type: Option<PathMatchType>,
        rewrite_path: Option<String>,
        rewrite_type: Option<RewritePathType>,
    ) -> Self {
        Self {
            path: path.filter(|p| !p.is_empty()),
            match_type,
            rewrite_path: rewrite_path.filter(|p| !p.is_empty()),
            rewrite_type,
        }
    }

    /// Path match requires both a path and a match type.
    pub fn path_match(&self) -> Option<(&str, PathMatchType)> {
        match (&self.path, self.match_type) {
            (Some(path), Some(match_type)) => Some((path.as_str(), match_type)),
            _ => None,
        }
    }

    pub fn has_rewrite(&self) -> bool {
        self.rewrite_path.is_some() || self.rewrite_type.is_some()
    }
}

/// Path with a leading `/` guaranteed.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_type_uses_camel_case_names() {
        assert_eq!(RewritePathType::StripPrefix.as_str(), "stripPrefix");
        assert_eq!("stripPrefix".parse::<RewritePathType>(), Ok(RewritePathType::StripPrefix));
        assert!("strip_prefix".parse::<RewritePathType>().is_err());
    }

    #[test]
    fn empty_strings_normalise_to_none() {
        let spec = PathRewrite::new(Some(String::new()), None, Some(String::new()), None);
        assert_eq!(spec, PathRewrite::default());
        assert!(!spec.has_rewrite());
    }

    #[test]
    fn path_match_requires_both_fields() {
        let spec = PathRewrite::new(Some("/api".into()), None, None, None);
        assert!(spec.path_match().is_none());

        let spec = PathRewrite::new(Some("/api".into()), Some(PathMatchType::Prefix), None, None);
        assert_eq!(spec.path_match(), Some(("/api", PathMatchType::Prefix)));
    }

    #[test]
    fn normalize_adds_leading_slash() {
        assert_eq!(normalize_path("api"), "/api");
        assert_eq!(normalize_path("/api"), "/api");
    }
}
