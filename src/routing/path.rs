//! Validation of path match / rewrite combinations.
//!
//! A group whose combination is rejected here is dropped whole; nothing of it
//! reaches the document.

use regex::Regex;

use crate::domain::{PathMatchType, PathRewrite, RewritePathType};
use crate::errors::{EdgeplaneError, Result};

/// Check that a path match and its rewrite can be expressed together.
pub fn validate_path_rewrite(path_rewrite: &PathRewrite) -> Result<()> {
    if let Some((path, PathMatchType::Regex)) = path_rewrite.path_match() {
        Regex::new(path).map_err(|e| {
            EdgeplaneError::validation_field(format!("Invalid path regex '{}': {}", path, e), "path")
        })?;
    }

    if !path_rewrite.has_rewrite() {
        return Ok(());
    }

    let Some((_, match_type)) = path_rewrite.path_match() else {
        return Err(EdgeplaneError::validation_field(
            "Path rewriting requires a path and a path match type",
            "path",
        ));
    };

    let Some(rewrite_type) = path_rewrite.rewrite_type else {
        return Err(EdgeplaneError::validation_field(
            "Rewrite path given without a rewrite type",
            "rewrite_path_type",
        ));
    };

    match (match_type, rewrite_type) {
        (PathMatchType::Regex, RewritePathType::Regex) => Ok(()),
        (_, RewritePathType::Regex) => Err(EdgeplaneError::validation_field(
            "Regex rewrites require a regex path match",
            "rewrite_path_type",
        )),
        (PathMatchType::Prefix, RewritePathType::StripPrefix) => Ok(()),
        (_, RewritePathType::StripPrefix) => Err(EdgeplaneError::validation_field(
            "Strip-prefix rewrites require a prefix path match",
            "rewrite_path_type",
        )),
        (PathMatchType::Regex, _) => Err(EdgeplaneError::validation_field(
            "Exact and prefix rewrites cannot be combined with a regex path match",
            "rewrite_path_type",
        )),
        (_, RewritePathType::Exact | RewritePathType::Prefix) => match path_rewrite.rewrite_path.as_deref()
        {
            Some(rewrite) if rewrite.starts_with('/') => Ok(()),
            _ => Err(EdgeplaneError::validation_field(
                "Rewrite path must start with '/'",
                "rewrite_path",
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(
        path: Option<&str>,
        match_type: Option<PathMatchType>,
        rewrite_path: Option<&str>,
        rewrite_type: Option<RewritePathType>,
    ) -> PathRewrite {
        PathRewrite::new(
            path.map(str::to_string),
            match_type,
            rewrite_path.map(str::to_string),
            rewrite_type,
        )
    }

    #[test]
    fn no_path_and_no_rewrite_is_valid() {
        assert!(validate_path_rewrite(&PathRewrite::default()).is_ok());
    }

    #[test]
    fn path_without_rewrite_is_valid() {
        let s = rewrite(Some("/api"), Some(PathMatchType::Prefix), None, None);
        assert!(validate_path_rewrite(&s).is_ok());
    }

    #[test]
    fn rewrite_without_path_match_is_invalid() {
        let s = rewrite(None, None, Some("/v2"), Some(RewritePathType::Prefix));
        assert!(validate_path_rewrite(&s).is_err());
    }

    #[test]
    fn rewrite_path_without_type_is_invalid() {
        let s = rewrite(Some("/api"), Some(PathMatchType::Prefix), Some("/v2"), None);
        assert!(validate_path_rewrite(&s).is_err());
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let s = rewrite(Some("^/api/(v1"), Some(PathMatchType::Regex), None, None);
        let err = validate_path_rewrite(&s).unwrap_err();
        assert!(err.to_string().contains("Invalid path regex"));
    }

    #[test]
    fn strip_prefix_requires_prefix_match() {
        let ok = rewrite(Some("/api"), Some(PathMatchType::Prefix), None, Some(RewritePathType::StripPrefix));
        assert!(validate_path_rewrite(&ok).is_ok());

        let bad = rewrite(Some("/api"), Some(PathMatchType::Exact), None, Some(RewritePathType::StripPrefix));
        assert!(validate_path_rewrite(&bad).is_err());
    }

    #[test]
    fn regex_rewrite_requires_regex_match() {
        let ok = rewrite(
            Some("^/api/(.*)"),
            Some(PathMatchType::Regex),
            Some("/v2/$1"),
            Some(RewritePathType::Regex),
        );
        assert!(validate_path_rewrite(&ok).is_ok());

        let bad = rewrite(Some("/api"), Some(PathMatchType::Prefix), Some("/v2"), Some(RewritePathType::Regex));
        assert!(validate_path_rewrite(&bad).is_err());
    }

    #[test]
    fn literal_rewrite_rejects_regex_match() {
        let s = rewrite(Some("^/api"), Some(PathMatchType::Regex), Some("/v2"), Some(RewritePathType::Prefix));
        assert!(validate_path_rewrite(&s).is_err());
    }

    #[test]
    fn literal_rewrite_requires_absolute_target() {
        let ok = rewrite(Some("/old"), Some(PathMatchType::Exact), Some("/new"), Some(RewritePathType::Exact));
        assert!(validate_path_rewrite(&ok).is_ok());

        let bad = rewrite(Some("/old"), Some(PathMatchType::Exact), Some("new"), Some(RewritePathType::Exact));
        assert!(validate_path_rewrite(&bad).is_err());

        let missing = rewrite(Some("/old"), Some(PathMatchType::Prefix), None, Some(RewritePathType::Prefix));
        assert!(validate_path_rewrite(&missing).is_err());
    }
}
