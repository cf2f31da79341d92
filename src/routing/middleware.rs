//! Router middleware chains.
//!
//! Chain order on a router is fixed: auth, configured extras, path rewrite,
//! custom headers. The HTTPS redirect only ever sits on the redirect twin.

use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, warn};

use super::document::{
    AddPrefix, HeadersMiddleware, Middleware, RedirectScheme, ReplacePathRegex, StripPrefix,
};
use super::group::RouteGroup;
use crate::config::{AuthMiddlewareConfig, RoutingConfig};
use crate::domain::{PathMatchType, PathRewrite, RewritePathType};
use crate::errors::{EdgeplaneError, Result};

/// Middleware definitions for a rewrite, plus the names to attach in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteMiddlewares {
    pub middlewares: BTreeMap<String, Middleware>,
    pub chain: Vec<String>,
}

impl RewriteMiddlewares {
    fn single(name: &str, middleware: Middleware) -> Self {
        let mut middlewares = BTreeMap::new();
        middlewares.insert(name.to_string(), middleware);
        Self { middlewares, chain: vec![name.to_string()] }
    }
}

/// Produces the middlewares that implement a path rewrite.
pub trait RewriteMiddlewareGenerator: Send + Sync {
    fn generate(&self, name: &str, path: &PathRewrite) -> Result<RewriteMiddlewares>;
}

/// Rewrites expressed with strip/add prefix and regex replacement middlewares.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRewriteGenerator;

impl RewriteMiddlewareGenerator for StandardRewriteGenerator {
    fn generate(&self, name: &str, path_rewrite: &PathRewrite) -> Result<RewriteMiddlewares> {
        let (path, match_type) = path_rewrite
            .path_match()
            .ok_or_else(|| EdgeplaneError::middleware("Rewrite without a path match"))?;
        let rewrite_type = path_rewrite
            .rewrite_type
            .ok_or_else(|| EdgeplaneError::middleware("Rewrite without a rewrite type"))?;
        let rewrite_path = path_rewrite.rewrite_path.as_deref();

        match (match_type, rewrite_type) {
            (PathMatchType::Prefix, RewritePathType::StripPrefix) => {
                let strip = format!("{}-strip", name);
                let mut out = RewriteMiddlewares::single(
                    &strip,
                    Middleware::StripPrefix(StripPrefix { prefixes: vec![path.to_string()] }),
                );
                if let Some(prefix) = rewrite_path.filter(|p| !p.is_empty() && *p != "/") {
                    let add = format!("{}-add", name);
                    out.middlewares.insert(
                        add.clone(),
                        Middleware::AddPrefix(AddPrefix { prefix: prefix.to_string() }),
                    );
                    out.chain.push(add);
                }
                Ok(out)
            }
            (PathMatchType::Prefix, RewritePathType::Prefix) => {
                let replacement = required(rewrite_path)?;
                // A trailing slash on the replacement absorbs the slash after the matched prefix.
                let regex = if replacement.ends_with('/') {
                    format!("^{}/?(.*)", regex::escape(path))
                } else {
                    format!("^{}(.*)", regex::escape(path))
                };
                Ok(RewriteMiddlewares::single(name, replace_path(regex, format!("{}$1", replacement))))
            }
            (PathMatchType::Exact, RewritePathType::Exact | RewritePathType::Prefix) => {
                let replacement = required(rewrite_path)?;
                Ok(RewriteMiddlewares::single(
                    name,
                    replace_path(format!("^{}$", regex::escape(path)), replacement.to_string()),
                ))
            }
            (PathMatchType::Regex, RewritePathType::Regex) => {
                let replacement = required(rewrite_path)?;
                Ok(RewriteMiddlewares::single(
                    name,
                    replace_path(path.to_string(), replacement.to_string()),
                ))
            }
            (match_type, rewrite_type) => Err(EdgeplaneError::middleware(format!(
                "Unsupported rewrite: {} match with {} rewrite",
                match_type, rewrite_type
            ))),
        }
    }
}

fn required(rewrite_path: Option<&str>) -> Result<&str> {
    rewrite_path.ok_or_else(|| EdgeplaneError::middleware("Rewrite path is required"))
}

fn replace_path(regex: String, replacement: String) -> Middleware {
    Middleware::ReplacePathRegex(ReplacePathRegex { regex, replacement })
}

/// Forward-auth plugin definition attached to every HTTP router.
pub fn auth_middleware(config: &AuthMiddlewareConfig) -> Middleware {
    let mut plugin = BTreeMap::new();
    plugin.insert(
        config.name.clone(),
        json!({
            "apiBaseUrl": config.api_base_url,
            "userSessionCookieName": config.session_cookie_name,
            "resourceSessionRequestParam": config.resource_session_request_param,
        }),
    );
    Middleware::Plugin(plugin)
}

/// Permanent redirect to https used by redirect twins.
pub fn redirect_middleware() -> Middleware {
    Middleware::RedirectScheme(RedirectScheme { scheme: "https".to_string(), permanent: true })
}

#[derive(Debug, Deserialize)]
struct HeaderPair {
    name: String,
    value: String,
}

/// Merge the resource's serialized headers with its host override.
///
/// Malformed header JSON is logged and treated as no headers. The host
/// override is written last, so it replaces any `Host` entry from the list.
pub fn custom_headers(group: &RouteGroup) -> BTreeMap<String, String> {
    let resource = &group.resource;
    let mut headers = BTreeMap::new();

    if let Some(raw) = resource.headers.as_deref().filter(|h| !h.trim().is_empty()) {
        match serde_json::from_str::<Vec<HeaderPair>>(raw) {
            Ok(pairs) => {
                for pair in pairs {
                    headers.insert(pair.name, pair.value);
                }
            }
            Err(e) => {
                warn!(
                    resource_id = %resource.resource_id,
                    group_key = %group.slug,
                    error = %e,
                    "Failed to parse custom headers, ignoring them"
                );
            }
        }
    }

    if let Some(host) = resource.set_host_header.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        headers.insert("Host".to_string(), host.to_string());
    }

    headers
}

/// Middlewares of a group's main router and the definitions they need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiddlewareChain {
    pub names: Vec<String>,
    pub definitions: BTreeMap<String, Middleware>,
}

/// Assemble the middleware chain of a group's main router.
///
/// A failing rewrite generator only drops the rewrite middlewares; the rest of
/// the chain is still returned.
pub fn build_chain(
    group: &RouteGroup,
    settings: &RoutingConfig,
    rewrites: &dyn RewriteMiddlewareGenerator,
) -> MiddlewareChain {
    let mut chain = MiddlewareChain::default();
    chain.names.push(settings.auth_middleware.name.clone());
    chain.names.extend(settings.additional_middlewares.iter().cloned());

    if group.key.path.has_rewrite() {
        let name = format!("rewrite-r{}-{}", group.resource.resource_id, group.slug);
        match rewrites.generate(&name, &group.key.path) {
            Ok(generated) => {
                chain.names.extend(generated.chain);
                chain.definitions.extend(generated.middlewares);
            }
            Err(e) => {
                error!(
                    resource_id = %group.resource.resource_id,
                    group_key = %group.slug,
                    error = %e,
                    "Failed to generate path rewrite middleware, routing without it"
                );
            }
        }
    }

    let headers = custom_headers(group);
    if !headers.is_empty() {
        let name = format!("{}-headers-middleware", group.slug);
        chain.definitions.insert(
            name.clone(),
            Middleware::Headers(HeadersMiddleware { custom_request_headers: headers }),
        );
        chain.names.push(name);
    }

    chain
}

/// Middlewares shared by every HTTP router, keyed by name.
pub fn shared_middlewares(settings: &RoutingConfig) -> BTreeMap<String, Middleware> {
    let mut shared = BTreeMap::new();
    shared.insert(settings.auth_middleware.name.clone(), auth_middleware(&settings.auth_middleware));
    shared.insert(settings.redirect_middleware_name.clone(), redirect_middleware());
    shared
}
