//! TLS policy: certificate resolver and wildcard preference per group.

use super::document::{TlsBlock, TlsDomain};
use crate::config::RoutingConfig;
use crate::domain::Resource;

/// Resolve the TLS block for a resource served on `full_domain`.
pub fn resolve_tls(resource: &Resource, full_domain: &str, settings: &RoutingConfig) -> TlsBlock {
    let cert_resolver = resource
        .domain
        .as_ref()
        .and_then(|d| d.cert_resolver.as_deref())
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(&settings.cert_resolver)
        .to_string();

    let prefer_wildcard = resource.prefer_wildcard_cert.unwrap_or(settings.prefer_wildcard_cert);

    let domains = if prefer_wildcard {
        vec![TlsDomain { main: wildcard_domain(full_domain, resource.has_subdomain()) }]
    } else {
        Vec::new()
    };

    TlsBlock { cert_resolver, domains }
}

/// Wildcard certificate name covering `full_domain`.
///
/// Without a subdomain the full domain is returned unchanged.
pub fn wildcard_domain(full_domain: &str, has_subdomain: bool) -> String {
    if !has_subdomain {
        return full_domain.to_string();
    }

    let labels: Vec<&str> = full_domain.split('.').collect();
    if labels.len() <= 2 {
        format!("*.{}", full_domain)
    } else {
        format!("*.{}", labels[1..].join("."))
    }
}
