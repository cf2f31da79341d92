//! Output document consumed by the data plane.
//!
//! Field names follow the data plane's dynamic-configuration schema, hence the
//! camelCase renames. All maps are ordered so serialisation is byte-stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::TransportProtocol;

/// Complete routing configuration for one exit node.
///
/// Serialises to `{}` when nothing is routable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp: Option<StreamConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<StreamConfig>,
}

impl RoutingDocument {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.tcp.is_none() && self.udp.is_none()
    }

    /// Total routers across all protocol families
    pub fn router_count(&self) -> usize {
        self.http.as_ref().map_or(0, |h| h.routers.len())
            + self.tcp.as_ref().map_or(0, |t| t.routers.len())
            + self.udp.as_ref().map_or(0, |u| u.routers.len())
    }

    pub(crate) fn http_mut(&mut self) -> &mut HttpConfig {
        self.http.get_or_insert_with(HttpConfig::default)
    }

    pub(crate) fn stream_mut(&mut self, protocol: TransportProtocol) -> &mut StreamConfig {
        match protocol {
            TransportProtocol::Tcp => self.tcp.get_or_insert_with(StreamConfig::default),
            TransportProtocol::Udp => self.udp.get_or_insert_with(StreamConfig::default),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    pub routers: BTreeMap<String, HttpRouter>,
    pub services: BTreeMap<String, HttpService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub middlewares: BTreeMap<String, Middleware>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub servers_transports: BTreeMap<String, ServersTransport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouter {
    pub entry_points: Vec<String>,
    pub rule: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpService {
    pub load_balancer: HttpLoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpLoadBalancer {
    pub servers: Vec<HttpServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<Sticky>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers_transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_host_header: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServer {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsBlock {
    pub cert_resolver: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<TlsDomain>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsDomain {
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServersTransport {
    pub server_name: String,
    pub insecure_skip_verify: bool,
}

/// Session affinity descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sticky {
    Cookie(StickyCookie),
    IpStrategy(IpStrategy),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyCookie {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpStrategy {
    pub depth: u32,
    pub source_port: bool,
}

/// HTTP middleware definitions, one variant per middleware kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Middleware {
    Plugin(BTreeMap<String, serde_json::Value>),
    RedirectScheme(RedirectScheme),
    Headers(HeadersMiddleware),
    StripPrefix(StripPrefix),
    AddPrefix(AddPrefix),
    ReplacePathRegex(ReplacePathRegex),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectScheme {
    pub scheme: String,
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersMiddleware {
    pub custom_request_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripPrefix {
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPrefix {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacePathRegex {
    pub regex: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    pub routers: BTreeMap<String, StreamRouter>,
    pub services: BTreeMap<String, StreamService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRouter {
    pub entry_points: Vec<String>,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamService {
    pub load_balancer: StreamLoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLoadBalancer {
    pub servers: Vec<StreamServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<Sticky>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers_transport: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamServer {
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_serializes_to_empty_object() {
        let doc = RoutingDocument::default();
        assert!(doc.is_empty());
        assert_eq!(serde_json::to_string(&doc).unwrap(), "{}");
    }

    #[test]
    fn middleware_is_externally_tagged() {
        let redirect = Middleware::RedirectScheme(RedirectScheme {
            scheme: "https".to_string(),
            permanent: true,
        });
        assert_eq!(
            serde_json::to_value(&redirect).unwrap(),
            json!({ "redirectScheme": { "scheme": "https", "permanent": true } })
        );

        let strip = Middleware::StripPrefix(StripPrefix { prefixes: vec!["/api".into()] });
        assert_eq!(
            serde_json::to_value(&strip).unwrap(),
            json!({ "stripPrefix": { "prefixes": ["/api"] } })
        );
    }

    #[test]
    fn sticky_cookie_shape() {
        let sticky = Sticky::Cookie(StickyCookie {
            name: "p_sticky".into(),
            secure: true,
            http_only: true,
        });
        assert_eq!(
            serde_json::to_value(&sticky).unwrap(),
            json!({ "cookie": { "name": "p_sticky", "secure": true, "httpOnly": true } })
        );
    }

    #[test]
    fn router_omits_empty_optional_fields() {
        let router = HttpRouter {
            entry_points: vec!["web".into()],
            rule: "Host(`example.com`)".into(),
            service: "svc".into(),
            middlewares: vec![],
            priority: 100,
            tls: None,
        };
        assert_eq!(
            serde_json::to_value(&router).unwrap(),
            json!({
                "entryPoints": ["web"],
                "rule": "Host(`example.com`)",
                "service": "svc",
                "priority": 100
            })
        );
    }

    #[test]
    fn stream_sections_are_created_per_protocol() {
        let mut doc = RoutingDocument::default();
        doc.stream_mut(TransportProtocol::Udp);
        assert!(doc.udp.is_some());
        assert!(doc.tcp.is_none());
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({ "udp": { "routers": {}, "services": {} } }));
    }
}
