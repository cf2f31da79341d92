//! Endpoint resolution per site type.
//!
//! The same resolver answers both "can this target carry traffic" and "where
//! does traffic go", so availability and backend lists cannot disagree.

use std::fmt;

use crate::domain::{Site, SiteType, Target};

/// Shape of the connection the data plane opens to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// HTTP services, addressed as `scheme://host:port`
    Http,
    /// Raw TCP/UDP services, addressed as `host:port`
    Stream,
}

/// Resolved network endpoint of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// `host:port` form used by stream services.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scheme {
            Some(scheme) => write!(f, "{}://{}:{}", scheme, self.host, self.port),
            None => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

/// Maps a target on a given kind of site to its endpoint.
///
/// Returns `None` when a field the site type requires is missing; such a
/// target is not eligible.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self, target: &Target, site: &Site, transport: Transport) -> Option<Endpoint>;
}

/// Local and wireguard sites: the target's own IP and port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectEndpoint;

/// Newt sites: the site subnet address and the target's internal port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TunnelEndpoint;

impl EndpointResolver for DirectEndpoint {
    fn resolve(&self, target: &Target, _site: &Site, transport: Transport) -> Option<Endpoint> {
        let host = non_empty(target.ip.as_deref())?;
        let port = target.port.filter(|p| *p != 0)?;
        let scheme = scheme_for(target, transport)?;
        Some(Endpoint { scheme, host: host.to_string(), port })
    }
}

impl EndpointResolver for TunnelEndpoint {
    fn resolve(&self, target: &Target, site: &Site, transport: Transport) -> Option<Endpoint> {
        let port = target.internal_port.filter(|p| *p != 0)?;
        let scheme = scheme_for(target, transport)?;
        let host = site.subnet_address()?;
        Some(Endpoint { scheme, host: host.to_string(), port })
    }
}

static DIRECT: DirectEndpoint = DirectEndpoint;
static TUNNEL: TunnelEndpoint = TunnelEndpoint;

/// Resolver for a site type.
pub fn resolver_for(site_type: SiteType) -> &'static dyn EndpointResolver {
    match site_type {
        SiteType::Local | SiteType::Wireguard => &DIRECT,
        SiteType::Newt => &TUNNEL,
    }
}

// Stream transports carry no scheme, so a missing method is fine there.
fn scheme_for(target: &Target, transport: Transport) -> Option<Option<String>> {
    match transport {
        Transport::Http => non_empty(target.method.as_deref()).map(|m| Some(m.to_string())),
        Transport::Stream => Some(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
