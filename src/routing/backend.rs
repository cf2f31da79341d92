//! Backend services built from the eligible targets of a group.

use std::collections::HashSet;

use super::availability::EligibleTarget;
use super::document::{
    HttpLoadBalancer, HttpServer, HttpService, IpStrategy, ServersTransport, Sticky, StickyCookie,
    StreamLoadBalancer, StreamServer, StreamService,
};
use crate::config::RoutingConfig;
use crate::domain::{Resource, TransportProtocol};

/// Endpoint strings in first-seen order, duplicates removed.
pub fn dedup_endpoints<I>(endpoints: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    endpoints.into_iter().filter(|e| seen.insert(e.clone())).collect()
}

/// HTTP service for the group.
pub fn http_service(
    resource: &Resource,
    eligible: &[EligibleTarget<'_>],
    transport_name: Option<&str>,
    settings: &RoutingConfig,
) -> HttpService {
    let servers = dedup_endpoints(eligible.iter().map(|e| e.endpoint.to_string()))
        .into_iter()
        .map(|url| HttpServer { url })
        .collect();

    let sticky = resource.sticky_session.then(|| {
        Sticky::Cookie(StickyCookie {
            name: settings.sticky_cookie_name.clone(),
            secure: resource.ssl,
            http_only: true,
        })
    });

    HttpService {
        load_balancer: HttpLoadBalancer {
            servers,
            sticky,
            servers_transport: transport_name.map(str::to_string),
            pass_host_header: None,
        },
    }
}

/// Upstream TLS transport when the resource pins a server name.
pub fn servers_transport(resource: &Resource) -> Option<ServersTransport> {
    let server_name = resource.tls_server_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some(ServersTransport { server_name: server_name.to_string(), insecure_skip_verify: true })
}

/// TCP/UDP service for a raw resource.
pub fn stream_service(
    resource: &Resource,
    protocol: TransportProtocol,
    eligible: &[EligibleTarget<'_>],
    settings: &RoutingConfig,
) -> StreamService {
    let servers = dedup_endpoints(eligible.iter().map(|e| e.endpoint.address()))
        .into_iter()
        .map(|address| StreamServer { address })
        .collect();

    let is_tcp = protocol == TransportProtocol::Tcp;

    let sticky = (resource.sticky_session && is_tcp)
        .then_some(Sticky::IpStrategy(IpStrategy { depth: 0, source_port: true }));

    let servers_transport = (resource.proxy_protocol && is_tcp).then(|| {
        format!(
            "{}{}@file",
            settings.pp_transport_prefix,
            resource.proxy_protocol_version.unwrap_or(1)
        )
    });

    StreamService { load_balancer: StreamLoadBalancer { servers, sticky, servers_transport } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::availability::eligible_targets;
    use crate::routing::endpoint::Transport;
    use crate::routing::group::GroupTarget;
    use crate::routing::test_support::{http_row, local_site, target};

    fn members(count: i64) -> Vec<GroupTarget> {
        (1..=count)
            .map(|id| GroupTarget { target: target(id, 1), site: local_site(id, true) })
            .collect()
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let endpoints = vec!["b".to_string(), "a".into(), "b".into(), "c".into(), "a".into()];
        assert_eq!(dedup_endpoints(endpoints), vec!["b", "a", "c"]);
    }

    #[test]
    fn identical_endpoints_collapse() {
        let members = members(2);
        let eligible = eligible_targets(&members, Transport::Http);
        let resource = http_row(1, 1, local_site(1, true)).resource;
        let service = http_service(&resource, &eligible, None, &RoutingConfig::default());
        assert_eq!(service.load_balancer.servers, vec![HttpServer { url: "http://10.0.0.5:8080".into() }]);
    }

    #[test]
    fn http_sticky_cookie_tracks_ssl() {
        let members = members(1);
        let eligible = eligible_targets(&members, Transport::Http);
        let mut resource = http_row(1, 1, local_site(1, true)).resource;
        resource.sticky_session = true;
        resource.ssl = false;

        let service = http_service(&resource, &eligible, None, &RoutingConfig::default());
        assert_eq!(
            service.load_balancer.sticky,
            Some(Sticky::Cookie(StickyCookie { name: "p_sticky".into(), secure: false, http_only: true }))
        );
    }

    #[test]
    fn tls_server_name_yields_transport() {
        let mut resource = http_row(1, 1, local_site(1, true)).resource;
        assert!(servers_transport(&resource).is_none());

        resource.tls_server_name = Some("internal.example.com".into());
        assert_eq!(
            servers_transport(&resource),
            Some(ServersTransport { server_name: "internal.example.com".into(), insecure_skip_verify: true })
        );
    }

    #[test]
    fn tcp_proxy_protocol_and_sticky() {
        let members = members(1);
        let eligible = eligible_targets(&members, Transport::Stream);
        let mut resource = http_row(1, 1, local_site(1, true)).resource;
        resource.http = false;
        resource.sticky_session = true;
        resource.proxy_protocol = true;
        resource.proxy_protocol_version = Some(2);

        let settings = RoutingConfig::default();
        let tcp = stream_service(&resource, TransportProtocol::Tcp, &eligible, &settings);
        assert_eq!(tcp.load_balancer.servers, vec![StreamServer { address: "10.0.0.5:8080".into() }]);
        assert_eq!(tcp.load_balancer.servers_transport.as_deref(), Some("pp-transport-v2@file"));
        assert_eq!(
            tcp.load_balancer.sticky,
            Some(Sticky::IpStrategy(IpStrategy { depth: 0, source_port: true }))
        );

        let udp = stream_service(&resource, TransportProtocol::Udp, &eligible, &settings);
        assert!(udp.load_balancer.servers_transport.is_none());
        assert!(udp.load_balancer.sticky.is_none());
    }
}
