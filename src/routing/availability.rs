//! Backend eligibility for a route group.

use super::endpoint::{resolver_for, Endpoint, Transport};
use super::group::GroupTarget;

/// A target that may carry traffic, with its resolved endpoint.
#[derive(Debug, Clone)]
pub struct EligibleTarget<'a> {
    pub member: &'a GroupTarget,
    pub endpoint: Endpoint,
}

/// Targets of a group that may carry traffic, in group order.
///
/// When any site in the group is online, targets on offline sites are left
/// out. When none is, every site is kept so the route is not blackholed while
/// site state catches up.
pub fn eligible_targets(targets: &[GroupTarget], transport: Transport) -> Vec<EligibleTarget<'_>> {
    let any_online = targets.iter().any(|t| t.site.online);

    targets
        .iter()
        .filter(|member| !any_online || member.site.online)
        .filter(|member| member.target.enabled && !member.target.is_unhealthy())
        .filter_map(|member| {
            resolver_for(member.site.site_type)
                .resolve(&member.target, &member.site, transport)
                .map(|endpoint| EligibleTarget { member, endpoint })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TargetHealth;
    use crate::routing::test_support::{local_site, target};

    fn member(target_id: i64, site_id: i64, online: bool) -> GroupTarget {
        GroupTarget { target: target(target_id, 1), site: local_site(site_id, online) }
    }

    fn ids(eligible: &[EligibleTarget<'_>]) -> Vec<i64> {
        eligible.iter().map(|e| e.member.target.target_id.get()).collect()
    }

    #[test]
    fn offline_sites_dropped_when_any_online() {
        let targets = vec![member(1, 1, true), member(2, 2, false)];
        assert_eq!(ids(&eligible_targets(&targets, Transport::Http)), vec![1]);
    }

    #[test]
    fn all_offline_keeps_everything() {
        let targets = vec![member(1, 1, false), member(2, 2, false)];
        assert_eq!(ids(&eligible_targets(&targets, Transport::Http)), vec![1, 2]);
    }

    #[test]
    fn disabled_and_incomplete_targets_are_ineligible() {
        let mut disabled = member(1, 1, true);
        disabled.target.enabled = false;
        let mut no_ip = member(2, 1, true);
        no_ip.target.ip = None;
        let targets = vec![disabled, no_ip, member(3, 1, true)];
        assert_eq!(ids(&eligible_targets(&targets, Transport::Http)), vec![3]);
    }

    #[test]
    fn unknown_health_is_eligible() {
        let mut unknown = member(1, 1, true);
        unknown.target.health = Some(TargetHealth::Unknown);
        let mut unhealthy = member(2, 1, true);
        unhealthy.target.health = Some(TargetHealth::Unhealthy);
        assert_eq!(ids(&eligible_targets(&[unknown, unhealthy], Transport::Http)), vec![1]);
    }

    #[test]
    fn stream_transport_does_not_need_method() {
        let mut no_method = member(1, 1, true);
        no_method.target.method = None;
        let targets = vec![no_method];
        assert!(eligible_targets(&targets, Transport::Http).is_empty());
        assert_eq!(ids(&eligible_targets(&targets, Transport::Stream)), vec![1]);
    }
}
