//! Routing configuration endpoint polled by the data plane

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::domain::{ExitNodeId, SiteType};
use crate::routing::RoutingDocument;
use crate::storage::SnapshotQuery;

/// Query string of the routing configuration endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfigParams {
    /// Comma-separated site types, e.g. `newt,local`
    pub site_types: Option<String>,
    pub filter_namespace_domains: Option<bool>,
    pub allow_raw_resources: Option<bool>,
}

impl RoutingConfigParams {
    /// Build the snapshot query for an exit node; unknown site types are rejected.
    pub fn into_query(self, exit_node_id: ExitNodeId) -> Result<SnapshotQuery, ApiError> {
        let mut query = SnapshotQuery::new(exit_node_id);

        if let Some(raw) = self.site_types.as_deref() {
            let site_types = parse_site_types(raw)?;
            if !site_types.is_empty() {
                query.site_types = site_types;
            }
        }
        if let Some(filter) = self.filter_namespace_domains {
            query.filter_namespace_domains = filter;
        }
        if let Some(allow) = self.allow_raw_resources {
            query.allow_raw_resources = allow;
        }

        Ok(query)
    }
}

fn parse_site_types(raw: &str) -> Result<Vec<SiteType>, ApiError> {
    let mut site_types = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let site_type: SiteType = part.parse().map_err(ApiError::bad_request)?;
        if !site_types.contains(&site_type) {
            site_types.push(site_type);
        }
    }
    Ok(site_types)
}

/// Synthesize the routing document for one exit node.
#[instrument(skip(state, params))]
pub async fn get_routing_config_handler(
    State(state): State<ApiState>,
    Path(exit_node_id): Path<String>,
    Query(params): Query<RoutingConfigParams>,
) -> Result<Json<RoutingDocument>, ApiError> {
    let exit_node_id: ExitNodeId = exit_node_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid exit node id '{}'", exit_node_id)))?;
    let query = params.into_query(exit_node_id)?;
    debug!(site_types = ?query.site_types, "Serving routing configuration");

    let document = state.synthesizer.generate(state.snapshots.as_ref(), &query).await?;
    Ok(Json(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_request_every_site_type() {
        let query = RoutingConfigParams::default().into_query(ExitNodeId::new(3)).unwrap();
        assert_eq!(query.site_types, SiteType::ALL.to_vec());
        assert!(query.allow_raw_resources);
        assert!(!query.filter_namespace_domains);
    }

    #[test]
    fn site_types_are_parsed_and_deduplicated() {
        let params = RoutingConfigParams {
            site_types: Some("local, newt,local".into()),
            ..Default::default()
        };
        let query = params.into_query(ExitNodeId::new(3)).unwrap();
        assert_eq!(query.site_types, vec![SiteType::Local, SiteType::Newt]);
    }

    #[test]
    fn unknown_site_type_is_rejected() {
        let params = RoutingConfigParams { site_types: Some("gre".into()), ..Default::default() };
        assert!(matches!(params.into_query(ExitNodeId::new(3)), Err(ApiError::BadRequest(_))));
    }
}
