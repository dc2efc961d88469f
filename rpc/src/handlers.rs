//! Request handlers and their response bodies.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use ripd_routing::{NeighborCosts, RelaxOutcome, Router, RoutingTable};
use ripd_types::UpdateMessage;

use crate::error::RpcError;

// ── Updates ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<usize>,
}

impl From<&RelaxOutcome> for UpdateResponse {
    fn from(outcome: &RelaxOutcome) -> Self {
        match outcome {
            RelaxOutcome::Ignored => Self {
                status: "ignored",
                message: None,
                changed: None,
            },
            RelaxOutcome::Applied { changed } => Self {
                status: "success",
                message: Some("Update received"),
                changed: Some(changed.len()),
            },
        }
    }
}

/// `POST /receive_update`
///
/// Malformed bodies are rejected before the table is touched; advertisements
/// from non-neighbors are acknowledged but ignored.
pub async fn receive_update(
    State(router): State<Arc<Router>>,
    payload: Result<Json<UpdateMessage>, JsonRejection>,
) -> Result<Json<UpdateResponse>, RpcError> {
    let Json(update) = payload?;
    if update.sender_address.trim().is_empty() {
        return Err(RpcError::InvalidRequest(
            "missing sender_address or routing_table".into(),
        ));
    }

    tracing::debug!(
        sender = %update.sender_address,
        routes = update.routing_table.len(),
        "received advertisement"
    );

    let outcome = router.apply_update(&update).await;
    Ok(Json(UpdateResponse::from(&outcome)))
}

// ── Inspection ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub my_address: String,
    pub my_network: String,
    pub neighbors: NeighborCosts,
    pub update_interval: u64,
    pub routing_table: RoutingTable,
}

/// `GET /routes`: the live, unsummarized table.
pub async fn routes(State(router): State<Arc<Router>>) -> Json<RoutesResponse> {
    let identity = router.identity();
    Json(RoutesResponse {
        my_address: identity.address.clone(),
        my_network: identity.network.clone(),
        neighbors: router.neighbors().clone(),
        update_interval: router.update_interval().as_secs(),
        routing_table: router.snapshot().await,
    })
}
