//! Client registration handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use super::GrantState;
use crate::error::AuthError;
use crate::types::{ClientView, NewClient, RegisteredClient};

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;

/// Pagination for `GET /clients`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListClientsParams {
    /// Page size, capped at 200.
    pub limit: Option<usize>,
    /// Number of clients to skip.
    pub offset: Option<usize>,
}

/// `POST /clients`
///
/// The response is the only place the client secret is ever returned.
pub async fn register_client_handler(
    State(state): State<GrantState>,
    Json(request): Json<NewClient>,
) -> Result<(StatusCode, Json<RegisteredClient>), AuthError> {
    let registered = state.registry.register(request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// `GET /clients`
pub async fn list_clients_handler(
    State(state): State<GrantState>,
    Query(params): Query<ListClientsParams>,
) -> Result<Json<Vec<ClientView>>, AuthError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let clients = state
        .registry
        .list(limit, params.offset.unwrap_or(0))
        .await?;
    Ok(Json(clients))
}
