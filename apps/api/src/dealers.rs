//! Pass-through handlers for dealer records.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DealersResponse {
    pub status: u16,
    pub dealers: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DealerResponse {
    pub status: u16,
    pub dealer: Option<Value>,
}

/// Upstream endpoint for a state filter; blank or `All` lists every dealer.
pub fn dealers_endpoint(state: Option<&str>) -> String {
    match state.map(str::trim) {
        None | Some("") | Some("All") => "/fetchDealers".to_string(),
        Some(state) => format!("/fetchDealers/{}", urlencoding::encode(state)),
    }
}

/// GET /dealerships[?state=XX]
pub async fn handle_list_dealers(
    State(state): State<AppState>,
    Query(query): Query<StateQuery>,
) -> Json<DealersResponse> {
    list_dealers(&state, query.state.as_deref()).await
}

/// GET /dealerships/:state — a `state` query parameter still takes precedence.
pub async fn handle_list_dealers_in_state(
    State(state): State<AppState>,
    Path(path_state): Path<String>,
    Query(query): Query<StateQuery>,
) -> Json<DealersResponse> {
    let filter = query
        .state
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&path_state);
    list_dealers(&state, Some(filter)).await
}

async fn list_dealers(state: &AppState, filter: Option<&str>) -> Json<DealersResponse> {
    let dealers = state.backend.fetch(&dealers_endpoint(filter), &[]).await;
    Json(DealersResponse {
        status: 200,
        dealers,
    })
}

/// GET /dealer/:id
pub async fn handle_dealer_details(
    State(state): State<AppState>,
    Path(dealer_id): Path<String>,
) -> Result<Json<DealerResponse>, AppError> {
    let dealer_id = dealer_id.trim();
    if dealer_id.is_empty() {
        return Err(AppError::Validation("Bad Request".to_string()));
    }

    let dealer = state
        .backend
        .fetch(
            &format!("/fetchDealer/{}", urlencoding::encode(dealer_id)),
            &[],
        )
        .await;
    Ok(Json(DealerResponse {
        status: 200,
        dealer,
    }))
}
