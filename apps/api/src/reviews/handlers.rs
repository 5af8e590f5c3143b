use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::SessionUser;
use crate::errors::AppError;
use crate::reviews::aggregator::get_reviews_for_dealer;
use crate::reviews::submission::{submit_review, SubmissionResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub status: u16,
    pub reviews: Vec<Value>,
}

/// GET /dealer/:id/reviews
pub async fn handle_dealer_reviews(
    State(state): State<AppState>,
    Path(dealer_id): Path<String>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = get_reviews_for_dealer(state.backend.as_ref(), &dealer_id).await?;
    Ok(Json(ReviewsResponse {
        status: 200,
        reviews,
    }))
}

/// POST /add_review
///
/// The body is taken raw so malformed JSON maps to a 400 with our envelope.
pub async fn handle_add_review(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    body: Bytes,
) -> Result<Json<SubmissionResponse>, AppError> {
    let response = submit_review(state.backend.as_ref(), user.as_deref(), &body).await?;
    Ok(Json(response))
}
