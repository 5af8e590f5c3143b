//! Review write path.
//!
//! A submission runs through a fixed sequence with no retries between steps:
//! auth check, parse and validate, build the canonical document, submit
//! upstream, interpret the upstream answer, then refresh the dealer's review
//! list. The refresh is best effort: once the write is accepted, a failed
//! refresh yields an empty list rather than an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::review::ReviewDocument;
use crate::reviews::{is_truthy, reviews_endpoint};
use crate::upstream::{is_error_envelope, ReviewBackend};

/// Keys accepted for the dealer id, in lookup order.
const DEALER_ID_KEYS: [&str; 4] = ["dealership", "dealerId", "dealer_id", "id"];
const ID_KEYS: [&str; 3] = ["_id", "insertedId", "id"];
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Validated submission fields, before the identity and timestamp are added.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSubmission {
    pub dealer_id: i64,
    pub review: String,
    pub name: Option<String>,
    pub purchase: bool,
    pub purchase_date: String,
    pub car_make: String,
    pub car_model: String,
    pub car_year: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub status: u16,
    pub reviews: Vec<Value>,
    pub backend: Value,
}

/// Which predicate accepted an upstream write response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Truthy `ok` or `acknowledged`.
    Flag,
    /// `status` of 200 or 201.
    Status,
    /// Truthy `_id`, `insertedId` or `id`.
    Identifier,
    /// Any other non-empty object.
    NonEmpty,
}

pub async fn submit_review(
    backend: &dyn ReviewBackend,
    username: Option<&str>,
    body: &[u8],
) -> Result<SubmissionResponse, AppError> {
    let username = username.ok_or(AppError::Forbidden)?;
    let submission = parse_submission(body)?;
    let document = build_document(submission, username, Utc::now());

    let upstream = backend
        .submit_review(&document)
        .await
        .map_err(|e| AppError::UpstreamTransport(e.to_string()))?;

    match interpret_outcome(&upstream) {
        Some(acceptance) => info!(
            "Review for dealer {} accepted upstream ({acceptance:?})",
            document.dealership
        ),
        None => return Err(AppError::UpstreamRejected(upstream)),
    }

    let reviews = refresh_reviews(backend, document.dealership).await;

    Ok(SubmissionResponse {
        status: 200,
        reviews,
        backend: upstream,
    })
}

/// Parses the request body into a submission.
/// An empty body is treated as an empty object.
pub fn parse_submission(body: &[u8]) -> Result<ReviewSubmission, AppError> {
    let data: Map<String, Value> = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::Validation(
                    "Request body must be a JSON object".to_string(),
                ))
            }
            Err(_) => return Err(AppError::Validation("Invalid JSON".to_string())),
        }
    };

    let dealer_id = DEALER_ID_KEYS
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|v| is_truthy(v));
    let review = data
        .get("review")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let Some(dealer_id) = dealer_id.filter(|_| !review.is_empty()) else {
        return Err(AppError::Validation(
            "dealer_id and review are required".to_string(),
        ));
    };
    let dealer_id = coerce_dealer_id(dealer_id).ok_or_else(|| {
        AppError::Validation(format!("dealer_id must be a positive integer, got {dealer_id}"))
    })?;

    Ok(ReviewSubmission {
        dealer_id,
        review: review.to_string(),
        name: data
            .get("name")
            .filter(|v| is_truthy(v))
            .map(coerce_string),
        purchase: data.get("purchase").map(is_truthy).unwrap_or(false),
        purchase_date: optional_string(&data, "purchase_date"),
        car_make: optional_string(&data, "car_make"),
        car_model: optional_string(&data, "car_model"),
        car_year: optional_string(&data, "car_year"),
    })
}

/// Assembles the document sent upstream. `name` falls back to the session user.
pub fn build_document(
    submission: ReviewSubmission,
    username: &str,
    now: DateTime<Utc>,
) -> ReviewDocument {
    ReviewDocument {
        name: submission.name.unwrap_or_else(|| username.to_string()),
        dealership: submission.dealer_id,
        review: submission.review,
        purchase: submission.purchase,
        purchase_date: submission.purchase_date,
        car_make: submission.car_make,
        car_model: submission.car_model,
        car_year: submission.car_year,
        time: now.format(TIME_FORMAT).to_string(),
    }
}

/// Decides whether the upstream accepted the write.
///
/// Rules are checked in order. An error envelope is always a rejection; any
/// other non-empty object is accepted even without a recognised success marker.
pub fn interpret_outcome(response: &Value) -> Option<Acceptance> {
    let Value::Object(fields) = response else {
        return None;
    };
    if is_error_envelope(response) {
        return None;
    }

    let truthy = |key: &str| fields.get(key).map(is_truthy).unwrap_or(false);

    if truthy("ok") || truthy("acknowledged") {
        Some(Acceptance::Flag)
    } else if matches!(
        fields.get("status").and_then(Value::as_i64),
        Some(200) | Some(201)
    ) {
        Some(Acceptance::Status)
    } else if ID_KEYS.into_iter().any(|key| truthy(key)) {
        Some(Acceptance::Identifier)
    } else if !fields.is_empty() {
        Some(Acceptance::NonEmpty)
    } else {
        None
    }
}

/// Plain re-read of the dealer's reviews after a write; no sentiment pass.
async fn refresh_reviews(backend: &dyn ReviewBackend, dealer_id: i64) -> Vec<Value> {
    match backend.fetch(&reviews_endpoint(dealer_id), &[]).await {
        Some(Value::Array(reviews)) => reviews,
        Some(other) => {
            warn!("Refresh for dealer {dealer_id} returned a non-list, using []: {other}");
            Vec::new()
        }
        None => {
            warn!("Refresh for dealer {dealer_id} failed after a successful write, using []");
            Vec::new()
        }
    }
}

fn coerce_dealer_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Falsy or missing values become an empty string.
fn optional_string(data: &Map<String, Value>, key: &str) -> String {
    data.get(key)
        .filter(|v| is_truthy(v))
        .map(coerce_string)
        .unwrap_or_default()
}
