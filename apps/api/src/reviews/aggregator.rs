//! Joins a dealer's reviews with one sentiment label per review.

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::review::Sentiment;
use crate::reviews::reviews_endpoint;
use crate::upstream::ReviewBackend;

/// Fetches a dealer's reviews and attaches a `sentiment` field to each one.
///
/// Upstream order is preserved and nothing is dropped. Blank review texts are
/// labelled neutral without calling the classifier, every other review costs
/// exactly one classifier call. Calls are made one review at a time.
pub async fn get_reviews_for_dealer(
    backend: &dyn ReviewBackend,
    dealer_id: &str,
) -> Result<Vec<Value>, AppError> {
    let dealer_id = dealer_id.trim();
    if dealer_id.is_empty() {
        return Err(AppError::Validation("Bad Request".to_string()));
    }

    let endpoint = reviews_endpoint(urlencoding::encode(dealer_id));
    let reviews = match backend.fetch(&endpoint, &[]).await {
        Some(Value::Array(reviews)) => reviews,
        Some(other) => {
            warn!("Reviews for dealer {dealer_id} were not a list, treating as empty: {other}");
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut enriched = Vec::with_capacity(reviews.len());
    for review in reviews {
        enriched.push(annotate(backend, review).await);
    }

    debug!("Annotated {} reviews for dealer {dealer_id}", enriched.len());
    Ok(enriched)
}

/// Non-object entries cannot carry a label and pass through unchanged.
async fn annotate(backend: &dyn ReviewBackend, mut review: Value) -> Value {
    if let Value::Object(fields) = &mut review {
        let text = fields
            .get("review")
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        let sentiment = if text.is_empty() {
            Sentiment::Neutral
        } else {
            backend.analyze_sentiment(&text).await.sentiment
        };

        fields.insert(
            "sentiment".to_string(),
            Value::String(sentiment.as_str().to_string()),
        );
    }
    review
}
