//! Dealer reviews: sentiment-annotated reads and the review write path.

pub mod aggregator;
pub mod handlers;
pub mod submission;

use std::fmt::Display;

use serde_json::Value;

/// Upstream endpoint listing one dealer's reviews.
pub fn reviews_endpoint(dealer_id: impl Display) -> String {
    format!("/fetchReviews/dealer/{dealer_id}")
}

/// Python-style truthiness of a JSON value, which is what the upstream
/// services and the frontend assume when they send optional fields.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_reviews_endpoint() {
        assert_eq!(reviews_endpoint(15), "/fetchReviews/dealer/15");
        assert_eq!(reviews_endpoint("15"), "/fetchReviews/dealer/15");
    }
}
