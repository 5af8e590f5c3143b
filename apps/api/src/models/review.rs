use serde::Serialize;
use serde_json::Value;

/// Classifier label attached to a review's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Reads the `sentiment` field of a classifier response.
    /// Any other shape or label maps to neutral.
    pub fn from_response(body: &Value) -> Self {
        match body.get("sentiment").and_then(Value::as_str) {
            Some("positive") => Sentiment::Positive,
            Some("negative") => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Canonical review document forwarded to `/insert_review`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDocument {
    pub name: String,
    pub dealership: i64,
    pub review: String,
    pub purchase: bool,
    pub purchase_date: String,
    pub car_make: String,
    pub car_model: String,
    pub car_year: String,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentiment_serializes_lowercase() {
        let result = SentimentResult {
            sentiment: Sentiment::Positive,
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({"sentiment": "positive"})
        );
        assert_eq!(
            serde_json::to_value(SentimentResult::neutral()).unwrap(),
            json!({"sentiment": "neutral"})
        );
    }

    #[test]
    fn test_unknown_labels_fall_back_to_neutral() {
        assert_eq!(
            Sentiment::from_response(&json!({"sentiment": "negative"})),
            Sentiment::Negative
        );
        assert_eq!(
            Sentiment::from_response(&json!({"sentiment": "mixed"})),
            Sentiment::Neutral
        );
        assert_eq!(Sentiment::from_response(&json!("positive")), Sentiment::Neutral);
        assert_eq!(Sentiment::from_response(&Value::Null), Sentiment::Neutral);
    }
}
