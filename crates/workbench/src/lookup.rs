//! Lookup outcome.

use serde_json::{Value, json};

use crate::FetchError;

/// Result of one lookup: upstream JSON, or a folded failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Success(Value),
    Failure(FetchError),
}

impl Lookup {
    /// Whether the lookup failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Render as the tool payload: the upstream body unchanged, or
    /// `{"error": <message>}`.
    pub fn into_payload(self) -> Value {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => json!({ "error": error.to_string() }),
        }
    }
}

impl From<Result<Value, FetchError>> for Lookup {
    fn from(result: Result<Value, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_is_unchanged() {
        let body = json!({"1": {"study_id": "ST000001"}});
        let lookup = Lookup::from(Ok(body.clone()));
        assert!(!lookup.is_error());
        assert_eq!(lookup.into_payload(), body);
    }

    #[test]
    fn request_failure_payload() {
        let lookup = Lookup::Failure(FetchError::Request("connection refused".into()));
        assert!(lookup.is_error());
        assert_eq!(
            lookup.into_payload(),
            json!({"error": "API request failed: connection refused"})
        );
    }

    #[test]
    fn decode_failure_payload() {
        let lookup = Lookup::Failure(FetchError::Decode);
        assert_eq!(
            lookup.into_payload(),
            json!({"error": "Failed to parse API response as JSON"})
        );
    }
}
