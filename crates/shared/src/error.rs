use serde::{Deserialize, Serialize};

/// Error envelope returned by the service, e.g. `{"error": "email already exists"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Pulls an `error` string out of an arbitrary JSON body, if one is present.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        value
            .as_object()?
            .get("error")?
            .as_str()
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_error_field_from_object() {
        let body = ErrorBody::from_value(&json!({"error": "Event is full"}));
        assert_eq!(body, Some(ErrorBody::new("Event is full")));
    }

    #[test]
    fn ignores_bodies_without_error_string() {
        assert_eq!(ErrorBody::from_value(&json!({"message": "ok"})), None);
        assert_eq!(ErrorBody::from_value(&json!({"error": 5})), None);
        assert_eq!(ErrorBody::from_value(&json!([1, 2])), None);
    }
}
