use serde::Serialize;

/// Standard response envelope for all API endpoints.
///
/// Every response is shaped as
/// `{"success": bool, "data"?, "error"?, "message"?, "count"?}` with absent
/// fields omitted from the JSON entirely.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            count: None,
        }
    }

    /// Successful response with no data payload, only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
            count: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a result count (for list/search responses).
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_omits_absent_fields() {
        let env = Envelope::ok(serde_json::json!({"id": "1"}));
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"data\""));
        assert!(!json.contains("\"error\""));
        assert!(!json.contains("\"message\""));
        assert!(!json.contains("\"count\""));
    }

    #[test]
    fn list_envelope_has_count() {
        let env = Envelope::ok(vec![1, 2, 3]).with_count(3);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["count"], 3);
        assert_eq!(value["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn message_only() {
        let env: Envelope<()> = Envelope::message("deleted");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "deleted");
        assert!(value.get("data").is_none());
    }
}
