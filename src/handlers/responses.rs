//! API response envelope

use serde::Serialize;

/// Uniform response body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TokenResponse {
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_omits_the_data_field() {
        let body = serde_json::to_value(TokenResponse::failure("nope")).unwrap();
        assert_eq!(body, json!({"success": false, "message": "nope"}));
    }

    #[test]
    fn success_carries_data() {
        let body =
            serde_json::to_value(TokenResponse::success("ok", json!({"modules": []}))).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "message": "ok", "data": {"modules": []}})
        );
    }
}
