//! Request and response bodies of the REST API
//!
//! ```text
//! POST   /register     Credentials -> SuccessResponse
//! POST   /login        Credentials -> LoginResponse
//! GET    /items        -           -> [ItemView]
//! POST   /items        ItemText    -> CreatedResponse
//! PUT    /items/{id}   ItemText    -> SuccessResponse
//! DELETE /items/{id}   -           -> SuccessResponse
//! any failure                      -> ErrorBody
//! ```

use serde::{Deserialize, Serialize};

/// Username/password pair used by both `/register` and `/login`.
///
/// Missing fields deserialize as empty strings so the server can answer with
/// its own validation error instead of a framework rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /items` and `PUT /items/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemText {
    #[serde(default)]
    pub text: String,
}

impl ItemText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One row of `GET /items`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: i64,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Pull the `error` string out of a response body, if the body has that shape.
    pub fn extract(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|body| body.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_fields_default_to_empty() {
        let creds: Credentials = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(creds.username, "alice");
        assert!(creds.password.is_empty());
    }

    #[test]
    fn test_error_body_extract() {
        assert_eq!(
            ErrorBody::extract(br#"{"error":"Username already taken"}"#).as_deref(),
            Some("Username already taken")
        );
        assert_eq!(ErrorBody::extract(b"<html>Bad Gateway</html>"), None);
        assert_eq!(ErrorBody::extract(br#"{"error":{"message":"nested"}}"#), None);
    }
}
