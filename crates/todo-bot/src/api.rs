//! REST client for the To-Do server
//!
//! [`TodoApi`] is the seam the conversation flow talks to. [`HttpApi`] is the
//! real implementation over `reqwest`; tests substitute an in-memory one.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use todo_common::{
    CreatedResponse, Credentials, ErrorBody, ItemText, ItemView, LoginResponse,
};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server answered with an `{error}` body
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Server answered with something else
    #[error("Request failed with status {0}")]
    Status(u16),
    #[error("Could not reach the To-Do server")]
    Transport(#[source] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } | ApiError::Status(status) => Some(*status),
            ApiError::Transport(_) => None,
        }
    }

    /// The token was missing, malformed or expired
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        warn!("[Api] Transport error: {}", err);
        ApiError::Transport(err)
    }
}

#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError>;
    /// Returns the bearer token
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
    async fn list(&self, token: &str) -> Result<Vec<ItemView>, ApiError>;
    /// Returns the new item's id
    async fn add(&self, token: &str, text: &str) -> Result<i64, ApiError>;
    async fn edit(&self, token: &str, id: i64, text: &str) -> Result<(), ApiError>;
    async fn delete(&self, token: &str, id: i64) -> Result<(), ApiError>;
}

/// [`TodoApi`] over HTTP
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &str) -> RequestBuilder {
        req.bearer_auth(token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await?;
        check(resp).await
    }
}

/// Pass 2xx responses through; turn anything else into an [`ApiError`].
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.bytes().await.unwrap_or_default();
    debug!("[Api] {} response: {} bytes", status, body.len());

    Err(match ErrorBody::extract(&body) {
        Some(message) => ApiError::Api {
            status: status.as_u16(),
            message,
        },
        None => ApiError::Status(status.as_u16()),
    })
}

#[async_trait]
impl TodoApi for HttpApi {
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url("/register"))
            .json(&Credentials::new(username, password));
        self.send(req).await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let req = self
            .client
            .post(self.url("/login"))
            .json(&Credentials::new(username, password));
        let body: LoginResponse = self.send(req).await?.json().await?;
        Ok(body.token)
    }

    async fn list(&self, token: &str) -> Result<Vec<ItemView>, ApiError> {
        let req = self.authed(self.client.get(self.url("/items")), token);
        Ok(self.send(req).await?.json().await?)
    }

    async fn add(&self, token: &str, text: &str) -> Result<i64, ApiError> {
        let req = self
            .authed(self.client.post(self.url("/items")), token)
            .json(&ItemText::new(text));
        let body: CreatedResponse = self.send(req).await?.json().await?;
        Ok(body.id)
    }

    async fn edit(&self, token: &str, id: i64, text: &str) -> Result<(), ApiError> {
        let req = self
            .authed(self.client.put(self.url(&format!("/items/{}", id))), token)
            .json(&ItemText::new(text));
        self.send(req).await?;
        Ok(())
    }

    async fn delete(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let req = self.authed(self.client.delete(self.url(&format!("/items/{}", id))), token);
        self.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let api = HttpApi::new("http://localhost:3000/");
        assert_eq!(api.url("/items"), "http://localhost:3000/items");
    }

    #[test]
    fn test_error_messages() {
        let shaped = ApiError::Api {
            status: 409,
            message: "Username already taken".into(),
        };
        assert_eq!(shaped.to_string(), "Username already taken");
        assert!(!shaped.is_unauthorized());

        let bare = ApiError::Status(401);
        assert_eq!(bare.to_string(), "Request failed with status 401");
        assert!(bare.is_unauthorized());
    }
}
