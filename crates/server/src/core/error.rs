use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use todo_common::ErrorBody;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Input
    #[error("{0}")]
    InvalidInput(String),

    // Auth
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("No auth token found")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("Auth context missing")]
    CtxNotInRequestExt,

    // Items
    #[error("Item not found or access denied")]
    NotFoundOrForbidden,

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::UsernameTaken => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidOrExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFoundOrForbidden => StatusCode::FORBIDDEN,
            Error::CtxNotInRequestExt | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client.
    ///
    /// Both token failures read the same, and internal details stay in the log.
    fn client_message(&self) -> String {
        match self {
            Error::MissingToken | Error::InvalidOrExpiredToken => {
                "Invalid or expired token".to_string()
            }
            Error::CtxNotInRequestExt | Error::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(ErrorBody::new(self.client_message()))).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Internal(format!("Database error: {}", err))
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(format!("Password hashing error: {}", err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Background task failed: {}", err))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::UsernameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFoundOrForbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_failures_are_indistinguishable() {
        assert_eq!(
            Error::MissingToken.client_message(),
            Error::InvalidOrExpiredToken.client_message()
        );
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = Error::Internal("Database error: disk I/O error".into());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
