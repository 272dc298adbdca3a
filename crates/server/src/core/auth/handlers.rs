//! Auth handlers

use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use todo_common::{Credentials, LoginResponse, SuccessResponse};
use tracing::info;

/// Unwrap a JSON body, turning any framework rejection into our 400.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        Error::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    })
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let req = json_body(payload)?;
    info!("POST /register - {}", req.username);

    state.auth.register(&req.username, &req.password).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let req = json_body(payload)?;
    info!("POST /login - {}", req.username);

    let token = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}
