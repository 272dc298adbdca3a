//! Item handlers
//!
//! Every route here sits behind `mw_require_auth`, so a `Ctx` is always present.

use crate::core::auth::handlers::json_body;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use todo_common::{CreatedResponse, ItemText, ItemView, SuccessResponse};

fn parse_item_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::InvalidInput("Invalid item id".to_string()))
}

/// GET /items
pub async fn list_items(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Vec<ItemView>>> {
    let items = state.items.list(ctx.user_id()).await?;
    Ok(Json(items.into_iter().map(ItemView::from).collect()))
}

/// POST /items
pub async fn add_item(
    State(state): State<AppState>,
    ctx: Ctx,
    payload: std::result::Result<Json<ItemText>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    let req = json_body(payload)?;
    let id = state.items.add(ctx.user_id(), &req.text).await?;

    Ok(Json(CreatedResponse { success: true, id }))
}

/// PUT /items/{id}
pub async fn edit_item(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ItemText>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let id = parse_item_id(&id)?;
    let req = json_body(payload)?;
    state.items.edit(ctx.user_id(), id, &req.text).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    let id = parse_item_id(&id)?;
    state.items.delete(ctx.user_id(), id).await?;

    Ok(Json(SuccessResponse::ok()))
}
