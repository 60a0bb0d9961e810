//! HTTP handlers for the admin lot endpoints.
//!
//! Handlers only translate between HTTP and the `LotSequencingApi`; every
//! rule lives in the sequencing service.

use crate::domain::ApiError;
use crate::router::AppState;
use ah_01_lot_sequencing::{CreateLot, RenumberLots, ReorderLots};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{Method, StatusCode, Uri},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

type ApiResult<T> = Result<T, ApiError>;

/// Query string of `GET /api/admin/lots`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLotsQuery {
    pub auction_id: Option<String>,
}

/// `PUT /api/admin/lots/reorder`
pub async fn reorder_lots(
    State(state): State<AppState>,
    payload: Result<Json<ReorderLots>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(command) = payload?;
    let outcome = state.api.reorder_lots(command).await?;
    Ok(Json(json!({ "success": true, "updated": outcome.updated })))
}

/// `POST /api/admin/lots/renumber`
pub async fn renumber_lots(
    State(state): State<AppState>,
    payload: Result<Json<RenumberLots>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(command) = payload?;
    let outcome = state.api.renumber_lots(command).await?;
    Ok(Json(json!({ "success": true, "updated": outcome.updated })))
}

/// `POST /api/admin/lots`
pub async fn create_lot(
    State(state): State<AppState>,
    payload: Result<Json<CreateLot>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(command) = payload?;
    let lot = state.api.create_lot(command).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "lot": lot }))))
}

/// `GET /api/admin/lots?auctionId=...`
pub async fn list_lots(
    State(state): State<AppState>,
    query: Result<Query<ListLotsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let auction_id = query
        .auction_id
        .ok_or_else(|| ApiError::bad_request("auctionId query parameter is required"))?;
    let lots = state.api.list_lots(&auction_id).await?;
    Ok(Json(json!({ "success": true, "lots": lots })))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Unknown routes answer in the same JSON shape as every other failure.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

/// Wrong method on a known route.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(&method, uri.path())
}
