use super::AppState;
use crate::error::ShopError;
use crate::model::{ModelId, OrderStatus, OrderView, Principal};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

pub async fn place(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<(StatusCode, Json<OrderView>), ShopError> {
    let order = state.orders.place_order(principal.customer_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<OrderView>>, ShopError> {
    Ok(Json(state.orders.list_orders(&principal).await?))
}

pub async fn active(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<OrderView>>, ShopError> {
    Ok(Json(state.orders.list_active(principal.customer_id).await?))
}

pub async fn retrieve(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<ModelId>,
) -> Result<Json<OrderView>, ShopError> {
    Ok(Json(state.orders.get_order(order_id, &principal).await?))
}

pub async fn cancel(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<ModelId>,
) -> Result<Json<Value>, ShopError> {
    state.orders.cancel(order_id, &principal).await?;
    Ok(Json(json!({ "message": "order cancelled" })))
}

pub async fn set_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(order_id): Path<ModelId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<OrderView>, ShopError> {
    let order = state.orders.set_status(order_id, request.status, &principal).await?;
    Ok(Json(order))
}
