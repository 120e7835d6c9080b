use super::AppState;
use crate::error::ShopError;
use crate::model::{CartLine, CartView, ModelId, Principal};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ModelId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: ModelId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ModelId,
    pub quantity: i32,
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<CartView>, ShopError> {
    Ok(Json(state.cart.list(principal.customer_id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddRequest>,
) -> Result<Json<CartLine>, ShopError> {
    let line = state
        .cart
        .add(principal.customer_id, request.product_id, request.quantity)
        .await?;
    Ok(Json(line))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<LineRequest>,
) -> Result<StatusCode, ShopError> {
    state.cart.remove(principal.customer_id, request.product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn increase(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<LineRequest>,
) -> Result<Json<Option<CartLine>>, ShopError> {
    let line = state.cart.increase(principal.customer_id, request.product_id).await?;
    Ok(Json(line))
}

pub async fn decrease(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<LineRequest>,
) -> Result<Json<Option<CartLine>>, ShopError> {
    let line = state.cart.decrease(principal.customer_id, request.product_id).await?;
    Ok(Json(line))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<Option<CartLine>>, ShopError> {
    let line = state
        .cart
        .set_quantity(principal.customer_id, request.product_id, request.quantity)
        .await?;
    Ok(Json(line))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<StatusCode, ShopError> {
    state.cart.clear(principal.customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
