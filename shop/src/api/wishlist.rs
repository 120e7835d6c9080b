use super::AppState;
use crate::error::ShopError;
use crate::model::{ModelId, Principal, WishlistLine};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ModelId,
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<WishlistLine>>, ShopError> {
    Ok(Json(state.wishlist.list_wishlist(principal.customer_id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AddRequest>,
) -> Result<(StatusCode, Json<WishlistLine>), ShopError> {
    let entry = state
        .wishlist
        .add_to_wishlist(principal.customer_id, request.product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<ModelId>,
) -> Result<StatusCode, ShopError> {
    state
        .wishlist
        .remove_from_wishlist(principal.customer_id, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
