use super::AppState;
use crate::entities::{category, product, review};
use crate::error::ShopError;
use crate::model::{ModelId, NewProduct, Principal, ProductPatch};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<ModelId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

fn require_admin(principal: &Principal) -> Result<(), ShopError> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(ShopError::Forbidden)
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<product::Model>>, ShopError> {
    Ok(Json(state.catalog.list_products(query.category).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<ModelId>,
) -> Result<Json<product::Model>, ShopError> {
    Ok(Json(state.catalog.get_product(product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<NewProduct>,
) -> Result<(StatusCode, Json<product::Model>), ShopError> {
    require_admin(&principal)?;
    let created = state.catalog.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_product(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<ModelId>,
    Json(request): Json<ProductPatch>,
) -> Result<Json<product::Model>, ShopError> {
    require_admin(&principal)?;
    Ok(Json(state.catalog.update_product(product_id, request).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<ModelId>,
) -> Result<StatusCode, ShopError> {
    require_admin(&principal)?;
    state.catalog.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<category::Model>>, ShopError> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<category::Model>), ShopError> {
    require_admin(&principal)?;
    let created = state.catalog.create_category(&request.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    principal: Principal,
    Path(category_id): Path<ModelId>,
) -> Result<StatusCode, ShopError> {
    require_admin(&principal)?;
    state.catalog.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<ModelId>,
) -> Result<Json<Vec<review::Model>>, ShopError> {
    Ok(Json(state.catalog.list_reviews(product_id).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<ModelId>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<review::Model>), ShopError> {
    let created = state
        .catalog
        .add_review(principal.customer_id, product_id, request.rating, request.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn my_reviews(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<review::Model>>, ShopError> {
    Ok(Json(state.catalog.customer_reviews(principal.customer_id).await?))
}
