use super::AppState;
use crate::error::ShopError;
use crate::model::{ModelId, Principal};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};

const TOKEN_SCHEME: &str = "Token ";

/// Resolve `Authorization: Token <key>` into the authenticated principal.
///
/// The principal is an explicit value handed to every operation; nothing
/// downstream reads request state implicitly.
impl FromRequestParts<AppState> for Principal {
    type Rejection = ShopError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ShopError::Unauthorized)?;
        let token = header.strip_prefix(TOKEN_SCHEME).ok_or(ShopError::Unauthorized)?;

        state.identity.resolve_token(token).await
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub customer_id: ModelId,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ShopError> {
    let (customer, token) = state.identity.register(&request.username, &request.email).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token, customer_id: customer.id })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ShopError> {
    let (customer, token) = state.identity.login(&request.email).await?;
    Ok(Json(TokenResponse { token, customer_id: customer.id }))
}
