use crate::model::{ModelId, OrderStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Boxed error alias used at the executable edges.
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Domain errors surfaced by the storage layer and mapped to HTTP responses
/// in one place.
///
/// An unknown product is a 400: the request body referenced a product that
/// does not exist. An unknown order is a 404: the order id is part of the
/// resource path.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("product {0} not found")]
    ProductNotFound(ModelId),

    #[error("order {0} not found")]
    OrderNotFound(ModelId),

    #[error("category {0} not found")]
    CategoryNotFound(ModelId),

    #[error("invalid credentials")]
    UnknownCustomer,

    #[error("cart empty")]
    EmptyCart,

    #[error("order cannot move from {from} to {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    #[error("forbidden")]
    Forbidden,

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl ShopError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::ProductNotFound(_)
            | ShopError::CategoryNotFound(_)
            | ShopError::UnknownCustomer
            | ShopError::EmptyCart
            | ShopError::InvalidStateTransition { .. }
            | ShopError::Validation(_)
            | ShopError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            ShopError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            ShopError::Forbidden => StatusCode::FORBIDDEN,
            ShopError::Unauthorized => StatusCode::UNAUTHORIZED,
            ShopError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            return (status, Json(json!({ "error": "internal server error" }))).into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ShopError::ProductNotFound(1).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::OrderNotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ShopError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ShopError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ShopError::Database(sea_orm::DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn empty_cart_message_is_stable() {
        // The HTTP contract promises {"error": "cart empty"} on checkout.
        assert_eq!(ShopError::EmptyCart.to_string(), "cart empty");
    }

    #[test]
    fn transition_message_names_both_states() {
        let err = ShopError::InvalidStateTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "order cannot move from Delivered to Cancelled");
    }
}
