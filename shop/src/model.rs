use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::Display as EnumDisplay;

pub type ModelId = i64;

/// Lifecycle of an order.
///
/// ```text
/// Created    --cancel--> Cancelled   [terminal]
/// Created    --admin-->  Processing
/// Processing --cancel--> Cancelled   [terminal]
/// Processing --admin-->  Shipped
/// Shipped    --admin-->  Delivered   [terminal]
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, EnumDisplay,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Created")]
    Created,
    #[sea_orm(string_value = "Processing")]
    Processing,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// An active order is one the customer is still waiting on.
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::Processing)
    }

    /// Owner-initiated cancellation is only permitted before shipping.
    pub fn is_cancellable(self) -> bool {
        self.is_active()
    }

    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Created, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

/// The authenticated caller, resolved from the request token and passed
/// explicitly into every operation.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub customer_id: ModelId,
    pub is_admin: bool,
}

impl Principal {
    pub fn owns(&self, customer_id: Option<ModelId>) -> bool {
        customer_id == Some(self.customer_id)
    }
}

/// One cart line with its live-priced total.
///
/// `unit_price` and `line_total` are absent when the referenced product no
/// longer exists; such lines contribute nothing to the grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Option<ModelId>,
    pub product_name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: i32,
    pub line_total: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

/// One order line, priced from the current product price at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Option<ModelId>,
    pub product_name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: i32,
    pub line_total: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: ModelId,
    pub customer_id: Option<ModelId>,
    pub status: OrderStatus,
    pub shipping_address_id: Option<ModelId>,
    pub transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishlistLine {
    pub product_id: Option<ModelId>,
    pub product_name: Option<String>,
}

/// Input for product creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<ModelId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available_quantity: i32,
}

/// Partial update for a product; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<ModelId>,
    pub description: Option<String>,
    pub available_quantity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_statuses() {
        assert!(OrderStatus::Created.is_active());
        assert!(OrderStatus::Processing.is_active());
        assert!(!OrderStatus::Shipped.is_active());
        assert!(!OrderStatus::Delivered.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn forward_transitions() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn cancellation_edges() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn no_skips_or_backward_moves() {
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn status_display_matches_stored_value() {
        assert_eq!(OrderStatus::Processing.to_string(), "Processing");
        assert_eq!(OrderStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn principal_ownership() {
        let principal = Principal { customer_id: 5, is_admin: false };
        assert!(principal.owns(Some(5)));
        assert!(!principal.owns(Some(6)));
        assert!(!principal.owns(None));
    }
}
