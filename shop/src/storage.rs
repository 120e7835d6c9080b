use crate::entities::{category, customer, product, review};
use crate::error::ShopError;
use crate::model::{
    CartLine, CartView, ModelId, NewProduct, OrderStatus, OrderView, Principal, ProductPatch,
    WishlistLine,
};
use async_trait::async_trait;

/// Per-customer cart line items.
///
/// All mutations are immediately persisted; read-modify-writes on a single
/// line must not lose concurrent updates.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Create the line for (customer, product) or add `quantity` to it.
    /// Fails if the product does not exist or `quantity < 1`.
    async fn add(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        quantity: i32,
    ) -> Result<CartLine, ShopError>;

    /// Delete the line if present; absent line is a no-op.
    async fn remove(&self, customer_id: ModelId, product_id: ModelId) -> Result<(), ShopError>;

    /// Bump the line quantity by one. `None` when the line does not exist.
    async fn increase(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<Option<CartLine>, ShopError>;

    /// Drop the line quantity by one, deleting the row at quantity 1.
    /// `None` when the line does not exist or was deleted.
    async fn decrease(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<Option<CartLine>, ShopError>;

    /// Set an absolute quantity on an existing line. Quantity 0 deletes the
    /// row; negative quantities are a validation error; absent line is a
    /// no-op returning `None`.
    async fn set_quantity(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        quantity: i32,
    ) -> Result<Option<CartLine>, ShopError>;

    /// Delete all of the customer's lines unconditionally.
    async fn clear(&self, customer_id: ModelId) -> Result<(), ShopError>;

    /// All lines with per-line totals and the grand total.
    async fn list(&self, customer_id: ModelId) -> Result<CartView, ShopError>;
}

/// Order placement, listing and the status state machine.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Convert the customer's cart into an order atomically: create the
    /// order and one item per cart line, then drain the cart. Fails with
    /// `EmptyCart` when there is nothing to order.
    async fn place_order(&self, customer_id: ModelId) -> Result<OrderView, ShopError>;

    /// Administrators see every order; customers see their own.
    async fn list_orders(&self, requester: &Principal) -> Result<Vec<OrderView>, ShopError>;

    /// Orders of the customer with status Created or Processing.
    async fn list_active(&self, customer_id: ModelId) -> Result<Vec<OrderView>, ShopError>;

    /// Single order, owner or admin only.
    async fn get_order(&self, order_id: ModelId, requester: &Principal)
    -> Result<OrderView, ShopError>;

    /// Owner- or admin-initiated cancellation, permitted only while the
    /// order is Created or Processing. No side effects on failure.
    async fn cancel(&self, order_id: ModelId, requester: &Principal) -> Result<(), ShopError>;

    /// Admin-only status transition, validated against the state machine.
    async fn set_status(
        &self,
        order_id: ModelId,
        next: OrderStatus,
        requester: &Principal,
    ) -> Result<OrderView, ShopError>;
}

/// Catalog reads and admin-only writes, plus product reviews.
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn list_products(
        &self,
        category_id: Option<ModelId>,
    ) -> Result<Vec<product::Model>, ShopError>;

    async fn get_product(&self, product_id: ModelId) -> Result<product::Model, ShopError>;

    async fn create_product(&self, new: NewProduct) -> Result<product::Model, ShopError>;

    async fn update_product(
        &self,
        product_id: ModelId,
        patch: ProductPatch,
    ) -> Result<product::Model, ShopError>;

    async fn delete_product(&self, product_id: ModelId) -> Result<(), ShopError>;

    async fn list_categories(&self) -> Result<Vec<category::Model>, ShopError>;

    async fn create_category(&self, name: &str) -> Result<category::Model, ShopError>;

    async fn delete_category(&self, category_id: ModelId) -> Result<(), ShopError>;

    async fn list_reviews(&self, product_id: ModelId) -> Result<Vec<review::Model>, ShopError>;

    async fn add_review(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        rating: i32,
        comment: Option<String>,
    ) -> Result<review::Model, ShopError>;

    async fn customer_reviews(&self, customer_id: ModelId)
    -> Result<Vec<review::Model>, ShopError>;
}

/// Token glue for the identity collaborator. Credential verification stays
/// outside this system; tokens are opaque.
#[async_trait]
pub trait IdentityStorage: Send + Sync {
    /// Create a customer and issue a token. Duplicate emails are rejected.
    async fn register(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(customer::Model, String), ShopError>;

    /// Resolve the customer by email and return the existing or a fresh
    /// token.
    async fn login(&self, email: &str) -> Result<(customer::Model, String), ShopError>;

    /// Resolve a bearer token to the authenticated principal.
    async fn resolve_token(&self, token: &str) -> Result<Principal, ShopError>;
}

/// Per-customer wishlist.
#[async_trait]
pub trait WishlistStorage: Send + Sync {
    async fn list_wishlist(&self, customer_id: ModelId) -> Result<Vec<WishlistLine>, ShopError>;

    /// Fails when the product is already wishlisted.
    async fn add_to_wishlist(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<WishlistLine, ShopError>;

    /// Fails when the product is not on the wishlist.
    async fn remove_from_wishlist(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<(), ShopError>;
}
