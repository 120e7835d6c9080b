use crate::entities::{cart_item, order, order_item, product};
use crate::error::ShopError;
use crate::model::{CartLine, CartView, ModelId, OrderLine, OrderStatus, OrderView, Principal};
use crate::storage::{CartStorage, OrderStorage};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait, Index, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, NotSet, QueryFilter, QueryOrder, Schema, Set, TransactionTrait,
};
use tracing::{debug, info};

/// SeaORM-backed storage for the shop.
///
/// One connection pool shared by all trait implementations; cart and order
/// operations live here, the catalog/identity/wishlist glue in
/// `catalog_store`.
pub struct ShopStorage {
    pub db: DatabaseConnection,
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn cart_line_view(item: &cart_item::Model, product: Option<&product::Model>) -> CartLine {
    let unit_price = product.map(|p| p.price);
    CartLine {
        product_id: item.product_id,
        product_name: product.map(|p| p.name.clone()),
        unit_price,
        quantity: item.quantity,
        line_total: unit_price.map(|price| price * Decimal::from(item.quantity)),
    }
}

fn order_line_view(item: &order_item::Model, product: Option<&product::Model>) -> OrderLine {
    let unit_price = product.map(|p| p.price);
    OrderLine {
        product_id: item.product_id,
        product_name: product.map(|p| p.name.clone()),
        unit_price,
        quantity: item.quantity,
        line_total: unit_price.map(|price| price * Decimal::from(item.quantity)),
    }
}

impl ShopStorage {
    pub async fn new(database_url: &str) -> Result<Self, ShopError> {
        let db = Database::connect(database_url).await?;
        Ok(Self { db })
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create missing tables and indexes from the entity definitions.
    pub async fn initialize_schema(&self) -> Result<(), ShopError> {
        use crate::entities::{
            auth_token, category, customer, review, shipping_address, wishlist,
        };

        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        // Creation order follows foreign key dependencies.
        self.create_table(&schema, category::Entity).await?;
        self.create_table(&schema, customer::Entity).await?;
        self.create_table(&schema, auth_token::Entity).await?;
        self.create_table(&schema, product::Entity).await?;
        self.create_table(&schema, shipping_address::Entity).await?;
        self.create_table(&schema, review::Entity).await?;
        self.create_table(&schema, cart_item::Entity).await?;
        self.create_table(&schema, order::Entity).await?;
        self.create_table(&schema, order_item::Entity).await?;
        self.create_table(&schema, wishlist::Entity).await?;

        // One cart line per (customer, product); the upsert in `add` targets
        // this index.
        let cart_index = Index::create()
            .name("ux_cart_items_customer_product")
            .table(cart_item::Entity)
            .col(cart_item::Column::CustomerId)
            .col(cart_item::Column::ProductId)
            .unique()
            .if_not_exists()
            .to_owned();
        self.db.execute(backend.build(&cart_index)).await?;

        let wishlist_index = Index::create()
            .name("ux_wishlists_customer_product")
            .table(wishlist::Entity)
            .col(wishlist::Column::CustomerId)
            .col(wishlist::Column::ProductId)
            .unique()
            .if_not_exists()
            .to_owned();
        self.db.execute(backend.build(&wishlist_index)).await?;

        info!("database schema initialized");
        Ok(())
    }

    async fn create_table<E: EntityTrait>(
        &self,
        schema: &Schema,
        entity: E,
    ) -> Result<(), ShopError> {
        let backend = self.db.get_database_backend();
        let mut statement = schema.create_table_from_entity(entity);
        statement.if_not_exists();
        self.db.execute(backend.build(&statement)).await?;
        Ok(())
    }

    /// Load one cart line with its product joined in.
    async fn cart_line(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<Option<CartLine>, ShopError> {
        let row = cart_item::Entity::find()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .find_also_related(product::Entity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(item, product)| cart_line_view(&item, product.as_ref())))
    }

    /// Assemble the full order view, pricing every line from the current
    /// product price.
    async fn order_view(&self, order: order::Model) -> Result<OrderView, ShopError> {
        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .order_by_asc(order_item::Column::Id)
            .find_also_related(product::Entity)
            .all(&self.db)
            .await?;

        let items: Vec<OrderLine> = rows
            .iter()
            .map(|(item, product)| order_line_view(item, product.as_ref()))
            .collect();
        let total = items.iter().filter_map(|line| line.line_total).sum();

        Ok(OrderView {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            shipping_address_id: order.shipping_address_id,
            transaction_id: order.transaction_id,
            created_at: order.created_at,
            items,
            total,
        })
    }
}

#[async_trait]
impl CartStorage for ShopStorage {
    async fn add(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        quantity: i32,
    ) -> Result<CartLine, ShopError> {
        if quantity < 1 {
            return Err(ShopError::Validation("quantity must be at least 1".to_string()));
        }
        product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))?;

        let line = cart_item::ActiveModel {
            id: NotSet,
            customer_id: Set(Some(customer_id)),
            product_id: Set(Some(product_id)),
            quantity: Set(quantity),
            created_at: Set(now()),
        };

        // Single upsert statement, so concurrent adds for the same line are
        // serialized by the database and never lose an increment.
        cart_item::Entity::insert(line)
            .on_conflict(
                OnConflict::columns([
                    cart_item::Column::CustomerId,
                    cart_item::Column::ProductId,
                ])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(quantity),
                )
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        debug!(customer_id, product_id, quantity, "added cart line");

        self.cart_line(customer_id, product_id).await?.ok_or_else(|| {
            ShopError::Database(DbErr::RecordNotFound(format!(
                "cart line for customer {customer_id}, product {product_id}"
            )))
        })
    }

    async fn remove(&self, customer_id: ModelId, product_id: ModelId) -> Result<(), ShopError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn increase(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<Option<CartLine>, ShopError> {
        let result = cart_item::Entity::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).add(1),
            )
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.cart_line(customer_id, product_id).await
    }

    async fn decrease(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<Option<CartLine>, ShopError> {
        let txn = self.db.begin().await?;

        // Conditional decrement; a line already at quantity 1 is deleted
        // instead, so quantity 0 never exists.
        let updated = cart_item::Entity::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).sub(1),
            )
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .filter(cart_item::Column::Quantity.gt(1))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            cart_item::Entity::delete_many()
                .filter(cart_item::Column::CustomerId.eq(customer_id))
                .filter(cart_item::Column::ProductId.eq(product_id))
                .filter(cart_item::Column::Quantity.lte(1))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        if updated.rows_affected == 0 {
            return Ok(None);
        }
        self.cart_line(customer_id, product_id).await
    }

    async fn set_quantity(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        quantity: i32,
    ) -> Result<Option<CartLine>, ShopError> {
        if quantity < 0 {
            return Err(ShopError::Validation("quantity must not be negative".to_string()));
        }
        if quantity == 0 {
            // Absolute zero behaves like a decrement reaching zero.
            cart_item::Entity::delete_many()
                .filter(cart_item::Column::CustomerId.eq(customer_id))
                .filter(cart_item::Column::ProductId.eq(product_id))
                .exec(&self.db)
                .await?;
            return Ok(None);
        }

        let result = cart_item::Entity::update_many()
            .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.cart_line(customer_id, product_id).await
    }

    async fn clear(&self, customer_id: ModelId) -> Result<(), ShopError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .exec(&self.db)
            .await?;
        debug!(customer_id, "cart cleared");
        Ok(())
    }

    async fn list(&self, customer_id: ModelId) -> Result<CartView, ShopError> {
        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .order_by_asc(cart_item::Column::Id)
            .find_also_related(product::Entity)
            .all(&self.db)
            .await?;

        let items: Vec<CartLine> = rows
            .iter()
            .map(|(item, product)| cart_line_view(item, product.as_ref()))
            .collect();
        let total = items.iter().filter_map(|line| line.line_total).sum();

        Ok(CartView { items, total })
    }
}

#[async_trait]
impl OrderStorage for ShopStorage {
    async fn place_order(&self, customer_id: ModelId) -> Result<OrderView, ShopError> {
        let txn = self.db.begin().await?;

        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .order_by_asc(cart_item::Column::Id)
            .all(&txn)
            .await?;

        if lines.is_empty() {
            // Dropping the transaction rolls it back; nothing was written.
            return Err(ShopError::EmptyCart);
        }

        let order = order::ActiveModel {
            id: NotSet,
            customer_id: Set(Some(customer_id)),
            status: Set(OrderStatus::Created),
            shipping_address_id: Set(None),
            transaction_id: Set(None),
            created_at: Set(now()),
        }
        .insert(&txn)
        .await?;

        for line in &lines {
            order_item::ActiveModel {
                id: NotSet,
                order_id: Set(Some(order.id)),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                created_at: Set(now()),
            }
            .insert(&txn)
            .await?;
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CustomerId.eq(customer_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        counter!("shop_orders_placed_total").increment(1);
        info!(order_id = order.id, customer_id, lines = lines.len(), "order placed");

        self.order_view(order).await
    }

    async fn list_orders(&self, requester: &Principal) -> Result<Vec<OrderView>, ShopError> {
        let mut query = order::Entity::find().order_by_asc(order::Column::Id);
        if !requester.is_admin {
            query = query.filter(order::Column::CustomerId.eq(requester.customer_id));
        }
        let orders = query.all(&self.db).await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.order_view(order).await?);
        }
        Ok(views)
    }

    async fn list_active(&self, customer_id: ModelId) -> Result<Vec<OrderView>, ShopError> {
        let orders = order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(
                order::Column::Status
                    .is_in([OrderStatus::Created, OrderStatus::Processing]),
            )
            .order_by_asc(order::Column::Id)
            .all(&self.db)
            .await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.order_view(order).await?);
        }
        Ok(views)
    }

    async fn get_order(
        &self,
        order_id: ModelId,
        requester: &Principal,
    ) -> Result<OrderView, ShopError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::OrderNotFound(order_id))?;

        if !requester.is_admin && !requester.owns(order.customer_id) {
            return Err(ShopError::Forbidden);
        }
        self.order_view(order).await
    }

    async fn cancel(&self, order_id: ModelId, requester: &Principal) -> Result<(), ShopError> {
        let order = order::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::OrderNotFound(order_id))?;

        if !requester.is_admin && !requester.owns(order.customer_id) {
            return Err(ShopError::Forbidden);
        }
        if !order.status.is_cancellable() {
            return Err(ShopError::InvalidStateTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);
        active.update(&self.db).await?;

        counter!("shop_orders_cancelled_total").increment(1);
        info!(order_id, "order cancelled");
        Ok(())
    }

    async fn set_status(
        &self,
        order_id: ModelId,
        next: OrderStatus,
        requester: &Principal,
    ) -> Result<OrderView, ShopError> {
        if !requester.is_admin {
            return Err(ShopError::Forbidden);
        }

        let order = order::Entity::find_by_id(order_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::OrderNotFound(order_id))?;

        if !order.status.can_transition_to(next) {
            return Err(ShopError::InvalidStateTransition { from: order.status, to: next });
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(next);
        let updated = active.update(&self.db).await?;

        info!(order_id, status = %next, "order status updated");
        self.order_view(updated).await
    }
}
