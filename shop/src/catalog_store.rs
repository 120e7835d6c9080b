//! Catalog, review, wishlist and identity-glue implementations for
//! [`ShopStorage`](crate::store::ShopStorage). Thin data access; the
//! interesting state lives in `store`.

use crate::entities::{auth_token, cart_item, category, customer, order_item, product, review, wishlist};
use crate::error::ShopError;
use crate::model::{ModelId, NewProduct, Principal, ProductPatch, WishlistLine};
use crate::storage::{CatalogStorage, IdentityStorage, WishlistStorage};
use crate::store::ShopStorage;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[async_trait]
impl CatalogStorage for ShopStorage {
    async fn list_products(
        &self,
        category_id: Option<ModelId>,
    ) -> Result<Vec<product::Model>, ShopError> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Id);
        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        Ok(query.all(&self.db).await?)
    }

    async fn get_product(&self, product_id: ModelId) -> Result<product::Model, ShopError> {
        product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))
    }

    async fn create_product(&self, new: NewProduct) -> Result<product::Model, ShopError> {
        if new.price.is_sign_negative() {
            return Err(ShopError::Validation("price must not be negative".to_string()));
        }
        if let Some(category_id) = new.category_id {
            category::Entity::find_by_id(category_id)
                .one(&self.db)
                .await?
                .ok_or(ShopError::CategoryNotFound(category_id))?;
        }

        let created = product::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            price: Set(new.price),
            category_id: Set(new.category_id),
            description: Set(new.description),
            available_quantity: Set(new.available_quantity),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await?;

        info!(product_id = created.id, "product created");
        Ok(created)
    }

    async fn update_product(
        &self,
        product_id: ModelId,
        patch: ProductPatch,
    ) -> Result<product::Model, ShopError> {
        if let Some(price) = patch.price {
            if price.is_sign_negative() {
                return Err(ShopError::Validation("price must not be negative".to_string()));
            }
        }

        let existing = product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(category_id) = patch.category_id {
            category::Entity::find_by_id(category_id)
                .one(&self.db)
                .await?
                .ok_or(ShopError::CategoryNotFound(category_id))?;
            active.category_id = Set(Some(category_id));
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(available_quantity) = patch.available_quantity {
            active.available_quantity = Set(available_quantity);
        }

        Ok(active.update(&self.db).await?)
    }

    async fn delete_product(&self, product_id: ModelId) -> Result<(), ShopError> {
        let txn = self.db.begin().await?;

        // Orphan semantics: dependent rows survive with the reference gone.
        cart_item::Entity::update_many()
            .col_expr(cart_item::Column::ProductId, Expr::value(Option::<i64>::None))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        order_item::Entity::update_many()
            .col_expr(order_item::Column::ProductId, Expr::value(Option::<i64>::None))
            .filter(order_item::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        review::Entity::update_many()
            .col_expr(review::Column::ProductId, Expr::value(Option::<i64>::None))
            .filter(review::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        wishlist::Entity::update_many()
            .col_expr(wishlist::Column::ProductId, Expr::value(Option::<i64>::None))
            .filter(wishlist::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;

        let result = product::Entity::delete_by_id(product_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ShopError::ProductNotFound(product_id));
        }

        txn.commit().await?;
        info!(product_id, "product deleted");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<category::Model>, ShopError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn create_category(&self, name: &str) -> Result<category::Model, ShopError> {
        if name.trim().is_empty() {
            return Err(ShopError::Validation("category name must not be empty".to_string()));
        }
        Ok(category::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        }
        .insert(&self.db)
        .await?)
    }

    async fn delete_category(&self, category_id: ModelId) -> Result<(), ShopError> {
        let txn = self.db.begin().await?;

        product::Entity::update_many()
            .col_expr(product::Column::CategoryId, Expr::value(Option::<i64>::None))
            .filter(product::Column::CategoryId.eq(category_id))
            .exec(&txn)
            .await?;

        let result = category::Entity::delete_by_id(category_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ShopError::CategoryNotFound(category_id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn list_reviews(&self, product_id: ModelId) -> Result<Vec<review::Model>, ShopError> {
        Ok(review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn add_review(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
        rating: i32,
        comment: Option<String>,
    ) -> Result<review::Model, ShopError> {
        if !(1..=5).contains(&rating) {
            return Err(ShopError::Validation("rating must be between 1 and 5".to_string()));
        }
        product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))?;

        Ok(review::ActiveModel {
            id: NotSet,
            product_id: Set(Some(product_id)),
            customer_id: Set(Some(customer_id)),
            rating: Set(rating),
            comment: Set(comment),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await?)
    }

    async fn customer_reviews(
        &self,
        customer_id: ModelId,
    ) -> Result<Vec<review::Model>, ShopError> {
        Ok(review::Entity::find()
            .filter(review::Column::CustomerId.eq(customer_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl IdentityStorage for ShopStorage {
    async fn register(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(customer::Model, String), ShopError> {
        if username.trim().is_empty() {
            return Err(ShopError::Validation("username must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(ShopError::Validation("invalid email address".to_string()));
        }

        let existing = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ShopError::AlreadyExists("email already registered".to_string()));
        }

        let created = customer::ActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            is_admin: Set(false),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await?;

        let token = self.issue_token(created.id).await?;
        info!(customer_id = created.id, "customer registered");
        Ok((created, token))
    }

    async fn login(&self, email: &str) -> Result<(customer::Model, String), ShopError> {
        let customer = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(ShopError::UnknownCustomer)?;

        // Reuse the existing token when one was already issued.
        let token = match auth_token::Entity::find()
            .filter(auth_token::Column::CustomerId.eq(customer.id))
            .one(&self.db)
            .await?
        {
            Some(existing) => existing.token,
            None => self.issue_token(customer.id).await?,
        };

        debug!(customer_id = customer.id, "customer logged in");
        Ok((customer, token))
    }

    async fn resolve_token(&self, token: &str) -> Result<Principal, ShopError> {
        let row = auth_token::Entity::find()
            .filter(auth_token::Column::Token.eq(token))
            .find_also_related(customer::Entity)
            .one(&self.db)
            .await?;

        match row {
            Some((_, Some(customer))) => Ok(Principal {
                customer_id: customer.id,
                is_admin: customer.is_admin,
            }),
            _ => Err(ShopError::Unauthorized),
        }
    }
}

impl ShopStorage {
    async fn issue_token(&self, customer_id: ModelId) -> Result<String, ShopError> {
        let token = Uuid::new_v4().to_string();
        auth_token::ActiveModel {
            id: NotSet,
            token: Set(token.clone()),
            customer_id: Set(customer_id),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await?;
        Ok(token)
    }
}

#[async_trait]
impl WishlistStorage for ShopStorage {
    async fn list_wishlist(&self, customer_id: ModelId) -> Result<Vec<WishlistLine>, ShopError> {
        let rows = wishlist::Entity::find()
            .filter(wishlist::Column::CustomerId.eq(customer_id))
            .order_by_asc(wishlist::Column::Id)
            .find_also_related(product::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(entry, product)| WishlistLine {
                product_id: entry.product_id,
                product_name: product.map(|p| p.name),
            })
            .collect())
    }

    async fn add_to_wishlist(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<WishlistLine, ShopError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .ok_or(ShopError::ProductNotFound(product_id))?;

        let existing = wishlist::Entity::find()
            .filter(wishlist::Column::CustomerId.eq(customer_id))
            .filter(wishlist::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ShopError::AlreadyExists("product already in wishlist".to_string()));
        }

        wishlist::ActiveModel {
            id: NotSet,
            customer_id: Set(Some(customer_id)),
            product_id: Set(Some(product_id)),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await?;

        Ok(WishlistLine {
            product_id: Some(product_id),
            product_name: Some(product.name),
        })
    }

    async fn remove_from_wishlist(
        &self,
        customer_id: ModelId,
        product_id: ModelId,
    ) -> Result<(), ShopError> {
        let result = wishlist::Entity::delete_many()
            .filter(wishlist::Column::CustomerId.eq(customer_id))
            .filter(wishlist::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ShopError::Validation("product not in wishlist".to_string()));
        }
        Ok(())
    }
}
