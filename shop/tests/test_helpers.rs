//! Shared setup for the shop test suites: an isolated in-memory database
//! per test plus row factories for customers and products.

#![allow(dead_code)]

use common::test_helpers::{generate_unique_id, get_test_in_memory_database_url};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, NotSet, Set};
use shop::entities::{customer, product};
use shop::error::GenericError;
use shop::model::Principal;
use shop::store::ShopStorage;

/// Fresh storage over an in-memory SQLite database with the schema applied.
///
/// The pool is pinned to a single connection so every statement sees the
/// same in-memory database.
pub async fn setup_storage() -> Result<ShopStorage, GenericError> {
    let mut options = ConnectOptions::new(get_test_in_memory_database_url());
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options).await?;
    let storage = ShopStorage::from_connection(db);
    storage.initialize_schema().await?;
    Ok(storage)
}

pub async fn create_customer(
    storage: &ShopStorage,
    is_admin: bool,
) -> Result<customer::Model, GenericError> {
    let username = generate_unique_id("shopper");
    let created = customer::ActiveModel {
        id: NotSet,
        username: Set(username.clone()),
        email: Set(format!("{username}@example.com")),
        is_admin: Set(is_admin),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&storage.db)
    .await?;
    Ok(created)
}

/// Insert a product priced in cents (1000 => 10.00).
pub async fn create_product(
    storage: &ShopStorage,
    name: &str,
    price_cents: i64,
) -> Result<product::Model, GenericError> {
    let created = product::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        price: Set(Decimal::new(price_cents, 2)),
        category_id: Set(None),
        description: Set(None),
        available_quantity: Set(100),
        created_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&storage.db)
    .await?;
    Ok(created)
}

pub fn principal_for(customer: &customer::Model) -> Principal {
    Principal {
        customer_id: customer.id,
        is_admin: customer.is_admin,
    }
}
