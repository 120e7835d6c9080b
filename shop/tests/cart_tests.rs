use common::test_helpers::TestResult;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use shop::entities::cart_item;
use shop::error::ShopError;
use shop::storage::CartStorage;
use shop::store::ShopStorage;

mod test_helpers;

async fn cart_row_count(storage: &ShopStorage, customer_id: i64) -> Result<u64, ShopError> {
    Ok(cart_item::Entity::find()
        .filter(cart_item::Column::CustomerId.eq(customer_id))
        .count(&storage.db)
        .await?)
}

#[tokio::test]
async fn add_merges_into_a_single_line() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Keyboard", 4999).await?;

    let line = storage.add(customer.id, product.id, 2).await?;
    assert_eq!(line.quantity, 2);

    let line = storage.add(customer.id, product.id, 3).await?;
    assert_eq!(line.quantity, 5);

    assert_eq!(cart_row_count(&storage, customer.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn add_unknown_product_is_rejected() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;

    let err = storage.add(customer.id, 9999, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::ProductNotFound(9999)));
    Ok(())
}

#[tokio::test]
async fn add_rejects_non_positive_quantity() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Mouse", 1999).await?;

    let err = storage.add(customer.id, product.id, 0).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));

    let err = storage.add(customer.id, product.id, -2).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));

    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn increase_bumps_quantity_by_one() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Webcam", 8900).await?;

    storage.add(customer.id, product.id, 1).await?;
    let line = storage.increase(customer.id, product.id).await?.unwrap();
    assert_eq!(line.quantity, 2);
    Ok(())
}

#[tokio::test]
async fn increase_on_missing_line_is_a_noop() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Webcam", 8900).await?;

    assert!(storage.increase(customer.id, product.id).await?.is_none());
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn decrease_above_one_keeps_the_line() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Monitor", 24900).await?;

    storage.add(customer.id, product.id, 3).await?;
    let line = storage.decrease(customer.id, product.id).await?.unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(cart_row_count(&storage, customer.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn decrease_at_one_deletes_the_line() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Monitor", 24900).await?;

    storage.add(customer.id, product.id, 1).await?;
    assert!(storage.decrease(customer.id, product.id).await?.is_none());
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);

    // A further decrease on the now-absent line stays a no-op.
    assert!(storage.decrease(customer.id, product.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn remove_deletes_and_tolerates_absent_lines() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Desk", 39900).await?;

    storage.add(customer.id, product.id, 2).await?;
    storage.remove(customer.id, product.id).await?;
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);

    // Removing again is not an error.
    storage.remove(customer.id, product.id).await?;
    Ok(())
}

#[tokio::test]
async fn set_quantity_sets_an_absolute_amount() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Chair", 12900).await?;

    storage.add(customer.id, product.id, 1).await?;
    let line = storage.set_quantity(customer.id, product.id, 7).await?.unwrap();
    assert_eq!(line.quantity, 7);
    Ok(())
}

#[tokio::test]
async fn set_quantity_zero_deletes_the_line() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Chair", 12900).await?;

    storage.add(customer.id, product.id, 4).await?;
    assert!(storage.set_quantity(customer.id, product.id, 0).await?.is_none());
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn set_quantity_rejects_negative_amounts() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Chair", 12900).await?;

    storage.add(customer.id, product.id, 4).await?;
    let err = storage.set_quantity(customer.id, product.id, -1).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));

    // The line is untouched.
    let view = storage.list(customer.id).await?;
    assert_eq!(view.items[0].quantity, 4);
    Ok(())
}

#[tokio::test]
async fn set_quantity_on_missing_line_is_a_noop() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Chair", 12900).await?;

    assert!(storage.set_quantity(customer.id, product.id, 3).await?.is_none());
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn clear_always_succeeds() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let first = test_helpers::create_product(&storage, "Pen", 300).await?;
    let second = test_helpers::create_product(&storage, "Notebook", 700).await?;

    storage.add(customer.id, first.id, 1).await?;
    storage.add(customer.id, second.id, 2).await?;

    storage.clear(customer.id).await?;
    assert_eq!(cart_row_count(&storage, customer.id).await?, 0);

    // Clearing an already-empty cart is fine too.
    storage.clear(customer.id).await?;
    Ok(())
}

#[tokio::test]
async fn list_computes_line_and_grand_totals() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let customer = test_helpers::create_customer(&storage, false).await?;
    let first = test_helpers::create_product(&storage, "Tea", 1000).await?;
    let second = test_helpers::create_product(&storage, "Coffee", 500).await?;

    storage.add(customer.id, first.id, 2).await?;
    storage.add(customer.id, second.id, 1).await?;

    let view = storage.list(customer.id).await?;
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].line_total, Some(Decimal::new(2000, 2)));
    assert_eq!(view.items[1].line_total, Some(Decimal::new(500, 2)));
    assert_eq!(view.total, Decimal::new(2500, 2));
    Ok(())
}

#[tokio::test]
async fn carts_are_scoped_per_customer() -> TestResult {
    let storage = test_helpers::setup_storage().await?;
    let alice = test_helpers::create_customer(&storage, false).await?;
    let bob = test_helpers::create_customer(&storage, false).await?;
    let product = test_helpers::create_product(&storage, "Lamp", 4500).await?;

    storage.add(alice.id, product.id, 1).await?;
    storage.add(bob.id, product.id, 5).await?;

    let alice_view = storage.list(alice.id).await?;
    let bob_view = storage.list(bob.id).await?;
    assert_eq!(alice_view.items[0].quantity, 1);
    assert_eq!(bob_view.items[0].quantity, 5);
    Ok(())
}
