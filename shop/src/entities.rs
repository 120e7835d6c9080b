use crate::model::OrderStatus;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM Customer Entity
pub mod customer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub username: String,
        #[sea_orm(unique)]
        pub email: String,
        pub is_admin: bool,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::cart_item::Entity")]
        CartItems,
        #[sea_orm(has_many = "super::order::Entity")]
        Orders,
        #[sea_orm(has_many = "super::auth_token::Entity")]
        AuthTokens,
    }

    impl Related<super::cart_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::CartItems.def()
        }
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Orders.def()
        }
    }

    impl Related<super::auth_token::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::AuthTokens.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Auth Token Entity
///
/// Glue for the identity collaborator: maps an opaque bearer token to a
/// customer. Credential verification itself is out of scope.
pub mod auth_token {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "auth_tokens")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub token: String,
        pub customer_id: i64,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "Cascade"
        )]
        Customer,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Category Entity
pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::product::Entity")]
        Products,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Products.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Product Entity
pub mod product {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub price: Decimal,
        pub category_id: Option<i64>,
        pub description: Option<String>,
        pub available_quantity: i32,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::category::Entity",
            from = "Column::CategoryId",
            to = "super::category::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Category,
        #[sea_orm(has_many = "super::review::Entity")]
        Reviews,
        #[sea_orm(has_many = "super::cart_item::Entity")]
        CartItems,
        #[sea_orm(has_many = "super::order_item::Entity")]
        OrderItems,
    }

    impl Related<super::category::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    impl Related<super::review::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Reviews.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Review Entity
pub mod review {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "reviews")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub product_id: Option<i64>,
        pub customer_id: Option<i64>,
        pub rating: i32,
        pub comment: Option<String>,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Product,
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Customer,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Shipping Address Entity
pub mod shipping_address {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "shipping_addresses")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub customer_id: Option<i64>,
        pub address: String,
        pub city: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Customer,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Cart Item Entity
///
/// One line item per (customer, product); uniqueness is enforced by a
/// composite index created in `ShopStorage::initialize_schema`. A stored
/// quantity is always >= 1; decrementing to zero deletes the row.
pub mod cart_item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cart_items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub customer_id: Option<i64>,
        pub product_id: Option<i64>,
        pub quantity: i32,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Product,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Order Entity
///
/// Immutable once items are attached, except for status transitions.
pub mod order {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub customer_id: Option<i64>,
        pub status: OrderStatus,
        pub shipping_address_id: Option<i64>,
        pub transaction_id: Option<String>,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::shipping_address::Entity",
            from = "Column::ShippingAddressId",
            to = "super::shipping_address::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        ShippingAddress,
        #[sea_orm(has_many = "super::order_item::Entity")]
        OrderItems,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::order_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::OrderItems.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Order Item Entity
///
/// Snapshot of (product, quantity) at checkout time. The product price is
/// not copied; totals are recomputed from the live product price on read.
/// Deleting the product or the order nulls the reference instead of
/// deleting the row.
pub mod order_item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "order_items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub order_id: Option<i64>,
        pub product_id: Option<i64>,
        pub quantity: i32,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Order,
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Product,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Wishlist Entity
pub mod wishlist {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "wishlists")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub customer_id: Option<i64>,
        pub product_id: Option<i64>,
        pub created_at: NaiveDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id",
            on_update = "Cascade",
            on_delete = "SetNull"
        )]
        Product,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_item_entity_creation() {
        let line = cart_item::Model {
            id: 1,
            customer_id: Some(7),
            product_id: Some(3),
            quantity: 2,
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };

        assert_eq!(line.quantity, 2);
        assert_eq!(line.product_id, Some(3));
    }

    #[test]
    fn order_entity_creation() {
        let order = order::Model {
            id: 1,
            customer_id: Some(7),
            status: OrderStatus::Created,
            shipping_address_id: None,
            transaction_id: None,
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };

        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.transaction_id.is_none());
    }
}
