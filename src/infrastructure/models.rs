use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product, ProductFields};
use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerInfo, NewOrder, Order, OrderItem, OrderStatus};
use crate::schema::{categories, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_pincode: String,
    pub items: Value,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_pincode: String,
    pub items: Value,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub status: String,
    pub notes: Option<String>,
}

impl NewOrderRow {
    pub fn from_domain(order: NewOrder) -> Result<Self, DomainError> {
        let items =
            serde_json::to_value(&order.items).map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(Self {
            id: Uuid::new_v4(),
            order_id: order.order_id,
            customer_name: order.customer.name,
            customer_phone: order.customer.phone,
            customer_email: order.customer.email,
            customer_address: order.customer.address,
            customer_city: order.customer.city,
            customer_pincode: order.customer.pincode,
            items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            status: order.status.to_string(),
            notes: order.customer.notes,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    /// Rows are checked here so a hand-edited record cannot reach callers
    /// with a broken shape.
    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let malformed =
            |what: String| DomainError::Store(format!("malformed order {}: {what}", row.order_id));

        let items: Vec<OrderItem> =
            serde_json::from_value(row.items.clone()).map_err(|e| malformed(e.to_string()))?;
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|_| malformed(row.status.clone()))?;

        let order = Order {
            id: row.id,
            order_id: row.order_id,
            customer: CustomerInfo {
                name: row.customer_name,
                phone: row.customer_phone,
                email: row.customer_email,
                address: row.customer_address,
                city: row.customer_city,
                pincode: row.customer_pincode,
                notes: row.notes,
            },
            items,
            subtotal: row.subtotal,
            shipping: row.shipping,
            total: row.total,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        order.validate()?;
        Ok(order)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub original_price: i64,
    pub image: String,
    pub description: String,
    pub badge: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            original_price: row.original_price,
            image: row.image,
            description: row.description,
            badge: row.badge,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub original_price: i64,
    pub image: String,
    pub description: String,
    pub badge: Option<String>,
    pub quantity: i32,
}

impl NewProductRow {
    pub fn from_fields(f: ProductFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: f.name,
            category: f.category,
            price: f.price,
            original_price: f.original_price,
            image: f.image,
            description: f.description,
            badge: f.badge,
            quantity: f.quantity,
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChanges {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub original_price: i64,
    pub image: String,
    pub description: String,
    pub badge: Option<String>,
    pub quantity: i32,
}

impl From<ProductFields> for ProductChanges {
    fn from(f: ProductFields) -> Self {
        Self {
            name: f.name,
            category: f.category,
            price: f.price,
            original_price: f.original_price,
            image: f.image,
            description: f.description,
            badge: f.badge,
            quantity: f.quantity,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub icon: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            icon: row.icon,
        }
    }
}

impl From<Category> for CategoryRow {
    fn from(c: Category) -> Self {
        CategoryRow {
            id: c.id,
            name: c.name,
            icon: c.icon,
        }
    }
}
