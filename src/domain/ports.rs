use std::sync::Arc;

use uuid::Uuid;

use super::catalog::{Category, Product, ProductFields};
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderStatus};

/// Durable order records. Each call is a single insert, read or update;
/// atomicity of that one operation is the store's responsibility.
pub trait OrderRepository: Send + Sync + 'static {
    /// Persists a new order, assigning its storage id and creation time.
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError>;
    /// All orders, most recently created first.
    fn list_all(&self) -> Result<Vec<Order>, DomainError>;
    fn get_by_public_id(&self, order_id: &str) -> Result<Option<Order>, DomainError>;
    /// Sets the status and stamps `updated_at`.
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    fn insert_product(&self, product: ProductFields) -> Result<Product, DomainError>;
    fn update_product(&self, id: Uuid, product: ProductFields) -> Result<Product, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<(), DomainError>;
    fn count_products_in_category(&self, category_id: &str) -> Result<i64, DomainError>;

    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn insert_category(&self, category: Category) -> Result<Category, DomainError>;
    fn delete_category(&self, id: &str) -> Result<(), DomainError>;
}

/// Admin credential check.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<R: OrderRepository + ?Sized> OrderRepository for Arc<R> {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).insert(order)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        (**self).list_all()
    }

    fn get_by_public_id(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
        (**self).get_by_public_id(order_id)
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        (**self).update_status(id, status)
    }
}

impl<R: CatalogRepository + ?Sized> CatalogRepository for Arc<R> {
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        (**self).list_products()
    }

    fn insert_product(&self, product: ProductFields) -> Result<Product, DomainError> {
        (**self).insert_product(product)
    }

    fn update_product(&self, id: Uuid, product: ProductFields) -> Result<Product, DomainError> {
        (**self).update_product(id, product)
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete_product(id)
    }

    fn count_products_in_category(&self, category_id: &str) -> Result<i64, DomainError> {
        (**self).count_products_in_category(category_id)
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        (**self).list_categories()
    }

    fn insert_category(&self, category: Category) -> Result<Category, DomainError> {
        (**self).insert_category(category)
    }

    fn delete_category(&self, id: &str) -> Result<(), DomainError> {
        (**self).delete_category(id)
    }
}
