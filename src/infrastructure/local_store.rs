//! Process-local stores, optionally mirrored to JSON files on disk.
//!
//! Every mutation is applied to a copy, written out, and only then swapped
//! in, so a failed write leaves the in-memory view untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::{default_categories, Category, Product, ProductFields};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::{CatalogRepository, OrderRepository};

pub const ORDERS_FILE: &str = "orders.json";
pub const CATALOG_FILE: &str = "catalog.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DomainError::Store(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::Store(format!("{}: {e}", path.display()))),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| DomainError::Store(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| {
            log::error!("Failed to write {}: {e}", path.display());
            DomainError::Store(format!("{}: {e}", path.display()))
        })
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    m.lock()
        .map_err(|_| DomainError::Store("local store lock poisoned".into()))
}

// ── Orders ────────────────────────────────────────────────────────────────────

pub struct LocalOrderRepository {
    orders: Mutex<Vec<Order>>,
    file: Option<PathBuf>,
}

impl LocalOrderRepository {
    pub fn in_memory() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            file: None,
        }
    }

    /// Loads `dir/orders.json` if present; later writes go to the same file.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let file = dir.as_ref().join(ORDERS_FILE);
        let orders: Vec<Order> = read_json(&file)?.unwrap_or_default();
        for order in &orders {
            order.validate().inspect_err(|e| {
                log::error!("Rejecting {}: {e}", file.display());
            })?;
        }
        log::info!("Loaded {} order(s) from {}", orders.len(), file.display());
        Ok(Self {
            orders: Mutex::new(orders),
            file: Some(file),
        })
    }

    fn commit(&self, guard: &mut Vec<Order>, next: Vec<Order>) -> Result<(), DomainError> {
        if let Some(file) = &self.file {
            write_json(file, &next)?;
        }
        *guard = next;
        Ok(())
    }
}

impl OrderRepository for LocalOrderRepository {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut guard = lock(&self.orders)?;
        if guard.iter().any(|o| o.order_id == order.order_id) {
            return Err(DomainError::DuplicateOrderId);
        }
        let stored = Order {
            id: Uuid::new_v4(),
            order_id: order.order_id,
            customer: order.customer,
            items: order.items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            status: order.status,
            created_at: Utc::now(),
            updated_at: None,
        };
        stored.validate()?;
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(stored.clone());
        next.extend(guard.iter().cloned());
        self.commit(&mut guard, next)?;
        Ok(stored)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)?.clone())
    }

    fn get_by_public_id(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.orders)?
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let mut guard = lock(&self.orders)?;
        let idx = guard
            .iter()
            .position(|o| o.id == id)
            .ok_or(DomainError::UnknownOrder)?;
        let mut next = guard.clone();
        next[idx].status = status;
        next[idx].updated_at = Some(Utc::now());
        let updated = next[idx].clone();
        self.commit(&mut guard, next)?;
        Ok(updated)
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: default_categories(),
        }
    }
}

pub struct LocalCatalogRepository {
    data: Mutex<CatalogData>,
    file: Option<PathBuf>,
}

impl LocalCatalogRepository {
    /// Memory-only catalog seeded with the default categories.
    pub fn in_memory() -> Self {
        Self {
            data: Mutex::new(CatalogData::default()),
            file: None,
        }
    }

    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let file = dir.as_ref().join(CATALOG_FILE);
        let data: CatalogData = read_json(&file)?.unwrap_or_default();
        Ok(Self {
            data: Mutex::new(data),
            file: Some(file),
        })
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut CatalogData) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut guard = lock(&self.data)?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if let Some(file) = &self.file {
            write_json(file, &next)?;
        }
        *guard = next;
        Ok(out)
    }
}

impl CatalogRepository for LocalCatalogRepository {
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(lock(&self.data)?.products.clone())
    }

    fn insert_product(&self, fields: ProductFields) -> Result<Product, DomainError> {
        self.mutate(|data| {
            let product = Product {
                id: Uuid::new_v4(),
                name: fields.name,
                category: fields.category,
                price: fields.price,
                original_price: fields.original_price,
                image: fields.image,
                description: fields.description,
                badge: fields.badge,
                quantity: fields.quantity,
                created_at: Utc::now(),
            };
            data.products.insert(0, product.clone());
            Ok(product)
        })
    }

    fn update_product(&self, id: Uuid, fields: ProductFields) -> Result<Product, DomainError> {
        self.mutate(|data| {
            let product = data
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(DomainError::NotFound)?;
            product.name = fields.name;
            product.category = fields.category;
            product.price = fields.price;
            product.original_price = fields.original_price;
            product.image = fields.image;
            product.description = fields.description;
            product.badge = fields.badge;
            product.quantity = fields.quantity;
            Ok(product.clone())
        })
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.mutate(|data| {
            let before = data.products.len();
            data.products.retain(|p| p.id != id);
            if data.products.len() == before {
                return Err(DomainError::NotFound);
            }
            Ok(())
        })
    }

    fn count_products_in_category(&self, category_id: &str) -> Result<i64, DomainError> {
        let count = lock(&self.data)?
            .products
            .iter()
            .filter(|p| p.category == category_id)
            .count();
        Ok(count as i64)
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = lock(&self.data)?.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn insert_category(&self, category: Category) -> Result<Category, DomainError> {
        self.mutate(|data| {
            if data.categories.iter().any(|c| c.id == category.id) {
                return Err(DomainError::Conflict(format!(
                    "category '{}' already exists",
                    category.id
                )));
            }
            data.categories.push(category.clone());
            Ok(category)
        })
    }

    fn delete_category(&self, id: &str) -> Result<(), DomainError> {
        self.mutate(|data| {
            let before = data.categories.len();
            data.categories.retain(|c| c.id != id);
            if data.categories.len() == before {
                return Err(DomainError::NotFound);
            }
            Ok(())
        })
    }
}
