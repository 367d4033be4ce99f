use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

pub const DEFAULT_CATEGORY_ICON: &str = "📦";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub image: String,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub quantity: Option<i32>,
}

/// Product fields after defaults are applied, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub original_price: i64,
    pub image: String,
    pub description: String,
    pub badge: Option<String>,
    pub quantity: i32,
}

impl ProductInput {
    pub fn into_fields(self) -> Result<ProductFields, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("product name is required".into()));
        }
        if self.price < 0 {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        let quantity = self.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(DomainError::InvalidInput("quantity must not be negative".into()));
        }
        Ok(ProductFields {
            name,
            category: self.category,
            price: self.price,
            original_price: self.original_price.unwrap_or(self.price),
            image: self.image,
            description: self.description.unwrap_or_default(),
            badge: self.badge.filter(|b| !b.trim().is_empty()),
            quantity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub id: Option<String>,
    pub name: String,
    pub icon: Option<String>,
}

impl CategoryInput {
    pub fn into_category(self) -> Result<Category, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("category name is required".into()));
        }
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| category_slug(&name));
        Ok(Category {
            id,
            name,
            icon: self
                .icon
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        })
    }
}

/// "Baby Care" -> "babycare".
pub fn category_slug(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn default_categories() -> Vec<Category> {
    [
        ("toys", "Toys", "🧸"),
        ("diapers", "Diapers", "👶"),
        ("clothes", "Clothes", "👗"),
        ("babycare", "Baby Care", "🍼"),
    ]
    .into_iter()
    .map(|(id, name, icon)| Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}
