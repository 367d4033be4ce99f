use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{Category, Product, ProductFields};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{categories, products};

use super::models::{CategoryRow, NewProductRow, ProductChanges, ProductRow};

fn constraint_error(e: diesel::result::Error) -> DomainError {
    match e {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DomainError::Conflict(info.message().to_string())
        }
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DomainError::Conflict(info.message().to_string())
        }
        other => other.into(),
    }
}

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn insert_product(&self, fields: ProductFields) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow::from_fields(fields))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(constraint_error)?;
        Ok(row.into())
    }

    fn update_product(&self, id: Uuid, fields: ProductFields) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::update(products::table.find(id))
            .set(&ProductChanges::from(fields))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(constraint_error)?;
        row.map(Product::from).ok_or(DomainError::NotFound)
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn count_products_in_category(&self, category_id: &str) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(products::table
            .filter(products::category.eq(category_id))
            .count()
            .get_result(&mut conn)?)
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn insert_category(&self, category: Category) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(categories::table)
            .values(&CategoryRow::from(category))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .map_err(constraint_error)?;
        Ok(row.into())
    }

    fn delete_category(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .map_err(constraint_error)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
