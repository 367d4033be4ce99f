use uuid::Uuid;

use crate::domain::catalog::{Category, CategoryInput, Product, ProductInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list_products()
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories()
    }

    pub fn add_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let fields = input.into_fields()?;
        self.ensure_category_exists(&fields.category)?;
        let product = self.repo.insert_product(fields)?;
        log::info!("Product {} added to '{}'", product.id, product.category);
        Ok(product)
    }

    pub fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        let fields = input.into_fields()?;
        self.ensure_category_exists(&fields.category)?;
        let product = self.repo.update_product(id, fields)?;
        log::info!("Product {} updated", product.id);
        Ok(product)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_product(id)?;
        log::info!("Product {id} deleted");
        Ok(())
    }

    pub fn add_category(&self, input: CategoryInput) -> Result<Category, DomainError> {
        let category = input.into_category()?;
        let category = self.repo.insert_category(category)?;
        log::info!("Category '{}' added", category.id);
        Ok(category)
    }

    /// Refuses while any product still belongs to the category.
    pub fn delete_category(&self, id: &str) -> Result<(), DomainError> {
        let in_use = self.repo.count_products_in_category(id)?;
        if in_use > 0 {
            return Err(DomainError::Conflict(format!(
                "category '{id}' still has {in_use} product(s)"
            )));
        }
        self.repo.delete_category(id)?;
        log::info!("Category '{id}' deleted");
        Ok(())
    }

    fn ensure_category_exists(&self, id: &str) -> Result<(), DomainError> {
        if self.repo.list_categories()?.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!("unknown category '{id}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::local_store::LocalCatalogRepository;

    fn service() -> CatalogService<LocalCatalogRepository> {
        CatalogService::new(LocalCatalogRepository::in_memory())
    }

    fn teddy() -> ProductInput {
        ProductInput {
            name: "Soft Plush Teddy Bear".to_string(),
            category: "toys".to_string(),
            price: 549,
            original_price: Some(749),
            image: "https://img.example/teddy.jpg".to_string(),
            description: Some("Super soft".to_string()),
            badge: Some("Sale".to_string()),
            quantity: Some(30),
        }
    }

    #[test]
    fn starts_with_default_categories() {
        let ids: Vec<String> = service()
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["babycare", "clothes", "diapers", "toys"]);
    }

    #[test]
    fn add_update_delete_product() {
        let svc = service();
        let product = svc.add_product(teddy()).unwrap();
        assert_eq!(product.original_price, 749);

        let mut change = teddy();
        change.price = 499;
        change.quantity = Some(12);
        let updated = svc.update_product(product.id, change).unwrap();
        assert_eq!(updated.price, 499);
        assert_eq!(updated.quantity, 12);
        assert_eq!(updated.created_at, product.created_at);

        svc.delete_product(product.id).unwrap();
        assert!(svc.list_products().unwrap().is_empty());
        assert!(matches!(
            svc.delete_product(product.id),
            Err(DomainError::NotFound)
        ));
    }

    #[test]
    fn product_needs_known_category() {
        let mut input = teddy();
        input.category = "gadgets".to_string();
        assert!(matches!(
            service().add_product(input),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn category_in_use_cannot_be_deleted() {
        let svc = service();
        let product = svc.add_product(teddy()).unwrap();
        assert!(matches!(
            svc.delete_category("toys"),
            Err(DomainError::Conflict(_))
        ));
        svc.delete_product(product.id).unwrap();
        svc.delete_category("toys").unwrap();
        assert!(!svc
            .list_categories()
            .unwrap()
            .iter()
            .any(|c| c.id == "toys"));
    }

    #[test]
    fn duplicate_category_conflicts() {
        let svc = service();
        let err = svc
            .add_category(CategoryInput {
                id: None,
                name: "Toys".to_string(),
                icon: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
