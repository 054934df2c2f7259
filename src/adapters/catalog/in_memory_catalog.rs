//! In-Memory Catalog Adapter
//!
//! Serves a fixed catalog from memory. `demo()` provides a small catalog
//! for running the service without the external catalog API.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::catalog::{Branch, Category, City, Product};
use crate::domain::foundation::{BranchId, CategoryId, CityId, ProductId};
use crate::ports::{CatalogClient, CatalogError};

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cities: Vec<City>,
    branches: Vec<Branch>,
    /// Categories with the cities they are offered in.
    categories: Vec<(Category, Vec<CityId>)>,
    products: Vec<Product>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: City) -> Self {
        self.cities.push(city);
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Adds a category offered in `cities`.
    pub fn with_category(mut self, category: Category, cities: Vec<CityId>) -> Self {
        self.categories.push((category, cities));
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Simulate an outage: every call fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("catalog outage".to_string()));
        }
        Ok(())
    }

    /// A small two-city catalog.
    pub fn demo() -> Self {
        let tashkent = CityId(1);
        let samarkand = CityId(2);
        let mains = CategoryId(1);
        let drinks = CategoryId(2);

        let product = |id: i64, category_id: CategoryId, name: &str, price: i64| Product {
            id: ProductId(id),
            category_id,
            name: name.to_string(),
            price,
            description: None,
            image_url: None,
        };

        Self::new()
            .with_city(City {
                id: tashkent,
                name: "Tashkent".to_string(),
            })
            .with_city(City {
                id: samarkand,
                name: "Samarkand".to_string(),
            })
            .with_branch(Branch {
                id: BranchId(1),
                city_id: tashkent,
                name: "Chilanzar".to_string(),
                address: Some("Bunyodkor 7".to_string()),
                is_open: true,
            })
            .with_branch(Branch {
                id: BranchId(2),
                city_id: tashkent,
                name: "Yunusabad".to_string(),
                address: Some("Amir Temur 108".to_string()),
                is_open: false,
            })
            .with_branch(Branch {
                id: BranchId(3),
                city_id: samarkand,
                name: "Registan".to_string(),
                address: None,
                is_open: true,
            })
            .with_category(
                Category {
                    id: mains,
                    name: "Mains".to_string(),
                    description: Some("Hot dishes".to_string()),
                    image_url: None,
                },
                vec![tashkent, samarkand],
            )
            .with_category(
                Category {
                    id: drinks,
                    name: "Drinks".to_string(),
                    description: None,
                    image_url: None,
                },
                vec![tashkent],
            )
            .with_product(product(1, mains, "Plov", 25_000))
            .with_product(product(2, mains, "Lagman", 22_000))
            .with_product(product(3, mains, "Manti", 18_000))
            .with_product(product(4, drinks, "Green tea", 5_000))
            .with_product(product(5, drinks, "Ayran", 7_000))
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn city(&self, id: CityId) -> Result<Option<City>, CatalogError> {
        self.check_available()?;
        Ok(self.cities.iter().find(|city| city.id == id).cloned())
    }

    async fn branches(&self, city_id: CityId) -> Result<Vec<Branch>, CatalogError> {
        self.check_available()?;
        Ok(self
            .branches
            .iter()
            .filter(|branch| branch.city_id == city_id)
            .cloned()
            .collect())
    }

    async fn branch(&self, id: BranchId) -> Result<Option<Branch>, CatalogError> {
        self.check_available()?;
        Ok(self.branches.iter().find(|branch| branch.id == id).cloned())
    }

    async fn categories(&self, city_id: CityId) -> Result<Vec<Category>, CatalogError> {
        self.check_available()?;
        Ok(self
            .categories
            .iter()
            .filter(|(_, cities)| cities.contains(&city_id))
            .map(|(category, _)| category.clone())
            .collect())
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, CatalogError> {
        self.check_available()?;
        Ok(self
            .categories
            .iter()
            .map(|(category, _)| category)
            .find(|category| category.id == id)
            .cloned())
    }

    async fn products(&self, category_id: CategoryId) -> Result<Vec<Product>, CatalogError> {
        self.check_available()?;
        Ok(self
            .products
            .iter()
            .filter(|product| product.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        self.check_available()?;
        Ok(self.products.iter().find(|product| product.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn branches_are_scoped_to_city() {
        let catalog = InMemoryCatalog::demo();

        let branches = catalog.branches(CityId(1)).await.unwrap();

        assert_eq!(branches.len(), 2);
        assert!(branches.iter().all(|branch| branch.city_id == CityId(1)));
    }

    #[tokio::test]
    async fn categories_are_scoped_to_city() {
        let catalog = InMemoryCatalog::demo();

        assert_eq!(catalog.categories(CityId(1)).await.unwrap().len(), 2);
        assert_eq!(catalog.categories(CityId(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let catalog = InMemoryCatalog::demo();
        assert!(catalog.product(ProductId(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let catalog = InMemoryCatalog::demo();
        catalog.set_unavailable(true);

        let result = catalog.city(CityId(1)).await;

        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }
}
