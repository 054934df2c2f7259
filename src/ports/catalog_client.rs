//! Catalog Client Port - Read-only access to the external catalog.
//!
//! Sessions store only ids and snapshots; everything else is fetched
//! through this port when a scene needs it.

use async_trait::async_trait;

use crate::domain::catalog::{Branch, Category, City, Product};
use crate::domain::foundation::{BranchId, CategoryId, CityId, ProductId};

/// Errors returned by catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected catalog response: {0}")]
    InvalidResponse(String),
}

/// Port for fetching catalog entities.
///
/// Fetch-by-id returns `Ok(None)` for unknown ids.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn city(&self, id: CityId) -> Result<Option<City>, CatalogError>;

    async fn branches(&self, city_id: CityId) -> Result<Vec<Branch>, CatalogError>;

    async fn branch(&self, id: BranchId) -> Result<Option<Branch>, CatalogError>;

    /// Categories available in a city.
    async fn categories(&self, city_id: CityId) -> Result<Vec<Category>, CatalogError>;

    async fn category(&self, id: CategoryId) -> Result<Option<Category>, CatalogError>;

    async fn products(&self, category_id: CategoryId) -> Result<Vec<Product>, CatalogError>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;
}
