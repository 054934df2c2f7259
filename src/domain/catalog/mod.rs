//! Catalog entities and the snapshots a session keeps of them.
//!
//! Catalog data is owned by the external catalog service. Sessions never
//! persist full entities as identity-critical data: they keep `{id, name,
//! price}` snapshots, plus optional refetchable details and listings that
//! compaction is free to drop.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BranchId, CategoryId, CityId, ProductId};

/// A city the service delivers in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

/// A branch (kitchen / pickup point) inside a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub city_id: CityId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_open")]
    pub is_open: bool,
}

fn default_open() -> bool {
    true
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A product as listed by the catalog. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Refetchable product details carried alongside a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Snapshot of a product taken when the user selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
}

impl ProductSnapshot {
    /// Creates a bare `{id, name, price}` snapshot.
    pub fn new(id: ProductId, name: impl Into<String>, price: i64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            details: None,
        }
    }

    /// Returns the snapshot reduced to `{id, name, price}`.
    pub fn demoted(&self) -> Self {
        Self::new(self.id, self.name.clone(), self.price)
    }

    /// True if the snapshot carries details beyond `{id, name, price}`.
    pub fn is_detailed(&self) -> bool {
        self.details.is_some()
    }
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            details: Some(ProductDetails {
                category_id: product.category_id,
                description: product.description.clone(),
                image_url: product.image_url.clone(),
            }),
        }
    }
}

/// Refetchable category details carried alongside a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Snapshot of a category taken when the user selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CategoryDetails>,
}

impl CategorySnapshot {
    /// Creates a bare `{id, name}` snapshot.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            details: None,
        }
    }

    /// Returns the snapshot reduced to `{id, name}`.
    pub fn demoted(&self) -> Self {
        Self::new(self.id, self.name.clone())
    }

    pub fn is_detailed(&self) -> bool {
        self.details.is_some()
    }
}

impl From<&Category> for CategorySnapshot {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            details: Some(CategoryDetails {
                description: category.description.clone(),
                image_url: category.image_url.clone(),
            }),
        }
    }
}

/// Snapshot of the branch chosen for pickup or delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSnapshot {
    pub id: BranchId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&Branch> for BranchSnapshot {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            address: branch.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plov() -> Product {
        Product {
            id: ProductId(5),
            category_id: CategoryId(1),
            name: "Plov".to_string(),
            price: 25_000,
            description: Some("Rice with lamb".to_string()),
            image_url: Some("https://cdn.example.com/plov.jpg".to_string()),
        }
    }

    #[test]
    fn product_snapshot_keeps_details_from_catalog() {
        let snapshot = ProductSnapshot::from(&plov());
        assert!(snapshot.is_detailed());
        assert_eq!(snapshot.price, 25_000);
    }

    #[test]
    fn demoted_product_snapshot_keeps_identity_and_price() {
        let demoted = ProductSnapshot::from(&plov()).demoted();
        assert_eq!(demoted, ProductSnapshot::new(ProductId(5), "Plov", 25_000));
        assert!(!demoted.is_detailed());
    }

    #[test]
    fn demoted_snapshot_omits_details_when_serialized() {
        let json = serde_json::to_value(ProductSnapshot::from(&plov()).demoted()).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn category_snapshot_demotes_to_id_and_name() {
        let category = Category {
            id: CategoryId(1),
            name: "Hot dishes".to_string(),
            description: Some("Fresh from the kazan".to_string()),
            image_url: None,
        };
        let demoted = CategorySnapshot::from(&category).demoted();
        assert_eq!(demoted, CategorySnapshot::new(CategoryId(1), "Hot dishes"));
    }

    #[test]
    fn branch_defaults_to_open_when_flag_missing() {
        let branch: Branch =
            serde_json::from_str(r#"{"id": 3, "city_id": 1, "name": "Chilanzar"}"#).unwrap();
        assert!(branch.is_open);
        assert_eq!(branch.address, None);
    }
}
