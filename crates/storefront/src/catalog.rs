//! Product catalog loaded from a JSON file at startup.
//!
//! The catalog is read-only for the lifetime of the process. It is the only
//! source of names and prices for line items, so a visitor cannot put an
//! arbitrary price into their cart.

use std::collections::HashMap;
use std::path::Path;

use panier_core::{CartLineItem, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

impl Product {
    /// A line item for this product.
    #[must_use]
    pub fn line_item(&self, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            quantity,
            image: self.image.clone(),
        }
    }
}

/// All products on offer, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from products.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids or negative prices.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(product.id));
            }
            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products, index })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the products are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::from_products(products)
    }

    /// Load the catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).and_then(|&i| self.products.get(i))
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "Silk scarf", "price": "100", "image": "/static/img/scarf.jpg"},
        {"id": 2, "name": "Leather belt", "price": "50.5", "image": "/static/img/belt.jpg"}
    ]"#;

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        let belt = catalog.get(ProductId::new(2)).unwrap();
        assert_eq!(belt.name, "Leather belt");
        assert_eq!(belt.price, Decimal::new(505, 1));
        assert!(catalog.get(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_numeric_prices_accepted() {
        let json = r#"[{"id": 1, "name": "Cap", "price": 12.5, "image": ""}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.get(ProductId::new(1)).unwrap().price, Decimal::new(125, 1));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": 1, "name": "A", "price": "1", "image": ""},
            {"id": 1, "name": "B", "price": "2", "image": ""}
        ]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"[{"id": 1, "name": "A", "price": "-1", "image": ""}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_line_item_copies_catalog_data() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let item = catalog.get(ProductId::new(1)).unwrap().line_item(3);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price, Decimal::new(100, 0));
        assert_eq!(item.image, "/static/img/scarf.jpg");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
