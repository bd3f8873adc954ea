//! Product documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProductId;
use crate::error::ValidationError;

/// A catalog product as read from the authoritative store.
///
/// The id is always a plain string here, whatever the store uses natively,
/// so the whole document serializes without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Absent on documents written without a creation stamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A product submitted for creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl NewProduct {
    /// Creates a product with empty description, category and attributes.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            attributes: Map::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Checks the fields a store would otherwise accept blindly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice { price: self.price });
        }
        Ok(())
    }

    /// Materializes the stored document.
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            attributes: self.attributes,
            created_at: Some(created_at),
        }
    }
}

/// Listing projection of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub category: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
        }
    }
}
