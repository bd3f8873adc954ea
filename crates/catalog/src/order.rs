//! Order documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{OrderId, ProductId};

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: u32,
}

impl OrderLine {
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// An order submitted for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderLine>,
    pub total: f64,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl NewOrder {
    pub fn new(user_id: impl Into<String>, items: Vec<OrderLine>, total: f64) -> Self {
        Self {
            user_id: user_id.into(),
            items,
            total,
            session_id: None,
        }
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::UserIdRequired);
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if let Some(line) = self.items.iter().find(|line| line.qty == 0) {
            return Err(ValidationError::InvalidQuantity {
                product_id: line.product_id.to_string(),
                quantity: line.qty,
            });
        }
        if !self.total.is_finite() || self.total < 0.0 {
            return Err(ValidationError::InvalidTotal { total: self.total });
        }
        Ok(())
    }

    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            total: self.total,
            session_id: self.session_id,
            created_at,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<OrderLine>,
    pub total: f64,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
