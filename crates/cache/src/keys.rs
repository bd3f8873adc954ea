//! Key layout shared by every cache backend.

use common::ProductId;

/// Sorted set ranking products by view score.
pub const TOP_PRODUCTS: &str = "leaderboard:top_products";

/// Key holding the serialized snapshot of a product.
pub fn product_snapshot(id: &ProductId) -> String {
    format!("product:cache:{id}")
}

/// Key holding the view counter of a product.
pub fn product_views(id: &ProductId) -> String {
    format!("counter:product:views:{id}")
}
