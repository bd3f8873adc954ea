//! Sample catalog used to bootstrap an empty store.

use tracing::info;

use crate::{CatalogStore, NewProduct, ProductId, Result};

/// Returns the sample product set.
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct::new("Noise-cancelling Headphones", 129.99)
            .description("Immersive sound")
            .category("audio")
            .attribute("battery", "30h"),
        NewProduct::new("Mechanical Keyboard", 79.99)
            .description("Tactile keys")
            .category("peripherals")
            .attribute("switch", "blue"),
        NewProduct::new("Smart Watch", 199.99)
            .description("Health & notifications")
            .category("wearables")
            .attribute("waterproof", true),
        NewProduct::new("4K Monitor", 349.99)
            .description("Ultra HD display")
            .category("display")
            .attribute("size", "27-inch"),
        NewProduct::new("Wireless Mouse", 39.99)
            .description("Ergonomic design")
            .category("peripherals")
            .attribute("dpi", 16000),
        NewProduct::new("Bluetooth Speaker", 59.99)
            .description("Portable and powerful")
            .category("audio")
            .attribute("battery", "12h"),
        NewProduct::new("Gaming Laptop", 1499.99)
            .description("High performance for gamers")
            .category("computers")
            .attribute("gpu", "RTX 4070"),
        NewProduct::new("External SSD", 119.99)
            .description("Fast data transfer")
            .category("storage")
            .attribute("capacity", "1TB"),
        NewProduct::new("Smartphone Gimbal", 89.99)
            .description("Stabilized video capture")
            .category("accessories")
            .attribute("axis", "3-axis"),
        NewProduct::new("VR Headset", 299.99)
            .description("Immersive virtual experience")
            .category("gaming")
            .attribute("resolution", "2160x1200"),
        NewProduct::new("Action Camera", 249.99)
            .description("Capture adventures")
            .category("cameras")
            .attribute("waterproof", true),
        NewProduct::new("Smart Light Bulb", 24.99)
            .description("Color-changing LED")
            .category("smart home")
            .attribute("connectivity", "Wi-Fi"),
        NewProduct::new("Portable Projector", 229.99)
            .description("Compact HD projection")
            .category("entertainment")
            .attribute("brightness", "600 ANSI lumens"),
    ]
}

/// Inserts the sample products when the catalog is empty.
///
/// Returns the ids of the inserted products; an already populated catalog
/// is left alone and yields an empty list.
pub async fn seed_if_empty<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<ProductId>> {
    if !store.list_products().await?.is_empty() {
        info!("Catalog already populated, skipping seed");
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for product in sample_products() {
        ids.push(store.insert_product(product).await?);
    }

    info!(count = ids.len(), "Seeded sample catalog");
    Ok(ids)
}
