//! MongoDB catalog implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    CatalogError, CatalogStore, NewOrder, NewProduct, OrderId, Product, ProductId, ProductSummary,
    Result,
};

/// Collection names.
const PRODUCTS_COLLECTION: &str = "products";
const ORDERS_COLLECTION: &str = "orders";

/// MongoDB implementation of [`CatalogStore`].
///
/// Products inserted here get an `ObjectId`; documents created elsewhere
/// with string ids are still found by the fallback lookup.
#[derive(Clone)]
pub struct MongoCatalogStore {
    database: Database,
    products: Collection<Document>,
    orders: Collection<Document>,
}

impl MongoCatalogStore {
    /// Creates a catalog on an existing client.
    pub fn new(client: &Client, database_name: &str) -> Self {
        let database = client.database(database_name);
        let products = database.collection(PRODUCTS_COLLECTION);
        let orders = database.collection(ORDERS_COLLECTION);

        Self {
            database,
            products,
            orders,
        }
    }

    /// Connects and verifies the server answers a ping.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!(database = database_name, "Connected to MongoDB");

        Ok(Self::new(&client, database_name))
    }

    /// Get the database reference.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Renders a native document id as a plain string.
pub(crate) fn normalize_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_filter(id: &ProductId) -> Document {
    match ObjectId::parse_str(id.as_str()) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id.as_str() },
    }
}

fn get_string(doc: &Document, key: &str) -> String {
    doc.get_str(key).map(str::to_string).unwrap_or_default()
}

fn get_number(doc: &Document, key: &str) -> f64 {
    match doc.get(key) {
        Some(Bson::Double(v)) => *v,
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        _ => 0.0,
    }
}

fn get_timestamp(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        _ => None,
    }
}

fn get_attributes(doc: &Document) -> Map<String, Value> {
    match doc.get("attributes") {
        Some(bson @ Bson::Document(_)) => match bson.clone().into_relaxed_extjson() {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

fn document_to_product(doc: &Document) -> Result<Product> {
    let id = doc
        .get("_id")
        .map(normalize_id)
        .ok_or_else(|| CatalogError::Malformed("product document without _id".to_string()))?;

    Ok(Product {
        id: ProductId::new(id),
        name: get_string(doc, "name"),
        description: get_string(doc, "description"),
        price: get_number(doc, "price"),
        category: get_string(doc, "category"),
        attributes: get_attributes(doc),
        created_at: get_timestamp(doc, "created_at"),
    })
}

fn to_bson_datetime(ts: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(ts.timestamp_millis())
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    async fn insert_product(&self, product: NewProduct) -> Result<ProductId> {
        product.validate()?;

        let attributes = bson::to_bson(&Value::Object(product.attributes))
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        let doc = doc! {
            "name": product.name,
            "description": product.description,
            "price": product.price,
            "category": product.category,
            "attributes": attributes,
            "created_at": to_bson_datetime(Utc::now()),
        };

        let result = self.products.insert_one(doc).await?;
        Ok(ProductId::new(normalize_id(&result.inserted_id)))
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let found = self.products.find_one(id_filter(id)).await?;
        debug!(product_id = %id, found = found.is_some(), "MongoDB product lookup");

        found.as_ref().map(document_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<ProductSummary>> {
        let options = FindOptions::builder()
            .projection(doc! { "name": 1, "price": 1, "category": 1 })
            .build();

        let mut cursor = self.products.find(doc! {}).with_options(options).await?;

        let mut products = Vec::new();
        while cursor.advance().await? {
            let doc = cursor.deserialize_current()?;
            let product_id = doc
                .get("_id")
                .map(normalize_id)
                .ok_or_else(|| CatalogError::Malformed("product document without _id".into()))?;
            products.push(ProductSummary {
                product_id: ProductId::new(product_id),
                name: get_string(&doc, "name"),
                price: get_number(&doc, "price"),
                category: get_string(&doc, "category"),
            });
        }

        Ok(products)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderId> {
        order.validate()?;

        let items: Vec<Bson> = order
            .items
            .iter()
            .map(|line| {
                Bson::Document(doc! {
                    "product_id": line.product_id.as_str(),
                    "qty": i64::from(line.qty),
                })
            })
            .collect();

        let doc = doc! {
            "user_id": order.user_id,
            "items": items,
            "total": order.total,
            "session_id": order.session_id,
            "created_at": to_bson_datetime(Utc::now()),
        };

        let result = self.orders.insert_one(doc).await?;
        Ok(OrderId::new(normalize_id(&result.inserted_id)))
    }
}
