// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store client with typed operations.
//!
//! Provides high-level operations for:
//! - Genres, products and license keys (admin catalog)
//! - Orders (one-shot reads and live subscriptions)
//! - Carts (per-user `users/{uid}/cart` sub-collections)
//!
//! Every read attaches the document ID to the returned [`Record`].

use crate::db::{collections, generate_document_id, CollectionPath, MemoryStore};
use crate::error::AppError;
use crate::models::{Achievement, CartItem, Genre, LicenseKey, Order, OrderItem, Product, Record};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Transactions that lose a write conflict are retried this many times.
const MAX_TRANSACTION_ATTEMPTS: usize = 5;
const LIVE_QUERY_TARGET_ID: u32 = 1;

#[derive(Clone)]
enum Backend {
    Remote(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
}

/// Document database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

/// Body of a key update: only the key string is written.
#[derive(Serialize, Deserialize)]
struct KeyUpdate {
    key: String,
}

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Full parent path for a collection, as the Firestore API expects it.
fn parent_path(client: &firestore::FirestoreDb, path: &CollectionPath) -> String {
    match path.parent() {
        Some((collection, id)) => {
            format!("{}/{}/{}", client.get_documents_path(), collection, id)
        }
        None => client.get_documents_path().to_string(),
    }
}

fn record_from_doc<T: DeserializeOwned>(
    doc: &firestore::FirestoreDocument,
) -> Result<Record<T>, AppError> {
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
    let data = firestore::FirestoreDb::deserialize_doc_to::<T>(doc)
        .map_err(|e| AppError::Database(format!("Malformed document {}: {}", id, e)))?;
    Ok(Record::new(id, data))
}

fn record_from_value<T: DeserializeOwned>(
    (id, value): (String, Value),
) -> Result<Record<T>, AppError> {
    let data = serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Malformed document {}: {}", id, e)))?;
    Ok(Record::new(id, data))
}

fn to_value<T: Serialize>(data: &T) -> Result<Value, AppError> {
    serde_json::to_value(data).map_err(|e| AppError::Internal(e.into()))
}

/// Source of "something changed" signals for a live query.
enum ChangeFeed {
    Remote(
        firestore::FirestoreListener<firestore::FirestoreDb, firestore::FirestoreMemListenStateStorage>,
    ),
    Memory(tokio::task::JoinHandle<()>),
}

impl ChangeFeed {
    async fn stop(self) {
        match self {
            ChangeFeed::Remote(mut listener) => {
                if let Err(e) = listener.shutdown().await {
                    tracing::warn!(error = %e, "Failed to shut down Firestore listener");
                }
            }
            ChangeFeed::Memory(handle) => handle.abort(),
        }
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Remote(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Remote(client),
        })
    }

    /// Create a database backed by an in-process store (tests, local demos).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::new())),
        }
    }

    /// The in-process store, if this database uses one.
    pub fn memory_store(&self) -> Option<Arc<MemoryStore>> {
        match &self.backend {
            Backend::Memory(store) => Some(store.clone()),
            Backend::Remote(_) => None,
        }
    }

    // ─── Genre Operations ────────────────────────────────────────

    /// Get all genres.
    pub async fn fetch_genres(&self) -> Result<Vec<Record<Genre>>, AppError> {
        self.list_docs(&CollectionPath::root(collections::GENRES))
            .await
    }

    /// Create a genre.
    pub async fn add_genre(&self, name: &str) -> Result<Record<Genre>, AppError> {
        let genre = Genre {
            name: name.to_string(),
        };
        let id = self
            .insert_doc(&CollectionPath::root(collections::GENRES), &genre)
            .await?;
        Ok(Record::new(id, genre))
    }

    /// Rename a genre.
    pub async fn update_genre(&self, genre: &Record<Genre>) -> Result<(), AppError> {
        self.update_fields(
            &CollectionPath::root(collections::GENRES),
            &genre.id,
            &genre.data,
            &["name"],
        )
        .await
    }

    pub async fn delete_genre(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(&CollectionPath::root(collections::GENRES), id)
            .await
    }

    // ─── Product Operations ──────────────────────────────────────

    /// Get all products.
    pub async fn fetch_products(&self) -> Result<Vec<Record<Product>>, AppError> {
        self.list_docs(&CollectionPath::root(collections::PRODUCTS))
            .await
    }

    /// Get a product by ID.
    pub async fn fetch_product(&self, id: &str) -> Result<Option<Record<Product>>, AppError> {
        self.get_doc(&CollectionPath::root(collections::PRODUCTS), id)
            .await
    }

    /// Create a product; the result is the input plus its new ID.
    pub async fn add_product(&self, product: &Product) -> Result<Record<Product>, AppError> {
        let id = self
            .insert_doc(&CollectionPath::root(collections::PRODUCTS), product)
            .await?;
        Ok(Record::new(id, product.clone()))
    }

    /// Overwrite a product's name, description, image and price.
    pub async fn update_product(&self, product: &Record<Product>) -> Result<(), AppError> {
        self.update_fields(
            &CollectionPath::root(collections::PRODUCTS),
            &product.id,
            &product.data,
            &["name", "descr", "image", "price"],
        )
        .await
    }

    /// Delete a product. Its keys and cart items are left in place.
    pub async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(&CollectionPath::root(collections::PRODUCTS), id)
            .await
    }

    // ─── License Key Operations ──────────────────────────────────

    /// Get all license keys.
    pub async fn fetch_keys(&self) -> Result<Vec<Record<LicenseKey>>, AppError> {
        self.list_docs(&CollectionPath::root(collections::KEYS))
            .await
    }

    /// Count the keys in stock for a product.
    pub async fn fetch_key_count(&self, product_id: &str) -> Result<usize, AppError> {
        self.count_docs(
            &CollectionPath::root(collections::KEYS),
            Some(("productId", product_id)),
        )
        .await
    }

    pub async fn add_key(&self, product_id: &str, key: &str) -> Result<Record<LicenseKey>, AppError> {
        let license = LicenseKey {
            product_id: product_id.to_string(),
            key: key.to_string(),
        };
        let id = self
            .insert_doc(&CollectionPath::root(collections::KEYS), &license)
            .await?;
        Ok(Record::new(id, license))
    }

    /// Change the key string; the product reference is left as is.
    pub async fn update_key(&self, id: &str, key: &str) -> Result<(), AppError> {
        self.update_fields(
            &CollectionPath::root(collections::KEYS),
            id,
            &KeyUpdate {
                key: key.to_string(),
            },
            &["key"],
        )
        .await
    }

    pub async fn delete_key(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(&CollectionPath::root(collections::KEYS), id)
            .await
    }

    /// Take one key for a product out of stock.
    ///
    /// Returns the removed key, or `None` (with nothing deleted) if the
    /// product has no keys left. The select and the delete are atomic.
    pub async fn fetch_and_delete_key(
        &self,
        product_id: &str,
    ) -> Result<Option<Record<LicenseKey>>, AppError> {
        let taken = self
            .take_one_eq(
                &CollectionPath::root(collections::KEYS),
                "productId",
                product_id,
            )
            .await?;

        match &taken {
            Some(key) => tracing::debug!(product_id, key_id = %key.id, "License key assigned"),
            None => tracing::debug!(product_id, "No license key in stock"),
        }

        Ok(taken)
    }

    // ─── Order Operations ────────────────────────────────────────

    /// Total number of orders.
    pub async fn fetch_sales(&self) -> Result<usize, AppError> {
        self.count_docs(&CollectionPath::root(collections::ORDERS), None)
            .await
    }

    /// Counters for the admin panel.
    pub async fn fetch_achievements(&self) -> Result<Vec<Achievement>, AppError> {
        let sales = self.fetch_sales().await?;
        let games = self
            .count_docs(&CollectionPath::root(collections::PRODUCTS), None)
            .await?;
        let genres = self
            .count_docs(&CollectionPath::root(collections::GENRES), None)
            .await?;

        Ok(vec![
            Achievement::new(Achievement::SALES, sales),
            Achievement::new(Achievement::GAMES_ON_SALE, games),
            Achievement::new(Achievement::GENRES, genres),
        ])
    }

    /// Orders placed by a user.
    pub async fn fetch_orders(&self, user_id: &str) -> Result<Vec<Record<Order>>, AppError> {
        self.query_eq(
            &CollectionPath::root(collections::ORDERS),
            "userId",
            user_id,
            None,
        )
        .await
    }

    /// Live view of a user's orders.
    ///
    /// The receiver starts with the current set and gets the complete set
    /// again after every change. The subscription ends when the last
    /// receiver is dropped.
    pub async fn watch_orders(
        &self,
        user_id: &str,
    ) -> Result<watch::Receiver<Vec<Record<Order>>>, AppError> {
        self.watch_eq(
            CollectionPath::root(collections::ORDERS),
            "userId",
            user_id.to_string(),
        )
        .await
    }

    /// Record an order, stamped with the current time.
    pub async fn add_order(
        &self,
        user_id: &str,
        items: Vec<OrderItem>,
    ) -> Result<Record<Order>, AppError> {
        let order = Order {
            user_id: user_id.to_string(),
            items,
            created_at: chrono::Utc::now(),
        };
        let id = self
            .insert_doc(&CollectionPath::root(collections::ORDERS), &order)
            .await?;

        tracing::info!(
            user_id,
            order_id = %id,
            items = order.items.len(),
            total = order.total(),
            "Order recorded"
        );

        Ok(Record::new(id, order))
    }

    // ─── Cart Operations ─────────────────────────────────────────

    fn cart_path(user_id: &str) -> CollectionPath {
        CollectionPath::nested(collections::USERS, user_id, collections::CART)
    }

    pub async fn fetch_cart(&self, user_id: &str) -> Result<Vec<Record<CartItem>>, AppError> {
        self.list_docs(&Self::cart_path(user_id)).await
    }

    /// Copy a product into the user's cart.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product: &Record<Product>,
    ) -> Result<Record<CartItem>, AppError> {
        let item = CartItem::from(product);
        let id = self.insert_doc(&Self::cart_path(user_id), &item).await?;
        Ok(Record::new(id, item))
    }

    pub async fn remove_from_cart(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        self.delete_doc(&Self::cart_path(user_id), item_id).await
    }

    /// Delete every item in a user's cart.
    ///
    /// Deletes are issued concurrently; returns once all of them have
    /// completed, with the number of items removed.
    pub async fn clear_cart(&self, user_id: &str) -> Result<usize, AppError> {
        let items: Vec<Record<Value>> = self.list_docs(&Self::cart_path(user_id)).await?;
        let ids: Vec<String> = items.into_iter().map(|item| item.id).collect();

        let count = self.remove_cart_items(user_id, &ids).await?;
        tracing::debug!(user_id, count, "Cart cleared");
        Ok(count)
    }

    /// Delete the given cart items concurrently. Items added to the cart
    /// in the meantime are left alone.
    pub async fn remove_cart_items(&self, user_id: &str, item_ids: &[String]) -> Result<usize, AppError> {
        let path = Self::cart_path(user_id);

        let deletes: Vec<_> = item_ids
            .iter()
            .map(|id| {
                let path = &path;
                async move { self.delete_doc(path, id).await }
            })
            .collect();

        stream::iter(deletes)
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(item_ids.len())
    }

    // ─── Document Primitives ─────────────────────────────────────

    async fn list_docs<T>(&self, path: &CollectionPath) -> Result<Vec<Record<T>>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Remote(client) => {
                let docs = client
                    .fluent()
                    .select()
                    .from(path.name())
                    .parent(parent_path(client, path))
                    .query()
                    .await
                    .map_err(db_err)?;
                docs.iter().map(record_from_doc).collect()
            }
            Backend::Memory(store) => store
                .list(&path.key())
                .into_iter()
                .map(record_from_value)
                .collect(),
        }
    }

    async fn get_doc<T>(&self, path: &CollectionPath, id: &str) -> Result<Option<Record<T>>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Remote(client) => client
                .fluent()
                .select()
                .by_id_in(path.name())
                .parent(parent_path(client, path))
                .one(id)
                .await
                .map_err(db_err)?
                .as_ref()
                .map(record_from_doc)
                .transpose(),
            Backend::Memory(store) => store
                .get(&path.key(), id)
                .map(|doc| record_from_value((id.to_string(), doc)))
                .transpose(),
        }
    }

    async fn query_eq<T>(
        &self,
        path: &CollectionPath,
        field: &'static str,
        value: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Record<T>>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Remote(client) => {
                let value = value.to_string();
                let query = client
                    .fluent()
                    .select()
                    .from(path.name())
                    .parent(parent_path(client, path))
                    .filter(move |q| q.field(field).eq(value.clone()));
                let query = match limit {
                    Some(limit) => query.limit(limit),
                    None => query,
                };
                let docs = query.query().await.map_err(db_err)?;
                docs.iter().map(record_from_doc).collect()
            }
            Backend::Memory(store) => store
                .query_eq(
                    &path.key(),
                    field,
                    &Value::String(value.to_string()),
                    limit.map(|l| l as usize),
                )
                .into_iter()
                .map(record_from_value)
                .collect(),
        }
    }

    /// Size of a (optionally filtered) result set.
    async fn count_docs(
        &self,
        path: &CollectionPath,
        filter: Option<(&'static str, &str)>,
    ) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Remote(client) => {
                let query = client
                    .fluent()
                    .select()
                    .from(path.name())
                    .parent(parent_path(client, path));
                let docs = match filter {
                    Some((field, value)) => {
                        let value = value.to_string();
                        query
                            .filter(move |q| q.field(field).eq(value.clone()))
                            .query()
                            .await
                    }
                    None => query.query().await,
                }
                .map_err(db_err)?;
                Ok(docs.len())
            }
            Backend::Memory(store) => Ok(match filter {
                Some((field, value)) => store
                    .query_eq(&path.key(), field, &Value::String(value.to_string()), None)
                    .len(),
                None => store.list(&path.key()).len(),
            }),
        }
    }

    /// Insert a document under a freshly generated ID and return the ID.
    async fn insert_doc<T>(&self, path: &CollectionPath, data: &T) -> Result<String, AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let id = generate_document_id()?;

        match &self.backend {
            Backend::Remote(client) => {
                let _: () = client
                    .fluent()
                    .insert()
                    .into(path.name())
                    .document_id(&id)
                    .parent(parent_path(client, path))
                    .object(data)
                    .execute()
                    .await
                    .map_err(db_err)?;
            }
            Backend::Memory(store) => store.insert(&path.key(), &id, to_value(data)?),
        }

        Ok(id)
    }

    /// Overwrite `fields` of an existing document with the values in `data`.
    async fn update_fields<T>(
        &self,
        path: &CollectionPath,
        id: &str,
        data: &T,
        fields: &[&str],
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Remote(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .fields(fields.to_vec())
                    .in_col(path.name())
                    .precondition(firestore::FirestoreWritePrecondition::Exists(true))
                    .document_id(id)
                    .parent(parent_path(client, path))
                    .object(data)
                    .execute()
                    .await
                    .map_err(db_err)?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.update_fields(&path.key(), id, &to_value(data)?, fields)
            }
        }
    }

    async fn delete_doc(&self, path: &CollectionPath, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote(client) => {
                client
                    .fluent()
                    .delete()
                    .from(path.name())
                    .parent(parent_path(client, path))
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(db_err)?;
            }
            Backend::Memory(store) => store.delete(&path.key(), id),
        }
        Ok(())
    }

    /// Atomically remove and return one document whose `field` equals `value`.
    async fn take_one_eq<T>(
        &self,
        path: &CollectionPath,
        field: &'static str,
        value: &str,
    ) -> Result<Option<Record<T>>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let client = match &self.backend {
            Backend::Memory(store) => {
                return store
                    .take_first_eq(&path.key(), field, &Value::String(value.to_string()))
                    .map(record_from_value)
                    .transpose();
            }
            Backend::Remote(client) => client,
        };

        let parent = parent_path(client, path);
        let mut last_error = None;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            // Reads through this handle are part of the transaction, so a
            // concurrent delete of the same document aborts our commit.
            let tx_client = client.clone_with_consistency_selector(
                firestore::FirestoreConsistencySelector::Transaction(
                    transaction.transaction_id().clone(),
                ),
            );

            let value_owned = value.to_string();
            let docs = tx_client
                .fluent()
                .select()
                .from(path.name())
                .parent(&parent)
                .filter(move |q| q.field(field).eq(value_owned.clone()))
                .limit(1)
                .query()
                .await
                .map_err(db_err)?;

            let Some(doc) = docs.first() else {
                let _ = transaction.rollback().await;
                return Ok(None);
            };
            let record = record_from_doc::<T>(doc)?;

            client
                .fluent()
                .delete()
                .from(path.name())
                .parent(&parent)
                .document_id(&record.id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                })?;

            match transaction.commit().await {
                Ok(_) => return Ok(Some(record)),
                Err(e) => {
                    tracing::warn!(
                        collection = path.name(),
                        attempt,
                        error = %e,
                        "Take-one transaction aborted, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::Database(format!(
            "Transaction commit failed after {} attempts: {}",
            MAX_TRANSACTION_ATTEMPTS,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    // ─── Live Queries ────────────────────────────────────────────

    /// Keep a watch channel filled with the current `field == value` result set.
    async fn watch_eq<T>(
        &self,
        path: CollectionPath,
        field: &'static str,
        value: String,
    ) -> Result<watch::Receiver<Vec<Record<T>>>, AppError>
    where
        T: DeserializeOwned + PartialEq + Send + Sync + 'static,
    {
        let changed = Arc::new(Notify::new());
        // Start listening before the first read so no change slips in between.
        let feed = self
            .start_change_feed(&path, field, &value, changed.clone())
            .await?;

        let initial = match self.query_eq::<T>(&path, field, &value, None).await {
            Ok(records) => records,
            Err(e) => {
                feed.stop().await;
                return Err(e);
            }
        };
        let (tx, rx) = watch::channel(initial);

        // The memory feed fires on any write to the collection, so refreshes
        // there are compared against the last set. A Firestore listener only
        // fires for documents matching the query; every event is pushed.
        let dedupe = matches!(self.backend, Backend::Memory(_));

        let db = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = changed.notified() => {}
                }

                match db.query_eq::<T>(&path, field, &value, None).await {
                    Ok(records) if dedupe => {
                        tx.send_if_modified(|current| {
                            if *current == records {
                                return false;
                            }
                            *current = records;
                            true
                        });
                    }
                    Ok(records) => {
                        if tx.send(records).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            collection = path.name(),
                            error = %e,
                            "Failed to refresh live query"
                        );
                    }
                }
            }

            feed.stop().await;
            tracing::debug!(collection = path.name(), "Live query closed");
        });

        Ok(rx)
    }

    async fn start_change_feed(
        &self,
        path: &CollectionPath,
        field: &'static str,
        value: &str,
        changed: Arc<Notify>,
    ) -> Result<ChangeFeed, AppError> {
        match &self.backend {
            Backend::Memory(store) => {
                let mut changes = store.subscribe();
                let watched = path.key();
                let handle = tokio::spawn(async move {
                    loop {
                        match changes.recv().await {
                            Ok(collection) if collection == watched => changed.notify_one(),
                            Ok(_) => {}
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                                changed.notify_one()
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });
                Ok(ChangeFeed::Memory(handle))
            }
            Backend::Remote(client) => {
                let mut listener = client
                    .create_listener(firestore::FirestoreMemListenStateStorage::new())
                    .await
                    .map_err(db_err)?;

                let value = value.to_string();
                client
                    .fluent()
                    .select()
                    .from(path.name())
                    .parent(parent_path(client, path))
                    .filter(move |q| q.field(field).eq(value.clone()))
                    .listen()
                    .add_target(
                        firestore::FirestoreListenerTarget::new(LIVE_QUERY_TARGET_ID),
                        &mut listener,
                    )
                    .map_err(db_err)?;

                listener
                    .start(move |event| {
                        let changed = changed.clone();
                        async move {
                            match event {
                                firestore::FirestoreListenEvent::DocumentChange(_)
                                | firestore::FirestoreListenEvent::DocumentDelete(_)
                                | firestore::FirestoreListenEvent::DocumentRemove(_) => {
                                    changed.notify_one()
                                }
                                _ => {}
                            }
                            Ok(())
                        }
                    })
                    .await
                    .map_err(db_err)?;

                Ok(ChangeFeed::Remote(listener))
            }
        }
    }
}
