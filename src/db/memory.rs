// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store with Firestore-like semantics.
//!
//! Collections are keyed by their full path (`users/{uid}/cart`) and hold
//! JSON documents ordered by document ID, which matches the default result
//! order of an unordered Firestore query. Every write publishes the
//! collection path on a broadcast channel so live queries can refresh.

use crate::error::AppError;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

type Collection = BTreeMap<String, Value>;

/// In-memory document store.
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
    changes: broadcast::Sender<String>,
    deletes_issued: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            collections: DashMap::new(),
            changes,
            deletes_issued: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents in a collection, ordered by ID.
    pub fn list(&self, collection: &str) -> Vec<(String, Value)> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    /// Documents whose `field` equals `value`, up to `limit`.
    pub fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Vec<(String, Value)> {
        let Some(docs) = self.collections.get(collection) else {
            return Vec::new();
        };

        docs.iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect()
    }

    pub fn insert(&self, collection: &str, id: &str, doc: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        self.notify(collection);
    }

    /// Overwrite the listed fields of an existing document.
    ///
    /// Fails with `NotFound` if the document does not exist.
    pub fn update_fields(
        &self,
        collection: &str,
        id: &str,
        doc: &Value,
        fields: &[&str],
    ) -> Result<(), AppError> {
        {
            let mut docs = self
                .collections
                .get_mut(collection)
                .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;
            let existing = docs
                .get_mut(id)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;

            for field in fields {
                match doc.get(*field) {
                    Some(value) => {
                        existing.insert(field.to_string(), value.clone());
                    }
                    None => {
                        existing.remove(*field);
                    }
                }
            }
        }
        self.notify(collection);
        Ok(())
    }

    /// Delete a document. Deleting a missing document is not an error.
    pub fn delete(&self, collection: &str, id: &str) {
        self.deletes_issued.fetch_add(1, Ordering::Relaxed);
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        self.notify(collection);
    }

    /// Remove and return the first document whose `field` equals `value`.
    ///
    /// Select and delete happen under the collection's shard lock, so
    /// concurrent callers never receive the same document.
    pub fn take_first_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Option<(String, Value)> {
        let taken = {
            let mut docs = self.collections.get_mut(collection)?;
            let id = docs
                .iter()
                .find(|(_, doc)| doc.get(field) == Some(value))
                .map(|(id, _)| id.clone())?;
            self.deletes_issued.fetch_add(1, Ordering::Relaxed);
            docs.remove_entry(&id)
        };
        self.notify(collection);
        taken
    }

    /// Receive the path of every collection written from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }

    /// Number of delete operations issued so far.
    pub fn deletes_issued(&self) -> usize {
        self.deletes_issued.load(Ordering::Relaxed)
    }

    fn notify(&self, collection: &str) {
        // No receivers is fine
        let _ = self.changes.send(collection.to_string());
    }
}
