// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, with an in-memory stand-in).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    pub const GENRES: &str = "genres";
    pub const PRODUCTS: &str = "products";
    pub const KEYS: &str = "keys";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
    /// Per-user sub-collection under `users/{uid}`
    pub const CART: &str = "cart";
}

/// Location of a collection, optionally nested under a parent document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    parent: Option<(&'static str, String)>,
    name: &'static str,
}

impl CollectionPath {
    /// A top-level collection.
    pub fn root(name: &'static str) -> Self {
        Self { parent: None, name }
    }

    /// A sub-collection under `{parent_collection}/{parent_id}`.
    pub fn nested(parent_collection: &'static str, parent_id: &str, name: &'static str) -> Self {
        Self {
            parent: Some((parent_collection, parent_id.to_string())),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<(&'static str, &str)> {
        self.parent
            .as_ref()
            .map(|(collection, id)| (*collection, id.as_str()))
    }

    /// Slash-separated path relative to the database root.
    pub fn key(&self) -> String {
        match &self.parent {
            Some((collection, id)) => format!("{}/{}/{}", collection, id, self.name),
            None => self.name.to_string(),
        }
    }
}

const AUTO_ID_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AUTO_ID_LEN: usize = 20;
// Largest multiple of the alphabet size that fits in a byte.
const AUTO_ID_BYTE_LIMIT: u8 = 248;

/// Generate a 20-character alphanumeric document ID.
pub fn generate_document_id() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut id = String::with_capacity(AUTO_ID_LEN);
    let mut buf = [0u8; 32];

    while id.len() < AUTO_ID_LEN {
        rng.fill(&mut buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;

        for byte in buf.iter().filter(|b| **b < AUTO_ID_BYTE_LIMIT) {
            if id.len() == AUTO_ID_LEN {
                break;
            }
            id.push(AUTO_ID_ALPHABET[(byte % 62) as usize] as char);
        }
    }

    Ok(id)
}
