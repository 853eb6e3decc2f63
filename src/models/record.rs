// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! A stored document paired with its store-assigned identifier.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Document fields flattened next to the document ID.
///
/// The ID is never written into the document body; it is attached on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Drop the ID and keep the document body.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
