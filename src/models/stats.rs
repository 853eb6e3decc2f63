// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Admin dashboard counters.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One titled counter shown on the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Achievement {
    pub title: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub value: usize,
}

impl Achievement {
    pub const SALES: &'static str = "Number of Sales";
    pub const GAMES_ON_SALE: &'static str = "Number of Games on Sale";
    pub const GENRES: &'static str = "Number of Genres";

    pub fn new(title: &str, value: usize) -> Self {
        Self {
            title: title.to_string(),
            value,
        }
    }
}
