// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod catalog;
pub mod order;
pub mod record;
pub mod stats;

pub use catalog::{Genre, LicenseKey, Product};
pub use order::{CartItem, Order, OrderItem};
pub use record::Record;
pub use stats::Achievement;
