// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod checkout;
pub mod identity;

pub use checkout::place_order;
pub use identity::{IdentityClient, SignedInUser};
