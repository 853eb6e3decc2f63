// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, navigation guard, security).

pub mod auth;
pub mod guard;
pub mod security;

pub use auth::require_auth;
pub use guard::guard_navigation;
