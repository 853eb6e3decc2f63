// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation guard for the named page routes.
//!
//! Each navigation is checked once against the request's session. There is
//! no waiting for identity resolution: a request without a valid session
//! token has no identity.

use crate::middleware::auth::{identity_from_parts, AuthUser};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where unauthenticated navigation to a guarded route ends up.
pub const HOME_PATH: &str = "/";

/// A page route with its auth requirement.
#[derive(Debug, PartialEq, Eq)]
pub struct NamedRoute {
    /// Path pattern, `:name` segments are parameters
    pub path: &'static str,
    pub name: &'static str,
    pub requires_auth: bool,
}

impl NamedRoute {
    /// The pattern in axum's `{param}` syntax.
    pub fn axum_path(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(param) => format!("{{{}}}", param),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Match a request path, returning the captured parameters.
    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = self.path.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, segment) in pattern.iter().zip(actual) {
            match expected.strip_prefix(':') {
                Some(param) => {
                    params.insert(param.to_string(), segment.to_string());
                }
                None if *expected == segment => {}
                None => return None,
            }
        }
        Some(params)
    }
}

pub const ROUTES: &[NamedRoute] = &[
    NamedRoute {
        path: "/",
        name: "home",
        requires_auth: false,
    },
    NamedRoute {
        path: "/catalog",
        name: "catalog",
        requires_auth: false,
    },
    NamedRoute {
        path: "/adminpanel",
        name: "adminpanel",
        requires_auth: true,
    },
    NamedRoute {
        path: "/user/:username",
        name: "user-profile",
        requires_auth: true,
    },
    NamedRoute {
        path: "/product/:id",
        name: "product-details",
        requires_auth: false,
    },
    NamedRoute {
        path: "/order",
        name: "order",
        requires_auth: false,
    },
];

/// Find the named route for a request path.
pub fn route_for(path: &str) -> Option<(&'static NamedRoute, BTreeMap<String, String>)> {
    ROUTES
        .iter()
        .find_map(|route| route.matches(path).map(|params| (route, params)))
}

/// Outcome of a guard check.
#[derive(Debug, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Allow the navigation unless the route requires auth and there is no identity.
pub fn check(route: &NamedRoute, identity: Option<&AuthUser>) -> Navigation {
    if route.requires_auth && identity.is_none() {
        Navigation::Redirect(HOME_PATH)
    } else {
        Navigation::Proceed
    }
}

/// Route and parameters of the page being rendered.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub route: &'static NamedRoute,
    pub params: BTreeMap<String, String>,
}

/// Middleware enforcing [`check`] on page routes.
pub async fn guard_navigation(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some((route, params)) = route_for(request.uri().path()) else {
        return next.run(request).await;
    };

    let identity =
        identity_from_parts(&jar, request.headers(), &state.config.session_signing_key);

    match check(route, identity.as_ref()) {
        Navigation::Redirect(to) => {
            tracing::debug!(route = route.name, "Guarded route without identity, redirecting");
            Redirect::to(to).into_response()
        }
        Navigation::Proceed => {
            request
                .extensions_mut()
                .insert(PageContext { route, params });
            if let Some(user) = identity {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
    }
}
