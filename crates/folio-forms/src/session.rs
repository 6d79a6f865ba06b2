//! Route access guard
//!
//! Pages sit behind a [`RouteGuard`] that asks a [`SessionProvider`] whether
//! the visitor is signed in. Unauthenticated visitors hitting a protected
//! route are sent to the login page.

use serde::Serialize;
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &[LOGIN_PATH, "/register", "/forgot-password"];

/// Every page route the site serves.
pub const SITE_ROUTES: &[&str] = &[
    "/", "/about", "/dashboard", "/features", "/docs", "/projects", "/blog", "/contact",
    "/security", "/certificate", "/terms", "/privacy", "/services", "/login", "/register",
    "/forgot-password",
];

pub trait SessionProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Authenticated when a non-blank API key is configured.
#[derive(Clone, Debug, Default)]
pub struct ApiKeySession {
    api_key: Option<String>,
}

impl ApiKeySession {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl SessionProvider for ApiKeySession {
    fn is_authenticated(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Access {
    Granted,
    Redirect(String),
}

pub struct RouteGuard {
    session: Arc<dyn SessionProvider>,
    protected: Vec<String>,
}

impl RouteGuard {
    /// Guards only the dashboard; marketing pages stay public.
    pub fn new(session: Arc<dyn SessionProvider>) -> Self {
        Self::with_protected(session, ["/dashboard"])
    }

    pub fn with_protected(session: Arc<dyn SessionProvider>, protected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { session, protected: protected.into_iter().map(Into::into).collect() }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        if PUBLIC_ROUTES.contains(&path) {
            return false;
        }
        self.protected.iter().any(|p| p == path || path.starts_with(&format!("{p}/")))
    }

    pub fn check(&self, path: &str) -> Access {
        if !self.is_protected(path) || self.session.is_authenticated() {
            Access::Granted
        } else {
            tracing::debug!("Redirecting {} to {}", path, LOGIN_PATH);
            Access::Redirect(LOGIN_PATH.to_string())
        }
    }
}
