//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;

use crate::config::ServerConfig;
use crate::db::{AccountStore, CatalogStore};
use crate::services::{AuthService, CatalogService, TokenService, UserService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    accounts: Arc<dyn AccountStore>,
    tokens: TokenService,
    auth: AuthService,
    users: UserService,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state over the given stores.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        accounts: Arc<dyn AccountStore>,
        products: Arc<dyn CatalogStore>,
    ) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            Duration::seconds(config.token_ttl_secs),
        );
        let auth = AuthService::new(Arc::clone(&accounts), tokens.clone());
        let users = UserService::new(Arc::clone(&accounts));
        let catalog = CatalogService::new(products, Arc::clone(&accounts));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                accounts,
                tokens,
                auth,
                users,
                catalog,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the account store.
    ///
    /// Used by the readiness probe; handlers go through the services.
    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.inner.accounts
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the account management service.
    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
