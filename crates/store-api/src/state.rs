//! # Application State
//!
//! Shared state for the Axum application: the in-memory store, the checkout
//! service over the configured gateway, and server settings.

use std::sync::Arc;
use store_core::{CheckoutService, SharedGateway, Store};
use store_stripe::StripeGateway;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL for redirect callbacks
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an injectable variable lookup; `from_env` passes the
    /// process environment, tests pass a plain map
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            base_url: lookup("BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout orchestrator
    pub checkout: CheckoutService,
    /// Catalog and order store
    pub store: Arc<Store>,
    /// Gateway publishable key, embedded in detail pages
    pub publishable_key: String,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the AppState with the Stripe gateway
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let store = Arc::new(load_store()?);

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let publishable_key = gateway.config().publishable_key.clone();

        Ok(Self::with_parts(
            config,
            store,
            Arc::new(gateway),
            publishable_key,
        ))
    }

    /// Assemble state from explicit parts (used by tests with a mock gateway)
    pub fn with_parts(
        config: AppConfig,
        store: Arc<Store>,
        gateway: SharedGateway,
        publishable_key: impl Into<String>,
    ) -> Self {
        Self {
            checkout: CheckoutService::new(store.clone(), gateway),
            store,
            publishable_key: publishable_key.into(),
            config,
        }
    }

    /// Success URL with the gateway's session-id placeholder
    pub fn success_url(&self) -> String {
        format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.config.base_url
        )
    }

    /// Cancel URL for a single-item checkout: back to the item page
    pub fn item_cancel_url(&self, item_id: u64) -> String {
        format!("{}/item/{}", self.config.base_url, item_id)
    }

    /// Cancel URL for an order checkout: back to the order page
    pub fn order_cancel_url(&self, order_id: u64) -> String {
        format!("{}/order/{}", self.config.base_url, order_id)
    }
}

/// Load the store seed from config file
fn load_store() -> anyhow::Result<Store> {
    let config_paths = [
        "config/store.toml",
        "../config/store.toml",
        "../../config/store.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let store = Store::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!(
                "Loaded {} items, {} orders from {}",
                store.item_count(),
                store.order_count(),
                path
            );
            return Ok(store);
        }
    }

    // Empty store if no seed file is present
    tracing::warn!("No store config found, starting with an empty store");
    Ok(Store::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        // No process-env mutation: defaults come from an empty lookup
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
    }

    #[test]
    fn test_app_config_overrides() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("HOST", "0.0.0.0"),
            ("PORT", "3000"),
            ("BASE_URL", "https://shop.test"),
            ("ENVIRONMENT", "production"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "https://shop.test");
        assert!(config.is_production());
    }

    #[test]
    fn test_app_config_bad_port_falls_back() {
        let config = AppConfig::from_lookup(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_redirect_urls() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "https://shop.test".to_string(),
            environment: "test".to_string(),
        };
        let state = AppState::with_parts(
            config,
            Arc::new(Store::new()),
            Arc::new(crate::handlers::tests::OkGateway::default()),
            "pk_test_xyz",
        );

        assert_eq!(
            state.success_url(),
            "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(state.item_cancel_url(7), "https://shop.test/item/7");
        assert_eq!(state.order_cancel_url(7), "https://shop.test/order/7");
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
