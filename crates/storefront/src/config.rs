//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://127.0.0.1:3000>)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog JSON file
//!   (default: crates/storefront/content/catalog.json)
//! - `STOREFRONT_CURRENCY` - ISO 4217 code used for display (default: TND)
//! - `CHECKOUT_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 500)
//! - `CHECKOUT_SHIPPING_FEE` - Flat shipping fee otherwise (default: 7)
//! - `CHECKOUT_PAYMENT_GATE` - `require-details` or `unrestricted` (default: require-details)
//! - `CHECKOUT_RECONFIRM_ON_CART_EDIT` - Require details again after a cart edit (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use panier_core::{CheckoutPolicy, CurrencyCode, DetailsRetention, PaymentGate, ShippingPolicy};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Product catalog file
    pub catalog_path: PathBuf,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// Shipping, payment gating and details retention rules
    pub checkout: CheckoutPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` naming the first bad variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or_default(&lookup, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_or_default(&lookup, "STOREFRONT_PORT", "3000")?;
        let base_url =
            lookup("STOREFRONT_BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));
        let catalog_path = lookup("STOREFRONT_CATALOG_PATH")
            .map_or_else(|| PathBuf::from("crates/storefront/content/catalog.json"), PathBuf::from);
        let currency = parse_or_default(&lookup, "STOREFRONT_CURRENCY", "TND")?;

        let shipping = ShippingPolicy {
            free_shipping_threshold: parse_or_default::<Decimal>(
                &lookup,
                "CHECKOUT_FREE_SHIPPING_THRESHOLD",
                "500",
            )?,
            flat_fee: parse_or_default::<Decimal>(&lookup, "CHECKOUT_SHIPPING_FEE", "7")?,
        };
        for (key, value) in [
            ("CHECKOUT_FREE_SHIPPING_THRESHOLD", shipping.free_shipping_threshold),
            ("CHECKOUT_SHIPPING_FEE", shipping.flat_fee),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    "must not be negative".to_string(),
                ));
            }
        }

        let payment_gate: PaymentGate =
            parse_or_default(&lookup, "CHECKOUT_PAYMENT_GATE", "require-details")?;
        let details_retention = if parse_bool(&lookup, "CHECKOUT_RECONFIRM_ON_CART_EDIT")? {
            DetailsRetention::ReconfirmOnEdit
        } else {
            DetailsRetention::KeepAcrossEdits
        };

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            currency,
            checkout: CheckoutPolicy {
                shipping,
                payment_gate,
                details_retention,
            },
            sentry_dsn: lookup("SENTRY_DSN")
                .filter(|dsn| !dsn.is_empty())
                .map(SecretString::from),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag; unset means false.
fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
