//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Store (all optional)
//! - `PLOT_CHECKOUT_UNIT_PRICE` - Price of one plot (default: 99.99)
//! - `PLOT_CHECKOUT_CURRENCY` - ISO 4217 code (default: USD)
//! - `PLOT_CHECKOUT_COUPONS` - Comma separated `CODE:kind:value` entries
//!   (default: `RESELLER10:percentage:10`)
//! - `PLOT_CHECKOUT_COUPON_DELAY_MS` - Simulated coupon validation delay (default: 500)
//!
//! ## Payment
//! - `PLOT_CHECKOUT_APP_ID` - Payment widget application ID (required)
//! - `PLOT_CHECKOUT_LOCATION_ID` - Payment processor location ID (required)
//! - `PLOT_CHECKOUT_BACKEND_URL` - Base URL of the order backend (default: http://127.0.0.1:3000)

use crate::domain::discount::{Discount, DiscountKind};
use crate::domain::money::{CurrencyCode, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::time::Duration;
use thiserror::Error;

const MAX_UNIT_PRICE: Decimal = dec!(1000000);
const DEFAULT_COUPONS: &str = "RESELLER10:percentage:10";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What is being sold and for how much.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub unit_price: Money,
    pub currency: CurrencyCode,
    pub coupons: Vec<Discount>,
    pub coupon_delay: Duration,
}

/// Payment widget credentials and the order backend.
///
/// Implements `Debug` manually to redact the application ID.
#[derive(Clone)]
pub struct PaymentConfig {
    pub app_id: SecretString,
    pub location_id: String,
    pub backend_url: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("app_id", &"[REDACTED]")
            .field("location_id", &self.location_id)
            .field("backend_url", &self.backend_url)
            .finish()
    }
}

/// Loads `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key -> value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let unit_price = parse_unit_price(&or_default(&lookup, "PLOT_CHECKOUT_UNIT_PRICE", "99.99"))?;
        let currency = or_default(&lookup, "PLOT_CHECKOUT_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("PLOT_CHECKOUT_CURRENCY".into(), e))?;
        let coupons = parse_coupons(&or_default(&lookup, "PLOT_CHECKOUT_COUPONS", DEFAULT_COUPONS))?;
        let coupon_delay = or_default(&lookup, "PLOT_CHECKOUT_COUPON_DELAY_MS", "500")
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PLOT_CHECKOUT_COUPON_DELAY_MS".into(), e.to_string())
            })?;

        Ok(Self {
            unit_price,
            currency,
            coupons,
            coupon_delay,
        })
    }
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_id = required(&lookup, "PLOT_CHECKOUT_APP_ID")?;
        let location_id = required(&lookup, "PLOT_CHECKOUT_LOCATION_ID")?;
        let backend_url = or_default(&lookup, "PLOT_CHECKOUT_BACKEND_URL", "http://127.0.0.1:3000");
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar(
                "PLOT_CHECKOUT_BACKEND_URL".into(),
                format!("'{backend_url}' is not an http(s) URL"),
            ));
        }

        Ok(Self {
            app_id: SecretString::from(app_id),
            location_id,
            backend_url: backend_url.trim_end_matches('/').to_owned(),
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_unit_price(raw: &str) -> Result<Money, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("PLOT_CHECKOUT_UNIT_PRICE".into(), msg);
    let price: Decimal = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if price <= Decimal::ZERO || price > MAX_UNIT_PRICE {
        return Err(invalid(format!("{price} must be above 0 and at most {MAX_UNIT_PRICE}")));
    }
    Ok(Money::new(price))
}

/// Parses `CODE:kind:value[,CODE:kind:value...]`. Codes are uppercased so they
/// match normalized user input.
pub fn parse_coupons(raw: &str) -> Result<Vec<Discount>, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("PLOT_CHECKOUT_COUPONS".into(), msg);

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [code, kind, value] = parts.as_slice() else {
                return Err(invalid(format!("'{entry}' is not CODE:kind:value")));
            };
            if code.is_empty() {
                return Err(invalid(format!("'{entry}' has an empty code")));
            }
            let kind: DiscountKind = kind.parse().map_err(invalid)?;
            let value: Decimal = value
                .parse()
                .map_err(|e| invalid(format!("'{entry}': {e}")))?;
            if value <= Decimal::ZERO
                || (kind == DiscountKind::Percentage && value > Decimal::ONE_HUNDRED)
            {
                return Err(invalid(format!("'{entry}' has an out of range value")));
            }
            Ok(Discount::new(code.to_uppercase(), kind, value))
        })
        .collect()
}
