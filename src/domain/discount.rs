use crate::domain::money::{CurrencyCode, Money, serialize_decimal};
use crate::error::CouponError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl FromStr for DiscountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown discount kind '{other}'")),
        }
    }
}

/// A coupon or volume discount. The monetary amount is always derived from the
/// current subtotal and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discount {
    code: String,
    #[serde(rename = "type")]
    kind: DiscountKind,
    #[serde(serialize_with = "serialize_decimal")]
    value: Decimal,
}

impl Discount {
    pub const VOLUME_LABEL: &'static str = "VOLUME DISCOUNT";
    pub const VOLUME_PERCENT: Decimal = dec!(10);

    pub fn new(code: impl Into<String>, kind: DiscountKind, value: Decimal) -> Self {
        Self {
            code: code.into(),
            kind,
            value,
        }
    }

    pub fn percentage(code: impl Into<String>, value: Decimal) -> Self {
        Self::new(code, DiscountKind::Percentage, value)
    }

    pub fn fixed(code: impl Into<String>, value: Decimal) -> Self {
        Self::new(code, DiscountKind::Fixed, value)
    }

    /// The automatic 10% discount for large orders.
    pub fn volume() -> Self {
        Self::percentage(Self::VOLUME_LABEL, Self::VOLUME_PERCENT)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn amount(&self, subtotal: Money) -> Money {
        match self.kind {
            DiscountKind::Percentage => subtotal.percent(self.value),
            DiscountKind::Fixed => Money::new(self.value),
        }
    }

    /// Human readable savings, e.g. `10% off` or `$5.00 off`.
    pub fn savings_label(&self, currency: CurrencyCode) -> String {
        match self.kind {
            DiscountKind::Percentage => format!("{}% off", self.value.normalize()),
            DiscountKind::Fixed => format!("{} off", Money::new(self.value).format(currency)),
        }
    }
}

/// Trims and uppercases a user-entered coupon code.
pub fn normalize_coupon_code(raw: &str) -> Result<String, CouponError> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        Err(CouponError::Empty)
    } else {
        Ok(code)
    }
}
