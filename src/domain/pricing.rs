//! Order pricing.
//!
//! [`price`] is a pure function of the order inputs. It is re-run after every
//! mutation of the checkout so the displayed totals and the amount sent to
//! payment tokenization never go stale.

use crate::domain::discount::Discount;
use crate::domain::money::{CurrencyCode, Money};
use crate::domain::plot::Quantity;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orders of this many plots or more get the volume discount, unless a coupon
/// is applied.
pub const VOLUME_DISCOUNT_THRESHOLD: u8 = 6;

pub const EXPRESS_SHIPPING_COST: Decimal = dec!(44.00);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl ShippingMethod {
    pub fn cost(&self) -> Money {
        match self {
            Self::Standard => Money::ZERO,
            Self::Express => Money::new(EXPRESS_SHIPPING_COST),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Standard Airmail (Free)",
            Self::Express => "Tracked Express Shipping ($44.00)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(format!("unknown shipping method '{other}'")),
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Works out the volume discount record after a change to the order.
///
/// Large orders without a coupon get one; orders below the threshold lose it.
/// With a coupon applied the existing record is kept but stays inert, since
/// [`price`] always prefers the coupon.
pub fn refresh_volume_discount(
    quantity: Quantity,
    coupon: Option<&Discount>,
    current: Option<Discount>,
) -> Option<Discount> {
    if quantity.get() < VOLUME_DISCOUNT_THRESHOLD {
        None
    } else if coupon.is_none() {
        Some(Discount::volume())
    } else {
        current
    }
}

/// Everything the order summary shows, derived from the order inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub quantity: Quantity,
    pub unit_price: Money,
    pub subtotal: Money,
    pub discount_label: Option<String>,
    pub discount_amount: Money,
    pub shipping_method: ShippingMethod,
    pub shipping_cost: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// The amount handed to payment tokenization, in cents.
    pub fn amount_minor_units(&self) -> Option<i64> {
        self.total.to_minor_units()
    }

    pub fn has_discount(&self) -> bool {
        self.discount_amount > Money::ZERO
    }

    /// Summary lines as shown beside the checkout form.
    pub fn render(&self, currency: CurrencyCode) -> String {
        let mut out = format!(
            "Quantity: {}\nSubtotal: {}\n",
            self.quantity,
            self.subtotal.format(currency)
        );
        if self.has_discount()
            && let Some(label) = &self.discount_label
        {
            out.push_str(&format!(
                "{label}: -{}\n",
                self.discount_amount.format(currency)
            ));
        }
        if self.shipping_cost.is_zero() {
            out.push_str("Shipping: FREE\n");
        } else {
            out.push_str(&format!("Shipping: {}\n", self.shipping_cost.format(currency)));
        }
        out.push_str(&format!("Total: {}", self.total.format(currency)));
        out
    }
}

/// Prices an order.
///
/// A coupon fully overrides the volume discount; the two never stack. The
/// discounted subtotal is floored at zero before shipping is added.
pub fn price(
    quantity: Quantity,
    unit_price: Money,
    coupon: Option<&Discount>,
    volume: Option<&Discount>,
    shipping_method: ShippingMethod,
) -> PriceBreakdown {
    let subtotal = unit_price.times(u32::from(quantity.get()));
    let active = coupon.or(volume);
    let discount_amount = active.map_or(Money::ZERO, |d| d.amount(subtotal));
    let shipping_cost = shipping_method.cost();
    let total = (subtotal - discount_amount).floor_at_zero() + shipping_cost;

    PriceBreakdown {
        quantity,
        unit_price,
        subtotal,
        discount_label: active.map(|d| d.code().to_owned()),
        discount_amount,
        shipping_method,
        shipping_cost,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn unit() -> Money {
        Money::new(dec!(99.99))
    }

    #[test]
    fn test_single_plot_standard_shipping() {
        let breakdown = price(qty(1), unit(), None, None, ShippingMethod::Standard);
        assert_eq!(breakdown.subtotal, Money::new(dec!(99.99)));
        assert_eq!(breakdown.discount_amount, Money::ZERO);
        assert_eq!(breakdown.total, Money::new(dec!(99.99)));
        assert_eq!(breakdown.amount_minor_units(), Some(9999));
    }

    #[test]
    fn test_volume_discount_threshold() {
        assert_eq!(
            refresh_volume_discount(qty(6), None, None),
            Some(Discount::volume())
        );
        assert_eq!(refresh_volume_discount(qty(5), None, Some(Discount::volume())), None);
    }

    #[test]
    fn test_volume_record_kept_but_inert_with_coupon() {
        let coupon = Discount::fixed("FIVE", dec!(5));
        let volume = refresh_volume_discount(qty(8), Some(&coupon), Some(Discount::volume()));
        assert_eq!(volume, Some(Discount::volume()));

        let breakdown = price(
            qty(8),
            unit(),
            Some(&coupon),
            volume.as_ref(),
            ShippingMethod::Standard,
        );
        assert_eq!(breakdown.discount_amount, Money::new(dec!(5)));
        assert_eq!(breakdown.discount_label.as_deref(), Some("FIVE"));
    }

    #[test]
    fn test_coupon_at_six_does_not_stack() {
        let coupon = Discount::percentage("RESELLER10", dec!(10));
        let volume = Discount::volume();
        let with_coupon = price(
            qty(6),
            unit(),
            Some(&coupon),
            Some(&volume),
            ShippingMethod::Standard,
        );
        let volume_only = price(qty(6), unit(), None, Some(&volume), ShippingMethod::Standard);

        assert_eq!(with_coupon.total.value(), dec!(539.946));
        assert_eq!(with_coupon.total.to_string(), "539.95");
        assert_eq!(with_coupon.amount_minor_units(), Some(53995));
        assert_eq!(with_coupon.total, volume_only.total);
    }

    #[test]
    fn test_express_adds_exactly_44() {
        let coupon = Discount::percentage("RESELLER10", dec!(10));
        for discount in [None, Some(&coupon)] {
            let standard = price(qty(3), unit(), discount, None, ShippingMethod::Standard);
            let express = price(qty(3), unit(), discount, None, ShippingMethod::Express);
            assert_eq!(express.total - standard.total, Money::new(dec!(44)));
        }
    }

    #[test]
    fn test_total_floored_before_shipping() {
        let huge = Discount::fixed("HUGE", dec!(1000));
        let breakdown = price(qty(1), unit(), Some(&huge), None, ShippingMethod::Express);
        assert_eq!(breakdown.total, Money::new(dec!(44)));

        let standard = price(qty(1), unit(), Some(&huge), None, ShippingMethod::Standard);
        assert_eq!(standard.total, Money::ZERO);
    }

    #[test]
    fn test_render_summary() {
        let volume = Discount::volume();
        let breakdown = price(qty(6), unit(), None, Some(&volume), ShippingMethod::Standard);
        assert_eq!(
            breakdown.render(CurrencyCode::USD),
            "Quantity: 6\nSubtotal: $599.94\nVOLUME DISCOUNT: -$59.99\nShipping: FREE\nTotal: $539.95"
        );

        let express = price(qty(1), unit(), None, None, ShippingMethod::Express);
        assert!(express.render(CurrencyCode::USD).contains("Shipping: $44.00"));
        assert!(!express.render(CurrencyCode::USD).contains("DISCOUNT"));
    }

    #[test]
    fn test_shipping_method_parse() {
        assert_eq!("Express".parse::<ShippingMethod>(), Ok(ShippingMethod::Express));
        assert!("overnight".parse::<ShippingMethod>().is_err());
    }
}
