//! The order submitted to the backend once the card has been tokenized.

use crate::domain::checkout::{CheckoutState, Step};
use crate::domain::delivery::DeliveryInfo;
use crate::domain::discount::{Discount, DiscountKind};
use crate::domain::money::{CurrencyCode, Money, serialize_decimal};
use crate::domain::plot::{PlotLineItem, Quantity, collect_certificate_names};
use crate::domain::pricing::ShippingMethod;
use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountMoney {
    /// Minor units (cents).
    pub amount: i64,
    pub currency: CurrencyCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingContact {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub phone: String,
    pub address_lines: Vec<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country_code: String,
}

impl From<&DeliveryInfo> for BillingContact {
    fn from(info: &DeliveryInfo) -> Self {
        Self {
            given_name: info.first_name().to_owned(),
            family_name: info.last_name().to_owned(),
            email: info.email().as_str().to_owned(),
            phone: info.phone().to_owned(),
            address_lines: info.address_lines(),
            city: info.city().to_owned(),
            state: info.state().to_owned(),
            postal_code: info.postal_code().to_owned(),
            country_code: info.country().to_owned(),
        }
    }
}

/// The discount that was actually applied, with its computed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedDiscount {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    #[serde(serialize_with = "serialize_decimal")]
    pub value: Decimal,
    pub amount: Money,
}

impl AppliedDiscount {
    fn new(discount: &Discount, amount: Money) -> Self {
        Self {
            code: discount.code().to_owned(),
            kind: discount.kind(),
            value: discount.value(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingSelection {
    pub method: ShippingMethod,
    pub cost: Money,
}

/// Body of `POST /api/process-payment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub source_id: String,
    pub amount_money: AmountMoney,
    pub location_id: String,
    pub idempotency_key: Uuid,
    pub billing_contact: BillingContact,
    pub plots: Vec<PlotLineItem>,
    pub quantity: Quantity,
    pub discount: Option<AppliedDiscount>,
    pub shipping: ShippingSelection,
}

impl OrderRequest {
    /// Builds the order from a checkout that has reached the payment step.
    ///
    /// Each call generates a new idempotency key, so a manual retry after a
    /// failure is a distinct attempt.
    pub fn build(
        state: &CheckoutState,
        source_id: impl Into<String>,
        location_id: impl Into<String>,
        currency: CurrencyCode,
    ) -> Result<Self, ValidationError> {
        let delivery = match (state.step(), state.delivery()) {
            (Step::Payment, Some(delivery)) => delivery,
            _ => {
                return Err(ValidationError::InvalidTransition {
                    from: state.step(),
                    to: Step::Payment,
                });
            }
        };

        let plots = collect_certificate_names(state.plots())?;
        let pricing = state.pricing();
        let amount = pricing
            .amount_minor_units()
            .ok_or(ValidationError::AmountOutOfRange)?;
        let discount = state
            .active_discount()
            .map(|d| AppliedDiscount::new(d, pricing.discount_amount));

        Ok(Self {
            source_id: source_id.into(),
            amount_money: AmountMoney { amount, currency },
            location_id: location_id.into(),
            idempotency_key: Uuid::new_v4(),
            billing_contact: BillingContact::from(delivery),
            plots,
            quantity: state.quantity(),
            discount,
            shipping: ShippingSelection {
                method: pricing.shipping_method,
                cost: pricing.shipping_cost,
            },
        })
    }
}

/// Successful backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Backend reply on a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderFailure {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::DeliveryForm;
    use rust_decimal_macros::dec;

    fn payment_ready(quantity: i64) -> CheckoutState {
        let mut state = CheckoutState::new(
            Money::new(dec!(99.99)),
            Quantity::new(quantity).unwrap(),
        );
        for n in 1..=state.quantity().get() {
            state.set_certificate_name(n, format!("Owner {n}")).unwrap();
        }
        state.continue_to_details().unwrap();
        state
            .continue_to_shipping(&DeliveryForm {
                first_name: "Aoife".into(),
                last_name: "Byrne".into(),
                email: "a@b.co".into(),
                phone: "0871234567".into(),
                address1: "12 Main Street".into(),
                address2: "Apt 4".into(),
                city: "Galway".into(),
                state: "Connacht".into(),
                zip: "H91".into(),
                country: "IE".into(),
            })
            .unwrap();
        state.select_shipping(ShippingMethod::Express);
        state.continue_to_payment().unwrap();
        state
    }

    #[test]
    fn test_build_requires_payment_step() {
        let state = CheckoutState::new(Money::new(dec!(99.99)), Quantity::default());
        assert!(matches!(
            OrderRequest::build(&state, "tok", "LOC", CurrencyCode::USD),
            Err(ValidationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_wire_format() {
        let state = payment_ready(6);
        let order = OrderRequest::build(&state, "cnon:ok", "LOC1", CurrencyCode::USD).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["sourceId"], "cnon:ok");
        assert_eq!(json["locationId"], "LOC1");
        // 539.946 + 44.00
        assert_eq!(json["amountMoney"]["amount"], 58395);
        assert_eq!(json["amountMoney"]["currency"], "USD");
        assert_eq!(json["quantity"], 6);
        assert_eq!(json["plots"][5]["plotNumber"], 6);
        assert_eq!(json["plots"][5]["certificateName"], "Owner 6");
        assert_eq!(json["billingContact"]["givenName"], "Aoife");
        assert_eq!(json["billingContact"]["postalCode"], "H91");
        assert_eq!(json["billingContact"]["countryCode"], "IE");
        assert_eq!(
            json["billingContact"]["addressLines"],
            serde_json::json!(["12 Main Street", "Apt 4"])
        );
        assert_eq!(json["discount"]["code"], "VOLUME DISCOUNT");
        assert_eq!(json["discount"]["type"], "percentage");
        assert_eq!(json["discount"]["amount"], 59.99);
        assert_eq!(json["shipping"]["method"], "express");
        assert_eq!(json["shipping"]["cost"], 44.0);
        assert!(Uuid::parse_str(json["idempotencyKey"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_no_discount_serializes_as_null() {
        let state = payment_ready(1);
        let order = OrderRequest::build(&state, "tok", "LOC", CurrencyCode::USD).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert!(json["discount"].is_null());
        assert_eq!(json["amountMoney"]["amount"], 14399);
    }

    #[test]
    fn test_each_build_gets_fresh_idempotency_key() {
        let state = payment_ready(1);
        let first = OrderRequest::build(&state, "tok", "LOC", CurrencyCode::USD).unwrap();
        let second = OrderRequest::build(&state, "tok", "LOC", CurrencyCode::USD).unwrap();
        assert_ne!(first.idempotency_key, second.idempotency_key);
    }

    #[test]
    fn test_confirmation_tolerates_missing_order_id() {
        let ok: OrderConfirmation = serde_json::from_str(r#"{"orderId":"ORD-1"}"#).unwrap();
        assert_eq!(ok.order_id.as_deref(), Some("ORD-1"));
        let empty: OrderConfirmation = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.order_id, None);
    }
}
