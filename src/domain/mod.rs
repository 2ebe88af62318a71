//! Checkout domain: pricing, the step state machine, and the ports through
//! which the checkout reaches coupon lookup, the payment widget, the order
//! backend, and the quantity cache.

pub mod checkout;
pub mod delivery;
pub mod discount;
pub mod money;
pub mod order;
pub mod payment;
pub mod plot;
pub mod ports;
pub mod pricing;
