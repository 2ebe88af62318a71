//! Application layer orchestrating a checkout.
//!
//! This module defines the `CheckoutController`, which owns the checkout state
//! and is the only place the domain meets the external ports: coupon lookup,
//! the hosted payment widget, the order backend and the quantity cache.

pub mod checkout;
