use super::discount::Discount;
use super::order::{OrderConfirmation, OrderRequest};
use super::payment::{CardStyle, TokenizeResult};
use super::plot::Quantity;
use crate::error::{CouponError, Result, WidgetError};
use async_trait::async_trait;

/// Resolves a normalized coupon code to its discount.
#[async_trait]
pub trait CouponLookup: Send + Sync {
    async fn lookup(&self, code: &str) -> std::result::Result<Discount, CouponError>;
}

/// Remembers the chosen quantity between visits.
#[async_trait]
pub trait QuantityCache: Send + Sync {
    async fn load(&self) -> Result<Option<Quantity>>;
    async fn save(&self, quantity: Quantity) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Backend that takes a tokenized payment and places the order.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation>;
}

/// Hosted card-tokenization widget. The crate never sees raw card numbers.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn initialize(
        &self,
        app_id: &str,
        location_id: &str,
    ) -> std::result::Result<Box<dyn PaymentsHandle>, WidgetError>;
}

#[async_trait]
pub trait PaymentsHandle: Send + Sync {
    async fn card(&self, style: &CardStyle) -> std::result::Result<Box<dyn CardHandle>, WidgetError>;
}

#[async_trait]
pub trait CardHandle: Send + Sync {
    async fn attach(&mut self, mount_point: &str) -> std::result::Result<(), WidgetError>;
    async fn tokenize(&self) -> std::result::Result<TokenizeResult, WidgetError>;
}

pub type CouponLookupBox = Box<dyn CouponLookup>;
pub type QuantityCacheBox = Box<dyn QuantityCache>;
pub type OrderGatewayBox = Box<dyn OrderGateway>;
pub type PaymentWidgetBox = Box<dyn PaymentWidget>;
