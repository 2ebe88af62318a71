use crate::domain::discount::Discount;
use crate::domain::ports::CouponLookup;
use crate::error::CouponError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Coupon lookup backed by a fixed table from configuration.
///
/// Stands in for a server-side validation call; the delay mimics the round
/// trip so callers exercise the same suspension point.
#[derive(Debug, Clone)]
pub struct StaticCouponTable {
    coupons: HashMap<String, Discount>,
    delay: Duration,
}

impl StaticCouponTable {
    pub fn new(coupons: impl IntoIterator<Item = Discount>, delay: Duration) -> Self {
        Self {
            coupons: coupons
                .into_iter()
                .map(|d| (d.code().to_uppercase(), d))
                .collect(),
            delay,
        }
    }
}

#[async_trait]
impl CouponLookup for StaticCouponTable {
    async fn lookup(&self, code: &str) -> Result<Discount, CouponError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let found = self.coupons.get(code).cloned();
        debug!(code, found = found.is_some(), "coupon lookup");
        found.ok_or(CouponError::NotFound)
    }
}
