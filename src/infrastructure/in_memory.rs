use crate::domain::plot::Quantity;
use crate::domain::ports::QuantityCache;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Quantity cache that lives only as long as the process.
///
/// `Clone` shares the slot, so a test can keep a handle and inspect what the
/// checkout stored.
#[derive(Default, Clone)]
pub struct InMemoryQuantityCache {
    slot: Arc<RwLock<Option<Quantity>>>,
}

impl InMemoryQuantityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quantity(quantity: Quantity) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(quantity))),
        }
    }
}

#[async_trait]
impl QuantityCache for InMemoryQuantityCache {
    async fn load(&self) -> Result<Option<Quantity>> {
        Ok(*self.slot.read().await)
    }

    async fn save(&self, quantity: Quantity) -> Result<()> {
        *self.slot.write().await = Some(quantity);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}
