use crate::domain::plot::Quantity;
use crate::domain::ports::QuantityCache;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding checkout session values.
pub const CF_CHECKOUT: &str = "checkout";
/// The single key the quantity is stored under.
pub const QUANTITY_KEY: &[u8] = b"checkoutQuantity";

/// Persistent quantity cache backed by RocksDB.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbQuantityCache {
    db: Arc<DB>,
}

impl RocksDbQuantityCache {
    /// Opens or creates the database at `path`, with the checkout column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_checkout = ColumnFamilyDescriptor::new(CF_CHECKOUT, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_checkout])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_CHECKOUT)
            .ok_or_else(|| CheckoutError::Storage("Checkout column family not found".to_string()))
    }
}

#[async_trait]
impl QuantityCache for RocksDbQuantityCache {
    async fn load(&self) -> Result<Option<Quantity>> {
        let Some(bytes) = self.db.get_cf(self.cf()?, QUANTITY_KEY)? else {
            return Ok(None);
        };
        // A corrupt or out of range value is treated as absent.
        Ok(serde_json::from_slice::<Quantity>(&bytes).ok())
    }

    async fn save(&self, quantity: Quantity) -> Result<()> {
        let value = serde_json::to_vec(&quantity)?;
        self.db.put_cf(self.cf()?, QUANTITY_KEY, value)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.db.delete_cf(self.cf()?, QUANTITY_KEY)?;
        Ok(())
    }
}
