//! Adapters for the domain ports.

pub mod coupons;
pub mod http;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod widget;
