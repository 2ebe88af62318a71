use crate::config::ConfigError;
use crate::domain::checkout::Step;
use thiserror::Error;

/// A required input is missing or malformed. Blocks the step transition that
/// triggered it and leaves previously collected state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quantity must be between {min} and {max}, got {got}")]
    QuantityOutOfRange { got: i64, min: u8, max: u8 },
    #[error("Please enter a name for each certificate (missing plot {})", format_plots(.0))]
    MissingCertificateNames(Vec<u8>),
    #[error("Plot #{0} is not part of this order")]
    UnknownPlot(u8),
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },
    #[error("Plots can only be changed on step 1 (quantity), currently on {0}")]
    PlotsLocked(Step),
    #[error("Order total cannot be represented in minor units")]
    AmountOutOfRange,
}

fn format_plots(plots: &[u8]) -> String {
    plots
        .iter()
        .map(|p| format!("#{p}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("Please enter a coupon code")]
    Empty,
    #[error("Invalid coupon code")]
    NotFound,
    #[error("A coupon has already been applied to this order")]
    AlreadyApplied,
}

/// Failure reported by the hosted payment widget.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct WidgetError(pub String);

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error("Failed to load payment form. {0}")]
    WidgetInit(String),
    #[error("{0}")]
    Tokenization(String),
    #[error("Payment processing failed: {0}")]
    Submission(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
