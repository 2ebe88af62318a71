use crate::error::{CheckoutError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One `plot,certificate_name` row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CertificateRow {
    pub plot: u8,
    #[serde(default)]
    pub certificate_name: String,
}

/// Reads certificate names from a CSV source.
///
/// This reader wraps `csv::Reader` and trims every field, so
/// `1, Aoife Byrne` and `1,Aoife Byrne` read the same.
pub struct CertificateNameReader<R: Read> {
    reader: csv::Reader<R>,
}

impl CertificateNameReader<File> {
    /// Opens a CSV file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> CertificateNameReader<R> {
    /// Creates a new `CertificateNameReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn rows(self) -> impl Iterator<Item = Result<CertificateRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}
