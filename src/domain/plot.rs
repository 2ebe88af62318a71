use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of plots in the order, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u8);

impl Quantity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::QuantityOutOfRange {
                got: value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// Parses a raw query value such as `?quantity=6`. Anything that is not an
    /// integer in range yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(|v| Self::new(v).ok())
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Steps by `delta`, returning `None` when the result leaves the range.
    pub fn step(self, delta: i64) -> Option<Self> {
        Self::new(i64::from(self.0) + delta).ok()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// One purchased plot and the name printed on its certificate.
///
/// While the customer is still typing the name may be empty; leaving the
/// quantity step requires every name to be filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotLineItem {
    pub plot_number: u8,
    pub certificate_name: String,
}

impl PlotLineItem {
    pub fn new(plot_number: u8, certificate_name: impl Into<String>) -> Self {
        Self {
            plot_number,
            certificate_name: certificate_name.into(),
        }
    }

    pub fn is_named(&self) -> bool {
        !self.certificate_name.trim().is_empty()
    }
}

/// Rebuilds the plot list for `quantity`, keeping names already entered at
/// indices that still exist.
pub fn regenerate_plots(existing: &[PlotLineItem], quantity: Quantity) -> Vec<PlotLineItem> {
    (1..=quantity.get())
        .map(|plot_number| {
            let name = existing
                .iter()
                .find(|item| item.plot_number == plot_number)
                .map(|item| item.certificate_name.clone())
                .unwrap_or_default();
            PlotLineItem::new(plot_number, name)
        })
        .collect()
}

/// Returns the plots with trimmed names, or the plot numbers still missing one.
pub fn collect_certificate_names(
    plots: &[PlotLineItem],
) -> Result<Vec<PlotLineItem>, ValidationError> {
    let missing: Vec<u8> = plots
        .iter()
        .filter(|item| !item.is_named())
        .map(|item| item.plot_number)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingCertificateNames(missing));
    }

    Ok(plots
        .iter()
        .map(|item| PlotLineItem::new(item.plot_number, item.certificate_name.trim()))
        .collect())
}
