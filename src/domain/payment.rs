//! Types exchanged with the hosted card-tokenization widget.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selector -> CSS property -> value, handed to the widget when the card form
/// is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardStyle(pub BTreeMap<String, BTreeMap<String, String>>);

impl CardStyle {
    pub fn rule(&self, selector: &str, property: &str) -> Option<&str> {
        self.0
            .get(selector)
            .and_then(|rules| rules.get(property))
            .map(String::as_str)
    }
}

impl Default for CardStyle {
    fn default() -> Self {
        let rules: [(&str, &[(&str, &str)]); 5] = [
            (
                ".input-container",
                &[("borderColor", "#d1d5db"), ("borderRadius", "8px")],
            ),
            (".input-container.is-focus", &[("borderColor", "#2d6a4f")]),
            (".input-container.is-error", &[("borderColor", "#dc2626")]),
            (".message-text", &[("color", "#6b7280")]),
            (".message-icon", &[("color", "#2d6a4f")]),
        ];
        Self(
            rules
                .iter()
                .map(|(selector, props)| {
                    (
                        (*selector).to_owned(),
                        props
                            .iter()
                            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenizeStatus {
    Ok,
    Invalid,
    Error,
}

/// Outcome of `tokenize`: a single-use token, or the widget's error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeResult {
    pub status: TokenizeStatus,
    pub token: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl TokenizeResult {
    pub fn ok(token: impl Into<String>) -> Self {
        Self {
            status: TokenizeStatus::Ok,
            token: Some(token.into()),
            errors: Vec::new(),
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            status: TokenizeStatus::Invalid,
            token: None,
            errors,
        }
    }

    /// The token when the card was accepted, otherwise the message to show.
    pub fn into_token(self) -> Result<String, String> {
        match (self.status, self.token) {
            (TokenizeStatus::Ok, Some(token)) => Ok(token),
            _ if !self.errors.is_empty() => Err(self.errors.join(", ")),
            _ => Err("Payment failed. Please check your card details.".to_string()),
        }
    }
}
