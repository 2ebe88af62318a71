use crate::domain::payment::{CardStyle, TokenizeResult};
use crate::domain::ports::{CardHandle, PaymentWidget, PaymentsHandle};
use crate::error::WidgetError;
use async_trait::async_trait;
use tracing::debug;

/// Payment widget for headless checkouts where the card was already tokenized
/// elsewhere, e.g. a sandbox test nonce such as `cnon:card-nonce-ok`.
///
/// `tokenize` hands back the preset nonce once the card form is attached.
#[derive(Debug, Clone)]
pub struct PresetNonceWidget {
    nonce: String,
}

impl PresetNonceWidget {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
        }
    }
}

#[async_trait]
impl PaymentWidget for PresetNonceWidget {
    async fn initialize(
        &self,
        app_id: &str,
        location_id: &str,
    ) -> Result<Box<dyn PaymentsHandle>, WidgetError> {
        if app_id.is_empty() || location_id.is_empty() {
            return Err(WidgetError(
                "Payment application and location IDs are required".to_string(),
            ));
        }
        debug!(location_id, "preset widget initialized");
        Ok(Box::new(PresetPayments {
            nonce: self.nonce.clone(),
        }))
    }
}

struct PresetPayments {
    nonce: String,
}

#[async_trait]
impl PaymentsHandle for PresetPayments {
    async fn card(&self, _style: &CardStyle) -> Result<Box<dyn CardHandle>, WidgetError> {
        Ok(Box::new(PresetCard {
            nonce: self.nonce.clone(),
            mount_point: None,
        }))
    }
}

struct PresetCard {
    nonce: String,
    mount_point: Option<String>,
}

#[async_trait]
impl CardHandle for PresetCard {
    async fn attach(&mut self, mount_point: &str) -> Result<(), WidgetError> {
        self.mount_point = Some(mount_point.to_owned());
        Ok(())
    }

    async fn tokenize(&self) -> Result<TokenizeResult, WidgetError> {
        if self.mount_point.is_none() {
            return Err(WidgetError("Card form is not attached".to_string()));
        }
        if self.nonce.trim().is_empty() {
            return Ok(TokenizeResult::rejected(vec![
                "Card nonce is empty".to_string(),
            ]));
        }
        Ok(TokenizeResult::ok(self.nonce.clone()))
    }
}
