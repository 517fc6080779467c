//! Webhook Models

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tariff::pricing::PriceCalculation;

use crate::webhooks::errors::WebhookError;

/// Event the payload was delivered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WebhookKind {
    ProductUpdated,
    ChannelCreated,
}

impl WebhookKind {
    /// Event type the payload must carry.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::ProductUpdated => "PRODUCT_UPDATED",
            Self::ChannelCreated => "CHANNEL_CREATED",
        }
    }
}

/// Raw catalog webhook body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookPayload {
    pub event_type: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Checked webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    ProductUpdated { product_id: String },
    ChannelCreated { channel_id: String },
}

impl WebhookEvent {
    /// Check a payload delivered as `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidPayload`] if the event type does not match `kind` or the
    /// identifier the event needs is missing or blank.
    pub fn from_payload(kind: WebhookKind, payload: &WebhookPayload) -> Result<Self, WebhookError> {
        if payload.event_type != kind.event_type() {
            return Err(WebhookError::InvalidPayload(format!(
                "expected event type {}, got {}",
                kind.event_type(),
                payload.event_type
            )));
        }

        let (field, id) = match kind {
            WebhookKind::ProductUpdated => ("product_id", &payload.product_id),
            WebhookKind::ChannelCreated => ("channel_id", &payload.channel_id),
        };

        let Some(id) = id.as_ref().filter(|id| !id.trim().is_empty()) else {
            return Err(WebhookError::InvalidPayload(format!("missing {field}")));
        };

        Ok(match kind {
            WebhookKind::ProductUpdated => Self::ProductUpdated {
                product_id: id.clone(),
            },
            WebhookKind::ChannelCreated => Self::ChannelCreated {
                channel_id: id.clone(),
            },
        })
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WebhookOutcome {
    PricesRecalculated {
        product_id: String,
        prices: Vec<PriceCalculation>,
        failed: usize,
    },
    CacheInvalidated {
        channel_id: String,
    },
}
