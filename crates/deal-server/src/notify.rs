use std::fmt;

use runtime::events::EngineEvent;
use serde::Serialize;

/// Outbound settlement notification, POSTed to the configured webhook as
/// JSON. A fire-and-forget operational message, not a trade record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementNotice {
    pub deal_id: String,
    pub instrument: String,
    pub side: String,
    pub settle_px: f64,
    pub pnl: f64,
    pub outcome: String,
    pub settled_at_ms: u64,
}

impl SettlementNotice {
    pub fn from_engine_event(event: &EngineEvent, settled_at_ms: u64) -> Option<Self> {
        match event {
            EngineEvent::DealSettled {
                deal_id,
                instrument,
                side,
                settle_price,
                pnl,
                outcome,
                ..
            } => Some(Self {
                deal_id: deal_id.clone(),
                instrument: instrument.clone(),
                side: side.as_str().to_string(),
                settle_px: *settle_price,
                pnl: *pnl,
                outcome: outcome.as_str().to_string(),
                settled_at_ms,
            }),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum NotifyError {
    Request(reqwest::Error),
    RejectedStatus(u16),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "webhook request failed: {err}"),
            Self::RejectedStatus(status) => {
                write!(f, "webhook responded with status {status}")
            }
        }
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::RejectedStatus(_) => None,
        }
    }
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub async fn send(&self, notice: &SettlementNotice) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(NotifyError::Request)?;

        if !response.status().is_success() {
            return Err(NotifyError::RejectedStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
