use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use deal_sim::OutcomeBias;
use runtime::engine::DealEngine;
use settlement::OrderLimits;
use tokio::sync::{broadcast, Mutex};

/// Events pushed to every tick-socket subscriber. Mirrors what the display
/// loop and the deal routes produce.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TickEvent {
    Connected {
        active_deals: usize,
    },
    DealOpened {
        deal_id: String,
        instrument: String,
        side: String,
        entry_px: f64,
    },
    PriceUpdate {
        deal_id: String,
        price: f64,
        pnl: f64,
        progress: f64,
    },
    DealSettled {
        deal_id: String,
        settle_px: f64,
        pnl: f64,
        outcome: String,
    },
}

impl TickEvent {
    pub fn connected(active_deals: usize) -> Self {
        Self::Connected { active_deals }
    }

    pub fn deal_opened(
        deal_id: impl Into<String>,
        instrument: impl Into<String>,
        side: impl Into<String>,
        entry_px: f64,
    ) -> Self {
        Self::DealOpened {
            deal_id: deal_id.into(),
            instrument: instrument.into(),
            side: side.into(),
            entry_px,
        }
    }

    pub fn price_update(deal_id: impl Into<String>, price: f64, pnl: f64, progress: f64) -> Self {
        Self::PriceUpdate {
            deal_id: deal_id.into(),
            price,
            pnl,
            progress,
        }
    }

    pub fn deal_settled(
        deal_id: impl Into<String>,
        settle_px: f64,
        pnl: f64,
        outcome: impl Into<String>,
    ) -> Self {
        Self::DealSettled {
            deal_id: deal_id.into(),
            settle_px,
            pnl,
            outcome: outcome.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    engine: Arc<Mutex<DealEngine>>,
    ticks_tx: broadcast::Sender<TickEvent>,
    order_limits: OrderLimits,
    deal_counter: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(bias: OutcomeBias) -> Self {
        let (ticks_tx, _) = broadcast::channel(256);
        Self {
            engine: Arc::new(Mutex::new(DealEngine::new(bias))),
            ticks_tx,
            order_limits: OrderLimits::default(),
            deal_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn engine(&self) -> Arc<Mutex<DealEngine>> {
        Arc::clone(&self.engine)
    }

    pub fn order_limits(&self) -> &OrderLimits {
        &self.order_limits
    }

    /// Deal ids end in a millisecond timestamp plus a sequence suffix, so
    /// every id carries the numeric tail the path seed is derived from.
    pub fn next_deal_id(&self, now_ms: u64) -> String {
        let seq = self.deal_counter.fetch_add(1, Ordering::Relaxed) % 1_000;
        format!("deal-{now_ms}{seq:03}")
    }

    pub fn subscribe_ticks(&self) -> broadcast::Receiver<TickEvent> {
        self.ticks_tx.subscribe()
    }

    pub fn publish_tick(
        &self,
        event: TickEvent,
    ) -> Result<usize, broadcast::error::SendError<TickEvent>> {
        self.ticks_tx.send(event)
    }
}
