use deal_sim::{pnl, progress, simulate_price, Deal, OutcomeBias};
use settlement::settle;

use crate::book::{BookError, DealBook};
use crate::events::EngineEvent;

/// Settled deals kept around for chart redraws before they age out.
const RECENT_SETTLED_CAP: usize = 64;

/// The display-loop engine: owns the active deal book and the session's
/// outcome bias, and advances one sweep at a time. The caller supplies
/// `now_ms`; the engine itself never reads a clock.
#[derive(Debug)]
pub struct DealEngine {
    book: DealBook,
    settled: Vec<Deal>,
    bias: OutcomeBias,
    tick: u64,
}

impl DealEngine {
    pub fn new(bias: OutcomeBias) -> Self {
        Self {
            book: DealBook::new(),
            settled: Vec::new(),
            bias,
            tick: 0,
        }
    }

    pub fn bias(&self) -> OutcomeBias {
        self.bias
    }

    pub fn set_bias(&mut self, bias: OutcomeBias) {
        self.bias = bias;
    }

    pub fn book(&self) -> &DealBook {
        &self.book
    }

    pub fn open_deal(&mut self, deal: Deal) -> Result<(), BookError> {
        self.book.open(deal)
    }

    /// Looks up a deal by id, open or recently settled. Settled deals stay
    /// reachable so the final chart frame can still be redrawn; the
    /// simulator freezes their path at expiry.
    pub fn find_deal(&self, id: &str) -> Option<&Deal> {
        self.book
            .get(id)
            .or_else(|| self.settled.iter().find(|deal| deal.id == id))
    }

    /// One sweep: evaluate every open deal at `now_ms`, then settle the
    /// ones whose lifetime has elapsed.
    pub async fn step_once(&mut self, now_ms: u64) -> Vec<EngineEvent> {
        self.tick += 1;
        tokio::task::yield_now().await;

        let mut events = vec![EngineEvent::SweepStarted {
            tick: self.tick,
            open_deals: self.book.len(),
        }];

        let mut evaluated = 0;
        for deal in self.book.snapshot() {
            let price = simulate_price(deal, now_ms, self.bias);
            events.push(EngineEvent::PriceEvaluated {
                deal_id: deal.id.clone(),
                price,
                pnl: pnl(deal, price),
                progress: progress(deal, now_ms),
            });
            evaluated += 1;
        }

        let mut settled = 0;
        for mut deal in self.book.take_expired(now_ms) {
            let settlement = settle(&deal, now_ms, self.bias)
                .expect("book only hands out unprocessed expired deals");
            deal.processed = true;
            settled += 1;

            events.push(EngineEvent::DealSettled {
                deal_id: deal.id.clone(),
                instrument: deal.instrument.clone(),
                side: deal.side,
                stake: deal.stake,
                leverage: deal.leverage,
                entry_price: deal.entry_price,
                settle_price: settlement.settle_price,
                pnl: settlement.pnl,
                outcome: settlement.outcome,
            });

            self.settled.push(deal);
            if self.settled.len() > RECENT_SETTLED_CAP {
                self.settled.remove(0);
            }
        }

        events.push(EngineEvent::SweepCompleted {
            tick: self.tick,
            evaluated,
            settled,
        });
        events
    }
}
