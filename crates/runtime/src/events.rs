use deal_sim::Side;
use settlement::Outcome;

/// One display-loop sweep emits a start marker, one evaluation per open
/// deal, one settlement per expired deal, and a completion marker.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SweepStarted {
        tick: u64,
        open_deals: usize,
    },
    PriceEvaluated {
        deal_id: String,
        price: f64,
        pnl: f64,
        progress: f64,
    },
    DealSettled {
        deal_id: String,
        instrument: String,
        side: Side,
        stake: f64,
        leverage: u32,
        entry_price: f64,
        settle_price: f64,
        pnl: f64,
        outcome: Outcome,
    },
    SweepCompleted {
        tick: u64,
        evaluated: usize,
        settled: usize,
    },
}
