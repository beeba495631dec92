mod deal;
mod path;
mod pnl;
mod simulator;

pub use deal::{seed_from_id, Deal, DealError, Side, DEFAULT_SEED};
pub use path::{sample_path, PathPoint};
pub use pnl::{pnl, pnl_ratio};
pub use simulator::{progress, simulate_price, OutcomeBias, MAX_CHANGE_PCT, TICK_SECONDS};
