pub mod book;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod metrics;

/// Evaluation budget the benches report against: a full sweep of a busy
/// book should stay comfortably under the display-loop cadence.
pub const TARGET_EVALS_PER_SEC: u64 = 200_000;

pub fn module_ready() -> bool {
    true
}
