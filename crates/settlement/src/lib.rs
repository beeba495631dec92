pub mod order;
pub mod outcome;

pub use order::{DurationBucket, OrderError, OrderLimits, OrderTicket};
pub use outcome::{settle, Outcome, SettleError, Settlement};
