use std::fmt;

pub const DEFAULT_SEED: u32 = 1;
const SEED_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealError {
    EmptyId,
    EmptyInstrument,
    NonPositiveEntryPrice,
    NonPositiveStake,
    ZeroLeverage,
    ZeroDuration,
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "deal id must not be empty"),
            Self::EmptyInstrument => write!(f, "instrument symbol must not be empty"),
            Self::NonPositiveEntryPrice => {
                write!(f, "entry price must be finite and positive")
            }
            Self::NonPositiveStake => write!(f, "stake must be finite and positive"),
            Self::ZeroLeverage => write!(f, "leverage must be at least 1"),
            Self::ZeroDuration => write!(f, "duration must be at least one second"),
        }
    }
}

impl std::error::Error for DealError {}

/// A single timed leveraged position. Immutable after creation except for
/// the `processed` flag flipped by settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    pub id: String,
    pub instrument: String,
    pub side: Side,
    pub stake: f64,
    pub leverage: u32,
    pub entry_price: f64,
    pub start_time_ms: u64,
    pub duration_seconds: u32,
    /// Price-path seed, fixed at creation from the id's numeric tail.
    pub seed: u32,
    pub processed: bool,
}

impl Deal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        instrument: impl Into<String>,
        side: Side,
        stake: f64,
        leverage: u32,
        entry_price: f64,
        start_time_ms: u64,
        duration_seconds: u32,
    ) -> Result<Self, DealError> {
        let id = id.into();
        let instrument = instrument.into();

        if id.trim().is_empty() {
            return Err(DealError::EmptyId);
        }
        if instrument.trim().is_empty() {
            return Err(DealError::EmptyInstrument);
        }
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Err(DealError::NonPositiveEntryPrice);
        }
        if !stake.is_finite() || stake <= 0.0 {
            return Err(DealError::NonPositiveStake);
        }
        if leverage == 0 {
            return Err(DealError::ZeroLeverage);
        }
        if duration_seconds == 0 {
            return Err(DealError::ZeroDuration);
        }

        let seed = seed_from_id(&id);

        Ok(Self {
            id,
            instrument,
            side,
            stake,
            leverage,
            entry_price,
            start_time_ms,
            duration_seconds,
            seed,
            processed: false,
        })
    }

    pub fn expiry_ms(&self) -> u64 {
        self.start_time_ms + u64::from(self.duration_seconds) * 1_000
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_time_ms)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expiry_ms()
    }
}

/// Derives the path seed from a deal id's trailing digit run (at most the
/// last five digits, base 10). Ids without a usable numeric tail fall back
/// to a fixed seed so the simulator stays total.
pub fn seed_from_id(id: &str) -> u32 {
    let tail: Vec<u32> = id
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .filter_map(|ch| ch.to_digit(10))
        .take(SEED_DIGITS)
        .collect();

    let mut seed = 0u32;
    for digit in tail.into_iter().rev() {
        seed = seed * 10 + digit;
    }

    if seed == 0 {
        DEFAULT_SEED
    } else {
        seed
    }
}
