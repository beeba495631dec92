use std::fmt;

use deal_sim::Side;

/// Fixed set of deal lifetimes offered by the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    TenSeconds,
    ThirtySeconds,
    OneMinute,
    TwoMinutes,
    FiveMinutes,
}

impl DurationBucket {
    pub const ALL: [Self; 5] = [
        Self::TenSeconds,
        Self::ThirtySeconds,
        Self::OneMinute,
        Self::TwoMinutes,
        Self::FiveMinutes,
    ];

    pub fn from_secs(seconds: u32) -> Option<Self> {
        match seconds {
            10 => Some(Self::TenSeconds),
            30 => Some(Self::ThirtySeconds),
            60 => Some(Self::OneMinute),
            120 => Some(Self::TwoMinutes),
            300 => Some(Self::FiveMinutes),
            _ => None,
        }
    }

    pub fn as_secs(self) -> u32 {
        match self {
            Self::TenSeconds => 10,
            Self::ThirtySeconds => 30,
            Self::OneMinute => 60,
            Self::TwoMinutes => 120,
            Self::FiveMinutes => 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLimits {
    pub min_stake: f64,
    pub max_stake: f64,
    pub max_leverage: u32,
}

impl Default for OrderLimits {
    fn default() -> Self {
        Self {
            min_stake: 1.0,
            max_stake: 10_000.0,
            max_leverage: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    EmptyInstrument,
    UnknownDurationBucket,
    NonFiniteStake,
    StakeBelowMinimum,
    StakeAboveMaximum,
    ZeroLeverage,
    LeverageAboveMaximum,
    NonPositiveEntryPrice,
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInstrument => write!(f, "instrument must not be empty"),
            Self::UnknownDurationBucket => {
                write!(f, "duration must be one of: 10, 30, 60, 120, 300 seconds")
            }
            Self::NonFiniteStake => write!(f, "stake must be a finite amount"),
            Self::StakeBelowMinimum => write!(f, "stake is below the minimum"),
            Self::StakeAboveMaximum => write!(f, "stake is above the maximum"),
            Self::ZeroLeverage => write!(f, "leverage must be at least 1"),
            Self::LeverageAboveMaximum => write!(f, "leverage is above the maximum"),
            Self::NonPositiveEntryPrice => write!(f, "entry price must be positive"),
        }
    }
}

impl std::error::Error for OrderError {}

/// Order-entry input as submitted by the UI, before a Deal exists.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub instrument: String,
    pub side: Side,
    pub stake: f64,
    pub leverage: u32,
    pub entry_price: f64,
    pub duration_seconds: u32,
}

impl OrderTicket {
    pub fn validate(&self, limits: &OrderLimits) -> Result<DurationBucket, OrderError> {
        if self.instrument.trim().is_empty() {
            return Err(OrderError::EmptyInstrument);
        }

        let bucket = DurationBucket::from_secs(self.duration_seconds)
            .ok_or(OrderError::UnknownDurationBucket)?;

        if !self.stake.is_finite() {
            return Err(OrderError::NonFiniteStake);
        }
        if self.stake < limits.min_stake {
            return Err(OrderError::StakeBelowMinimum);
        }
        if self.stake > limits.max_stake {
            return Err(OrderError::StakeAboveMaximum);
        }
        if self.leverage == 0 {
            return Err(OrderError::ZeroLeverage);
        }
        if self.leverage > limits.max_leverage {
            return Err(OrderError::LeverageAboveMaximum);
        }
        if !self.entry_price.is_finite() || self.entry_price <= 0.0 {
            return Err(OrderError::NonPositiveEntryPrice);
        }

        Ok(bucket)
    }
}
