use std::fmt;

use deal_sim::{pnl, pnl_ratio, simulate_price, Deal, OutcomeBias};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Flat,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleError {
    DealStillOpen,
    AlreadyProcessed,
}

impl fmt::Display for SettleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DealStillOpen => write!(f, "deal has not reached its expiry yet"),
            Self::AlreadyProcessed => write!(f, "deal was already settled"),
        }
    }
}

impl std::error::Error for SettleError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub settle_price: f64,
    pub pnl_ratio: f64,
    pub pnl: f64,
    pub outcome: Outcome,
}

/// Finalizes an expired deal. The simulator's value at the expiry boundary
/// is the authoritative settlement price; no extra snapping toward the
/// steering target is applied.
pub fn settle(deal: &Deal, now_ms: u64, bias: OutcomeBias) -> Result<Settlement, SettleError> {
    if deal.processed {
        return Err(SettleError::AlreadyProcessed);
    }
    if !deal.is_expired(now_ms) {
        return Err(SettleError::DealStillOpen);
    }

    let settle_price = simulate_price(deal, deal.expiry_ms(), bias);
    let ratio = pnl_ratio(deal.side, deal.entry_price, settle_price);
    let outcome = if ratio > 0.0 {
        Outcome::Won
    } else if ratio < 0.0 {
        Outcome::Lost
    } else {
        Outcome::Flat
    };

    Ok(Settlement {
        settle_price,
        pnl_ratio: ratio,
        pnl: pnl(deal, settle_price),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use deal_sim::{simulate_price, Deal, OutcomeBias, Side};

    use super::{settle, Outcome, SettleError};

    const START_MS: u64 = 1_700_000_000_000;

    fn sample_deal(side: Side) -> Deal {
        Deal::new(
            "deal-1700000024680",
            "BTC-USD",
            side,
            50.0,
            10,
            64_000.0,
            START_MS,
            60,
        )
        .unwrap()
    }

    #[test]
    fn settling_an_open_deal_is_rejected() {
        let deal = sample_deal(Side::Long);
        assert_eq!(
            settle(&deal, START_MS + 30_000, OutcomeBias::Win),
            Err(SettleError::DealStillOpen)
        );
    }

    #[test]
    fn settling_a_processed_deal_is_rejected() {
        let mut deal = sample_deal(Side::Long);
        deal.processed = true;
        assert_eq!(
            settle(&deal, START_MS + 90_000, OutcomeBias::Win),
            Err(SettleError::AlreadyProcessed)
        );
    }

    #[test]
    fn win_bias_settles_as_won_for_both_sides() {
        for side in [Side::Long, Side::Short] {
            let deal = sample_deal(side);
            let settlement = settle(&deal, deal.expiry_ms(), OutcomeBias::Win).unwrap();

            assert_eq!(settlement.outcome, Outcome::Won);
            assert!(settlement.pnl > 0.0);
        }
    }

    #[test]
    fn lose_bias_settles_as_lost_for_both_sides() {
        for side in [Side::Long, Side::Short] {
            let deal = sample_deal(side);
            let settlement = settle(&deal, deal.expiry_ms(), OutcomeBias::Lose).unwrap();

            assert_eq!(settlement.outcome, Outcome::Lost);
            assert!(settlement.pnl < 0.0);
        }
    }

    #[test]
    fn settlement_price_is_the_simulator_boundary_value() {
        let deal = sample_deal(Side::Long);
        let settlement = settle(&deal, START_MS + 300_000, OutcomeBias::Default).unwrap();

        let boundary = simulate_price(&deal, deal.expiry_ms(), OutcomeBias::Default);
        assert_eq!(settlement.settle_price.to_bits(), boundary.to_bits());
    }
}
