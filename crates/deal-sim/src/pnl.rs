use crate::deal::{Deal, Side};

/// Fractional gain of the position at `price`, before leverage and stake.
/// Long deals gain when the price rises, short deals when it falls.
pub fn pnl_ratio(side: Side, entry_price: f64, price: f64) -> f64 {
    match side {
        Side::Long => (price - entry_price) / entry_price,
        Side::Short => (entry_price - price) / entry_price,
    }
}

/// Profit or loss of the deal at `price`, in stake currency. This is the
/// single PnL derivation every consumer must share.
pub fn pnl(deal: &Deal, price: f64) -> f64 {
    pnl_ratio(deal.side, deal.entry_price, price) * f64::from(deal.leverage) * deal.stake
}

#[cfg(test)]
mod tests {
    use super::{pnl, pnl_ratio};
    use crate::deal::{Deal, Side};

    fn deal(side: Side, stake: f64, leverage: u32) -> Deal {
        Deal::new("deal-42", "ETH-USD", side, stake, leverage, 200.0, 0, 30).unwrap()
    }

    #[test]
    fn long_ratio_is_positive_when_price_rises() {
        assert_eq!(pnl_ratio(Side::Long, 200.0, 210.0), 0.05);
        assert_eq!(pnl_ratio(Side::Long, 200.0, 190.0), -0.05);
    }

    #[test]
    fn short_ratio_is_positive_when_price_falls() {
        assert_eq!(pnl_ratio(Side::Short, 200.0, 190.0), 0.05);
        assert_eq!(pnl_ratio(Side::Short, 200.0, 210.0), -0.05);
    }

    #[test]
    fn pnl_scales_with_leverage_and_stake() {
        let d = deal(Side::Long, 50.0, 10);
        assert_eq!(pnl(&d, 210.0), 0.05 * 10.0 * 50.0);

        let flat = deal(Side::Short, 50.0, 10);
        assert_eq!(pnl(&flat, 200.0), 0.0);
    }
}
