use crate::deal::Deal;
use crate::simulator::{simulate_price, OutcomeBias};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Offset from the deal's start time, in milliseconds.
    pub offset_ms: u64,
    pub price: f64,
}

/// Resamples the deal's price path from its start up to `now_ms` (clamped
/// to expiry) as `points + 1` evenly spaced samples, for chart rendering.
///
/// Each sample re-evaluates the simulator at the corresponding timestamp,
/// so a redrawn chart agrees bit-for-bit with what the live views showed
/// at the same elapsed time.
pub fn sample_path(deal: &Deal, now_ms: u64, bias: OutcomeBias, points: usize) -> Vec<PathPoint> {
    let points = points.max(1) as u64;
    let span_ms = deal.elapsed_ms(now_ms).min(u64::from(deal.duration_seconds) * 1_000);

    (0..=points)
        .map(|index| {
            let offset_ms = span_ms * index / points;
            PathPoint {
                offset_ms,
                price: simulate_price(deal, deal.start_time_ms + offset_ms, bias),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sample_path;
    use crate::deal::{Deal, Side};
    use crate::simulator::{simulate_price, OutcomeBias};

    const START_MS: u64 = 1_700_000_000_000;

    fn sample_deal() -> Deal {
        Deal::new(
            "deal-1700000031415",
            "SOL-USD",
            Side::Long,
            25.0,
            5,
            150.0,
            START_MS,
            60,
        )
        .unwrap()
    }

    #[test]
    fn path_has_requested_point_count_plus_origin() {
        let deal = sample_deal();
        let path = sample_path(&deal, START_MS + 30_000, OutcomeBias::Default, 40);
        assert_eq!(path.len(), 41);
    }

    #[test]
    fn path_starts_at_entry_price_and_ends_at_live_price() {
        let deal = sample_deal();
        let now = START_MS + 30_000;
        let path = sample_path(&deal, now, OutcomeBias::Default, 40);

        assert_eq!(path[0].offset_ms, 0);
        assert_eq!(path[0].price, 150.0);

        let last = path.last().unwrap();
        assert_eq!(last.offset_ms, 30_000);
        assert_eq!(
            last.price.to_bits(),
            simulate_price(&deal, now, OutcomeBias::Default).to_bits()
        );
    }

    #[test]
    fn path_offsets_never_pass_expiry() {
        let deal = sample_deal();
        let path = sample_path(&deal, START_MS + 500_000, OutcomeBias::Default, 20);

        assert!(path.windows(2).all(|pair| pair[0].offset_ms <= pair[1].offset_ms));
        assert_eq!(path.last().unwrap().offset_ms, 60_000);
    }

    #[test]
    fn zero_requested_points_still_yields_both_endpoints() {
        let deal = sample_deal();
        let path = sample_path(&deal, START_MS + 10_000, OutcomeBias::Default, 0);
        assert_eq!(path.len(), 2);
    }
}
