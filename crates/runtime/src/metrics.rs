/// One display-loop sweep: how long it took and how many open deals it
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SweepSample {
    latency_micros: u64,
    evaluated: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub sweeps: usize,
    pub evaluated_total: u64,
    pub p50_micros: u64,
    pub p90_micros: u64,
    pub p99_micros: u64,
    pub max_micros: u64,
    /// Sweeps that cost more than the budget. A nonzero count means the
    /// loop cannot keep its cadence at the current book size.
    pub over_budget: usize,
    pub budget_micros: u64,
}

/// Wall-clock cost of display-loop sweeps, recorded by the loop driver
/// against a fixed per-sweep budget (in practice the tick interval).
#[derive(Debug, Clone)]
pub struct SweepLatencyMetrics {
    budget_micros: u64,
    samples: Vec<SweepSample>,
}

impl SweepLatencyMetrics {
    pub fn with_budget(budget_micros: u64) -> Self {
        Self {
            budget_micros,
            samples: Vec::new(),
        }
    }

    pub fn record_sweep(&mut self, latency_micros: u64, evaluated: u64) {
        self.samples.push(SweepSample {
            latency_micros,
            evaluated,
        });
    }

    pub fn report(&self) -> Option<SweepReport> {
        if self.samples.is_empty() {
            return None;
        }

        let mut latencies: Vec<u64> = self
            .samples
            .iter()
            .map(|sample| sample.latency_micros)
            .collect();
        latencies.sort_unstable();
        let sweeps = latencies.len();
        let at_percentile = |percentile: usize| latencies[(sweeps - 1) * percentile / 100];

        Some(SweepReport {
            sweeps,
            evaluated_total: self.samples.iter().map(|sample| sample.evaluated).sum(),
            p50_micros: at_percentile(50),
            p90_micros: at_percentile(90),
            p99_micros: at_percentile(99),
            max_micros: latencies[sweeps - 1],
            over_budget: self
                .samples
                .iter()
                .filter(|sample| sample.latency_micros > self.budget_micros)
                .count(),
            budget_micros: self.budget_micros,
        })
    }
}
