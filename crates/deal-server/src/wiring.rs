use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use api::state::{AppState, TickEvent};
use axum::{routing::get, Router};
use runtime::events::EngineEvent;
use runtime::ledger::{LedgerCsvWriter, LedgerRow};
use runtime::logging::{InMemoryRunLogWriter, RunLogEvent, RunLogEventKind, RunLogWriter};
use runtime::metrics::SweepLatencyMetrics;
use tokio::task::JoinHandle;

use crate::notify::{SettlementNotice, WebhookNotifier};

pub fn build_app(state: AppState) -> Router {
    debug_assert!(runtime::module_ready());
    debug_assert!(api::module_ready());
    debug_assert!(ui::module_ready());

    api::app(state).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Drives the display loop: one engine sweep per interval tick, fanning
/// sweep results out to the tick socket, the ledger artifact and the
/// settlement webhook.
pub fn spawn_display_loop(
    state: AppState,
    tick_interval: Duration,
    mut ledger: LedgerCsvWriter<File>,
    notifier: Option<WebhookNotifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut run_log = InMemoryRunLogWriter::new();
        let mut metrics = SweepLatencyMetrics::with_budget(tick_interval.as_micros() as u64);
        let mut interval = tokio::time::interval(tick_interval);
        let mut tick = 0u64;

        loop {
            interval.tick().await;
            tick += 1;

            let now_ms = unix_now_ms();
            let started = Instant::now();
            let events = {
                let engine = state.engine();
                let mut engine = engine.lock().await;
                engine.step_once(now_ms).await
            };
            let evaluated = events
                .iter()
                .find_map(|event| match event {
                    EngineEvent::SweepCompleted { evaluated, .. } => Some(*evaluated as u64),
                    _ => None,
                })
                .unwrap_or(0);
            metrics.record_sweep(started.elapsed().as_micros() as u64, evaluated);
            if tick % 100 == 0 {
                if let Some(report) = metrics.report() {
                    println!(
                        "sweep_latency p50_micros={} p99_micros={} max_micros={} over_budget={}/{} evaluated_total={}",
                        report.p50_micros,
                        report.p99_micros,
                        report.max_micros,
                        report.over_budget,
                        report.sweeps,
                        report.evaluated_total
                    );
                }
            }

            for event in &events {
                handle_sweep_event(
                    event, now_ms, tick, &state, &mut ledger, &notifier, &mut run_log,
                )
                .await;
            }
        }
    })
}

async fn handle_sweep_event(
    event: &EngineEvent,
    now_ms: u64,
    tick: u64,
    state: &AppState,
    ledger: &mut LedgerCsvWriter<File>,
    notifier: &Option<WebhookNotifier>,
    run_log: &mut InMemoryRunLogWriter,
) {
    match event {
        EngineEvent::PriceEvaluated {
            deal_id,
            price,
            pnl,
            progress,
        } => {
            let _ = state.publish_tick(TickEvent::price_update(
                deal_id.clone(),
                *price,
                *pnl,
                *progress,
            ));
        }
        EngineEvent::DealSettled {
            deal_id,
            settle_price,
            pnl,
            outcome,
            ..
        } => {
            let _ = state.publish_tick(TickEvent::deal_settled(
                deal_id.clone(),
                *settle_price,
                *pnl,
                outcome.as_str(),
            ));
            run_log.write(RunLogEvent::new(
                tick,
                RunLogEventKind::DealSettled,
                Some(deal_id.clone()),
            ));

            if let Some(row) = LedgerRow::from_settled_event(event, now_ms) {
                if let Err(err) = ledger.append_row_and_log(&row, tick, run_log) {
                    eprintln!("ledger append failed for {deal_id}: {err}");
                }
            }

            if let (Some(notifier), Some(notice)) = (
                notifier.as_ref(),
                SettlementNotice::from_engine_event(event, now_ms),
            ) {
                match notifier.send(&notice).await {
                    Ok(()) => run_log.write(RunLogEvent::new(
                        tick,
                        RunLogEventKind::WebhookDelivered,
                        Some(deal_id.clone()),
                    )),
                    Err(err) => {
                        eprintln!("settlement webhook failed for {deal_id}: {err}");
                        run_log.write(RunLogEvent::new(
                            tick,
                            RunLogEventKind::WebhookFailed,
                            Some(deal_id.clone()),
                        ));
                    }
                }
            }
        }
        EngineEvent::SweepCompleted { .. } => {
            run_log.write(RunLogEvent::new(tick, RunLogEventKind::SweepCompleted, None));
        }
        EngineEvent::SweepStarted { .. } => {}
    }
}
