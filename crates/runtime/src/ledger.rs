use std::io::{self, Write};

use deal_sim::Side;
use settlement::Outcome;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::events::EngineEvent;
use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter};

pub const LEDGER_CSV_HEADER: &str =
    "settled_at,deal_id,instrument,side,stake,leverage,entry_px,settle_px,pnl,outcome\n";

/// One settled deal, as written to the ledger artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub settled_at_ms: u64,
    pub deal_id: String,
    pub instrument: String,
    pub side: Side,
    pub stake: f64,
    pub leverage: u32,
    pub entry_price: f64,
    pub settle_price: f64,
    pub pnl: f64,
    pub outcome: Outcome,
}

impl LedgerRow {
    /// Builds a row from a `DealSettled` engine event; other events have
    /// no ledger representation.
    pub fn from_settled_event(event: &EngineEvent, settled_at_ms: u64) -> Option<Self> {
        match event {
            EngineEvent::DealSettled {
                deal_id,
                instrument,
                side,
                stake,
                leverage,
                entry_price,
                settle_price,
                pnl,
                outcome,
            } => Some(Self {
                settled_at_ms,
                deal_id: deal_id.clone(),
                instrument: instrument.clone(),
                side: *side,
                stake: *stake,
                leverage: *leverage,
                entry_price: *entry_price,
                settle_price: *settle_price,
                pnl: *pnl,
                outcome: *outcome,
            }),
            _ => None,
        }
    }
}

pub struct LedgerCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> LedgerCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(LEDGER_CSV_HEADER.as_bytes())?;
        self.writer.flush()
    }

    pub fn write_header_and_log(
        &mut self,
        tick: u64,
        run_log_writer: &mut dyn RunLogWriter,
    ) -> io::Result<()> {
        self.write_header()?;
        run_log_writer.write(RunLogEvent::new(
            tick,
            RunLogEventKind::LedgerHeaderWritten,
            None,
        ));
        Ok(())
    }

    pub fn append_row(&mut self, row: &LedgerRow) -> io::Result<()> {
        let settled_at = rfc3339_utc(row.settled_at_ms)?;
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{}",
            settled_at,
            escape_csv_field(&row.deal_id),
            escape_csv_field(&row.instrument),
            row.side.as_str(),
            row.stake,
            row.leverage,
            row.entry_price,
            row.settle_price,
            row.pnl,
            row.outcome.as_str()
        )?;
        self.writer.flush()
    }

    pub fn append_row_and_log(
        &mut self,
        row: &LedgerRow,
        tick: u64,
        run_log_writer: &mut dyn RunLogWriter,
    ) -> io::Result<()> {
        self.append_row(row)?;
        run_log_writer.write(RunLogEvent::new(
            tick,
            RunLogEventKind::LedgerRowWritten,
            Some(row.deal_id.clone()),
        ));
        Ok(())
    }
}

fn rfc3339_utc(unix_ms: u64) -> io::Result<String> {
    let timestamp = OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix_ms) * 1_000_000)
        .map_err(io::Error::other)?;
    timestamp.format(&Rfc3339).map_err(io::Error::other)
}

fn escape_csv_field(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|ch| matches!(ch, ',' | '"' | '\n' | '\r'));
    if !needs_quotes {
        return value.to_string();
    }

    let escaped = value.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use deal_sim::Side;
    use settlement::Outcome;

    use crate::logging::{InMemoryRunLogWriter, RunLogEventKind};

    use super::{LedgerCsvWriter, LedgerRow, LEDGER_CSV_HEADER};

    fn sample_row() -> LedgerRow {
        LedgerRow {
            settled_at_ms: 1_700_000_060_000,
            deal_id: "deal-1700000000123".to_string(),
            instrument: "BTC-USD".to_string(),
            side: Side::Long,
            stake: 50.0,
            leverage: 10,
            entry_price: 64000.0,
            settle_price: 67200.0,
            pnl: 25.0,
            outcome: Outcome::Won,
        }
    }

    #[test]
    fn header_and_row_produce_expected_csv() {
        let mut writer = LedgerCsvWriter::new(Vec::new());
        writer.write_header().unwrap();
        writer.append_row(&sample_row()).unwrap();

        let output = String::from_utf8(writer.writer).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next().unwrap(), LEDGER_CSV_HEADER.trim_end());
        assert_eq!(
            lines.next().unwrap(),
            "2023-11-14T22:14:20Z,deal-1700000000123,BTC-USD,long,50,10,64000,67200,25,won"
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut row = sample_row();
        row.instrument = "BTC,perp".to_string();

        let mut writer = LedgerCsvWriter::new(Vec::new());
        writer.append_row(&row).unwrap();

        let output = String::from_utf8(writer.writer).unwrap();
        assert!(output.contains(",\"BTC,perp\","));
    }

    #[test]
    fn append_row_and_log_records_a_run_log_event() {
        let mut writer = LedgerCsvWriter::new(Vec::new());
        let mut run_log = InMemoryRunLogWriter::new();

        writer.write_header_and_log(1, &mut run_log).unwrap();
        writer.append_row_and_log(&sample_row(), 2, &mut run_log).unwrap();

        let events = run_log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, RunLogEventKind::LedgerHeaderWritten);
        assert_eq!(events[1].kind, RunLogEventKind::LedgerRowWritten);
        assert_eq!(events[1].deal_id.as_deref(), Some("deal-1700000000123"));
    }
}
