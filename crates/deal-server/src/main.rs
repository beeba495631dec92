mod config;
mod notify;
mod wiring;

use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use api::state::AppState;
use runtime::ledger::LedgerCsvWriter;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_env()?;
    let ledger = initialize_ledger_output(&config.ledger_output_path)?;

    let state = AppState::new(config.session_luck);
    let notifier = config
        .settle_webhook_url
        .clone()
        .map(notify::WebhookNotifier::new);

    wiring::spawn_display_loop(
        state.clone(),
        Duration::from_millis(config.display_tick_ms),
        ledger,
        notifier,
    );

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, wiring::build_app(state)).await?;
    Ok(())
}

fn initialize_ledger_output(path: &str) -> Result<LedgerCsvWriter<File>, std::io::Error> {
    let ledger_path = Path::new(path);

    if let Some(parent) = ledger_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let ledger_file = File::create(ledger_path)?;
    let mut ledger_writer = LedgerCsvWriter::new(ledger_file);
    ledger_writer.write_header()?;
    Ok(ledger_writer)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use runtime::ledger::LEDGER_CSV_HEADER;

    use super::initialize_ledger_output;

    #[test]
    fn initialize_ledger_output_creates_parent_dir_and_writes_csv_header() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("deal-server-ledger-{unique}"));
        let ledger_path = root.join("nested").join("ledger.csv");

        initialize_ledger_output(ledger_path.to_str().unwrap())
            .expect("startup should initialize the ledger output");

        let actual = fs::read_to_string(&ledger_path).expect("ledger output file should exist");
        assert_eq!(actual, LEDGER_CSV_HEADER);

        fs::remove_dir_all(&root).expect("temp ledger directory should be removable");
    }
}
