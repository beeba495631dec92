use std::{
    env, fmt,
    net::{AddrParseError, SocketAddr},
};

use deal_sim::OutcomeBias;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DISPLAY_TICK_MS: u64 = 3_000;
const DEFAULT_SESSION_LUCK: OutcomeBias = OutcomeBias::Default;
const DEFAULT_LEDGER_OUTPUT_PATH: &str = "artifacts/ledger.csv";

const MIN_DISPLAY_TICK_MS: u64 = 100;
const MAX_DISPLAY_TICK_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub display_tick_ms: u64,
    pub session_luck: OutcomeBias,
    pub ledger_output_path: String,
    pub settle_webhook_url: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidListenAddr(AddrParseError),
    InvalidDisplayTickMs,
    InvalidSessionLuck,
    InvalidLedgerOutputPath,
    InvalidSettleWebhookUrl,
    NonUnicodeListenAddr,
    NonUnicodeDisplayTickMs,
    NonUnicodeSessionLuck,
    NonUnicodeLedgerOutput,
    NonUnicodeSettleWebhookUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidListenAddr(err) => {
                write!(f, "DEAL_SERVER_ADDR is not a valid socket address: {err}")
            }
            Self::InvalidDisplayTickMs => {
                write!(
                    f,
                    "DEAL_DISPLAY_TICK_MS must be an integer between {MIN_DISPLAY_TICK_MS} and {MAX_DISPLAY_TICK_MS}"
                )
            }
            Self::InvalidSessionLuck => {
                write!(f, "DEAL_SESSION_LUCK must be one of: win, lose, default")
            }
            Self::InvalidLedgerOutputPath => {
                write!(f, "DEAL_LEDGER_OUTPUT must not be empty or whitespace")
            }
            Self::InvalidSettleWebhookUrl => {
                write!(f, "DEAL_SETTLE_WEBHOOK must be an http(s) URL")
            }
            Self::NonUnicodeListenAddr => {
                write!(f, "DEAL_SERVER_ADDR contains non-unicode data")
            }
            Self::NonUnicodeDisplayTickMs => {
                write!(f, "DEAL_DISPLAY_TICK_MS contains non-unicode data")
            }
            Self::NonUnicodeSessionLuck => {
                write!(f, "DEAL_SESSION_LUCK contains non-unicode data")
            }
            Self::NonUnicodeLedgerOutput => {
                write!(f, "DEAL_LEDGER_OUTPUT contains non-unicode data")
            }
            Self::NonUnicodeSettleWebhookUrl => {
                write!(f, "DEAL_SETTLE_WEBHOOK contains non-unicode data")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidListenAddr(err) => Some(err),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match env::var("DEAL_SERVER_ADDR") {
            Ok(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            Err(env::VarError::NotPresent) => DEFAULT_LISTEN_ADDR
                .parse()
                .expect("default listen address must be valid"),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeListenAddr);
            }
        };

        let display_tick_ms = match env::var("DEAL_DISPLAY_TICK_MS") {
            Ok(value) => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidDisplayTickMs)?;
                if !(MIN_DISPLAY_TICK_MS..=MAX_DISPLAY_TICK_MS).contains(&parsed) {
                    return Err(ConfigError::InvalidDisplayTickMs);
                }
                parsed
            }
            Err(env::VarError::NotPresent) => DEFAULT_DISPLAY_TICK_MS,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeDisplayTickMs);
            }
        };

        let session_luck = match env::var("DEAL_SESSION_LUCK") {
            Ok(value) => {
                OutcomeBias::parse(value.as_str()).ok_or(ConfigError::InvalidSessionLuck)?
            }
            Err(env::VarError::NotPresent) => DEFAULT_SESSION_LUCK,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeSessionLuck);
            }
        };

        let ledger_output_path = match env::var("DEAL_LEDGER_OUTPUT") {
            Ok(value) => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidLedgerOutputPath);
                }
                value
            }
            Err(env::VarError::NotPresent) => DEFAULT_LEDGER_OUTPUT_PATH.to_owned(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeLedgerOutput);
            }
        };

        let settle_webhook_url = match env::var("DEAL_SETTLE_WEBHOOK") {
            Ok(value) => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(ConfigError::InvalidSettleWebhookUrl);
                }
                Some(value)
            }
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::NonUnicodeSettleWebhookUrl);
            }
        };

        Ok(Self {
            listen_addr,
            display_tick_ms,
            session_luck,
            ledger_output_path,
            settle_webhook_url,
        })
    }
}
