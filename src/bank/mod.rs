//! Access to the online bank. The `BankApi` trait is implemented against MyAmeria and, for running
//! the downloader end to end without the network, by an in-memory `TestBank`.

pub mod history;
mod myameria;
mod test_bank;

use crate::config::{AccountKind, DownloaderConfig};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use history::{group_by_account, to_canonical, HistoryEntry};
pub(crate) use myameria::MyAmeria;
pub(crate) use test_bank::TestBank;

/// When this environment variable is set and non-empty the downloader talks to `TestBank`.
pub const TEST_MODE_ENV: &str = "BANKSTMT_IN_TEST_MODE";

/// What the downloader needs from the bank.
#[async_trait::async_trait]
pub trait BankApi: Send + Sync {
    /// The transaction history of all my accounts between two dates, inclusive.
    async fn history(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<HistoryEntry>>;

    /// The raw statement file of one account or card.
    async fn statement(&self, request: &StatementRequest) -> Result<Vec<u8>>;
}

/// Parameters of a statement download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub kind: AccountKind,
    pub account_number: String,
    pub inner_account_number: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Which `BankApi` implementation to use.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    MyAmeria,
    Testing,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::MyAmeria,
        }
    }
}

/// Creates the bank client for `mode`.
pub fn client(config: &DownloaderConfig, mode: Mode) -> Result<Box<dyn BankApi>> {
    debug!("Creating a bank client in {mode} mode");
    Ok(match mode {
        Mode::MyAmeria => {
            let my = config.my_ameria();
            Box::new(MyAmeria::new(&my.auth_token, &my.client_id)?)
        }
        Mode::Testing => Box::new(TestBank::default()),
    })
}
