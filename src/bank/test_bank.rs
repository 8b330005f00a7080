//! Implements the `BankApi` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! downloader, top-to-bottom, without talking to MyAmeria.

use crate::bank::history::{AccountingType, HistoryEntry, Money};
use crate::bank::{BankApi, StatementRequest};
use crate::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// An implementation of `BankApi` that holds its history and statements in memory. By default it
/// is seeded with a small history of two accounts.
pub(crate) struct TestBank {
    pub(crate) entries: Vec<HistoryEntry>,
    /// Statement files keyed by inner account number.
    pub(crate) statements: HashMap<String, Vec<u8>>,
}

impl TestBank {
    pub(crate) fn new(entries: Vec<HistoryEntry>, statements: HashMap<String, Vec<u8>>) -> Self {
        Self {
            entries,
            statements,
        }
    }
}

impl Default for TestBank {
    fn default() -> Self {
        Self::new(seed_entries(), HashMap::new())
    }
}

#[async_trait::async_trait]
impl BankApi for TestBank {
    async fn history(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for entry in &self.entries {
            let date = entry.date()?;
            if date >= from && date <= to {
                entries.push(entry.clone());
            }
        }
        debug!("TestBank returns {} history entries", entries.len());
        Ok(entries)
    }

    async fn statement(&self, request: &StatementRequest) -> Result<Vec<u8>> {
        Ok(match self.statements.get(&request.inner_account_number) {
            Some(bytes) => bytes.clone(),
            None => format!(
                "Test statement of {} {} from {} to {}\n",
                request.kind, request.account_number, request.from, request.to
            )
            .into_bytes(),
        })
    }
}

const CARD_AMD: &str = "2470000000000001";
const ACCOUNT_USD: &str = "1570000000000002";

#[allow(clippy::too_many_arguments)]
fn entry(
    id: u64,
    transaction_type: &str,
    accounting_type: AccountingType,
    cents: i64,
    currency: &str,
    debit: &str,
    credit: &str,
    date: &str,
    details: &str,
) -> HistoryEntry {
    HistoryEntry {
        id: id.into(),
        transaction_type: transaction_type.to_string(),
        accounting_type,
        amount: Money {
            amount: Decimal::new(cents, 2),
            currency: currency.to_string(),
        },
        debit_account_number: debit.to_string(),
        credit_account_number: credit.to_string(),
        operation_date: date.to_string(),
        details: details.to_string(),
    }
}

/// Provides the seed history of this module.
fn seed_entries() -> Vec<HistoryEntry> {
    use AccountingType::{Credit, Debit};
    vec![
        entry(
            1,
            "deposit",
            Credit,
            50_000_000,
            "AMD",
            "1000000000000000",
            CARD_AMD,
            "2024-05-02T09:00:00+04:00",
            "SALARY",
        ),
        entry(
            2,
            "card",
            Debit,
            1_250_000,
            "AMD",
            CARD_AMD,
            "4000000000000010",
            "2024-05-03T18:45:10+04:00",
            "SAS SUPERMARKET",
        ),
        entry(
            3,
            "transfer:between-own-accounts",
            Debit,
            10_000,
            "USD",
            ACCOUNT_USD,
            CARD_AMD,
            "2024-05-05T12:00:00+04:00",
            "Transfer between my accounts",
        ),
        entry(
            4,
            "charge:commission",
            Debit,
            50_000,
            "AMD",
            CARD_AMD,
            "9000000000000000",
            "2024-05-31T23:59:00+04:00",
            "Monthly fee",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::group_by_account;
    use crate::config::AccountKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_history_is_filtered_by_date() {
        let bank = TestBank::default();
        let all = bank.history(date(2024, 1, 1), date(2024, 12, 31)).await.unwrap();
        assert_eq!(all.len(), 4);
        let some = bank.history(date(2024, 5, 3), date(2024, 5, 5)).await.unwrap();
        assert_eq!(some.len(), 2);
        assert_eq!(some[0].details, "SAS SUPERMARKET");
    }

    #[tokio::test]
    async fn test_seed_history_groups() {
        let bank = TestBank::default();
        let entries = bank.history(date(2024, 1, 1), date(2024, 12, 31)).await.unwrap();
        let grouped = group_by_account(&entries).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(
            grouped[&(CARD_AMD.to_string(), "AMD".to_string())].len(),
            3
        );
    }

    #[tokio::test]
    async fn test_statement() {
        let mut statements = HashMap::new();
        statements.insert("7".to_string(), b"xls".to_vec());
        let bank = TestBank::new(Vec::new(), statements);
        let mut request = StatementRequest {
            kind: AccountKind::Account,
            account_number: ACCOUNT_USD.into(),
            inner_account_number: "7".into(),
            from: date(2024, 1, 1),
            to: date(2024, 2, 1),
        };
        assert_eq!(bank.statement(&request).await.unwrap(), b"xls");
        request.inner_account_number = "8".into();
        let text = String::from_utf8(bank.statement(&request).await.unwrap()).unwrap();
        assert!(text.starts_with("Test statement of account 1570000000000002"));
    }
}
