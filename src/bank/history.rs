//! MyAmeria transaction history: attributing entries to my accounts and converting them to the
//! canonical CSV.

use crate::model::CanonicalRecord;
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// The side of the entry that belongs to the account the history was requested for.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountingType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

/// One entry of the MyAmeria `events/past` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: serde_json::Value,
    pub transaction_type: String,
    pub accounting_type: AccountingType,
    pub amount: Money,
    pub debit_account_number: String,
    pub credit_account_number: String,
    /// ISO 8601, e.g. `2024-05-01T10:20:30Z`.
    pub operation_date: String,
    #[serde(default)]
    pub details: String,
}

impl HistoryEntry {
    /// The account on the side given by the accounting type.
    fn own_side(&self) -> &str {
        match self.accounting_type {
            AccountingType::Debit => &self.debit_account_number,
            AccountingType::Credit => &self.credit_account_number,
        }
    }

    /// The calendar date of the operation in the offset it was reported in.
    pub fn date(&self) -> Result<NaiveDate> {
        let s = self.operation_date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(dt.date());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Unable to parse operation date '{s}' of entry {}", self.id))
    }
}

/// The `data` payload of the history response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub data: HistoryPage,
}

/// An account of mine discovered from the history, with its currency.
pub type OwnAccount = (String, String);

/// Which side of an entry identifies one of my accounts, by transaction type.
fn owner_side(entry: &HistoryEntry) -> Result<&str> {
    match entry.transaction_type.as_str() {
        "transfer:between-own-accounts"
        | "transfer:local"
        | "exchange"
        | "card"
        | "transfer:to-card"
        | "transfer:international"
        | "charge:commission:transfer"
        | "charge:commission"
        | "charge:international"
        | "cash-out" => Ok(entry.own_side()),
        // Income via ATM or a bank branch.
        "deposit" | "deposit:cash" => Ok(&entry.credit_account_number),
        other => bail!("Unknown transaction type: {other}"),
    }
}

/// Groups history entries by my account and its currency.
///
/// My accounts are discovered from the transaction types first, then every entry must belong to
/// exactly one of them. Fails on unknown transaction types, entries that belong to none of my
/// accounts, accounts seen with more than one currency and entries counted twice.
pub fn group_by_account(
    entries: &[HistoryEntry],
) -> Result<BTreeMap<OwnAccount, Vec<&HistoryEntry>>> {
    info!("Parsing {} MyAmeria History entries...", entries.len());
    let mut mine: BTreeSet<OwnAccount> = BTreeSet::new();
    for entry in entries.iter().rev() {
        let account = owner_side(entry)?;
        mine.insert((account.to_string(), entry.amount.currency.clone()));
    }
    info!(
        "Discovered {} my accounts:\n  {}",
        mine.len(),
        mine.iter()
            .map(|(account, currency)| format!("{account} ({currency})"))
            .collect::<Vec<_>>()
            .join("\n  ")
    );

    let numbers: BTreeSet<&str> = mine.iter().map(|(a, _)| a.as_str()).collect();
    let mut by_account: BTreeMap<&str, Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        let account = entry.own_side();
        if !numbers.contains(account) {
            bail!("Transaction {} doesn't belong to any of my accounts", entry.id);
        }
        by_account.entry(account).or_default().push(entry);
    }

    let mut result = BTreeMap::new();
    for (account, transactions) in by_account {
        let currencies: Vec<&String> = mine
            .iter()
            .filter(|(a, _)| a == account)
            .map(|(_, c)| c)
            .collect();
        let [currency] = currencies.as_slice() else {
            bail!("Could not find currency for account {account}");
        };
        result.insert((account.to_string(), (*currency).clone()), transactions);
    }

    info!(
        "Transaction statistics:\n  {}",
        result
            .iter()
            .map(|((account, currency), t)| format!("{account} ({currency}) - {} transactions", t.len()))
            .collect::<Vec<_>>()
            .join("\n  ")
    );
    let total: usize = result.values().map(Vec::len).sum();
    if total != entries.len() {
        bail!(
            "Transactions are duplicated between my accounts: {total} != {}",
            entries.len()
        );
    }
    Ok(result)
}

/// Converts grouped entries to canonical records. An entry in a currency other than its account's
/// has no account amount in the history and is rejected, as is any non-positive amount.
pub fn to_canonical(
    grouped: &BTreeMap<OwnAccount, Vec<&HistoryEntry>>,
) -> Result<Vec<CanonicalRecord>> {
    let mut records = Vec::new();
    for ((_, native_currency), entries) in grouped {
        for (i, entry) in entries.iter().enumerate() {
            let (account_amount, origin_currency, origin_currency_amount) =
                if entry.amount.currency == *native_currency {
                    (entry.amount.amount, String::new(), String::new())
                } else {
                    (
                        Decimal::ZERO,
                        entry.amount.currency.clone(),
                        format!("{:.2}", entry.amount.amount),
                    )
                };
            if account_amount <= Decimal::ZERO {
                bail!("{i} line: wrong amount '{account_amount}' for {entry:?}");
            }
            records.push(CanonicalRecord {
                date: entry.date()?,
                from_account: entry.debit_account_number.clone(),
                to_account: entry.credit_account_number.clone(),
                is_expense: entry.accounting_type == AccountingType::Debit,
                amount: format!("{:.2}", account_amount),
                details: entry.details.clone(),
                account_currency: native_currency.clone(),
                origin_currency,
                origin_currency_amount,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(
        id: u64,
        transaction_type: &str,
        accounting_type: &str,
        amount: f64,
        currency: &str,
        debit: &str,
        credit: &str,
    ) -> HistoryEntry {
        serde_json::from_value(json!({
            "id": id,
            "transactionType": transaction_type,
            "accountingType": accounting_type,
            "amount": {"amount": amount, "currency": currency},
            "debitAccountNumber": debit,
            "creditAccountNumber": credit,
            "operationDate": "2024-05-01T21:30:00Z",
            "details": format!("entry {id}"),
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_response() {
        let response: HistoryResponse = serde_json::from_value(json!({
            "data": {"entries": [{
                "id": "abc",
                "transactionType": "card",
                "accountingType": "DEBIT",
                "amount": {"amount": 1500.5, "currency": "AMD"},
                "debitAccountNumber": "1",
                "creditAccountNumber": "2",
                "operationDate": "2024-05-01T10:00:00+04:00",
                "details": "SAS"
            }]}
        }))
        .unwrap();
        let e = &response.data.entries[0];
        assert_eq!(e.accounting_type, AccountingType::Debit);
        assert_eq!(e.amount.amount.to_string(), "1500.5");
        assert_eq!(e.date().unwrap(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_group_and_convert() {
        let entries = vec![
            entry(1, "card", "DEBIT", 1500.0, "AMD", "A1", "SHOP"),
            entry(2, "deposit", "CREDIT", 100000.0, "AMD", "BANK", "A1"),
            entry(3, "transfer:between-own-accounts", "DEBIT", 50.0, "USD", "U1", "A1"),
        ];
        let grouped = group_by_account(&entries).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&("A1".to_string(), "AMD".to_string())].len(), 2);
        assert_eq!(grouped[&("U1".to_string(), "USD".to_string())].len(), 1);

        let records = to_canonical(&grouped).unwrap();
        assert_eq!(records.len(), 3);
        let shop = &records[0];
        assert_eq!(shop.from_account, "A1");
        assert_eq!(shop.to_account, "SHOP");
        assert!(shop.is_expense);
        assert_eq!(shop.amount, "1500.00");
        assert_eq!(shop.origin_currency, "");
        let deposit = &records[1];
        assert!(!deposit.is_expense);
        assert_eq!(deposit.amount, "100000.00");
        assert_eq!(deposit.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_unknown_type() {
        let entries = vec![entry(1, "loan", "DEBIT", 1.0, "AMD", "A1", "B")];
        let err = group_by_account(&entries).unwrap_err();
        assert_eq!(err.to_string(), "Unknown transaction type: loan");
    }

    #[test]
    fn test_unattributed_entry() {
        // A deposit identifies its credit side, but the entry is reported from the debit side.
        let entries = vec![entry(7, "deposit", "DEBIT", 1.0, "AMD", "X", "A1")];
        let err = group_by_account(&entries).unwrap_err();
        assert_eq!(err.to_string(), "Transaction 7 doesn't belong to any of my accounts");
    }

    #[test]
    fn test_ambiguous_currency() {
        let entries = vec![
            entry(1, "card", "DEBIT", 1.0, "AMD", "A1", "B"),
            entry(2, "card", "DEBIT", 1.0, "USD", "A1", "B"),
        ];
        let err = group_by_account(&entries).unwrap_err();
        assert_eq!(err.to_string(), "Could not find currency for account A1");
    }

    #[test]
    fn test_foreign_currency_entry_is_rejected() {
        let native = entry(1, "card", "DEBIT", 10.0, "AMD", "A1", "B");
        let foreign = entry(2, "card", "DEBIT", 10.0, "USD", "A1", "B");
        let mut grouped = BTreeMap::new();
        grouped.insert(("A1".to_string(), "AMD".to_string()), vec![&native, &foreign]);
        let err = to_canonical(&grouped).unwrap_err();
        assert!(err.to_string().starts_with("1 line: wrong amount '0'"), "{err}");
    }

    #[test]
    fn test_non_positive_amount() {
        let entries = vec![entry(1, "card", "DEBIT", 0.0, "AMD", "A1", "B")];
        let grouped = group_by_account(&entries).unwrap();
        assert!(to_canonical(&grouped).is_err());
    }
}
