use crate::{utils, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

/// The columns of the canonical CSV, in order.
pub const CANONICAL_HEADER: [&str; 9] = [
    "Date",
    "FromAccount",
    "ToAccount",
    "IsExpense",
    "Amount",
    "Details",
    "AccountCurrency",
    "OriginCurrency",
    "OriginCurrencyAmount",
];

/// One row of the normalized CSV shared by the generator and the history downloader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CanonicalRecord {
    #[serde(serialize_with = "iso_date")]
    pub date: NaiveDate,
    pub from_account: String,
    pub to_account: String,
    pub is_expense: bool,
    /// Amount in the account currency, already formatted with two decimals.
    pub amount: String,
    pub details: String,
    pub account_currency: String,
    /// Empty when the counterparty uses the account currency.
    pub origin_currency: String,
    /// Empty when the counterparty uses the account currency.
    pub origin_currency_amount: String,
}

fn iso_date<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

/// Writes the header followed by `records`. The header is written even when there are no records.
pub fn write_canonical(records: &[CanonicalRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(CANONICAL_HEADER)
        .context("Unable to write the canonical CSV header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Unable to write canonical record {record:?}"))?;
    }
    utils::csv_bytes(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_header_only() {
        let bytes = write_canonical(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Date,FromAccount,ToAccount,IsExpense,Amount,Details,AccountCurrency,OriginCurrency,OriginCurrencyAmount\n"
        );
    }

    #[test]
    fn test_native_income_row() {
        let record = CanonicalRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            from_account: "1111222233334444".into(),
            to_account: "5555666677778888".into(),
            is_expense: false,
            amount: "100.00".into(),
            details: "Salary, May".into(),
            account_currency: "AMD".into(),
            origin_currency: String::new(),
            origin_currency_amount: String::new(),
        };
        let text = String::from_utf8(write_canonical(&[record]).unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2024-05-01,1111222233334444,5555666677778888,false,100.00,\"Salary, May\",AMD,,"
        );
    }
}
