use crate::format::{Format, StatementSerializer};
use crate::model::money::fixed;
use crate::model::{write_canonical, CanonicalRecord, Operation, TaskContext};
use crate::Result;
use rand::rngs::StdRng;

/// The canonical CSV, the same layout the history downloader writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericCsv;

impl GenericCsv {
    pub fn record(op: &Operation) -> CanonicalRecord {
        let t = &op.transaction;
        let (origin_currency, origin_currency_amount) = match t.origin {
            Some((currency, amount)) => (currency.to_string(), fixed(amount)),
            None => (String::new(), String::new()),
        };
        CanonicalRecord {
            date: op.at.date(),
            from_account: t.payer_account.clone(),
            to_account: t.receiver_account.clone(),
            is_expense: !t.is_income,
            amount: fixed(t.account_amount),
            details: t.description.clone(),
            account_currency: t.account_currency.to_string(),
            origin_currency,
            origin_currency_amount,
        }
    }
}

impl StatementSerializer for GenericCsv {
    fn format(&self) -> Format {
        Format::GenericCsv
    }

    fn render(
        &self,
        _rng: &mut StdRng,
        _ctx: &TaskContext,
        operations: &[Operation],
    ) -> Result<Vec<u8>> {
        let records: Vec<CanonicalRecord> = operations.iter().map(Self::record).collect();
        write_canonical(&records)
    }
}
