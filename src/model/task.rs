use crate::format::Format;
use crate::model::{Archetype, Currency};
use chrono::{Duration, Local, NaiveDateTime};
use serde::Serialize;

/// One synthetic bank account to simulate and the statement format to write it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    format: Format,
    /// The youngest possible transaction time.
    end_date: NaiveDateTime,
    /// The number of days before `end_date` to generate transactions for.
    days_back: u32,
    archetype: Archetype,
    /// The currency of the underlying account.
    currency: Currency,
    /// Currencies counterparties may use, for both income and expenses.
    other_currencies: Vec<Currency>,
}

impl Task {
    /// A task ending now that covers the last 30 days.
    pub fn new(format: Format, archetype: Archetype, currency: Currency) -> Self {
        Self {
            format,
            end_date: Local::now().naive_local(),
            days_back: 30,
            archetype,
            currency,
            other_currencies: Vec::new(),
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    pub fn with_other_currencies(mut self, other_currencies: impl Into<Vec<Currency>>) -> Self {
        self.other_currencies = other_currencies.into();
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn end_date(&self) -> NaiveDateTime {
        self.end_date
    }

    pub fn start_date(&self) -> NaiveDateTime {
        self.end_date - Duration::days(i64::from(self.days_back))
    }

    pub fn days_back(&self) -> u32 {
        self.days_back
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn other_currencies(&self) -> &[Currency] {
        &self.other_currencies
    }

    /// Identifies the task in file names, e.g. `SALARY_EUR_365`.
    pub fn suffix(&self) -> String {
        format!("{}_{}_{}", self.archetype, self.currency, self.days_back)
    }
}

/// A counterpart account: its number and the currency it operates in.
pub type PoolAccount = (String, Currency);

/// Mutable simulation state for one [`Task`]. Built by the context builder and consumed by one
/// serializer run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskContext {
    pub(crate) task: Task,
    pub(crate) account_number: String,
    pub(crate) account_currency: Currency,
    /// The other simulated accounts, used for transfers between my accounts.
    pub(crate) my_accounts: Vec<PoolAccount>,
    pub(crate) income_categories: Vec<String>,
    pub(crate) expense_categories: Vec<String>,
    pub(crate) income_accounts: Vec<PoolAccount>,
    pub(crate) expense_accounts: Vec<PoolAccount>,
    pub(crate) opening_balance: f64,
    pub(crate) current_balance: f64,
    pub(crate) transactions_count: usize,
}

impl TaskContext {
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn account_currency(&self) -> Currency {
        self.account_currency
    }

    pub fn my_accounts(&self) -> &[PoolAccount] {
        &self.my_accounts
    }

    pub fn income_accounts(&self) -> &[PoolAccount] {
        &self.income_accounts
    }

    pub fn expense_accounts(&self) -> &[PoolAccount] {
        &self.expense_accounts
    }

    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    pub fn current_balance(&self) -> f64 {
        self.current_balance
    }

    pub fn transactions_count(&self) -> usize {
        self.transactions_count
    }

    /// The running-balance bounds converted into the account currency.
    pub fn balance_bounds(&self) -> (f64, f64) {
        let desc = self.task.archetype().desc();
        (
            self.account_currency.from_usd(desc.balance_min_usd),
            self.account_currency.from_usd(desc.balance_max_usd),
        )
    }

    /// Total number of accounts in all pools.
    pub fn pool_size(&self) -> usize {
        self.income_accounts.len() + self.expense_accounts.len() + self.my_accounts.len()
    }
}

/// One simulated money movement on the task's account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub payer_account: String,
    pub receiver_account: String,
    pub is_income: bool,
    pub account_currency: Currency,
    /// Non-negative amount in the account currency.
    pub account_amount: f64,
    /// The counterparty currency and amount, when it differs from the account currency.
    pub origin: Option<(Currency, f64)>,
    pub description: String,
    pub category: String,
}

impl Transaction {
    /// The account on the other side of the movement.
    pub fn counterparty(&self) -> &str {
        if self.is_income {
            &self.payer_account
        } else {
            &self.receiver_account
        }
    }

    /// The currency the counterparty operates in.
    pub fn origin_currency(&self) -> Currency {
        self.origin
            .map(|(currency, _)| currency)
            .unwrap_or(self.account_currency)
    }

    /// The amount in the counterparty currency.
    pub fn origin_amount(&self) -> f64 {
        self.origin
            .map(|(_, amount)| amount)
            .unwrap_or(self.account_amount)
    }

    /// Account-currency units per origin-currency unit, when the currencies differ.
    pub fn exchange_rate(&self) -> Option<f64> {
        match self.origin {
            Some((_, origin_amount)) if origin_amount != 0.0 => {
                Some(self.account_amount / origin_amount)
            }
            _ => None,
        }
    }
}

/// A transaction together with the time it happened at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub at: NaiveDateTime,
    pub transaction: Transaction,
}
