//! Transaction archetypes: named statistical profiles that drive the simulator.

use serde::{Deserialize, Serialize};

/// The category used for transfers between the simulated accounts themselves.
pub const TRANSFER_BETWEEN_MY_ACCOUNTS: &str = "Transfer between my accounts";

/// Immutable parameters of an archetype.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
    /// Number of transactions per day.
    pub n_per_day: f64,
    /// Probability that a transaction is income. 0.1 is one income per nine expenses, 0.5 is pairs.
    pub in_out_ratio: f64,
    /// Average income amount in USD.
    pub average_sum_in_usd: f64,
    /// Average expense amount in USD.
    pub average_sum_out_usd: f64,
    /// Standard deviation as a fraction of the average. Zero makes every amount the average.
    pub sum_variance: f64,
    /// Lower bound of the running balance in USD.
    pub balance_min_usd: f64,
    /// Upper bound of the running balance in USD.
    pub balance_max_usd: f64,
    /// Counterpart accounts generated per pool at start.
    pub accounts_per_category: usize,
    /// Probability that a transaction adds a new income counterparty.
    pub new_accounts_per_transaction: f64,
    /// Probability that a transaction removes a counterparty from the active pool.
    pub remove_accounts_ratio_per_transaction: f64,
    /// Probability that an expense goes to one of my other accounts.
    pub expense_my_to_foreign_accounts_ratio: f64,
    /// Probability that an income comes from one of my other accounts.
    pub income_my_to_foreign_accounts_ratio: f64,
    /// Expense categories. Repeat a category to make it more frequent.
    pub expense_categories: &'static [&'static str],
    /// Income categories. Repeat a category to make it more frequent.
    pub income_categories: &'static [&'static str],
    /// Probability that a new counterparty uses one of the task's other currencies.
    pub other_currencies_ratio: f64,
}

/// A named archetype. Use [`Archetype::desc`] to get its parameters.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Archetype {
    Everyday,
    BigEvents,
    CurConversions,
    Salary,
    Utilities,
}

serde_plain::derive_display_from_serialize!(Archetype);
serde_plain::derive_fromstr_from_deserialize!(Archetype);

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Everyday,
        Archetype::BigEvents,
        Archetype::CurConversions,
        Archetype::Salary,
        Archetype::Utilities,
    ];

    pub fn desc(self) -> &'static TypeDesc {
        match self {
            Archetype::Everyday => &EVERYDAY,
            Archetype::BigEvents => &BIG_EVENTS,
            Archetype::CurConversions => &CUR_CONVERSIONS,
            Archetype::Salary => &SALARY,
            Archetype::Utilities => &UTILITIES,
        }
    }
}

// A big transfer from the salary account, then many small expenses.
static EVERYDAY: TypeDesc = TypeDesc {
    n_per_day: 1.0,
    in_out_ratio: 0.05,
    average_sum_in_usd: 500.0,
    average_sum_out_usd: 5.0,
    sum_variance: 0.5,
    balance_min_usd: 0.0,
    balance_max_usd: 1000.0,
    accounts_per_category: 10,
    new_accounts_per_transaction: 0.01,
    remove_accounts_ratio_per_transaction: 0.01,
    expense_my_to_foreign_accounts_ratio: 0.1,
    income_my_to_foreign_accounts_ratio: 0.9,
    expense_categories: &[
        "Groceries",
        "Groceries",
        "Groceries",
        "Entertainment",
        "Health",
        "Pharmacies",
        "Taxi",
        "Online shopping",
        "Subscriptions",
    ],
    // Refunds, plus an occasional salary from a foreign company.
    income_categories: &["Taxi", "Online shopping", "Entertainment", "Salary"],
    other_currencies_ratio: 0.0,
};

static BIG_EVENTS: TypeDesc = TypeDesc {
    n_per_day: 0.1,
    in_out_ratio: 0.3,
    average_sum_in_usd: 1000.0,
    average_sum_out_usd: 600.0,
    sum_variance: 0.5,
    balance_min_usd: 0.0,
    balance_max_usd: 10000.0,
    accounts_per_category: 2,
    new_accounts_per_transaction: 0.8,
    remove_accounts_ratio_per_transaction: 0.1,
    expense_my_to_foreign_accounts_ratio: 0.0,
    income_my_to_foreign_accounts_ratio: 1.0,
    expense_categories: &["Cash", "Entertainment", "Health", "Online shopping"],
    income_categories: &["Salary"],
    other_currencies_ratio: 0.0,
};

// Payments pass through the account 1:1, always between my own accounts.
static CUR_CONVERSIONS: TypeDesc = TypeDesc {
    n_per_day: 0.15,
    in_out_ratio: 0.5,
    average_sum_in_usd: 500.0,
    average_sum_out_usd: 500.0,
    sum_variance: 0.2,
    balance_min_usd: 0.0,
    balance_max_usd: 10000.0,
    accounts_per_category: 2,
    new_accounts_per_transaction: 0.01,
    remove_accounts_ratio_per_transaction: 0.0,
    expense_my_to_foreign_accounts_ratio: 1.0,
    income_my_to_foreign_accounts_ratio: 1.0,
    expense_categories: &[TRANSFER_BETWEEN_MY_ACCOUNTS],
    income_categories: &["Salary"],
    other_currencies_ratio: 0.0,
};

static SALARY: TypeDesc = TypeDesc {
    n_per_day: 0.2,
    in_out_ratio: 0.5,
    average_sum_in_usd: 500.0,
    average_sum_out_usd: 500.0,
    sum_variance: 0.1,
    balance_min_usd: 0.0,
    balance_max_usd: 4000.0,
    accounts_per_category: 2,
    new_accounts_per_transaction: 0.01,
    remove_accounts_ratio_per_transaction: 0.01,
    expense_my_to_foreign_accounts_ratio: 1.0,
    income_my_to_foreign_accounts_ratio: 0.0,
    expense_categories: &[TRANSFER_BETWEEN_MY_ACCOUNTS],
    income_categories: &["Salary"],
    other_currencies_ratio: 0.0,
};

// Money arrives twice a month, then rent, water, gas, phone and internet go out.
static UTILITIES: TypeDesc = TypeDesc {
    n_per_day: 0.2,
    in_out_ratio: 2.0 / 6.0,
    average_sum_in_usd: 300.0,
    average_sum_out_usd: 100.0,
    sum_variance: 0.3,
    balance_min_usd: 0.0,
    balance_max_usd: 1000.0,
    accounts_per_category: 3,
    new_accounts_per_transaction: 0.01,
    remove_accounts_ratio_per_transaction: 0.01,
    expense_my_to_foreign_accounts_ratio: 0.0,
    income_my_to_foreign_accounts_ratio: 1.0,
    expense_categories: &["Utilities and rent"],
    income_categories: &["Salary"],
    other_currencies_ratio: 0.0,
};
