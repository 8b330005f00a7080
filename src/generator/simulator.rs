use crate::generator::diagnostics::Diagnostics;
use crate::generator::fake;
use crate::model::{
    cross_rate, round2, CategoryGroups, Currency, Operation, PoolAccount, TaskContext, Transaction,
    TRANSFER_BETWEEN_MY_ACCOUNTS,
};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Description template used when a category has no templates in the config.
const DEFAULT_DESCRIPTION: &str = "Payment";

/// Categories whose descriptions sometimes mention a number of purchased items.
const ITEM_CATEGORIES: [&str; 4] = ["Groceries", "Entertainment", "Pharmacies", "Health"];

/// The counterparty side of `amount` at `rate`, never rounded down to zero for a non-zero amount.
fn origin_amount(amount: f64, rate: f64) -> f64 {
    let origin = round2(amount / rate);
    if origin == 0.0 && amount > 0.0 {
        0.01
    } else {
        origin
    }
}

/// Produces one transaction per timestamp for a [`TaskContext`], keeping its running balance
/// within the archetype bounds.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    groups: CategoryGroups,
    diagnostics: Diagnostics,
}

impl Simulator {
    pub fn new(rng: StdRng, groups: CategoryGroups) -> Self {
        Self {
            rng,
            groups,
            diagnostics: Diagnostics::default(),
        }
    }

    /// The random source, shared with the serializers for their decorative fields.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Series recorded by [`Simulator::run`].
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Simulates every timestamp in order. Diagnostics are reset first.
    pub fn run(
        &mut self,
        ctx: &mut TaskContext,
        timestamps: &[NaiveDateTime],
    ) -> Result<Vec<Operation>> {
        self.diagnostics.clear();
        timestamps
            .iter()
            .map(|&at| {
                let transaction = self.next_transaction(ctx, at).with_context(|| {
                    format!("Unable to simulate {} at {at}", ctx.task().suffix())
                })?;
                Ok(Operation { at, transaction })
            })
            .collect()
    }

    /// Draws the next transaction and applies it to the context.
    pub fn next_transaction(
        &mut self,
        ctx: &mut TaskContext,
        at: NaiveDateTime,
    ) -> Result<Transaction> {
        let desc = ctx.task.archetype().desc();
        let account_currency = ctx.account_currency;

        let mut is_income = self.rng.gen_bool(desc.in_out_ratio.clamp(0.0, 1.0));
        let average = if is_income {
            desc.average_sum_in_usd
        } else {
            desc.average_sum_out_usd
        };
        let mut amount =
            self.draw_amount(account_currency, average, average * desc.sum_variance)?;

        let amount_before_policy = amount;
        let (min, max) = ctx.balance_bounds();
        let balance = ctx.current_balance;
        let expected = if is_income {
            balance + amount
        } else {
            balance - amount
        };
        if expected < min {
            debug!("Min balance exceeded: {expected} < {min}, is_income={is_income}");
            if is_income {
                amount = min - balance;
            } else {
                is_income = true;
                // Flipped to income, so the same amount must not overshoot the upper bound.
                if balance + amount > max {
                    amount = max - balance;
                }
            }
        } else if expected > max {
            debug!("Max balance exceeded: {expected} > {max}, is_income={is_income}");
            if is_income {
                is_income = false;
                if balance - amount < min {
                    amount = balance - min;
                }
            } else {
                amount = max - balance;
            }
        }
        let amount = round2(amount.abs());
        if amount != amount_before_policy {
            debug!("Amount adjusted from {amount_before_policy} to {amount}");
        }

        let (category, counterparty) = self.counterparty(ctx, is_income)?;
        let (counterparty_account, counterparty_currency) = counterparty;
        let (payer_account, receiver_account) = if is_income {
            (counterparty_account, ctx.account_number.clone())
        } else {
            (ctx.account_number.clone(), counterparty_account)
        };

        let origin = if counterparty_currency != account_currency {
            let rate = cross_rate(counterparty_currency, account_currency);
            Some((counterparty_currency, origin_amount(amount, rate)))
        } else {
            None
        };

        let description = self.description(&category);
        self.churn_pools(ctx, is_income);

        ctx.transactions_count += 1;
        if is_income {
            ctx.current_balance += amount;
        } else {
            ctx.current_balance -= amount;
        }
        ctx.current_balance = round2(ctx.current_balance);

        self.diagnostics.amounts.push((at, amount, is_income));
        self.diagnostics.pool_sizes.push((at, ctx.pool_size()));
        self.diagnostics
            .categories
            .push((category.clone(), is_income));

        Ok(Transaction {
            payer_account,
            receiver_account,
            is_income,
            account_currency,
            account_amount: amount,
            origin,
            description,
            category,
        })
    }

    /// Samples a normally distributed USD amount and converts it into `currency`. Samples that
    /// are negative or round to zero cents are drawn again.
    fn draw_amount(&mut self, currency: Currency, mean: f64, std_dev: f64) -> Result<f64> {
        if currency.from_usd(mean) <= 0.0 {
            bail!("Average amount {mean} USD is less than a cent of {currency}");
        }
        if std_dev <= 0.0 {
            return Ok(currency.from_usd(mean));
        }
        let normal = Normal::new(mean, std_dev)
            .with_context(|| format!("Invalid amount distribution N({mean}, {std_dev})"))?;
        loop {
            let amount = currency.from_usd(normal.sample(&mut self.rng));
            if amount > 0.0 {
                return Ok(amount);
            }
        }
    }

    /// Chooses the category and the account on the other side of the transaction.
    fn counterparty(
        &mut self,
        ctx: &TaskContext,
        is_income: bool,
    ) -> Result<(String, PoolAccount)> {
        let desc = ctx.task.archetype().desc();
        let (direction, my_ratio, categories, foreign) = if is_income {
            (
                "income",
                desc.income_my_to_foreign_accounts_ratio,
                &ctx.income_categories,
                &ctx.income_accounts,
            )
        } else {
            (
                "expense",
                desc.expense_my_to_foreign_accounts_ratio,
                &ctx.expense_categories,
                &ctx.expense_accounts,
            )
        };

        if self.rng.gen_bool(my_ratio.clamp(0.0, 1.0)) {
            let Some(account) = ctx.my_accounts.choose(&mut self.rng) else {
                bail!(
                    "No 'my' accounts available for {direction} transactions. Check that another \
                    task is used"
                );
            };
            return Ok((TRANSFER_BETWEEN_MY_ACCOUNTS.to_string(), account.clone()));
        }

        let Some(category) = categories.choose(&mut self.rng) else {
            bail!("No {direction} categories available for {}", ctx.task.archetype());
        };
        let Some(account) = foreign.choose(&mut self.rng) else {
            bail!(
                "No 'foreign' accounts available for {direction} category '{category}'. Check \
                that accounts_per_category is positive"
            );
        };
        Ok((category.clone(), account.clone()))
    }

    /// Picks a template for the category and decorates it with item counts, places and ids.
    fn description(&mut self, category: &str) -> String {
        let mut description = self
            .groups
            .get(category)
            .and_then(|templates| templates.choose(&mut self.rng))
            .map(String::as_str)
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string();

        if ITEM_CATEGORIES.contains(&category) && self.rng.gen_bool(0.3) {
            let items = self.rng.gen_range(1..=5);
            description.push_str(&format!(" {items} ITEMS"));
        }
        if self.rng.gen_bool(0.4) {
            if category == "Salary" {
                let reference = fake::bothify(&mut self.rng, "????###");
                description.push_str(&format!(" REF:{reference}"));
            } else {
                let city = fake::prefix(fake::city(&mut self.rng), 10);
                description.push_str(&format!(" {city}"));
            }
        }
        if self.rng.gen_bool(0.3) {
            let id = fake::digits(&mut self.rng, 7);
            description.push_str(&format!(" ID:{id}"));
        }
        description
    }

    /// Adds a new income counterparty or drops one from the active side's pool.
    fn churn_pools(&mut self, ctx: &mut TaskContext, is_income: bool) {
        let desc = ctx.task.archetype().desc();
        if self
            .rng
            .gen_bool(desc.new_accounts_per_transaction.clamp(0.0, 1.0))
        {
            let mut currency = ctx.task.currency();
            if !ctx.task.other_currencies().is_empty()
                && self.rng.gen_bool(desc.other_currencies_ratio.clamp(0.0, 1.0))
            {
                if let Some(other) = ctx.task.other_currencies().choose(&mut self.rng) {
                    currency = *other;
                }
            }
            let number = fake::digits(&mut self.rng, 16);
            ctx.income_accounts.push((number, currency));
        }

        if self
            .rng
            .gen_bool(desc.remove_accounts_ratio_per_transaction.clamp(0.0, 1.0))
        {
            let pool = if is_income {
                &mut ctx.income_accounts
            } else {
                &mut ctx.expense_accounts
            };
            if pool.len() > 1 {
                let idx = self.rng.gen_range(0..pool.len());
                pool.remove(idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::generator::context::ContextBuilder;
    use crate::generator::{demo_groups, schedule};
    use crate::model::{Archetype, Currency, Task};
    use chrono::{Duration, NaiveDate};
    use rand::SeedableRng;

    fn end() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn contexts(tasks: &[Task], seed: u64) -> Vec<TaskContext> {
        let groups = demo_groups();
        ContextBuilder::new(&groups, StdRng::seed_from_u64(seed))
            .build(tasks)
            .unwrap()
    }

    fn demo_tasks(days_back: u32) -> Vec<Task> {
        vec![
            Task::new(Format::InecobankXml, Archetype::Salary, Currency::Eur)
                .with_end_date(end())
                .with_days_back(days_back)
                .with_other_currencies([Currency::Amd]),
            Task::new(Format::InecobankXml, Archetype::Utilities, Currency::Amd)
                .with_end_date(end())
                .with_days_back(days_back),
            Task::new(Format::AmeriaCsv, Archetype::Everyday, Currency::Amd)
                .with_end_date(end())
                .with_days_back(days_back),
            Task::new(Format::AmeriaCsv, Archetype::BigEvents, Currency::Amd)
                .with_end_date(end() - Duration::days(90))
                .with_days_back(days_back),
        ]
    }

    #[test]
    fn test_balance_stays_within_bounds() {
        for seed in 0..10 {
            for mut ctx in contexts(&demo_tasks(365), seed) {
                let mut sim = Simulator::new(StdRng::seed_from_u64(seed), demo_groups());
                let stamps = schedule::timestamps(sim.rng(), ctx.task());
                let (min, max) = ctx.balance_bounds();
                let mut balance = ctx.opening_balance();
                for at in stamps {
                    let t = sim.next_transaction(&mut ctx, at).unwrap();
                    assert!(t.account_amount >= 0.0);
                    balance += if t.is_income {
                        t.account_amount
                    } else {
                        -t.account_amount
                    };
                    assert!(
                        (balance - ctx.current_balance()).abs() < 1e-6,
                        "{balance} != {}",
                        ctx.current_balance()
                    );
                    assert!(
                        ctx.current_balance() >= min - 0.01 && ctx.current_balance() <= max + 0.01,
                        "{} outside [{min}, {max}] for {}",
                        ctx.current_balance(),
                        ctx.task().suffix()
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_window_keeps_opening_balance() {
        let mut ctx = contexts(&demo_tasks(0), 5).remove(0);
        let mut sim = Simulator::new(StdRng::seed_from_u64(5), demo_groups());
        let stamps = schedule::timestamps(sim.rng(), ctx.task());
        let ops = sim.run(&mut ctx, &stamps).unwrap();
        assert!(ops.is_empty());
        assert_eq!(ctx.transactions_count(), 0);
        assert_eq!(ctx.opening_balance(), ctx.current_balance());
        assert!(sim.diagnostics().is_empty());
    }

    #[test]
    fn test_single_salary_transaction() {
        for seed in 0..20 {
            let mut ctx = contexts(&demo_tasks(30), seed).remove(0);
            let mut sim = Simulator::new(StdRng::seed_from_u64(seed), demo_groups());
            let ops = sim.run(&mut ctx, &[end()]).unwrap();
            assert_eq!(ops.len(), 1);
            assert_eq!(ctx.transactions_count(), 1);
            let t = &ops[0].transaction;
            assert_eq!(t.account_currency, Currency::Eur);

            // Salary amounts are N(500, 50) USD, so within four sigma unless clamped.
            let (min, max) = ctx.balance_bounds();
            let clamped = ctx.current_balance() <= min + 0.01 || ctx.current_balance() >= max - 0.01;
            let expected = Currency::Eur.from_usd(500.0);
            let spread = Currency::Eur.from_usd(200.0);
            assert!(
                clamped || (t.account_amount - expected).abs() <= spread,
                "{} is too far from {expected}",
                t.account_amount
            );
        }
    }

    #[test]
    fn test_origin_amount_follows_cross_rate() {
        let mut checked = 0;
        for seed in 0..10 {
            let mut ctx = contexts(&demo_tasks(365), seed).remove(0);
            let mut sim = Simulator::new(StdRng::seed_from_u64(seed), demo_groups());
            let stamps = schedule::timestamps(sim.rng(), ctx.task());
            for op in sim.run(&mut ctx, &stamps).unwrap() {
                let t = op.transaction;
                if t.is_income {
                    // Salary income comes from foreign accounts in the account currency.
                    assert_eq!(t.origin, None);
                    assert_eq!(t.category, "Salary");
                    assert_eq!(t.receiver_account, ctx.account_number());
                } else {
                    assert_eq!(t.category, TRANSFER_BETWEEN_MY_ACCOUNTS);
                    assert_eq!(t.payer_account, ctx.account_number());
                    let owner = ctx
                        .my_accounts()
                        .iter()
                        .find(|(n, _)| *n == t.receiver_account)
                        .unwrap();
                    if owner.1 == Currency::Amd {
                        let (currency, origin_amount) = t.origin.unwrap();
                        assert_eq!(currency, Currency::Amd);
                        let expected = round2(t.account_amount * 390.0 / 0.9);
                        assert!((origin_amount - expected).abs() < 0.011);
                        checked += 1;
                    }
                }
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_missing_my_accounts_is_an_error() {
        // A lone salary task has nobody to transfer its salary to.
        let tasks = vec![Task::new(Format::GenericCsv, Archetype::Salary, Currency::Amd)
            .with_end_date(end())
            .with_days_back(365)];
        let mut ctx = contexts(&tasks, 3).remove(0);
        let mut sim = Simulator::new(StdRng::seed_from_u64(3), demo_groups());
        let stamps = schedule::timestamps(sim.rng(), ctx.task());
        let err = sim.run(&mut ctx, &stamps).unwrap_err();
        assert!(format!("{err:#}").contains("No 'my' accounts available"));
    }

    #[test]
    fn test_descriptions_use_templates() {
        let mut sim = Simulator::new(StdRng::seed_from_u64(9), demo_groups());
        for _ in 0..50 {
            let d = sim.description("Groceries");
            assert!(d.starts_with("SAS") || d.starts_with("YEREVAN CITY"), "{d}");
            let d = sim.description("Unknown");
            assert!(d.starts_with(DEFAULT_DESCRIPTION), "{d}");
            let d = sim.description("Salary");
            assert!(d.starts_with("SALARY"), "{d}");
            assert!(!d.contains("ITEMS"), "{d}");
        }
    }

    #[test]
    fn test_draw_amount_skips_zero_cents() {
        let mut sim = Simulator::new(StdRng::seed_from_u64(1), demo_groups());
        // About half of these samples round to 0.00 USD.
        for _ in 0..200 {
            let amount = sim.draw_amount(Currency::Usd, 0.004, 0.004).unwrap();
            assert!(amount >= 0.01, "{amount}");
        }
        assert_eq!(sim.draw_amount(Currency::Amd, 5.0, 0.0).unwrap(), 1950.0);
        assert!(sim.draw_amount(Currency::Usd, 0.001, 0.1).is_err());
    }

    #[test]
    fn test_origin_amount_is_never_zero() {
        assert_eq!(origin_amount(1.0, 390.0), 0.01);
        assert_eq!(origin_amount(390.0, 390.0), 1.0);
        assert_eq!(origin_amount(0.0, 390.0), 0.0);
    }

    #[test]
    fn test_amounts_are_positive_in_every_currency() {
        let mut tasks = demo_tasks(365);
        tasks.push(
            Task::new(Format::GenericCsv, Archetype::Everyday, Currency::Eur)
                .with_end_date(end())
                .with_days_back(365)
                .with_other_currencies([Currency::Try, Currency::Usd, Currency::Gbp]),
        );
        for seed in 0..5 {
            for mut ctx in contexts(&tasks, seed) {
                let mut sim = Simulator::new(StdRng::seed_from_u64(seed), demo_groups());
                let stamps = schedule::timestamps(sim.rng(), ctx.task());
                let (min, max) = ctx.balance_bounds();
                for at in stamps {
                    let t = sim.next_transaction(&mut ctx, at).unwrap();
                    // Only a transaction squeezed to nothing by a balance bound may be empty.
                    let at_bound = ctx.current_balance() == min || ctx.current_balance() == max;
                    assert!(
                        t.account_amount > 0.0 || at_bound,
                        "{} at {at}",
                        ctx.task().suffix()
                    );
                    if t.account_amount == 0.0 {
                        continue;
                    }
                    if let Some((currency, amount)) = t.origin {
                        assert!(amount > 0.0, "{currency} origin of {}", t.account_amount);
                        assert!(t.exchange_rate().is_some());
                    }
                }
            }
        }
    }
}
