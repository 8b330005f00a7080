use crate::generator::fake;
use crate::model::{CategoryGroups, PoolAccount, Task, TaskContext};
use crate::Result;
use anyhow::bail;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Builds the simulation state for a batch of tasks. All tasks of one batch know each other's
/// accounts as "my accounts", so they must be built together.
pub struct ContextBuilder<'a> {
    groups: &'a CategoryGroups,
    rng: StdRng,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(groups: &'a CategoryGroups, rng: StdRng) -> Self {
        Self { groups, rng }
    }

    /// A random 16-digit account number.
    pub fn account_number(&mut self) -> String {
        fake::digits(&mut self.rng, 16)
    }

    /// Returns one context per task, in the same order.
    pub fn build(&mut self, tasks: &[Task]) -> Result<Vec<TaskContext>> {
        let numbers: Vec<String> = tasks.iter().map(|_| self.account_number()).collect();
        let mut contexts = Vec::with_capacity(tasks.len());
        for (i, (task, account_number)) in tasks.iter().zip(&numbers).enumerate() {
            let desc = task.archetype().desc();
            let income_categories = self.groups.filter_defined(desc.income_categories);
            let expense_categories = self.groups.filter_defined(desc.expense_categories);
            if income_categories.is_empty() {
                bail!(
                    "No valid income categories found for task type {}. Categories {:?} don't \
                    exist in config groups. Check the groups section of your config",
                    task.archetype(),
                    desc.income_categories
                );
            }
            if expense_categories.is_empty() {
                bail!(
                    "No valid expense categories found for task type {}. Categories {:?} don't \
                    exist in config groups. Check the groups section of your config",
                    task.archetype(),
                    desc.expense_categories
                );
            }

            let r: f64 = self.rng.gen();
            let opening_usd = desc.balance_min_usd + r * (desc.balance_max_usd - desc.balance_min_usd);
            let opening_balance = task.currency().from_usd(opening_usd);

            let mut income_accounts: Vec<PoolAccount> = Vec::new();
            let mut expense_accounts: Vec<PoolAccount> = Vec::new();
            for _ in 0..desc.accounts_per_category {
                income_accounts.push((self.account_number(), task.currency()));
                let expense_currency = task
                    .other_currencies()
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(task.currency());
                expense_accounts.push((self.account_number(), expense_currency));
            }

            let my_accounts = numbers
                .iter()
                .zip(tasks)
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (number, other))| (number.clone(), other.currency()))
                .collect();

            debug!(
                "Built context for {} with account {account_number} and opening balance \
                {opening_balance}",
                task.suffix()
            );
            contexts.push(TaskContext {
                task: task.clone(),
                account_number: account_number.clone(),
                account_currency: task.currency(),
                my_accounts,
                income_categories,
                expense_categories,
                income_accounts,
                expense_accounts,
                opening_balance,
                current_balance: opening_balance,
                transactions_count: 0,
            });
        }
        Ok(contexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::generator::demo_groups;
    use crate::model::{Archetype, Currency};
    use rand::SeedableRng;

    #[test]
    fn test_contexts_are_cross_linked() {
        let groups = demo_groups();
        let tasks = vec![
            Task::new(Format::InecobankXml, Archetype::Salary, Currency::Eur)
                .with_other_currencies([Currency::Amd]),
            Task::new(Format::InecobankXml, Archetype::Utilities, Currency::Amd),
            Task::new(Format::AmeriaCsv, Archetype::Everyday, Currency::Amd),
        ];
        let mut builder = ContextBuilder::new(&groups, StdRng::seed_from_u64(11));
        let contexts = builder.build(&tasks).unwrap();
        assert_eq!(contexts.len(), 3);

        for (i, ctx) in contexts.iter().enumerate() {
            assert_eq!(ctx.account_number().len(), 16);
            assert_eq!(ctx.my_accounts().len(), 2);
            assert!(ctx
                .my_accounts()
                .iter()
                .all(|(n, _)| n != ctx.account_number()));
            let others: Vec<&str> = contexts
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| c.account_number())
                .collect();
            for (n, _) in ctx.my_accounts() {
                assert!(others.contains(&n.as_str()));
            }
            let per_category = ctx.task().archetype().desc().accounts_per_category;
            assert_eq!(ctx.income_accounts().len(), per_category);
            assert_eq!(ctx.expense_accounts().len(), per_category);
            let (min, max) = ctx.balance_bounds();
            assert!(ctx.opening_balance() >= min && ctx.opening_balance() <= max);
            assert_eq!(ctx.opening_balance(), ctx.current_balance());
        }

        let salary = &contexts[0];
        assert!(salary
            .expense_accounts()
            .iter()
            .all(|(_, c)| *c == Currency::Amd));
        assert!(salary
            .income_accounts()
            .iter()
            .all(|(_, c)| *c == Currency::Eur));
        assert_eq!(contexts[1].my_accounts()[0].1, Currency::Eur);
    }

    #[test]
    fn test_everyday_categories_are_filtered() {
        let groups = CategoryGroups::new([("Groceries", vec!["SAS"]), ("Salary", vec!["SALARY"])]);
        let tasks = vec![Task::new(Format::AmeriaCsv, Archetype::Everyday, Currency::Amd)];
        let contexts = ContextBuilder::new(&groups, StdRng::seed_from_u64(1))
            .build(&tasks)
            .unwrap();
        assert_eq!(
            contexts[0].expense_categories,
            vec!["Groceries", "Groceries", "Groceries"]
        );
        assert_eq!(contexts[0].income_categories, vec!["Salary"]);
    }

    #[test]
    fn test_missing_categories_name_the_archetype() {
        let groups = CategoryGroups::new([("Salary", vec!["SALARY"])]);
        let tasks = vec![Task::new(Format::AmeriaCsv, Archetype::Utilities, Currency::Amd)];
        let err = ContextBuilder::new(&groups, StdRng::seed_from_u64(1))
            .build(&tasks)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expense"), "{msg}");
        assert!(msg.contains("UTILITIES"), "{msg}");
    }
}
