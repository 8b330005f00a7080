use crate::model::Task;
use crate::{utils, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// The folder, relative to the statements folder, that diagnostics are written to.
pub const DIAGNOSTICS_DIR: &str = "tmp/demo_plots";

/// Series recorded while simulating one task, for inspecting the generated data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    /// `(timestamp, account amount, is_income)` per transaction.
    pub amounts: Vec<(NaiveDateTime, f64, bool)>,
    /// `(timestamp, total accounts in all pools)` after each transaction.
    pub pool_sizes: Vec<(NaiveDateTime, usize)>,
    /// `(category, is_income)` per transaction.
    pub categories: Vec<(String, bool)>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty() && self.pool_sizes.is_empty() && self.categories.is_empty()
    }

    pub fn clear(&mut self) {
        self.amounts.clear();
        self.pool_sizes.clear();
        self.categories.clear();
    }

    /// How many times each category was used as `(income, expense)` counts.
    pub fn category_counts(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for (category, is_income) in &self.categories {
            let entry = counts.entry(category.as_str()).or_default();
            if *is_income {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        counts
    }

    /// Writes `amounts_<suffix>.csv`, `accounts_<suffix>.csv` and `categories_<suffix>.csv` under
    /// `<folder>/tmp/demo_plots`. Nothing is written when no data was recorded.
    pub async fn write(&self, folder: &Path, task: &Task) -> Result<Vec<PathBuf>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let dir = folder.join(DIAGNOSTICS_DIR);
        utils::make_dir(&dir).await?;
        let suffix = task.suffix();
        let mut written = Vec::new();

        if !self.amounts.is_empty() {
            let mut w = csv::Writer::from_writer(Vec::new());
            w.write_record(["Timestamp", "Amount", "IsIncome"])?;
            for (at, amount, is_income) in &self.amounts {
                w.write_record([
                    at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    format!("{amount:.2}"),
                    is_income.to_string(),
                ])?;
            }
            let path = dir.join(format!("amounts_{suffix}.csv"));
            utils::write(&path, utils::csv_bytes(w)?).await?;
            written.push(path);
        }

        if !self.pool_sizes.is_empty() {
            let mut w = csv::Writer::from_writer(Vec::new());
            w.write_record(["Timestamp", "Accounts"])?;
            for (at, size) in &self.pool_sizes {
                w.write_record([at.format("%Y-%m-%d %H:%M:%S").to_string(), size.to_string()])?;
            }
            let path = dir.join(format!("accounts_{suffix}.csv"));
            utils::write(&path, utils::csv_bytes(w)?).await?;
            written.push(path);
        }

        if !self.categories.is_empty() {
            let mut w = csv::Writer::from_writer(Vec::new());
            w.write_record(["Category", "Income", "Expense"])?;
            for (category, (income, expense)) in self.category_counts() {
                w.write_record([category.to_string(), income.to_string(), expense.to_string()])?;
            }
            let path = dir.join(format!("categories_{suffix}.csv"));
            utils::write(&path, utils::csv_bytes(w)?).await?;
            written.push(path);
        }

        for path in &written {
            info!("Generated diagnostics: {}", path.display());
        }
        Ok(written)
    }
}
