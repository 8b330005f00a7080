use crate::format::{dmy, period, Format, StatementSerializer};
use crate::generator::fake;
use crate::model::money::{fixed, grouped};
use crate::model::{Operation, TaskContext};
use crate::Result;
use anyhow::Context;
use rand::rngs::StdRng;
use rust_xlsxwriter::Workbook;

const SHEET_NAME: &str = "Statement";

/// Width of the transaction table.
const COLUMNS: usize = 18;
const DATE_COL: usize = 0;
const AMOUNT_COL: usize = 1;
const CURRENCY_COL: usize = 3;
const INCOME_COL: usize = 5;
const EXPENSE_COL: usize = 6;
const RATE_COL: usize = 7;
const DETAILS_COL: usize = 17;

/// The Inecobank Excel statement: a single `Statement` worksheet with a labelled header block and
/// an 18-column transaction table.
#[derive(Debug, Clone, Copy, Default)]
pub struct InecobankXlsx;

impl InecobankXlsx {
    /// The worksheet content, row by row. Empty strings are left as blank cells.
    pub fn rows(client: &str, ctx: &TaskContext, operations: &[Operation]) -> Vec<Vec<String>> {
        let (first, last) = period(ctx, operations);
        let mut rows: Vec<Vec<String>> = vec![
            vec!["Հաշվի համար՝".into(), ctx.account_number().into()],
            vec!["Հաշվի արժույթ՝".into(), ctx.account_currency().to_string()],
            vec!["Հաճախորդ՝".into(), client.into()],
            vec![],
            vec![
                "Ժամանակահատված՝".into(),
                format!("{} - {}", dmy(first), dmy(last)),
            ],
            vec![],
            vec![
                "Գործարքներ/այլ գործառնություններ".into(),
                "Գործարքի գումար հաշվի արժույթով".into(),
                "Կիրառվող փոխարժեք".into(),
                "Հաշվի վերջնական մնացորդ".into(),
                "Գործարքի նկարագրություն".into(),
            ],
            vec![
                "Ամսաթիվ".into(),
                "Գումար".into(),
                String::new(),
                "Արժույթ".into(),
                String::new(),
                "Մուտք".into(),
                "Ելք".into(),
            ],
        ];

        let mut labels = vec![String::new(); COLUMNS];
        labels[RATE_COL] = "Փոխարժեք".into();
        labels[DETAILS_COL] = "Մանրամասներ".into();
        rows.push(labels);

        for op in operations {
            let t = &op.transaction;
            let amount = fixed(t.account_amount);
            let mut row = vec![String::new(); COLUMNS];
            row[DATE_COL] = dmy(op.at);
            row[AMOUNT_COL] = amount.clone();
            row[CURRENCY_COL] = t.account_currency.to_string();
            if t.is_income {
                row[INCOME_COL] = amount;
                row[EXPENSE_COL] = "0.00".into();
            } else {
                row[INCOME_COL] = "0.00".into();
                row[EXPENSE_COL] = amount;
            }
            let mut details = t.description.clone();
            if let (Some((origin_currency, origin_amount)), Some(rate)) =
                (t.origin, t.exchange_rate())
            {
                row[RATE_COL] = format!("{rate:.4}");
                details.push_str(&format!(" {} {origin_currency}", grouped(origin_amount)));
            }
            row[DETAILS_COL] = details;
            rows.push(row);
        }

        rows.push(vec![]);
        rows.push(vec!["Մնացորդ՝".into(), fixed(ctx.current_balance())]);
        rows
    }
}

impl StatementSerializer for InecobankXlsx {
    fn format(&self) -> Format {
        Format::InecobankXlsx
    }

    fn render(
        &self,
        rng: &mut StdRng,
        ctx: &TaskContext,
        operations: &[Operation],
    ) -> Result<Vec<u8>> {
        let client = fake::name(rng);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(SHEET_NAME)
            .context("Unable to name the worksheet")?;
        for (r, row) in Self::rows(&client, ctx, operations).iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(r as u32, c as u16, cell)
                    .with_context(|| format!("Unable to write cell ({r}, {c})"))?;
            }
        }
        workbook
            .save_to_buffer()
            .context("Unable to serialize the workbook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support;
    use rand::SeedableRng;

    #[test]
    fn test_rows() {
        let ctx = test_support::context(Format::InecobankXlsx);
        let ops = test_support::operations();
        let rows = InecobankXlsx::rows("Anna Petrosyan", &ctx, &ops);

        assert_eq!(rows[0][1], "1234567890123456");
        assert_eq!(rows[1][1], "AMD");
        assert_eq!(rows[2][1], "Anna Petrosyan");
        assert!(rows[3].is_empty());
        assert_eq!(rows[4][1], "03/03/2025 - 07/03/2025");
        assert_eq!(rows[8].len(), 18);
        assert_eq!(rows[8][7], "Փոխարժեք");
        assert_eq!(rows[8][17], "Մանրամասներ");

        let income = &rows[9];
        assert_eq!(income.len(), 18);
        assert_eq!(income[0], "03/03/2025");
        assert_eq!(income[1], "39000.00");
        assert_eq!(income[3], "AMD");
        assert_eq!(income[5], "39000.00");
        assert_eq!(income[6], "0.00");
        assert_eq!(income[7], "390.0000");
        assert_eq!(income[17], "SALARY REF:ABCD123 100.00 USD");
        assert_eq!(income[2], "");

        let expense = &rows[10];
        assert_eq!(expense[5], "0.00");
        assert_eq!(expense[6], "60000.00");
        assert_eq!(expense[7], "");
        assert_eq!(expense[17], "Transfer between my accounts");

        assert!(rows[11].is_empty());
        assert_eq!(rows[12], vec!["Մնացորդ՝", "179000.00"]);
        assert_eq!(rows.len(), 13);
    }

    #[test]
    fn test_render_produces_a_zip() {
        let ctx = test_support::context(Format::InecobankXlsx);
        let bytes = InecobankXlsx
            .render(
                &mut StdRng::seed_from_u64(1),
                &ctx,
                &test_support::operations(),
            )
            .unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");
    }
}
