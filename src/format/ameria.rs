use crate::format::{dmy, mask_account, period, Format, StatementSerializer};
use crate::generator::fake;
use crate::model::money::grouped;
use crate::model::{Operation, TaskContext, TRANSFER_BETWEEN_MY_ACCOUNTS};
use crate::Result;
use rand::rngs::StdRng;
use rand::Rng;

/// Little-endian UTF-16 byte order mark.
const BOM: [u8; 2] = [0xFF, 0xFE];

const TRANSACTION_HEADER: [&str; 8] = [
    "Date",
    "Doc.No.",
    "Type",
    "Account",
    "Details",
    "Debit",
    "Credit",
    "Remitter/Beneficiary",
];

/// One cell of the tab separated export. Text is quoted with embedded quotes doubled, placeholders
/// are left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Text(String),
    Empty,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Cell::Empty => String::new(),
        }
    }
}

/// A summary row: a label, two placeholder cells, then the values.
fn labelled(label: impl Into<String>, values: impl IntoIterator<Item = String>) -> Vec<Cell> {
    let mut row = vec![Cell::text(label), Cell::Empty, Cell::Empty];
    row.extend(values.into_iter().map(Cell::Text));
    row
}

/// The Ameria bank CSV export: tab separated, every text cell quoted, UTF-16LE with a byte order
/// mark. It carries no exchange rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmeriaCsv;

/// Classifies a transaction description the way the Ameria export does.
pub fn transaction_type(description: &str) -> &'static str {
    if description.contains("Currency Exchange") {
        "CEX"
    } else if description.contains("Card Replenishment") {
        "TRF"
    } else if description.to_lowercase().contains("fee") {
        "FEE"
    } else {
        "MSC"
    }
}

impl AmeriaCsv {
    fn rows(rng: &mut StdRng, ctx: &TaskContext, operations: &[Operation]) -> Vec<Vec<Cell>> {
        let account = ctx.account_number();
        let currency = ctx.account_currency().to_string();
        let client = fake::name(rng).to_uppercase();
        let (start, end) = period(ctx, operations);

        let mut rows = vec![
            labelled("Start of Period", [dmy(start)]),
            labelled("End of Period", [dmy(end)]),
            labelled("Account No.", [account.to_string(), client]),
            labelled("Currency", [currency.clone(), format!("{currency} currency")]),
            labelled("TIN", [rng.gen_range(10_000_000..=99_999_999).to_string()]),
            vec![],
        ];

        let mut total_debit = 0.0;
        let mut total_credit = 0.0;
        let mut closing = ctx.opening_balance();
        let mut transactions = Vec::with_capacity(operations.len());
        for op in operations {
            let t = &op.transaction;
            let doc_no = fake::digits(rng, 6);
            let kind = transaction_type(&t.description);
            let (debit, credit) = if t.is_income {
                total_credit += t.account_amount;
                closing += t.account_amount;
                (0.0, t.account_amount)
            } else {
                total_debit += t.account_amount;
                closing -= t.account_amount;
                (t.account_amount, 0.0)
            };

            let details = if t.description.contains(TRANSFER_BETWEEN_MY_ACCOUNTS) {
                if t.is_income {
                    "Card Replenishment".to_string()
                } else {
                    format!("{} {}", t.description, mask_account(account))
                }
            } else if rng.gen_bool(0.3) {
                let city = fake::prefix(fake::city(rng), 8).to_uppercase();
                format!("{}\\Purchase POS {city}", t.description)
            } else {
                t.description.clone()
            };

            transactions.push(vec![
                Cell::text(dmy(op.at)),
                Cell::text(doc_no),
                Cell::text(kind),
                Cell::text(t.counterparty()),
                Cell::text(details),
                Cell::text(grouped(debit)),
                Cell::text(grouped(credit)),
                Cell::text(""),
            ]);
        }

        rows.push(labelled(
            format!("Opening Balance on {}", dmy(start)),
            [grouped(ctx.opening_balance())],
        ));
        rows.push(labelled("Debit Turnover", [grouped(total_debit)]));
        rows.push(labelled("Credit Turnover", [grouped(total_credit)]));
        rows.push(labelled(
            format!("Closing Balance on {}", dmy(end)),
            [grouped(closing)],
        ));
        rows.push(labelled("Closing Available Balance", [grouped(closing)]));
        rows.push(vec![]);
        rows.push(TRANSACTION_HEADER.iter().map(|h| Cell::text(*h)).collect());
        rows.extend(transactions);
        rows.push(vec![]);
        rows.push(labelled(
            "Days Count",
            [ctx.task().days_back().to_string()],
        ));
        rows
    }
}

/// Joins cells with tabs and rows with `\n`, without a trailing newline.
fn to_text(rows: &[Vec<Cell>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(Cell::render).collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// UTF-16LE with a byte order mark.
fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes = BOM.to_vec();
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

impl StatementSerializer for AmeriaCsv {
    fn format(&self) -> Format {
        Format::AmeriaCsv
    }

    fn render(
        &self,
        rng: &mut StdRng,
        ctx: &TaskContext,
        operations: &[Operation],
    ) -> Result<Vec<u8>> {
        let rows = Self::rows(rng, ctx, operations);
        Ok(encode_utf16le(&to_text(&rows)))
    }
}
