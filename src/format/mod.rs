//! Statement serializers. Each bank layout is a [`StatementSerializer`]; use [`serializer_for`] to
//! get the one for a [`Format`].
mod ameria;
mod generic;
mod xlsx;
mod xml;

pub use ameria::{transaction_type, AmeriaCsv};
pub use generic::GenericCsv;
pub use xlsx::InecobankXlsx;
pub use xml::InecobankXml;

use crate::generator::Simulator;
use crate::model::{Operation, TaskContext};
use crate::Result;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// The statement layouts the generator can produce.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    InecobankXml,
    InecobankXlsx,
    AmeriaCsv,
    GenericCsv,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

impl Format {
    pub const ALL: [Format; 4] = [
        Format::InecobankXml,
        Format::InecobankXlsx,
        Format::AmeriaCsv,
        Format::GenericCsv,
    ];

    /// The config key holding the file name glob for this format.
    pub fn glob_key(self) -> &'static str {
        match self {
            Format::InecobankXml => "inecobankStatementXmlFilesGlob",
            Format::InecobankXlsx => "inecobankStatementXlsxFilesGlob",
            Format::AmeriaCsv => "ameriaCsvFilesGlob",
            Format::GenericCsv => "genericCsvFilesGlob",
        }
    }

    /// A human readable name used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            Format::InecobankXml => "Inecobank XML statement",
            Format::InecobankXlsx => "Inecobank Excel statement",
            Format::AmeriaCsv => "Ameria CSV statement",
            Format::GenericCsv => "Generic CSV",
        }
    }
}

/// A fully rendered statement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub bytes: Vec<u8>,
    /// E.g. `Generated Ameria CSV statement with 12 transactions`.
    pub summary: String,
    pub transactions: usize,
}

/// Writes one task's transactions in a bank's statement layout.
pub trait StatementSerializer {
    fn format(&self) -> Format;

    /// Renders already simulated operations. `ctx` holds the final balance and counts. `rng` is
    /// used for decorative fields such as client names and document numbers.
    fn render(&self, rng: &mut StdRng, ctx: &TaskContext, operations: &[Operation])
        -> Result<Vec<u8>>;

    /// Simulates one transaction per timestamp and renders the result.
    fn write(
        &self,
        simulator: &mut Simulator,
        ctx: &mut TaskContext,
        timestamps: &[NaiveDateTime],
    ) -> Result<Statement> {
        let operations = simulator.run(ctx, timestamps)?;
        let bytes = self.render(simulator.rng(), ctx, &operations)?;
        Ok(Statement {
            bytes,
            summary: format!(
                "Generated {} with {} transactions",
                self.format().label(),
                operations.len()
            ),
            transactions: operations.len(),
        })
    }
}

/// Returns the serializer for `format`.
pub fn serializer_for(format: Format) -> Box<dyn StatementSerializer> {
    match format {
        Format::InecobankXml => Box::new(InecobankXml),
        Format::InecobankXlsx => Box::new(InecobankXlsx),
        Format::AmeriaCsv => Box::new(AmeriaCsv),
        Format::GenericCsv => Box::new(GenericCsv),
    }
}

/// `dd/mm/yyyy`.
pub(crate) fn dmy(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// The first and last operation times, or the task end date twice when there are none.
pub(crate) fn period(ctx: &TaskContext, operations: &[Operation]) -> (NaiveDateTime, NaiveDateTime) {
    let first = operations.iter().map(|o| o.at).min();
    let last = operations.iter().map(|o| o.at).max();
    match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => (ctx.task().end_date(), ctx.task().end_date()),
    }
}

/// Keeps the first four and last three characters, e.g. `1234***789`.
pub(crate) fn mask_account(account: &str) -> String {
    let chars: Vec<char> = account.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    format!("{head}***{tail}")
}
