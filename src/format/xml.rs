use crate::format::{dmy, mask_account, period, Format, StatementSerializer};
use crate::generator::fake;
use crate::model::money::grouped;
use crate::model::{Operation, TaskContext};
use crate::Result;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rand::rngs::StdRng;
use std::io::Write;

/// Marks a non-cash operation in the details column.
const NON_CASH: &str = "Անկանխիկ գործարք";

/// The Inecobank XML statement: a `Statement` root with header nodes and one `Operation` per
/// transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InecobankXml;

impl StatementSerializer for InecobankXml {
    fn format(&self) -> Format {
        Format::InecobankXml
    }

    fn render(
        &self,
        rng: &mut StdRng,
        ctx: &TaskContext,
        operations: &[Operation],
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut wr = Writer::new_with_indent(&mut out, b' ', 2);
        wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        wr.write_event(Event::Start(BytesStart::new("Statement")))?;

        let account = ctx.account_number();
        let currency = ctx.account_currency().to_string();
        let (first, last) = period(ctx, operations);
        text_element(&mut wr, "Client", &fake::name(rng))?;
        text_element(&mut wr, "AccountNumber", account)?;
        text_element(&mut wr, "Currency", &currency)?;
        text_element(&mut wr, "Period", &format!("[{} - {}]", dmy(first), dmy(last)))?;
        text_element(&mut wr, "Openingbalance", &grouped(ctx.opening_balance()))?;
        // Consumers divide the closing balance by 1000.
        text_element(
            &mut wr,
            "Closingbalance",
            &grouped(ctx.current_balance() * 1000.0),
        )?;

        wr.write_event(Event::Start(BytesStart::new("Operations")))?;
        for op in operations {
            let t = &op.transaction;
            wr.write_event(Event::Start(BytesStart::new("Operation")))?;
            text_element(&mut wr, "n-n", &fake::digits(rng, 9))?;
            text_element(&mut wr, "Number", &fake::digits(rng, 10))?;
            text_element(&mut wr, "Date", &dmy(op.at))?;
            text_element(&mut wr, "Currency", &currency)?;
            let amount = grouped(t.account_amount);
            let (income, expense) = if t.is_income {
                (amount.as_str(), "0.00")
            } else {
                ("0.00", amount.as_str())
            };
            text_element(&mut wr, "Income", income)?;
            text_element(&mut wr, "Expense", expense)?;
            text_element(&mut wr, "Receiver-PayerAccount", t.counterparty())?;
            let receiver_payer = receiver_payer(&t.description);
            text_element(&mut wr, "Receiver-Payer", receiver_payer)?;

            let mut details = format!(
                "{}, {NON_CASH}, {}, {receiver_payer}({}), {}",
                t.description,
                mask_account(account),
                t.origin_currency(),
                op.at.format("%d/%m/%Y %H:%M:%S")
            );
            if let (Some((origin_currency, origin_amount)), Some(rate)) =
                (t.origin, t.exchange_rate())
            {
                details.push_str(&format!(
                    ", {} {origin_currency} * {rate:.4} = {} {}",
                    grouped(origin_amount),
                    grouped(t.account_amount),
                    t.account_currency
                ));
            }
            text_element(&mut wr, "Details", &details)?;
            wr.write_event(Event::End(BytesStart::new("Operation").to_end()))?;
        }
        wr.write_event(Event::End(BytesStart::new("Operations").to_end()))?;
        wr.write_event(Event::End(BytesStart::new("Statement").to_end()))?;
        Ok(out)
    }
}

/// The first word of a description.
fn receiver_payer(description: &str) -> &str {
    description.split(' ').next().unwrap_or(description)
}

fn text_element<W: Write>(wr: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    wr.write_event(Event::Start(BytesStart::new(name)))?;
    wr.write_event(Event::Text(BytesText::new(text)))?;
    wr.write_event(Event::End(BytesStart::new(name).to_end()))?;
    Ok(())
}
