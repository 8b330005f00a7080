//! The synthetic transaction generator: context building, scheduling, simulation and the run
//! that writes statement files.
mod context;
mod diagnostics;
pub(crate) mod fake;
mod run;
pub mod schedule;
mod simulator;

pub use context::ContextBuilder;
pub use diagnostics::{Diagnostics, DIAGNOSTICS_DIR};
pub use run::{execute, GeneratedFile, RunOptions};
pub use simulator::Simulator;

#[cfg(test)]
pub(crate) fn demo_groups() -> crate::model::CategoryGroups {
    crate::model::CategoryGroups::new([
        ("Groceries", vec!["SAS SUPERMARKET", "YEREVAN CITY"]),
        ("Entertainment", vec!["CINEMA STAR"]),
        ("Health", vec!["MEDLINE CLINIC"]),
        ("Pharmacies", vec!["ALFA PHARM"]),
        ("Taxi", vec!["YANDEX GO"]),
        ("Online shopping", vec!["WILDBERRIES"]),
        ("Subscriptions", vec!["NETFLIX"]),
        ("Cash", vec!["ATM CASH WITHDRAWAL"]),
        ("Salary", vec!["SALARY"]),
        ("Utilities and rent", vec!["ENA", "VEOLIA JUR"]),
        (
            "Transfer between my accounts",
            vec!["Transfer between my accounts"],
        ),
    ])
}
