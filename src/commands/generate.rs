use crate::commands::Out;
use crate::format::Format;
use crate::generator::{self, ContextBuilder, GeneratedFile, RunOptions};
use crate::model::{Archetype, Currency, Task};
use crate::{Result, StatementsConfig};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// The demo statements: a salary paid from a European company, utilities, everyday spending and a
/// short burst of big events that ended 90 days ago.
pub fn demo_tasks(now: NaiveDateTime) -> Vec<Task> {
    vec![
        Task::new(Format::InecobankXml, Archetype::Salary, Currency::Eur)
            .with_end_date(now)
            .with_days_back(365)
            .with_other_currencies([Currency::Amd]),
        Task::new(Format::InecobankXml, Archetype::Utilities, Currency::Amd)
            .with_end_date(now)
            .with_days_back(365),
        Task::new(Format::AmeriaCsv, Archetype::Everyday, Currency::Amd)
            .with_end_date(now)
            .with_days_back(365),
        Task::new(Format::AmeriaCsv, Archetype::BigEvents, Currency::Amd)
            .with_end_date(now - Duration::days(90))
            .with_days_back(60),
    ]
}

/// Generates statements for `tasks`. The contexts are built together so that the tasks transfer
/// money between each other's accounts.
pub async fn generate(
    config: &StatementsConfig,
    tasks: &[Task],
    options: &RunOptions,
    seed: Option<u64>,
) -> Result<Out<Vec<GeneratedFile>>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    debug!("Generating {} statements with seed {seed:?}", tasks.len());
    info!(
        "Generating statements to match globs in '{}'...",
        config.folder().display()
    );

    let contexts =
        ContextBuilder::new(config.groups(), StdRng::seed_from_u64(rng.gen())).build(tasks)?;
    let files = generator::execute(config, contexts, options, &mut rng).await?;
    if options.plots {
        info!(
            "Diagnostics written to {}",
            config.folder().join(generator::DIAGNOSTICS_DIR).display()
        );
    }

    let total: usize = files.iter().map(|f| f.transactions).sum();
    Ok(Out::new(
        format!(
            "Generated {} statements with {total} transactions",
            files.len()
        ),
        files,
    ))
}
