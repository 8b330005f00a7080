use crate::config::StatementsConfig;
use crate::format::{serializer_for, Format};
use crate::generator::{schedule, Simulator};
use crate::model::TaskContext;
use crate::{utils, Result};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

/// Options of one generator run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Remove files matching a format's glob before writing the first file of that format.
    pub remove_old: bool,
    /// Write diagnostics series for every task.
    pub plots: bool,
}

/// A statement file written by [`execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub summary: String,
    pub transactions: usize,
}

/// Simulates and writes one statement per context into the config folder, in order.
///
/// Each task gets its own simulator seeded from `rng`, so a seeded run is reproducible.
pub async fn execute(
    config: &StatementsConfig,
    contexts: Vec<TaskContext>,
    options: &RunOptions,
    rng: &mut StdRng,
) -> Result<Vec<GeneratedFile>> {
    let folder = config.folder();
    let mut seen: BTreeSet<Format> = BTreeSet::new();
    let mut generated = Vec::with_capacity(contexts.len());

    for mut ctx in contexts {
        let format = ctx.task().format();
        let key = format.glob_key();
        if seen.insert(format) && options.remove_old {
            let glob = config.glob(format)?;
            for removed in utils::remove_matching(folder, glob).await? {
                let name = removed.file_name().unwrap_or_default().to_string_lossy();
                info!("{key}: Removed {name}");
            }
        }

        let path = folder.join(config.file_name(format, &ctx.task().suffix())?);
        if let Some(parent) = path.parent() {
            utils::make_dir(parent).await?;
        }
        info!(
            "{key}: Generating {} for {} task",
            path.display(),
            ctx.task().suffix()
        );

        let mut simulator =
            Simulator::new(StdRng::seed_from_u64(rng.gen()), config.groups().clone());
        let timestamps = schedule::timestamps(simulator.rng(), ctx.task());
        let statement = serializer_for(format)
            .write(&mut simulator, &mut ctx, &timestamps)
            .with_context(|| format!("Unable to generate {}", path.display()))?;
        utils::write(&path, &statement.bytes).await?;

        if options.plots {
            simulator.diagnostics().write(folder, ctx.task()).await?;
        }
        info!("{key}: {} at {}", statement.summary, path.display());
        generated.push(GeneratedFile {
            path,
            summary: statement.summary,
            transactions: statement.transactions,
        });
    }
    Ok(generated)
}
