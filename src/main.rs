use bank_statements::args::{Args, Command};
use bank_statements::generator::RunOptions;
use bank_statements::{commands, DownloaderConfig, Mode, Result, StatementsConfig};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");

    // This allows for running the downloader without hitting MyAmeria. When
    // BANKSTMT_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Testing,
    // otherwise it will be Mode::MyAmeria.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Generate(generate_args) => {
            let config = StatementsConfig::load(generate_args.config()).await?;
            let options = RunOptions {
                remove_old: !generate_args.keep_old(),
                plots: generate_args.plots(),
            };
            let tasks = commands::demo_tasks(Local::now().naive_local());
            commands::generate(&config, &tasks, &options, generate_args.seed())
                .await?
                .print()
        }

        Command::Download(download_args) => {
            let config = DownloaderConfig::load(download_args.config()).await?;
            commands::download(&config, mode).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "bank_statements",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
