use clap::Parser;
use findash::args::{Args, Command, OutputFormat};
use findash::{commands, Config, Mode, Result};
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
    let home = args.common().findash_home().path();

    // When FINDASH_IN_TEST_MODE is set and non-empty, Google sheets are replaced by the demo data
    // so that the program can be exercised without network access.
    let mode = Mode::from_env();

    match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.sheet_url())
                .await?
                .print(OutputFormat::Text)?;
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(&config, mode, summary_args)
                .await?
                .print(summary_args.format())?;
        }

        Command::Transactions(transactions_args) => {
            let config = Config::load(home).await?;
            commands::transactions(&config, mode, transactions_args)
                .await?
                .print(transactions_args.format())?;
        }

        Command::Template(template_args) => {
            commands::template(template_args)
                .await?
                .print(OutputFormat::Text)?;
        }
    }
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
                env!("CARGO_CRATE_NAME"),
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
