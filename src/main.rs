use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use debt_reckoning::{run, Command, Error, FileStorage, Ledger, Settings};

#[derive(Debug, Parser)]
#[command(name = "debt-reckoning", about = "Track who owes whom how much")]
struct Cli {
    /// Config file path (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the directory holding the ledger
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run_app().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Error> {
    let cli = Cli::parse();

    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    let mut ledger = Ledger::load(FileStorage::new(&settings.data_dir)).await;
    run(&mut ledger, cli.command, &settings.currency_symbol, io::stdout()).await
}
