use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookfinder::logging::init().context("init logging")?;

    let cli = bookfinder::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        bookfinder::cli::Command::Search(args) => {
            bookfinder::search::run(args).await.context("search")?;
        }
    }

    Ok(())
}
