use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use bookfinder::app::controller::SearchController;
use bookfinder::app::routes::router;
use bookfinder::cli::ConfigArgs;
use bookfinder::source::HttpVolumeSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[command(flatten)]
    connection: ConfigArgs,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookfinder::logging::init()?;

    let args = AppArgs::parse();
    tracing::info!(addr = %args.addr, "starting bookfinder-app");

    let config = bookfinder::search::load_config(&args.connection)?;
    let source = HttpVolumeSource::new()?;
    let controller = Arc::new(SearchController::new(config, Arc::new(source)));
    let app = router(controller);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(?err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
