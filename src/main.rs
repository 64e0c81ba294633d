use std::path::PathBuf;

use clap::Parser;
use contribution_engine::api::{AppState, create_router};
use contribution_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "contribution-engine",
    about = "Serve the payroll contribution engine over HTTP",
    version
)]
struct Cli {
    /// Directory holding schedule.yaml and the catalogs/ folder
    #[arg(long, default_value = "./config/urssaf")]
    config: PathBuf,
    /// Host address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(&cli.config)?;
    let metadata = config.metadata();
    info!(
        schedule = %metadata.code,
        catalogs = config.catalogs().len(),
        path = %cli.config.display(),
        "Contribution catalogs loaded"
    );

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Contribution engine listening");

    axum::serve(listener, app).await?;
    Ok(())
}
