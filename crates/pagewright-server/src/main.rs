use clap::Parser;
use tracing_subscriber::EnvFilter;

use pagewright_core::config::{Config, WarnLevel};
use pagewright_server::state::AppState;

#[derive(Parser)]
#[command(
    name = "pagewright",
    about = "Brief-to-pages deployment service — generate, publish, and host small web apps",
    version
)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::from_env();
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => tracing::error!("{}", warning.message),
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
        }
    }

    let state = AppState::new(config);
    pagewright_server::serve(state, &cli.bind, cli.port).await
}
