use clap::Parser;
use logscope::config::AppConfig;
use logscope::infrastructure::logstore::{HttpLogStore, LogStore};
use logscope::infrastructure::model::OllamaClient;
use logscope::tui;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "logscope",
    version,
    about = "Query your logs in natural language from the terminal"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<String>,
    /// Model name override
    #[arg(long)]
    model: Option<String>,
    /// Ollama base URL override
    #[arg(long)]
    ollama_url: Option<String>,
    /// Log store gateway URL override
    #[arg(long)]
    endpoint: Option<String>,
    /// Log store region override
    #[arg(long)]
    region: Option<String>,
    /// Credential profile override
    #[arg(long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("starting logscope");

    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(Path::new);
    let mut config = AppConfig::load(config_path)?;
    debug!(path = ?config_path, "configuration loaded");

    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(url) = cli.ollama_url {
        config.ollama_url = url;
    }
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }

    let endpoint = match &config.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => {
            error!("no log store endpoint configured");
            eprintln!(
                "No log store endpoint is configured. Set `endpoint` in the config file or pass --endpoint."
            );
            std::process::exit(1);
        }
    };

    let store = Arc::new(HttpLogStore::new(
        endpoint,
        config.region.clone(),
        config.profile.clone(),
    ));

    // Bootstrap: verify the identity before any query can run.
    let identity = match store.caller_identity().await {
        Ok(identity) => identity,
        Err(err) => {
            error!(%err, "failed to verify log store identity");
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    };
    info!(account = %identity.account, arn = %identity.arn, "log store session established");

    let provider = Arc::new(OllamaClient::new(config.ollama_url.clone()));
    let store: Arc<dyn LogStore> = store;
    tui::run(provider, store, Arc::new(config), identity).await?;

    info!("logscope finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
