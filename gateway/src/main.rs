use clap::Parser;
use config_cache::{ApiConfigClient, ConfigCache};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use verifier::{
    CreditorInstitutionClient, PaymentOptionsService, RouterConfig, TracingSink,
};

mod api;
mod config;

#[derive(Parser)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_file(&cli.config)?;

    let provider = ApiConfigClient::new(
        &config.cache.url,
        config.cache.subscription_key.clone(),
    );
    let cache = ConfigCache::new(Arc::new(provider));

    let service = PaymentOptionsService::new(
        cache.clone(),
        CreditorInstitutionClient::new(
            config.forwarder.subscription_key.clone(),
            Duration::from_secs(config.forwarder.timeout_secs),
        ),
        RouterConfig {
            forwarder_endpoint: config.forwarder.endpoint.clone(),
            forwarder_path: config.forwarder.path.clone(),
            direct_endpoint: config.direct.as_ref().map(|d| d.endpoint.clone()),
        },
        Arc::new(TracingSink),
    );

    let state = api::AppState {
        service: Arc::new(service),
        cache,
    };

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    tracing::info!(%addr, "starting payment options gateway");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
