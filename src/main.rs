use anyhow::{Error, Result};
use gateway_adapter::api::run_api_server;
use gateway_adapter::config::Config;
use gateway_adapter::dispatch::NotificationDispatcher;
use gateway_adapter::handlers::{HandlerRegistry, default_handlers};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = Config::load()?;
    let resolver = config.account_resolver();
    let dispatcher = NotificationDispatcher::new(HandlerRegistry::new(default_handlers()));

    run_api_server(config, dispatcher, resolver).await
}
