use anyhow::{Error, Result};
use notification_relay::{
    clients::{rbmq::RabbitMqClient, webhook::WebhookClient},
    config::{Config, DEFAULT_TIMEZONE},
    consumer, logging,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // amqps endpoints need a process-wide crypto provider; a second install is harmless.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::load();
    let timezone = config
        .as_ref()
        .map(|config| config.timezone.as_str())
        .unwrap_or(DEFAULT_TIMEZONE);
    logging::init(timezone);

    let config = config.inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!(
        queue = %config.queue_name,
        topic = %config.topic,
        exchanges = ?config.exchanges,
        ignored_event_types = ?config.ignored_event_types,
        "Configuration loaded"
    );

    let webhook = WebhookClient::from_config(&config)?;

    let client = RabbitMqClient::connect(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Could not connect to RabbitMQ"))?;

    client
        .declare_topology(&config.queue_spec(), &config.binding_specs())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to declare queue topology"))?;

    consumer::run(client, &config, &webhook).await?;

    info!("Notification relay stopped");

    Ok(())
}
