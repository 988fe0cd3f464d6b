use std::future::Future;

use futures_util::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    clients::{rbmq::RabbitMqClient, webhook::WebhookClient},
    config::Config,
    error::RelayError,
    utils::process_message,
};

/// Consumes until Ctrl+C or SIGTERM. See [`run_until`].
pub async fn run(
    client: RabbitMqClient,
    config: &Config,
    webhook: &WebhookClient,
) -> Result<(), RelayError> {
    run_until(client, config, webhook, shutdown_signal()).await
}

/// Serial receive loop: each delivery is processed and settled before the next
/// one is pulled. Prefetch 1 keeps at most one unacknowledged message on this consumer.
///
/// Returns `Ok` once `shutdown` resolves and the session is closed. A consumer
/// stream that ends or fails is a broker error; there is no reconnect.
pub async fn run_until<S>(
    client: RabbitMqClient,
    config: &Config,
    webhook: &WebhookClient,
    shutdown: S,
) -> Result<(), RelayError>
where
    S: Future<Output = ()>,
{
    client.set_prefetch().await?;

    let consumer_tag = format!("notification-relay-{}", Uuid::new_v4());
    let mut consumer = client
        .create_consumer(&config.queue_name, &consumer_tag)
        .await?;

    info!(
        "Listening for notifications on quorum queue '{}'...",
        config.queue_name
    );

    tokio::pin!(shutdown);

    let result = loop {
        let next = tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, closing connection...");
                break Ok(());
            }
            next = consumer.next() => next,
        };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(e)) => break Err(RelayError::broker(format!("consumer failed: {}", e))),
            None => break Err(RelayError::broker("consumer stream ended")),
        };

        let outcome = process_message(&delivery.data, config, webhook).await;
        let decision = outcome.ack_decision();

        if let Err(e) = client.settle(delivery.delivery_tag, decision).await {
            break Err(e);
        }

        debug!(
            delivery_tag = delivery.delivery_tag,
            decision = %decision,
            "Delivery settled"
        );
    };

    if let Err(e) = result {
        error!(error = %e, "Receive loop stopped");
        return Err(e);
    }

    if let Err(e) = client.cancel_consumer(&consumer_tag).await {
        warn!(error = %e, "Failed to cancel consumer");
    }

    client.close().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
