use std::{fmt::Display, future::Future};

use tracing::{debug, error, info, warn};

use crate::{
    clients::webhook::WebhookClient,
    config::Config,
    error::RelayError,
    models::{endpoint::BrokerEndpoint, message::Notification, outcome::ProcessingOutcome},
};

/// Runs one delivery through decode, filter, log and forward.
///
/// Every failure is contained in the returned outcome; nothing here ends the
/// receive loop.
pub async fn process_message(
    payload: &[u8],
    config: &Config,
    webhook: &WebhookClient,
) -> ProcessingOutcome {
    match forward_notification(payload, config, webhook).await {
        Ok(outcome) => outcome,
        Err(e) => {
            match &e {
                RelayError::Decode(_) => warn!(error = %e, "Invalid JSON in message"),
                e if e.is_delivery() => warn!(error = %e, "Failed to send to webhook"),
                _ => error!(error = %e, "Error processing message"),
            }
            ProcessingOutcome::Failed(e)
        }
    }
}

async fn forward_notification(
    payload: &[u8],
    config: &Config,
    webhook: &WebhookClient,
) -> Result<ProcessingOutcome, RelayError> {
    let notification = Notification::decode(payload)?;
    let envelope = notification.envelope()?;

    let event_type = envelope.event_type();
    if config.is_ignored(&event_type) {
        info!("Ignoring event type: {}", event_type);
        return Ok(ProcessingOutcome::Ignored { event_type });
    }

    let summary = envelope.summary()?;
    info!("{}", summary);

    // The webhook gets the whole notification, not the unwrapped envelope.
    webhook.deliver(notification.as_value()).await?;

    debug!(event_type = %summary.event_type, "Notification forwarded to webhook");

    Ok(ProcessingOutcome::Forwarded)
}

/// Single pass over the endpoints in listed order; stops at the first success.
pub async fn connect_with_failover<T, E, F, Fut>(
    endpoints: &[BrokerEndpoint],
    mut attempt: F,
) -> Result<(BrokerEndpoint, T), RelayError>
where
    F: FnMut(BrokerEndpoint) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut failures = Vec::with_capacity(endpoints.len());

    for endpoint in endpoints {
        match attempt(endpoint.clone()).await {
            Ok(session) => {
                info!("Connected to RabbitMQ at {}", endpoint);
                return Ok((endpoint.clone(), session));
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", endpoint, e);
                failures.push(format!("{}: {}", endpoint, e));
            }
        }
    }

    Err(RelayError::Connection { attempts: failures })
}
