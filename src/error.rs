use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Everything that can go wrong between reading the environment and settling a delivery.
///
/// Startup and broker-session failures are fatal; decode, delivery and unexpected
/// failures are scoped to a single message and only decide how it gets settled.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not connect to any RabbitMQ host: {}", .attempts.join("; "))]
    Connection { attempts: Vec<String> },

    #[error("topology declaration failed: {0}")]
    Topology(String),

    #[error("invalid JSON in message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("webhook responded with HTTP {status}: {body}")]
    DeliveryStatus { status: u16, body: String },

    #[error("failed to send to webhook: {0}")]
    DeliveryTransport(String),

    #[error("error processing message: {0}")]
    Unexpected(String),

    #[error("broker error: {0}")]
    Broker(String),
}

impl RelayError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn broker(message: impl Into<String>) -> Self {
        Self::Broker(message.into())
    }

    /// Fatal errors stop the process; the rest only reject the current message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Connection { .. } | Self::Topology(_) | Self::Broker(_)
        )
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::DeliveryStatus { .. } | Self::DeliveryTransport(_))
    }
}
