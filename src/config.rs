use std::time::Duration;

use dotenvy::dotenv;
use serde::Deserialize;
use url::Url;

use crate::{
    error::RelayError,
    models::{
        endpoint::{BrokerEndpoint, Credentials},
        topology::{BindingSpec, QueueSpec},
    },
};

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_WEBHOOK_TIMEOUT_SECONDS: u64 = 30;

/// Variables as they come out of the environment, before validation.
#[derive(Deserialize, Debug)]
struct EnvConfig {
    rabbitmq_username: String,
    rabbitmq_password: String,
    rabbitmq_hosts: String,
    queue_name: String,
    topic: String,
    exchanges: String,
    webhook_url: String,

    #[serde(default)]
    ignored_event_types: Option<String>,
    #[serde(default)]
    tz: Option<String>,
    #[serde(default)]
    webhook_timeout_seconds: Option<u64>,
}

/// Immutable relay configuration, built once at startup and passed down explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub hosts: Vec<BrokerEndpoint>,
    pub queue_name: String,
    pub topic: String,
    pub exchanges: Vec<String>,
    pub webhook_url: Url,
    pub ignored_event_types: Vec<String>,
    pub timezone: String,
    /// `None` leaves webhook calls unbounded.
    pub webhook_timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self, RelayError> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::from_iter::<_, EnvConfig>(vars).map_err(|e| match e {
            envy::Error::MissingValue(field) => missing(&field.to_uppercase()),
            other => RelayError::configuration(other.to_string()),
        })?;

        let username = required("RABBITMQ_USERNAME", env.rabbitmq_username)?;
        let password = required("RABBITMQ_PASSWORD", env.rabbitmq_password)?;
        let hosts = required("RABBITMQ_HOSTS", env.rabbitmq_hosts)?;
        let queue_name = required("QUEUE_NAME", env.queue_name)?;
        let topic = required("TOPIC", env.topic)?;
        let exchanges = required("EXCHANGES", env.exchanges)?;
        let webhook_url = required("WEBHOOK_URL", env.webhook_url)?;

        let exchanges = split_list(&exchanges);
        if exchanges.is_empty() {
            return Err(RelayError::configuration(
                "EXCHANGES does not contain any exchange name",
            ));
        }

        let webhook_url = Url::parse(webhook_url.trim())
            .map_err(|e| RelayError::configuration(format!("WEBHOOK_URL is not a valid URL: {}", e)))?;
        if !matches!(webhook_url.scheme(), "http" | "https") {
            return Err(RelayError::configuration(format!(
                "WEBHOOK_URL must use http or https, got '{}'",
                webhook_url.scheme()
            )));
        }

        let timezone = env
            .tz
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let webhook_timeout = match env
            .webhook_timeout_seconds
            .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECONDS)
        {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };

        Ok(Self {
            credentials: Credentials { username, password },
            hosts: BrokerEndpoint::parse_list(&hosts)?,
            queue_name: queue_name.trim().to_string(),
            topic: topic.trim().to_string(),
            exchanges,
            webhook_url,
            ignored_event_types: env
                .ignored_event_types
                .as_deref()
                .map(split_list)
                .unwrap_or_default(),
            timezone,
            webhook_timeout,
        })
    }

    pub fn queue_spec(&self) -> QueueSpec {
        QueueSpec::quorum(&self.queue_name)
    }

    pub fn binding_specs(&self) -> Vec<BindingSpec> {
        self.exchanges
            .iter()
            .map(|exchange| BindingSpec {
                exchange: exchange.clone(),
                queue: self.queue_name.clone(),
                routing_key: self.topic.clone(),
            })
            .collect()
    }

    pub fn is_ignored(&self, event_type: &str) -> bool {
        self.ignored_event_types
            .iter()
            .any(|ignored| ignored == event_type)
    }
}

fn missing(name: &str) -> RelayError {
    RelayError::configuration(format!("required environment variable '{}' is not set", name))
}

fn required(name: &str, value: String) -> Result<String, RelayError> {
    if value.trim().is_empty() {
        return Err(missing(name));
    }
    Ok(value)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
