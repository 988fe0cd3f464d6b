use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::RelayError;

pub const DEFAULT_AMQP_PORT: u16 = 5672;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    pub host: String,
    pub port: u16,
}

impl BrokerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses a comma-separated `host:port` list, keeping the listed order.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, RelayError> {
        let endpoints = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Self>, _>>()?;

        if endpoints.is_empty() {
            return Err(RelayError::configuration(
                "RABBITMQ_HOSTS does not contain any host",
            ));
        }

        Ok(endpoints)
    }
}

impl FromStr for BrokerEndpoint {
    type Err = RelayError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let (host, port) = match entry.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|_| {
                    RelayError::configuration(format!("invalid port in RABBITMQ_HOSTS entry '{}'", entry))
                })?;
                (host.trim(), port)
            }
            None => (entry.trim(), DEFAULT_AMQP_PORT),
        };

        if host.is_empty() {
            return Err(RelayError::configuration(format!(
                "missing host in RABBITMQ_HOSTS entry '{}'",
                entry
            )));
        }

        Ok(Self::new(host, port))
    }
}

impl Display for BrokerEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep the password out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
