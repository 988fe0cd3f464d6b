use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Renders event timestamps in a fixed IANA timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer {
    tz: Tz,
}

impl ZonedTimer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Unknown zone names resolve to UTC; the flag reports whether that happened.
    pub fn from_name(name: &str) -> (Self, bool) {
        match name.trim().parse::<Tz>() {
            Ok(tz) => (Self::new(tz), false),
            Err(_) => (Self::new(Tz::UTC), true),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format(TIMESTAMP_FORMAT).to_string()
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", self.timestamp(Utc::now()))
    }
}

/// Installs the stdout subscriber. Stdout is line-buffered, so every event is
/// flushed as soon as its line is written.
pub fn init(timezone: &str) {
    let (timer, fell_back) = ZonedTimer::from_name(timezone);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_timer(timer)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stdout);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    if fell_back {
        warn!(timezone, "Unknown timezone, falling back to UTC");
    }
}
