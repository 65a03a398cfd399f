use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind};
use std::str::FromStr;
use std::time::Duration;

/// Default artificial delay before the producer signals
pub const DEFAULT_PRODUCER_DELAY_MS: u64 = 1000;

/// Order in which the coordinator starts the two roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartOrder {
    /// Consumer first, so it is normally already waiting when the producer runs
    #[default]
    ConsumerFirst,
    ProducerFirst,
    /// Decided per run by a coin flip
    Random,
}

impl FromStr for StartOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer-first" => Ok(StartOrder::ConsumerFirst),
            "producer-first" => Ok(StartOrder::ProducerFirst),
            "random" => Ok(StartOrder::Random),
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "unknown start order '{}' (expected consumer-first, producer-first or random)",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for StartOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartOrder::ConsumerFirst => "consumer-first",
            StartOrder::ProducerFirst => "producer-first",
            StartOrder::Random => "random",
        };
        f.write_str(name)
    }
}

/// Handshake run settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Producer sleep before signalling, in milliseconds (JSON field: producer_delay_ms)
    pub producer_delay_ms: u64,
    /// Thread start order (JSON field: start_order)
    pub start_order: StartOrder,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            producer_delay_ms: DEFAULT_PRODUCER_DELAY_MS,
            start_order: StartOrder::default(),
        }
    }
}

impl Config {
    pub fn producer_delay(&self) -> Duration {
        Duration::from_millis(self.producer_delay_ms)
    }
}

/// Parses a configuration file into a [`Config`]
///
/// # Arguments
/// * `filename` - Path to configuration file
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON or unknown fields (`InvalidInput`)
///
/// # File Format
/// A single JSON object. Empty lines and lines starting with `#` are ignored.
/// Missing fields take their defaults:
/// ```text
/// # slower demo, producer starts first
/// {"producer_delay_ms": 2000, "start_order": "producer-first"}
/// ```
pub fn parse_config(filename: &str) -> Result<Config, Error> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);

    let mut json = String::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        json.push_str(trimmed);
        json.push('\n');
    }

    if json.is_empty() {
        return Ok(Config::default());
    }

    serde_json::from_str(&json).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("invalid config in {}: {}", filename, e),
        )
    })
}
