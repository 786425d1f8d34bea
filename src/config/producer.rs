use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use super::{deserialize_duration_from_seconds, serialize_duration_to_seconds};

fn default_producer_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

/// The external command that scrapes a fresh snapshot.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProducerConfig {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// File the command writes its snapshot to.
    pub output_path: PathBuf,
    /// Maximum run time before the command is killed.
    #[serde(
        default = "default_producer_timeout",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub timeout_secs: Duration,
}
