use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Custom serializer for Duration to milliseconds
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Backoff {
        #[serde(
            deserialize_with = "deserialize_duration_from_ms",
            serialize_with = "serialize_duration_to_ms"
        )]
        initial: Duration,
        #[serde(
            deserialize_with = "deserialize_duration_from_seconds",
            serialize_with = "serialize_duration_to_seconds"
        )]
        timeout: Duration,
    }

    #[test]
    fn reads_milliseconds_and_seconds() {
        let parsed: Backoff = serde_json::from_str(r#"{"initial": 250, "timeout": 1800}"#).unwrap();
        assert_eq!(parsed.initial, Duration::from_millis(250));
        assert_eq!(parsed.timeout, Duration::from_secs(1800));
    }

    #[test]
    fn writes_back_in_the_same_units() {
        let value = Backoff { initial: Duration::from_millis(5), timeout: Duration::from_secs(30) };
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"initial":5,"timeout":30}"#);
    }

    #[test]
    fn rejects_negative_durations() {
        let result: Result<Backoff, _> = serde_json::from_str(r#"{"initial": -1, "timeout": 1}"#);
        assert!(result.is_err());
    }
}
