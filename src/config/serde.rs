use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// `serde_with` adapter reading durations written as `"2s"`, `"1m 30s"`, ...
pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize, Serialize)]
    struct Sample {
        #[serde_as(as = "HumantimeDuration")]
        fade: Duration,
    }

    #[test]
    fn humantime_duration_parses_compound_strings() {
        let sample: Sample = match serde_json::from_str(r#"{"fade":"1m 30s"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(sample.fade, Duration::from_secs(90));
    }

    #[test]
    fn humantime_duration_serializes_back_to_text() {
        let sample = Sample {
            fade: Duration::from_millis(2_500),
        };
        let json = match serde_json::to_string(&sample) {
            Ok(value) => value,
            Err(err) => panic!("failed to serialize sample: {err}"),
        };
        assert_eq!(json, r#"{"fade":"2s 500ms"}"#);
    }
}
