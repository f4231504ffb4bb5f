use serde::{Deserialize, Serialize};

/// Log group that receives every forwarded stream.
pub const LOG_GROUP_NAME: &str = "ArcXP/DynamicLogStreams";

/// Lines accumulated before a mid-batch flush to the object store.
pub const MAX_LOG_BUFFER_SIZE: usize = 100;

const DEFAULT_BUCKET: &str = "arcxpplogs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bucket: String,
    #[serde(default)]
    pub date_mode: DateMode,
}

/// Which calendar day a flushed object is keyed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    Utc,
    Local,
}

impl DateMode {
    /// Today's date as it appears in object keys (`YYYY-MM-DD`).
    pub fn today(&self) -> String {
        match self {
            DateMode::Utc => chrono::Utc::now().format("%Y-%m-%d").to_string(),
            DateMode::Local => chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

impl Config {
    /// Resolve configuration from the environment. Both variables are
    /// optional; unset or unrecognized values fall back to defaults.
    pub fn from_env() -> Self {
        let bucket =
            std::env::var("S3_BUCKET_NAME").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        let date_mode = match std::env::var("LOG_DATE_MODE").as_deref() {
            Ok("local") => DateMode::Local,
            _ => DateMode::Utc,
        };
        Self { bucket, date_mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_mode_defaults_to_utc() {
        assert_eq!(DateMode::default(), DateMode::Utc);
    }

    #[test]
    fn test_today_is_iso_date() {
        let today = DateMode::Utc.today();
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }

    #[test]
    fn test_date_mode_deserializes_lowercase() {
        let mode: DateMode = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(mode, DateMode::Local);
    }
}
