use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

/// Stream name used when a payload carries no source log group.
pub const UNKNOWN_SOURCE: &str = "unknown-source";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("gzip decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("invalid subscription payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// CloudWatch Logs subscription document carried inside each Kinesis record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    #[serde(default)]
    pub log_group: Option<String>,

    #[serde(default)]
    pub log_events: Vec<SubscriptionLogEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionLogEvent {
    #[serde(default)]
    pub message: String,

    /// Millisecond epoch. Absent in some test fixtures and agent versions.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl SubscriptionPayload {
    /// Decompress and parse a record's data. Base64 has already been undone
    /// by the event deserializer, so `data` is the raw gzip blob.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = MultiGzDecoder::new(data);
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Log stream name for this payload: the source log group with path
    /// separators flattened, or a sentinel when the group is absent.
    pub fn stream_name(&self) -> String {
        match &self.log_group {
            Some(group) => group.replace('/', "_"),
            None => UNKNOWN_SOURCE.to_string(),
        }
    }
}

impl SubscriptionLogEvent {
    /// Event timestamp in milliseconds, defaulting to the current time.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_well_formed_payload() {
        let data = gzip(
            br#"{
                "logGroup": "svc/api/prod",
                "logEvents": [
                    {"message": "first", "timestamp": 1700000000000},
                    {"message": "second"}
                ]
            }"#,
        );

        let payload = SubscriptionPayload::decode(&data).unwrap();
        assert_eq!(payload.log_group.as_deref(), Some("svc/api/prod"));
        assert_eq!(payload.log_events.len(), 2);
        assert_eq!(payload.log_events[0].message, "first");
        assert_eq!(payload.log_events[0].timestamp, Some(1700000000000));
        assert_eq!(payload.log_events[1].timestamp, None);
    }

    #[test]
    fn test_decode_corrupt_gzip() {
        let result = SubscriptionPayload::decode(b"not gzip at all");
        assert!(matches!(result, Err(DecodeError::Decompress(_))));
    }

    #[test]
    fn test_decode_invalid_json() {
        let data = gzip(b"{ this is not json");
        let result = SubscriptionPayload::decode(&data);
        assert!(matches!(result, Err(DecodeError::Payload(_))));
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let data = gzip(b"{}");
        let payload = SubscriptionPayload::decode(&data).unwrap();
        assert!(payload.log_group.is_none());
        assert!(payload.log_events.is_empty());
    }

    #[test]
    fn test_stream_name_flattens_separators() {
        let payload = SubscriptionPayload {
            log_group: Some("a/b/c".to_string()),
            log_events: Vec::new(),
        };
        assert_eq!(payload.stream_name(), "a_b_c");
    }

    #[test]
    fn test_stream_name_sentinel_when_group_missing() {
        let payload = SubscriptionPayload {
            log_group: None,
            log_events: Vec::new(),
        };
        assert_eq!(payload.stream_name(), UNKNOWN_SOURCE);
    }

    #[test]
    fn test_timestamp_defaults_to_now() {
        let event = SubscriptionLogEvent {
            message: String::new(),
            timestamp: None,
        };
        let before = chrono::Utc::now().timestamp_millis();
        let ts = event.timestamp_ms();
        let after = chrono::Utc::now().timestamp_millis();
        assert!(ts >= before && ts <= after);
    }
}
