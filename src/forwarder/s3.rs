use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use thiserror::Error;
use tracing::info;

use crate::config::DateMode;
use crate::forwarder::buffer::LineBuffer;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("put object failed: {0}")]
    PutObject(#[source] PutObjectError),
}

/// Key a stream's buffered lines are flushed under for a given day.
pub fn object_key(stream_name: &str, date: &str) -> String {
    format!("{stream_name}/{date}.log")
}

/// S3 sink: one `{stream}/{date}.log` object per stream per calendar day.
///
/// A flush replaces the day's object wholesale; the store has no append, so
/// repeated flushes for the same stream and day overwrite each other.
pub struct ObjectStoreSink {
    client: Client,
    bucket: String,
    date_mode: DateMode,
}

impl ObjectStoreSink {
    pub fn new(client: Client, bucket: impl Into<String>, date_mode: DateMode) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            date_mode,
        }
    }

    /// Write the buffered lines as one newline-joined object. No-op when
    /// the buffer is empty.
    pub async fn flush(
        &self,
        buffer: &LineBuffer,
        stream_name: &str,
    ) -> Result<(), ObjectStoreError> {
        if buffer.is_empty() {
            return Ok(());
        }

        let key = object_key(stream_name, &self.date_mode.today());
        let body = buffer.join();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| ObjectStoreError::PutObject(e.into_service_error()))?;

        info!(
            bucket = %self.bucket,
            key = %key,
            lines = buffer.len(),
            "flushed buffer to object store"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_format() {
        assert_eq!(
            object_key("svc_api_prod", "2026-08-29"),
            "svc_api_prod/2026-08-29.log"
        );
    }
}
