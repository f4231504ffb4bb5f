use std::collections::HashMap;

use aws_sdk_cloudwatchlogs::operation::create_log_group::CreateLogGroupError;
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::operation::describe_log_streams::DescribeLogStreamsError;
use aws_sdk_cloudwatchlogs::operation::put_log_events::PutLogEventsError;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("create log group failed: {0}")]
    CreateGroup(#[source] CreateLogGroupError),

    #[error("create log stream failed: {0}")]
    CreateStream(#[source] CreateLogStreamError),

    #[error("describe log streams failed: {0}")]
    DescribeStreams(#[source] DescribeLogStreamsError),

    #[error("put log events failed: {0}")]
    PutEvents(#[source] PutLogEventsError),

    #[error("invalid log event: {0}")]
    Build(#[from] aws_sdk_cloudwatchlogs::error::BuildError),
}

/// Result of an idempotent create call against the log service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

/// CloudWatch Logs sink: one log stream per source group inside a fixed log
/// group, with the per-stream sequence tokens the service requires for
/// ordered appends.
///
/// The token registry lives as long as this value does. Losing it is safe;
/// the next `ensure_log_stream` rebuilds the token from the service.
pub struct LogSink {
    client: Client,
    log_group: String,
    // StreamName -> last-known upload token. A present key means the stream
    // has already been ensured this process lifetime.
    stream_tokens: HashMap<String, Option<String>>,
}

impl LogSink {
    pub fn new(client: Client, log_group: impl Into<String>) -> Self {
        Self {
            client,
            log_group: log_group.into(),
            stream_tokens: HashMap::new(),
        }
    }

    /// Create the log group if it does not exist yet. Any failure other
    /// than "already exists" propagates to the caller.
    pub async fn ensure_log_group(&self) -> Result<EnsureOutcome, SinkError> {
        match self
            .client
            .create_log_group()
            .log_group_name(&self.log_group)
            .send()
            .await
        {
            Ok(_) => Ok(EnsureOutcome::Created),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_resource_already_exists_exception() {
                    Ok(EnsureOutcome::AlreadyExists)
                } else {
                    Err(SinkError::CreateGroup(err))
                }
            }
        }
    }

    /// Create the stream on first sight, or recover its upload token when it
    /// already exists. Memoized for the process lifetime; repeat calls for a
    /// known stream are no-ops.
    pub async fn ensure_log_stream(&mut self, stream_name: &str) -> Result<EnsureOutcome, SinkError> {
        if self.stream_tokens.contains_key(stream_name) {
            return Ok(EnsureOutcome::AlreadyExists);
        }

        match self
            .client
            .create_log_stream()
            .log_group_name(&self.log_group)
            .log_stream_name(stream_name)
            .send()
            .await
        {
            Ok(_) => {
                // Fresh stream, no prior events, no token yet.
                self.stream_tokens.insert(stream_name.to_string(), None);
                debug!(stream = stream_name, "created log stream");
                Ok(EnsureOutcome::Created)
            }
            Err(err) => {
                let err = err.into_service_error();
                if !err.is_resource_already_exists_exception() {
                    return Err(SinkError::CreateStream(err));
                }

                let described = self
                    .client
                    .describe_log_streams()
                    .log_group_name(&self.log_group)
                    .log_stream_name_prefix(stream_name)
                    .send()
                    .await
                    .map_err(|e| SinkError::DescribeStreams(e.into_service_error()))?;

                if let Some(stream) = described.log_streams().first() {
                    self.stream_tokens.insert(
                        stream_name.to_string(),
                        stream.upload_sequence_token().map(str::to_string),
                    );
                }
                Ok(EnsureOutcome::AlreadyExists)
            }
        }
    }

    /// Append a single event to `stream_name`, threading the sequence token
    /// through the registry. The service rejects out-of-order tokens, so
    /// appends to one stream must stay strictly sequential.
    pub async fn append_event(
        &mut self,
        stream_name: &str,
        message: &str,
        timestamp_ms: i64,
    ) -> Result<(), SinkError> {
        self.ensure_log_stream(stream_name).await?;
        let token = self.stream_tokens.get(stream_name).cloned().flatten();

        let event = InputLogEvent::builder()
            .timestamp(timestamp_ms)
            .message(message)
            .build()?;

        let mut request = self
            .client
            .put_log_events()
            .log_group_name(&self.log_group)
            .log_stream_name(stream_name)
            .log_events(event);
        if let Some(token) = token {
            request = request.sequence_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::PutEvents(e.into_service_error()))?;

        self.stream_tokens.insert(
            stream_name.to_string(),
            response.next_sequence_token().map(str::to_string),
        );

        debug!(stream = stream_name, "appended log event");
        Ok(())
    }
}
