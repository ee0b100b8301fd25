use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Classified gateway failure. Callers distinguish these four kinds and
/// nothing finer; parse failures surface as [`ApiError::Network`] for the
/// snapshot and [`ApiError::Malformed`] for push messages.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message} ({status} {status_text})")]
    Transport {
        status: u16,
        status_text: String,
        message: String,
    },

    /// No usable response: connection, read, or body parse failure.
    #[error("{message}")]
    Network { message: String },

    /// The event channel failed. Terminal for the subscription.
    #[error("event channel failed: {message}")]
    Channel { message: String },

    /// A single push message could not be parsed. Recoverable; the
    /// subscription continues.
    #[error("malformed push message: {message}")]
    Malformed { message: String },
}

#[derive(Clone)]
pub struct SlotApiClient {
    client: Client,
    base_url: String,
}

impl SlotApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().build().map_err(|e| ApiError::Network {
            message: format!("Failed to build HTTP client: {e}"),
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the full slot snapshot from `{base}/timeSlots`.
    pub async fn fetch_snapshot(&self) -> Result<Vec<Value>, ApiError> {
        let url = format!("{}/timeSlots", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                message: format!("Failed to fetch time slots: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                message: "Failed to fetch time slots".to_string(),
            });
        }

        let text = resp.text().await.map_err(|e| ApiError::Network {
            message: format!("Failed to read time slots response: {e}"),
        })?;
        debug!("Snapshot response (status {}): {}", status, text);

        let body: Value = serde_json::from_str(&text).map_err(|e| ApiError::Network {
            message: format!("Failed to parse time slots response: {e}"),
        })?;

        match body {
            Value::Array(slots) => Ok(slots),
            other => Err(ApiError::Network {
                message: format!("Expected an array of time slots, got: {other}"),
            }),
        }
    }

    /// Opens the live update channel at `{base}/sse`. The returned
    /// subscription is non-restartable; reconnecting means calling
    /// `subscribe` again.
    pub async fn subscribe(&self) -> Result<SlotSubscription, ApiError> {
        let url = format!("{}/sse", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| ApiError::Channel {
                message: format!("Failed to open event channel: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Channel {
                message: format!("Event channel refused with status {status}"),
            });
        }
        debug!("Event channel open at {}", url);

        Ok(SlotSubscription {
            stream: Box::pin(resp.bytes_stream().map(|r| r.map(|b| b.to_vec()))),
            buffer: Vec::new(),
            closed: false,
        })
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// A live `text/event-stream` subscription yielding one parsed JSON value
/// per event. Events are framed by blank lines; `data:` lines are
/// concatenated, comments and other fields are ignored.
pub struct SlotSubscription {
    stream: ByteStream,
    buffer: Vec<u8>,
    closed: bool,
}

impl SlotSubscription {
    /// Next push message. `Some(Err(Malformed))` for an unparsable payload,
    /// `Some(Err(Channel))` once on channel failure, then `None`. `None`
    /// also marks an orderly end of stream.
    pub async fn next_message(&mut self) -> Option<Result<Value, ApiError>> {
        loop {
            if let Some(block) = self.take_event() {
                let Some(data) = event_data(&block) else {
                    continue; // comment or heartbeat
                };
                return Some(serde_json::from_str::<Value>(&data).map_err(|e| {
                    ApiError::Malformed {
                        message: format!("{e} in {data:?}"),
                    }
                }));
            }

            if self.closed {
                return None;
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.extend(chunk.into_iter().filter(|b| *b != b'\r'));
                }
                Some(Err(e)) => {
                    self.closed = true;
                    return Some(Err(ApiError::Channel {
                        message: e.to_string(),
                    }));
                }
                // Orderly end; an unterminated trailing event is discarded.
                None => self.closed = true,
            }
        }
    }

    /// Closes the channel and releases the underlying connection.
    pub fn close(self) {}

    fn take_event(&mut self) -> Option<String> {
        let pos = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let rest = self.buffer.split_off(pos + 2);
        let block = std::mem::replace(&mut self.buffer, rest);
        Some(String::from_utf8_lossy(&block).into_owned())
    }
}

/// Joined `data:` payload of one event block, or `None` when the block
/// carries no data (comments, retry hints, bare event names).
fn event_data(block: &str) -> Option<String> {
    let mut data: Vec<&str> = Vec::new();
    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tokio::net::TcpListener;

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn event_data_joins_multiline_payloads() {
        assert_eq!(
            event_data("data: {\"id\":\ndata: 1}\n"),
            Some("{\"id\":\n1}".to_string())
        );
    }

    #[test]
    fn event_data_skips_comments_and_other_fields() {
        assert_eq!(event_data(": keep-alive\n"), None);
        assert_eq!(event_data("event: update\nretry: 500\n"), None);
        assert_eq!(
            event_data("event: update\ndata: {}\n"),
            Some("{}".to_string())
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let app = Router::new().route(
            "/timeSlots",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_server(app).await;

        let client = SlotApiClient::new(&base).unwrap();
        match client.fetch_snapshot().await {
            Err(ApiError::Transport {
                status,
                status_text,
                ..
            }) => {
                assert_eq!(status, 503);
                assert_eq!(status_text, "Service Unavailable");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = SlotApiClient::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(
            client.fetch_snapshot().await,
            Err(ApiError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn non_array_snapshot_is_a_network_error() {
        let app = Router::new().route("/timeSlots", get(|| async { "{\"data\": []}" }));
        let base = spawn_server(app).await;

        let client = SlotApiClient::new(&base).unwrap();
        assert!(matches!(
            client.fetch_snapshot().await,
            Err(ApiError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn subscription_yields_parsed_events_in_order() {
        let app = Router::new().route(
            "/sse",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    ": hello\n\ndata: {\"id\":1,\"currentCapacity\":7,\"category\":\"red\"}\n\ndata: not json\n\ndata: {\"id\":2}\n\n",
                )
            }),
        );
        let base = spawn_server(app).await;

        let client = SlotApiClient::new(&base).unwrap();
        let mut sub = client.subscribe().await.unwrap();

        let first = sub.next_message().await.unwrap().unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["currentCapacity"], 7);

        assert!(matches!(
            sub.next_message().await,
            Some(Err(ApiError::Malformed { .. }))
        ));

        let third = sub.next_message().await.unwrap().unwrap();
        assert_eq!(third["id"], 2);

        assert!(sub.next_message().await.is_none());
    }

    #[tokio::test]
    async fn refused_channel_is_a_channel_error() {
        let app = Router::new().route("/sse", get(|| async { StatusCode::NOT_FOUND }));
        let base = spawn_server(app).await;

        let client = SlotApiClient::new(&base).unwrap();
        assert!(matches!(
            client.subscribe().await,
            Err(ApiError::Channel { .. })
        ));
    }
}
