use std::io::Write;
use std::time::Duration;

use flate2::write::GzEncoder;
use reqwest::Client;
use url::Url;

use crate::event::LogEvent;
use crate::transport::{Transport, TransportError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport posting each batch as newline-delimited payloads.
///
/// Events are concatenated with `\n` and sent in a single POST to the
/// configured endpoint, optionally gzip-compressed. A non-2xx response is a
/// failed attempt; the dispatcher's backoff takes it from there.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    headers: Vec<(String, String)>,
    compress: bool,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            headers: Vec::new(),
            compress: false,
        })
    }

    /// Add a header to every request, e.g. an API key.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Gzip request bodies.
    pub fn gzip(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

impl Transport for HttpTransport {
    async fn dispatch(&self, batch: &[LogEvent]) -> Result<(), TransportError> {
        let body = ndjson_body(batch);
        let body = if self.compress {
            compress_gzip(&body)?
        } else {
            body
        };

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", "application/x-ndjson");

        if self.compress {
            req = req.header("content-encoding", "gzip");
        }

        for (name, value) in &self.headers {
            req = req.header(name, value);
        }

        let resp = req.body(body).send().await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Rejected {
                status: resp.status(),
            })
        }
    }
}

fn ndjson_body(batch: &[LogEvent]) -> Vec<u8> {
    let mut body = Vec::with_capacity(batch.iter().map(|e| e.len() + 1).sum());
    for (i, event) in batch.iter().enumerate() {
        if i > 0 {
            body.push(b'\n');
        }
        body.extend_from_slice(event.payload());
    }
    body
}

fn compress_gzip(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(data)?;
    encoder.finish()
}
