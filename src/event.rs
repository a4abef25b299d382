use bytes::Bytes;
use serde::Serialize;

/// One log event, as an opaque pre-serialized payload.
///
/// The relay never inspects the payload; it only moves it. Callers render
/// events however their collector expects (JSON, logfmt, protobuf) before
/// handing them over. Clones are cheap; the payload is reference-counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent(Bytes);

impl LogEvent {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Render a structured value to a JSON payload.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self(Bytes::from(serde_json::to_vec(value)?)))
    }

    pub fn payload(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Bytes> for LogEvent {
    fn from(payload: Bytes) -> Self {
        Self(payload)
    }
}
