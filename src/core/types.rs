//! Core data model: request ids, descriptors, outcomes and selectors

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque, globally unique identifier of one logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One node of a selector: a field name, or a nested list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorNode {
    Field(String),
    Nested(Vec<SelectorNode>),
}

impl From<&str> for SelectorNode {
    fn from(s: &str) -> Self {
        SelectorNode::Field(s.to_string())
    }
}

/// Backend-interpreted description of which response fields the caller wants.
///
/// The client never looks inside; it is forwarded under the `_s` key of the
/// request's BLEST headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(pub Vec<SelectorNode>);

impl Selector {
    pub fn new(nodes: Vec<SelectorNode>) -> Self {
        Self(nodes)
    }

    /// Flat selector from plain field names
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            fields
                .into_iter()
                .map(|f| SelectorNode::Field(f.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Key under which the selector travels in the BLEST headers object
pub const SELECTOR_HEADER: &str = "_s";

/// Per-request options accepted by `request` and `lazy_request`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Do not enqueue on creation; the view stays at the idle default until refreshed
    pub skip: bool,
    /// Optional response selector
    pub select: Option<Selector>,
    /// Extra BLEST headers for this request (sent inside the batch, not as HTTP headers)
    pub headers: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_select(mut self, select: Selector) -> Self {
        self.select = Some(select);
        self
    }

    pub fn with_header<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.headers.insert(key.into(), value);
        self
    }

    /// Build the BLEST headers object for the wire, or `None` when there is nothing to send.
    ///
    /// The selector always wins over a caller header that happens to use `_s`.
    pub fn blest_headers(&self) -> Option<Value> {
        let mut headers = self.headers.clone();
        if let Some(select) = &self.select {
            headers.insert(SELECTOR_HEADER.to_string(), serde_json::to_value(select).ok()?);
        }
        if headers.is_empty() {
            None
        } else {
            Some(Value::Object(headers))
        }
    }
}

/// A request waiting in the pending queue. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub id: RequestId,
    pub route: String,
    pub parameters: Option<Value>,
    pub headers: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(
        id: RequestId,
        route: impl Into<String>,
        parameters: Option<Value>,
        headers: Option<Value>,
    ) -> Self {
        Self {
            id,
            route: route.into(),
            // JSON null and "no parameters" are the same thing on the wire
            parameters: parameters.filter(|p| !p.is_null()),
            headers: headers.filter(|h| !h.is_null()),
        }
    }
}

/// Classification of an outcome error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeErrorKind {
    /// The server reported an error for this specific request
    Application,
    /// The batch could not be sent or the connection failed
    Transport,
    /// The batch endpoint answered with a non-success HTTP status
    Status,
    /// The batch response could not be decoded
    Decode,
    /// The batch response did not mention this request
    Unacknowledged,
    /// The client was disposed before the request was sent
    Disposed,
}

/// Error carried by a terminal outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: OutcomeErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl OutcomeError {
    /// Wrap an error value reported by the server for one request
    pub fn application(value: Value) -> Self {
        let message = match &value {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            other => other.to_string(),
        };
        Self {
            kind: OutcomeErrorKind::Application,
            message,
            details: Some(value),
        }
    }

    pub fn unacknowledged(id: &RequestId) -> Self {
        Self {
            kind: OutcomeErrorKind::Unacknowledged,
            message: format!("Batch response did not include request {}", id),
            details: None,
        }
    }
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Tri-state result of one request id: pending, success, or error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub loading: bool,
    pub error: Option<OutcomeError>,
    pub data: Option<Value>,
}

impl RequestOutcome {
    /// Outcome published at enqueue time
    pub fn pending() -> Self {
        Self {
            loading: true,
            error: None,
            data: None,
        }
    }

    /// Outcome seen for ids that have no entry yet (or were never issued)
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn success(data: Option<Value>) -> Self {
        Self {
            loading: false,
            error: None,
            data,
        }
    }

    pub fn failure(error: OutcomeError) -> Self {
        Self {
            loading: false,
            error: Some(error),
            data: None,
        }
    }

    /// Terminal outcome built from one response item's data and error slots
    pub fn from_result(data: Option<Value>, error: Option<Value>) -> Self {
        Self {
            loading: false,
            error: error.map(OutcomeError::application),
            data,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !self.loading
    }

    pub fn is_ok(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}
