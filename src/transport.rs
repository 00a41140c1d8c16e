//! Host transport seam.
//!
//! A [`Transport`] performs one exchange for a [`PreparedRequest`] and reports progress through a
//! state change notification carrying the [`Response`], the transport object handed to the
//! completion callback.
use bytes::Bytes;
use std::rc::Rc;

use crate::entity::{Entity, EntityError};

#[cfg(feature = "tokio")]
mod body;
#[cfg(feature = "tokio")]
mod net;

#[cfg(feature = "tokio")]
pub use body::{Collect, Full};
#[cfg(feature = "tokio")]
pub use net::HyperTransport;

/// Status reported for network level failures.
pub const NETWORK_ERROR: u16 = 0;

/// Transport state, as reported to state change notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    #[default]
    Unsent,
    Opened,
    HeadersReceived,
    Loading,
    /// The exchange finished, successfully or not.
    Done,
}

// ===== Response =====

/// Raw response as observed by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    url: String,
    ready_state: ReadyState,
    status: u16,
    headers: Vec<(String, String)>,
    text: String,
}

impl Response {
    /// Create unsent response for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create finished response with given status.
    pub fn done(url: impl Into<String>, status: u16) -> Self {
        Self::new(url).with_state(ReadyState::Done).with_status(status)
    }

    /// Create finished response for a failed exchange.
    pub fn network_error(url: impl Into<String>) -> Self {
        Self::done(url, NETWORK_ERROR)
    }

    pub fn with_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns the requested url.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn is_done(&self) -> bool {
        self.ready_state == ReadyState::Done
    }

    /// Returns the status code, `0` for network failures.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header value with given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn etag(&self) -> Option<&str> {
        self.header("etag")
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.header("last-modified")
    }

    /// Returns the raw response text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ===== Request =====

/// Request as handed to the transport: final url, headers and body.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) is_async: bool,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) payload: Payload,
}

impl PreparedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Returns headers in the order they are set on the transport.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the last header value with given name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Outgoing body.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    /// Serialized form, XML or JSON text.
    Text(String),
    /// Entity passed through without negotiation.
    Entity(Entity),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Entity(_) => false,
        }
    }

    /// Returns the bytes written on the wire.
    pub fn to_bytes(&self) -> Result<Bytes, EntityError> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Self::Entity(entity) => Ok(Bytes::from(entity.to_text()?)),
        }
    }
}

// ===== Transport =====

/// State change notification.
///
/// Called for every state transition, the last call carries [`ReadyState::Done`].
pub type OnStateChange = Box<dyn FnMut(&Response)>;

/// HTTP transport primitive.
pub trait Transport {
    /// Send the request.
    ///
    /// A synchronous request blocks until the exchange is done and returns the final state. Some
    /// transports do not notify state changes for synchronous requests, callers must not rely on
    /// `on_state_change` having been called.
    ///
    /// An asynchronous request returns `None` immediately and reports through `on_state_change`.
    fn send(&self, request: PreparedRequest, on_state_change: OnStateChange) -> Option<Response>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send(&self, request: PreparedRequest, on_state_change: OnStateChange) -> Option<Response> {
        T::send(self, request, on_state_change)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: PreparedRequest, on_state_change: OnStateChange) -> Option<Response> {
        T::send(self, request, on_state_change)
    }
}
