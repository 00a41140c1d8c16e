use http::{Request, Uri, header::HOST};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::{borrow::Cow, fmt, io};
use tokio::{net::TcpStream, runtime};

use super::{Collect, Full, OnStateChange, PreparedRequest, ReadyState, Response, Transport};
use crate::{
    entity::EntityError,
    log::{debug, error, warning},
};

/// [`Transport`] over a fresh HTTP/1 connection per request.
///
/// Only `http://` urls are supported.
///
/// Synchronous requests run on a private current thread runtime and must not be sent from within
/// a runtime. Asynchronous requests are spawned with [`tokio::task::spawn_local`].
///
/// # Panics
///
/// Sending an asynchronous request outside of a [`LocalSet`][tokio::task::LocalSet] panics.
#[derive(Clone, Debug, Default)]
pub struct HyperTransport {
    _priv: (),
}

impl HyperTransport {
    pub fn new() -> Self {
        Self { _priv: () }
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: PreparedRequest, mut on_state_change: OnStateChange) -> Option<Response> {
        if request.is_async() {
            tokio::task::spawn_local(async move {
                let response = exchange(&request, &mut on_state_change).await;
                on_state_change(&response);
            });
            return None;
        }

        if runtime::Handle::try_current().is_ok() {
            error!("synchronous request sent from within a runtime: {}", request.url());
            return Some(Response::network_error(request.url()));
        }

        let rt = match runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(_err) => {
                error!("failed to build runtime: {_err}");
                return Some(Response::network_error(request.url()));
            }
        };

        let response = rt.block_on(exchange(&request, &mut on_state_change));
        on_state_change(&response);
        Some(response)
    }
}

async fn exchange(request: &PreparedRequest, on_state_change: &mut OnStateChange) -> Response {
    match try_exchange(request, on_state_change).await {
        Ok(response) => response,
        Err(_err) => {
            error!("{} {} failed: {_err}", request.method(), request.url());
            Response::network_error(request.url())
        }
    }
}

async fn try_exchange(
    request: &PreparedRequest,
    on_state_change: &mut OnStateChange,
) -> Result<Response, TransportError> {
    let uri: Uri = request.url().parse()?;
    let Some(authority) = uri.authority().filter(|_| uri.scheme_str() == Some("http")) else {
        return Err(TransportError::Unsupported(request.url().to_owned()));
    };

    let host = authority.host().trim_start_matches('[').trim_end_matches(']');
    let port = authority.port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host, port)).await?;
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;

    tokio::spawn(async move {
        if let Err(_err) = conn.await {
            debug!("connection closed: {_err}");
        }
    });

    let path = uri.path_and_query().map_or("/", |path| path.as_str());
    let mut builder = Request::builder().method(request.method()).uri(path);
    if request.header("host").is_none() {
        builder = builder.header(HOST, authority.as_str());
    }
    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let outgoing = builder.body(Full::new(request.payload().to_bytes()?))?;

    on_state_change(&Response::new(request.url()).with_state(ReadyState::Opened));

    let (parts, body) = sender.send_request(outgoing).await?.into_parts();

    let mut response = Response::new(request.url())
        .with_state(ReadyState::HeadersReceived)
        .with_status(parts.status.as_u16());
    for (name, value) in &parts.headers {
        response = response.with_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    on_state_change(&response);

    let bytes = Collect::new(body).await?;
    let text = match String::from_utf8_lossy(&bytes) {
        Cow::Borrowed(text) => text.to_owned(),
        Cow::Owned(text) => {
            warning!("response body of {} is not valid UTF-8, invalid bytes replaced", request.url());
            text
        }
    };

    Ok(response.with_state(ReadyState::Done).with_text(text))
}

// ===== Error =====

/// An error that fails an exchange, reported to the caller as a network error.
#[derive(Debug)]
enum TransportError {
    Uri(http::uri::InvalidUri),
    /// Url is not an absolute `http://` url.
    Unsupported(String),
    Io(io::Error),
    Http(http::Error),
    Hyper(hyper::Error),
    Entity(EntityError),
}

impl std::error::Error for TransportError {}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(err) => write!(f, "invalid url: {err}"),
            Self::Unsupported(url) => write!(f, "unsupported url: {url}"),
            Self::Io(err) => fmt::Display::fmt(err, f),
            Self::Http(err) => fmt::Display::fmt(err, f),
            Self::Hyper(err) => fmt::Display::fmt(err, f),
            Self::Entity(err) => fmt::Display::fmt(err, f),
        }
    }
}

macro_rules! from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TransportError {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

from! {
    http::uri::InvalidUri => Uri,
    io::Error => Io,
    http::Error => Http,
    hyper::Error => Hyper,
    EntityError => Entity,
}
