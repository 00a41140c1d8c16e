//! REST Request Builder
//!
//! Builds HTTP requests for REST APIs: percent encoding of matrix, query, form and cookie
//! parameters, body negotiation for XML, JSON and form entities, and a conditional cache answering
//! `304 Not Modified` responses with the last good entity.
//!
//! Requests are sent through a [`Session`] over any [`Transport`][transport::Transport]. With the
//! `tokio` feature, [`HyperTransport`][transport::HyperTransport] sends them over HTTP/1.
//!
//! ```no_run
//! use rest_request::{OutgoingRequest, Session, config::Config, transport::HyperTransport};
//!
//! let config = Config::default().with_anti_cache(true);
//! let session = Session::with_config(HyperTransport::new(), config);
//!
//! let mut request = OutgoingRequest::new("http://localhost:8080/rest/items");
//! request.add_query_parameter("owner", "j doe");
//!
//! let completion = request.call(&session).unwrap();
//! if let Some(entity) = completion.entity() {
//!     println!("{entity:?}");
//! }
//! ```
#![warn(missing_debug_implementations)]

mod log;

pub mod encoding;
pub mod mime;
pub mod xml;
pub mod entity;
pub mod request;

pub mod cache;
pub mod cookie;
pub mod transport;
mod dispatch;
pub mod session;
pub mod config;

pub use dispatch::Completion;
pub use entity::{Entity, ResponseEntity};
pub use request::{OutgoingRequest, RequestError};
pub use session::Session;
