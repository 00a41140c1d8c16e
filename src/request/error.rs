use std::fmt;

use super::TemplateError;
use crate::{encoding::EncodeError, entity::EntityError};

/// An error that aborts a request before it reaches the transport.
#[derive(Debug)]
pub enum RequestError {
    /// Both an entity and form parameters are configured.
    EntityWithForm,
    /// An explicit `Content-Type` conflicts with form parameters.
    FormContentType {
        content_type: String,
        source: ContentTypeSource,
    },
    /// A form record is not a record with at least one key.
    InvalidForm { name: String },
    /// A value cannot be percent encoded.
    Encode(EncodeError),
    /// The entity cannot be serialized.
    Entity(EntityError),
    /// A path template cannot be expanded.
    Template(TemplateError),
    /// A synchronous call returned without the transport completing.
    Incomplete,
}

/// Where an explicit `Content-Type` came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentTypeSource {
    /// Added with `add_header`.
    Header,
    /// Set with `set_content_type`.
    ContentType,
}

impl RequestError {
    /// Returns `true` for configuration errors, i.e. a request that can never be sent as built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EntityWithForm | Self::FormContentType { .. } | Self::InvalidForm { .. }
        )
    }
}

impl From<EncodeError> for RequestError {
    fn from(v: EncodeError) -> Self {
        Self::Encode(v)
    }
}

impl From<EntityError> for RequestError {
    fn from(v: EntityError) -> Self {
        Self::Entity(v)
    }
}

impl From<TemplateError> for RequestError {
    fn from(v: TemplateError) -> Self {
        Self::Template(v)
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Entity(err) => Some(err),
            Self::Template(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityWithForm => f.write_str("cannot have both an entity and form parameters"),
            Self::FormContentType { content_type, source: ContentTypeSource::Header } => write!(
                f,
                "the content type set by header value ({content_type}) is incompatible with form parameters"
            ),
            Self::FormContentType { content_type, source: ContentTypeSource::ContentType } => write!(
                f,
                "the content type set with set_content_type ({content_type}) is incompatible with form parameters"
            ),
            Self::InvalidForm { name } => write!(f, "form `{name}` is not a record with a key"),
            Self::Encode(err) => fmt::Display::fmt(err, f),
            Self::Entity(err) => fmt::Display::fmt(err, f),
            Self::Template(err) => fmt::Display::fmt(err, f),
            Self::Incomplete => f.write_str("transport returned without completing the request"),
        }
    }
}
