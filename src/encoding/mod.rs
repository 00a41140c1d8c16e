//! Percent encoding ([RFC3986])
//!
//! [RFC3986]: <https://datatracker.ietf.org/doc/html/rfc3986#section-2.1>
//!
//! # Character classes
//!
//! [`class`] contains the grammar sets of RFC3986 and RFC2616, and the derived sets used for each
//! position in a request. Encoding never leaves a literal `%` in the output.
//!
//! # Contexts
//!
//! A [`Context`] binds a class to a wire position, e.g. [`Context::Query`]. The free functions
//! [`encode_query_name_or_value`] and friends are shorthands for [`Context::encode`].
//!
//! ```
//! use rest_request::encoding::{Context, encode_form_name_or_value};
//!
//! assert_eq!(encode_form_name_or_value("a b").unwrap(), "a+b");
//! assert_eq!(Context::Query.encode("x=1&y").unwrap(), "x%3d1%26y");
//! assert_eq!(Context::PathSegment.encode("caf\u{e9}").unwrap(), "caf%c3%a9");
//! ```
pub mod class;
mod percent;
mod context;
mod error;

pub use class::{CharClass, is_http_token};
pub use percent::{encode, encode_utf16, percent_byte, percent_utf8};
pub use context::{
    Context, encode_form_name_or_value, encode_fragment, encode_header_name, encode_header_value,
    encode_matrix_name, encode_matrix_value, encode_path_segment, encode_query_name_or_value,
};
pub use error::EncodeError;

#[cfg(test)]
mod test;
