use std::fmt;

use super::ParamValue;
use crate::encoding::{Context, EncodeError};

/// Expand `{name}` placeholders of a path template.
///
/// A placeholder may carry a regular expression, `{id: [0-9]+}`, which is ignored. Values are
/// encoded as path segments.
///
/// ```
/// use rest_request::request::{ParamValue, expand_template};
///
/// let path = expand_template("/users/{id}/files/{name: .+}", |name| match name {
///     "id" => Some(ParamValue::from(7)),
///     "name" => Some(ParamValue::from("a b;c")),
///     _ => None,
/// });
/// assert_eq!(path.unwrap(), "/users/7/files/a%20b%3bc");
/// ```
pub fn expand_template<F>(template: &str, mut lookup: F) -> Result<String, TemplateError>
where
    F: FnMut(&str) -> Option<ParamValue>,
{
    let mut out = String::with_capacity(template.len());
    let mut offset = 0;
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(TemplateError::Unmatched(offset + open));
        }
        out.push_str(&rest[..open]);

        let close = closing_brace(&rest[open + 1..])
            .ok_or(TemplateError::Unclosed(offset + open))?
            + open
            + 1;

        let inner = &rest[open + 1..close];
        let name = match inner.split_once(':') {
            Some((name, _regex)) => name.trim(),
            None => inner.trim(),
        };
        if name.is_empty() {
            return Err(TemplateError::EmptyName(offset + open));
        }

        let value = lookup(name).ok_or_else(|| TemplateError::Missing(name.to_owned()))?;
        out.push_str(&value.encode(Context::PathSegment)?);

        offset += close + 1;
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Returns the index of the brace closing an already opened one, honoring nested braces.
fn closing_brace(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, byte) in input.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// An error that can occur when expanding a path template.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// `{` without closing `}`, at given byte offset.
    Unclosed(usize),
    /// `}` without opening `{`, at given byte offset.
    Unmatched(usize),
    /// Placeholder without a name, at given byte offset.
    EmptyName(usize),
    /// No value for the placeholder.
    Missing(String),
    /// Value cannot be encoded.
    Encode(EncodeError),
}

impl From<EncodeError> for TemplateError {
    fn from(v: EncodeError) -> Self {
        Self::Encode(v)
    }
}

impl std::error::Error for TemplateError { }

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid path template: ")?;
        match self {
            Self::Unclosed(at) => write!(f, "unclosed `{{` at {at}"),
            Self::Unmatched(at) => write!(f, "unmatched `}}` at {at}"),
            Self::EmptyName(at) => write!(f, "empty parameter name at {at}"),
            Self::Missing(name) => write!(f, "missing value for `{name}`"),
            Self::Encode(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params(name: &str) -> Option<ParamValue> {
        match name {
            "id" => Some(ParamValue::from("a/b")),
            "n" => Some(ParamValue::from(3)),
            _ => None,
        }
    }

    #[test]
    fn test_expand() {
        assert_eq!(expand_template("/plain", params).unwrap(), "/plain");
        assert_eq!(expand_template("/x/{id}", params).unwrap(), "/x/a%2fb");
        assert_eq!(expand_template("/{ id }/{n}", params).unwrap(), "/a%2fb/3");
        assert_eq!(expand_template("/{n: [0-9]{1,3}}/end", params).unwrap(), "/3/end");
        assert_eq!(expand_template("{n}{n}", params).unwrap(), "33");
    }

    #[test]
    fn test_expand_failures() {
        assert_eq!(expand_template("/x/{id", params), Err(TemplateError::Unclosed(3)));
        assert_eq!(expand_template("/x/id}", params), Err(TemplateError::Unmatched(5)));
        assert_eq!(expand_template("/{n}/}", params), Err(TemplateError::Unmatched(5)));
        assert_eq!(expand_template("/{ }", params), Err(TemplateError::EmptyName(1)));
        assert_eq!(expand_template("/{other}", params), Err(TemplateError::Missing("other".into())));
    }
}
