use super::{CharClass, EncodeError, class, encode};

/// Wire position of an encoded value.
///
/// Each position binds a [`CharClass`] and whether form substitutions apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    /// `application/x-www-form-urlencoded` name or value.
    Form,
    /// Query parameter name or value.
    Query,
    /// Path segment.
    PathSegment,
    /// Matrix parameter name.
    MatrixName,
    /// Matrix parameter value.
    MatrixValue,
    /// URI fragment.
    Fragment,
    /// Whole URI, used for cookie pairs.
    WholeUri,
}

impl Context {
    /// Returns the characters left unescaped in this position.
    pub const fn class(&self) -> &'static CharClass {
        match self {
            Self::Form => &class::ALPHANUMERIC,
            Self::Query => &class::QUERY,
            Self::PathSegment => &class::PATH_SEGMENT,
            Self::MatrixName => &class::PATH_PARAM_NAME,
            Self::MatrixValue => &class::PATH_PARAM_VALUE,
            Self::Fragment => &class::FRAGMENT,
            Self::WholeUri => &class::WHOLE_URI,
        }
    }

    /// Returns `true` if form substitutions apply.
    pub const fn is_form(&self) -> bool {
        matches!(self, Self::Form)
    }

    /// Returns `true` if percent triplets use uppercase hex digits.
    ///
    /// Whole URI escaping is used for cookie pairs, which are compared byte for byte, and follows
    /// the uppercase output of `encodeURI`.
    pub const fn is_uppercase(&self) -> bool {
        matches!(self, Self::WholeUri)
    }

    /// Percent encode `value` for this position.
    #[inline]
    pub fn encode(&self, value: &str) -> Result<String, EncodeError> {
        let out = encode(value, self.class(), self.is_form())?;
        Ok(if self.is_uppercase() { uppercase_triplets(out) } else { out })
    }
}

/// Uppercase the hex digits of every percent triplet.
fn uppercase_triplets(value: String) -> String {
    let mut bytes = value.into_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            for digit in bytes.iter_mut().skip(i + 1).take(2) {
                digit.make_ascii_uppercase();
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    // only ASCII bytes changed
    String::from_utf8(bytes).unwrap_or_default()
}

// ===== Named encoders =====

/// Encode a form parameter name or value.
pub fn encode_form_name_or_value(value: &str) -> Result<String, EncodeError> {
    Context::Form.encode(value)
}

/// Encode a query parameter name or value.
pub fn encode_query_name_or_value(value: &str) -> Result<String, EncodeError> {
    Context::Query.encode(value)
}

/// Encode a path segment.
pub fn encode_path_segment(value: &str) -> Result<String, EncodeError> {
    Context::PathSegment.encode(value)
}

/// Encode a matrix parameter name.
pub fn encode_matrix_name(value: &str) -> Result<String, EncodeError> {
    Context::MatrixName.encode(value)
}

/// Encode a matrix parameter value.
pub fn encode_matrix_value(value: &str) -> Result<String, EncodeError> {
    Context::MatrixValue.encode(value)
}

/// Encode a URI fragment.
pub fn encode_fragment(value: &str) -> Result<String, EncodeError> {
    Context::Fragment.encode(value)
}

/// Header names are passed through, the transport rejects invalid tokens itself.
#[inline]
pub fn encode_header_name(value: &str) -> &str {
    value
}

/// Header values are passed through.
///
/// There is no safe escaping for header values short of RFC2047 MIME folding.
#[inline]
pub fn encode_header_value(value: &str) -> &str {
    value
}
