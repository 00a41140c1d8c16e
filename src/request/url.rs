use super::ParamValue;
use crate::encoding::{Context, EncodeError};

/// Materialize the request URL.
///
/// Matrix parameters are appended as `;name=value`, then query parameters as `?name=value`
/// joined by `&`, each in insertion order.
pub fn build_url(
    uri: &str,
    matrix: &[(String, ParamValue)],
    query: &[(String, ParamValue)],
) -> Result<String, EncodeError> {
    let mut url = String::with_capacity(uri.len() + 16 * (matrix.len() + query.len()));
    url.push_str(uri);

    for (name, value) in matrix {
        url.push(';');
        url.push_str(&Context::MatrixName.encode(name)?);
        url.push('=');
        url.push_str(&value.encode(Context::MatrixValue)?);
    }

    for (i, (name, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&Context::Query.encode(name)?);
        url.push('=');
        url.push_str(&value.encode(Context::Query)?);
    }

    Ok(url)
}
