//! Media type classification.

/// `application/x-www-form-urlencoded`
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `application/json`
pub const APPLICATION_JSON: &str = "application/json";

/// `application/xml`
pub const APPLICATION_XML: &str = "application/xml";

/// `text/xml`
pub const TEXT_XML: &str = "text/xml";

/// Returns the media type without parameters, e.g. `text/html` for `text/html; charset=utf-8`.
pub fn essence(content_type: &str) -> &str {
    match content_type.split_once(';') {
        Some((essence, _)) => essence.trim(),
        None => content_type.trim(),
    }
}

fn subtype(essence: &str) -> Option<&str> {
    essence.split_once('/').map(|(_, subtype)| subtype)
}

fn has_suffix(essence: &str, suffix: &str) -> bool {
    subtype(essence).is_some_and(|subtype| {
        subtype.len() > suffix.len()
            && subtype
                .get(subtype.len() - suffix.len()..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
    })
}

/// Returns `true` for `text/xml`, `application/xml` or any `+xml` subtype.
pub fn is_xml(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.eq_ignore_ascii_case(TEXT_XML)
        || essence.eq_ignore_ascii_case(APPLICATION_XML)
        || has_suffix(essence, "+xml")
}

/// Returns `true` for `application/json` or any `+json` subtype.
pub fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.eq_ignore_ascii_case(APPLICATION_JSON) || has_suffix(essence, "+json")
}

/// Returns `true` if both content types name the same media type, ignoring parameters.
pub fn same_type(left: &str, right: &str) -> bool {
    essence(left).eq_ignore_ascii_case(essence(right))
}
