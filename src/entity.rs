//! Request and response entities.
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;

use crate::{
    mime,
    xml::{XmlDocument, XmlError, XmlNode},
};

/// Request body entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// A single element, serialized as XML.
    XmlNode(XmlNode),
    /// A whole document, serialized as XML with declaration.
    XmlDocument(XmlDocument),
    /// A record, array or scalar, serialized as JSON.
    Structured(Value),
}

impl Entity {
    /// Create structured entity from a [`Serialize`] value.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, EntityError> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    /// Returns `true` for XML nodes and documents.
    pub fn is_xml(&self) -> bool {
        matches!(self, Self::XmlNode(_) | Self::XmlDocument(_))
    }

    /// Returns `true` for records and arrays.
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Structured(Value::Object(_) | Value::Array(_)))
    }

    /// Returns the XML text of an XML entity.
    pub fn to_xml(&self) -> Result<Option<String>, EntityError> {
        Ok(match self {
            Self::XmlNode(node) => Some(node.to_xml()?),
            Self::XmlDocument(doc) => Some(doc.to_xml()?),
            Self::Structured(_) => None,
        })
    }

    /// Returns the textual representation the transport sends as-is.
    ///
    /// Scalars are written without JSON quoting, e.g. a string entity is sent verbatim.
    pub fn to_text(&self) -> Result<String, EntityError> {
        match self {
            Self::XmlNode(node) => Ok(node.to_xml()?),
            Self::XmlDocument(doc) => Ok(doc.to_xml()?),
            Self::Structured(Value::String(text)) => Ok(text.clone()),
            Self::Structured(Value::Null) => Ok(String::new()),
            Self::Structured(value @ (Value::Bool(_) | Value::Number(_))) => Ok(value.to_string()),
            Self::Structured(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

impl From<XmlNode> for Entity {
    fn from(v: XmlNode) -> Self {
        Self::XmlNode(v)
    }
}

impl From<XmlDocument> for Entity {
    fn from(v: XmlDocument) -> Self {
        Self::XmlDocument(v)
    }
}

impl From<Value> for Entity {
    fn from(v: Value) -> Self {
        Self::Structured(v)
    }
}

// ===== Response =====

/// Response entity, classified by the response `Content-Type`.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseEntity {
    Xml(XmlDocument),
    Json(Value),
    Text(String),
}

impl ResponseEntity {
    /// Classify and parse a response body.
    ///
    /// Returns `None` for an empty body.
    pub fn classify(content_type: Option<&str>, text: &str) -> Result<Option<Self>, EntityError> {
        if text.is_empty() {
            return Ok(None);
        }
        let entity = match content_type {
            Some(ct) if mime::is_xml(ct) => Self::Xml(XmlDocument::parse(text)?),
            Some(ct) if mime::is_json(ct) => Self::Json(serde_json::from_str(text)?),
            _ => Self::Text(text.to_owned()),
        };
        Ok(Some(entity))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Xml(doc) => Some(doc),
            _ => None,
        }
    }

    /// Deserialize a JSON entity into `T`.
    ///
    /// Text entities are parsed as JSON first.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, EntityError> {
        match self {
            Self::Json(value) => Ok(T::deserialize(value)?),
            Self::Text(text) => Ok(serde_json::from_str(text)?),
            Self::Xml(_) => Err(EntityError::NotJson),
        }
    }
}

// ===== Error =====

/// An error that can occur when serializing or parsing an entity.
#[derive(Debug)]
pub enum EntityError {
    Xml(XmlError),
    Json(serde_json::Error),
    /// An XML entity was deserialized as JSON.
    NotJson,
}

impl From<XmlError> for EntityError {
    fn from(v: XmlError) -> Self {
        Self::Xml(v)
    }
}

impl From<serde_json::Error> for EntityError {
    fn from(v: serde_json::Error) -> Self {
        Self::Json(v)
    }
}

impl std::error::Error for EntityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotJson => None,
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(err) => fmt::Display::fmt(err, f),
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::NotJson => f.write_str("xml entity cannot be deserialized as json"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        let json = ResponseEntity::classify(Some("application/json; charset=utf-8"), r#"{"v":1}"#);
        assert_eq!(json.unwrap(), Some(ResponseEntity::Json(json!({"v": 1}))));

        let xml = ResponseEntity::classify(Some("application/atom+xml"), "<feed/>").unwrap().unwrap();
        assert_eq!(xml.as_xml().unwrap().root().name(), "feed");

        let text = ResponseEntity::classify(Some("text/plain"), "hello").unwrap();
        assert_eq!(text, Some(ResponseEntity::Text("hello".into())));

        let untyped = ResponseEntity::classify(None, r#"{"v":1}"#).unwrap();
        assert_eq!(untyped.unwrap().as_text(), Some(r#"{"v":1}"#));

        assert_eq!(ResponseEntity::classify(Some("application/json"), "").unwrap(), None);
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            ResponseEntity::classify(Some("application/json"), "{oops"),
            Err(EntityError::Json(_))
        ));
        assert!(matches!(
            ResponseEntity::classify(Some("text/xml"), "<a>"),
            Err(EntityError::Xml(_))
        ));
    }

    #[test]
    fn test_deserialize() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Version {
            v: u32,
        }

        let json = ResponseEntity::Json(json!({"v": 7}));
        assert_eq!(json.deserialize::<Version>().unwrap(), Version { v: 7 });

        let text = ResponseEntity::Text(r#"{"v":8}"#.into());
        assert_eq!(text.deserialize::<Version>().unwrap(), Version { v: 8 });
    }

    #[test]
    fn test_entity_text() {
        assert_eq!(Entity::Structured(json!("raw")).to_text().unwrap(), "raw");
        assert_eq!(Entity::Structured(json!(12)).to_text().unwrap(), "12");
        assert_eq!(Entity::Structured(json!({"a": [1, 2]})).to_text().unwrap(), r#"{"a":[1,2]}"#);
        assert_eq!(Entity::from(XmlNode::new("a")).to_text().unwrap(), "<a/>");
        assert!(Entity::Structured(json!([1])).is_record());
        assert!(!Entity::Structured(json!("x")).is_record());
    }
}
