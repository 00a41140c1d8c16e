use serde_json::Value;

use super::{ContentTypeSource, ParamValue, RequestError};
use crate::{
    encoding::Context,
    entity::Entity,
    mime,
    transport::Payload,
};

/// Outcome of body negotiation.
#[derive(Debug)]
pub struct Negotiated {
    /// Effective `Content-Type` of the body, if any.
    pub content_type: Option<String>,
    pub payload: Payload,
}

/// Explicit body related configuration of a request.
#[derive(Clone, Copy, Debug)]
pub struct BodyConfig<'a> {
    pub entity: Option<&'a Entity>,
    pub form: &'a [(String, ParamValue)],
    pub forms: &'a [(String, Value)],
    /// `Content-Type` given with `add_header`.
    pub header_content_type: Option<&'a str>,
    /// `Content-Type` given with `set_content_type`.
    pub content_type: Option<&'a str>,
}

/// Decide the outgoing body and its `Content-Type`.
pub fn negotiate(config: BodyConfig) -> Result<Negotiated, RequestError> {
    let has_form = !config.form.is_empty() || !config.forms.is_empty();

    if config.entity.is_some() && has_form {
        return Err(RequestError::EntityWithForm);
    }

    if has_form {
        for (content_type, source) in [
            (config.header_content_type, ContentTypeSource::Header),
            (config.content_type, ContentTypeSource::ContentType),
        ] {
            if let Some(content_type) = content_type {
                if !mime::same_type(content_type, mime::FORM_URLENCODED) {
                    return Err(RequestError::FormContentType {
                        content_type: content_type.to_owned(),
                        source,
                    });
                }
            }
        }

        return Ok(Negotiated {
            content_type: Some(mime::FORM_URLENCODED.to_owned()),
            payload: Payload::Text(form_body(config.form, config.forms)?),
        });
    }

    let Some(entity) = config.entity else {
        return Ok(Negotiated { content_type: None, payload: Payload::Empty });
    };

    let content_type = config.header_content_type.or(config.content_type);

    let payload = match entity {
        Entity::XmlNode(_) | Entity::XmlDocument(_) if content_type.is_none_or(mime::is_xml) => {
            Payload::Text(entity.to_text()?)
        }
        Entity::Structured(Value::Object(_) | Value::Array(_))
            if content_type.is_none_or(mime::is_json) =>
        {
            Payload::Text(entity.to_text()?)
        }
        // assume the caller serialized it and set a matching content type
        _ => Payload::Entity(entity.clone()),
    };

    Ok(Negotiated {
        content_type: content_type.map(ToOwned::to_owned),
        payload,
    })
}

fn form_body(form: &[(String, ParamValue)], forms: &[(String, Value)]) -> Result<String, RequestError> {
    let mut body = String::new();

    let mut push = |name: &str, value: &ParamValue| -> Result<(), RequestError> {
        if !body.is_empty() {
            body.push('&');
        }
        body.push_str(&Context::Form.encode(name)?);
        body.push('=');
        body.push_str(&value.encode(Context::Form)?);
        Ok(())
    };

    for (name, value) in form {
        push(name, value)?;
    }

    for (name, record) in forms {
        let (key, value) = record
            .as_object()
            .and_then(|record| record.iter().next())
            .ok_or_else(|| RequestError::InvalidForm { name: name.clone() })?;
        push(key, &ParamValue::from(value))?;
    }

    Ok(body)
}
