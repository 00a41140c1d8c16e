//! Outgoing request builder.
//!
//! An [`OutgoingRequest`] is configured with the `set_*` and `add_*` mutators and sent with
//! [`OutgoingRequest::execute`] through a [`Session`].
//!
//! ```no_run
//! use rest_request::{OutgoingRequest, Session, transport::HyperTransport};
//!
//! let session = Session::new(HyperTransport::new());
//!
//! let mut request = OutgoingRequest::new("http://localhost:8080/rest/users");
//! request
//!     .add_matrix_parameter("lang", "en")
//!     .add_query_parameter("tag", ["a", "b"])
//!     .set_accepts("application/json");
//!
//! let completion = request.call(&session).unwrap();
//! println!("{}: {:?}", completion.status, completion.entity);
//! ```
use base64ct::{Base64, Encoding};
use serde_json::Value;

use crate::{
    dispatch::Completion,
    encoding::{Context, EncodeError, is_http_token},
    entity::Entity,
    log::{debug, trace, warning},
    session::Session,
    transport::{PreparedRequest, Transport},
};

mod param;
mod url;
mod negotiate;
mod template;
mod error;

pub use param::{IntoParamValues, ParamValue};
pub use url::build_url;
pub use negotiate::{BodyConfig, Negotiated, negotiate};
pub use template::{TemplateError, expand_template};
pub use error::{ContentTypeSource, RequestError};

/// Default `Accept` header value.
pub const DEFAULT_ACCEPT: &str = "*/*";

/// One outgoing HTTP request.
///
/// Parameter lists keep insertion order and may repeat names. A request can be executed more
/// than once, cookies are written to the session jar on every execution.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingRequest {
    uri: String,
    method: String,
    username: Option<String>,
    password: Option<String>,
    accept: String,
    content_type: Option<String>,
    is_async: bool,
    matrix: Vec<(String, ParamValue)>,
    query: Vec<(String, ParamValue)>,
    form: Vec<(String, ParamValue)>,
    forms: Vec<(String, Value)>,
    cookies: Vec<(String, ParamValue)>,
    headers: Vec<(String, String)>,
    entity: Option<Entity>,
}

impl Default for OutgoingRequest {
    fn default() -> Self {
        Self {
            uri: String::new(),
            method: "GET".to_owned(),
            username: None,
            password: None,
            accept: DEFAULT_ACCEPT.to_owned(),
            content_type: None,
            is_async: true,
            matrix: Vec::new(),
            query: Vec::new(),
            form: Vec::new(),
            forms: Vec::new(),
            cookies: Vec::new(),
            headers: Vec::new(),
            entity: None,
        }
    }
}

fn push_all(list: &mut Vec<(String, ParamValue)>, name: String, values: impl IntoParamValues) {
    for value in values.into_param_values() {
        list.push((name.clone(), value));
    }
}

impl OutgoingRequest {
    /// Create new `GET` request for `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.uri = uri.into();
        trace!("set uri: {}", self.uri);
        self
    }

    pub fn set_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.method = method.into();
        trace!("set method: {}", self.method);
        self
    }

    /// Set basic credentials, sent only when both are non-empty.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) -> &mut Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        trace!("set credentials");
        self
    }

    pub fn set_entity(&mut self, entity: impl Into<Entity>) -> &mut Self {
        self.entity = Some(entity.into());
        trace!("set entity");
        self
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = Some(content_type.into());
        trace!("set content type: {:?}", self.content_type);
        self
    }

    /// Set the `Accept` value used when no `Accept` header is added.
    pub fn set_accepts(&mut self, accept: impl Into<String>) -> &mut Self {
        self.accept = accept.into();
        trace!("set accepts: {}", self.accept);
        self
    }

    pub fn set_async(&mut self, is_async: bool) -> &mut Self {
        self.is_async = is_async;
        trace!("set async: {is_async}");
        self
    }

    pub fn add_cookie(&mut self, name: impl Into<String>, values: impl IntoParamValues) -> &mut Self {
        let name = name.into();
        trace!("add cookie: {name}");
        push_all(&mut self.cookies, name, values);
        self
    }

    pub fn add_query_parameter(&mut self, name: impl Into<String>, values: impl IntoParamValues) -> &mut Self {
        let name = name.into();
        trace!("add query parameter: {name}");
        push_all(&mut self.query, name, values);
        self
    }

    pub fn add_matrix_parameter(&mut self, name: impl Into<String>, values: impl IntoParamValues) -> &mut Self {
        let name = name.into();
        trace!("add matrix parameter: {name}");
        push_all(&mut self.matrix, name, values);
        self
    }

    pub fn add_form_parameter(&mut self, name: impl Into<String>, values: impl IntoParamValues) -> &mut Self {
        let name = name.into();
        trace!("add form parameter: {name}");
        push_all(&mut self.form, name, values);
        self
    }

    /// Add a single key record sent as a form pair.
    ///
    /// An array adds one form per element.
    pub fn add_form(&mut self, name: impl Into<String>, record: Value) -> &mut Self {
        let name = name.into();
        trace!("add form: {name}");
        match record {
            Value::Array(records) => {
                for record in records {
                    self.forms.push((name.clone(), record));
                }
            }
            record => self.forms.push((name, record)),
        }
        self
    }

    /// Add a request header, values are sent as-is.
    pub fn add_header(&mut self, name: impl Into<String>, values: impl IntoParamValues) -> &mut Self {
        let name = name.into();
        trace!("add header: {name}");
        for value in values.into_param_values() {
            self.headers.push((name.clone(), value.to_string()));
        }
        self
    }

    // ===== Getters =====

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }

    pub fn accepts(&self) -> &str {
        &self.accept
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn matrix_parameters(&self) -> &[(String, ParamValue)] {
        &self.matrix
    }

    pub fn query_parameters(&self) -> &[(String, ParamValue)] {
        &self.query
    }

    pub fn form_parameters(&self) -> &[(String, ParamValue)] {
        &self.form
    }

    pub fn forms(&self) -> &[(String, Value)] {
        &self.forms
    }

    pub fn cookies(&self) -> &[(String, ParamValue)] {
        &self.cookies
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn has_query_parameter(&self, name: &str) -> bool {
        self.query.iter().any(|(key, _)| key == name)
    }

    /// Returns `true` if a header with given name was added, case-insensitive.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Returns the last added header value with given name, case-insensitive.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    // ===== Execution =====

    /// Returns the final url with matrix and query parameters.
    pub fn url(&self) -> Result<String, EncodeError> {
        build_url(&self.uri, &self.matrix, &self.query)
    }

    /// Materialize the url, cookie writes, headers and body.
    ///
    /// Fails before any side effect on configuration or encoding errors.
    pub fn prepare(&self) -> Result<Prepared, RequestError> {
        let url = self.url()?;

        let cookies = self
            .cookies
            .iter()
            .map(|(name, value)| {
                let name = Context::WholeUri.encode(name)?;
                let value = value.encode(Context::WholeUri)?;
                Ok(format!("{name}={value}"))
            })
            .collect::<Result<Vec<_>, EncodeError>>()?;

        for (name, _) in &self.headers {
            if !is_http_token(name) {
                warning!("header name is not a valid token: {name:?}");
            }
        }

        let header_accept = self.header("accept");
        let header_content_type = self.header("content-type");

        let negotiated = negotiate(BodyConfig {
            entity: self.entity.as_ref(),
            form: &self.form,
            forms: &self.forms,
            header_content_type,
            content_type: self.content_type.as_deref(),
        })?;

        let mut headers = self.headers.clone();
        if header_accept.is_none() {
            headers.push(("Accept".to_owned(), self.accept.clone()));
        }
        if let (Some(content_type), None) = (&negotiated.content_type, header_content_type) {
            headers.push(("Content-Type".to_owned(), content_type.clone()));
        }
        if let Some((username, password)) = self.credentials() {
            if !username.is_empty() && !password.is_empty() && !self.has_header("authorization") {
                let token = Base64::encode_string(format!("{username}:{password}").as_bytes());
                headers.push(("Authorization".to_owned(), format!("Basic {token}")));
            }
        }

        debug!("{} {url} content type: {:?}", self.method, negotiated.content_type);

        Ok(Prepared {
            request: PreparedRequest {
                method: self.method.clone(),
                url,
                is_async: self.is_async,
                headers,
                payload: negotiated.payload,
            },
            cookies,
        })
    }

    /// Send the request, `on_complete` is called once the transport is done.
    ///
    /// Configuration and encoding errors are returned before the transport is called, transport
    /// outcomes are always reported to `on_complete`.
    pub fn execute<T, F>(&self, session: &Session<T>, on_complete: F) -> Result<(), RequestError>
    where
        T: Transport,
        F: FnOnce(Completion) + 'static,
    {
        session.execute(self, on_complete)
    }

    /// Send the request without completion callback.
    pub fn send<T: Transport>(&self, session: &Session<T>) -> Result<(), RequestError> {
        session.send(self)
    }

    /// Send the request synchronously and return its completion.
    pub fn call<T: Transport>(&self, session: &Session<T>) -> Result<Completion, RequestError> {
        session.call(self)
    }
}

/// Request ready for the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    pub request: PreparedRequest,
    /// Escaped `name=value` cookie writes.
    pub cookies: Vec<String>,
}
