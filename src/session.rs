//! Request session.
//!
//! A [`Session`] owns the transport and the ambient state requests share: configuration, the
//! cookie jar and the conditional cache.
use std::{
    cell::{Ref, RefCell},
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    cache::{ANTI_CACHE_PARAM, ConditionalCache},
    config::Config,
    cookie::CookieJar,
    dispatch::{Completion, Dispatch, OnComplete},
    encoding::EncodeError,
    log::{debug, warning},
    request::{OutgoingRequest, ParamValue, Prepared, RequestError, TemplateError, expand_template},
    transport::{PreparedRequest, Response, Transport},
};

/// Shared state of requests sent through one transport.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    config: Config,
    cache: Rc<RefCell<ConditionalCache>>,
    cookies: RefCell<CookieJar>,
    last_request: RefCell<Option<PreparedRequest>>,
}

impl<T: Transport> Session<T> {
    /// Create new session with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Create new session with its own cache store.
    pub fn with_config(transport: T, config: Config) -> Self {
        let cache = match config.cache_limit {
            Some(limit) => ConditionalCache::with_limit(limit),
            None => ConditionalCache::new(),
        };
        Self::with_cache(transport, config, Rc::new(RefCell::new(cache)))
    }

    /// Create new session sharing the given cache store.
    pub fn with_cache(transport: T, config: Config, cache: Rc<RefCell<ConditionalCache>>) -> Self {
        Self {
            transport,
            config,
            cache,
            cookies: RefCell::new(CookieJar::new()),
            last_request: RefCell::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Rc<RefCell<ConditionalCache>> {
        &self.cache
    }

    /// Returns the cookie jar.
    pub fn cookies(&self) -> Ref<'_, CookieJar> {
        self.cookies.borrow()
    }

    /// Set a cookie in the jar.
    pub fn set_cookie(&self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.borrow_mut().set(name, value);
    }

    /// Returns the last request handed to the transport, kept only in debug mode.
    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.last_request.borrow().clone()
    }

    /// Create request for a path template, prefixed by the configured api url.
    ///
    /// ```
    /// use rest_request::{Session, config::Config, request::ParamValue};
    /// # use rest_request::transport::{OnStateChange, PreparedRequest, Response, Transport};
    /// # struct Noop;
    /// # impl Transport for Noop {
    /// #     fn send(&self, _: PreparedRequest, _: OnStateChange) -> Option<Response> { None }
    /// # }
    ///
    /// let session = Session::with_config(Noop, Config::default().with_api_url("http://api/rest"));
    /// let request = session
    ///     .request("DELETE", "/users/{id}", &[("id", ParamValue::from("a b"))])
    ///     .unwrap();
    ///
    /// assert_eq!(request.method(), "DELETE");
    /// assert_eq!(request.uri(), "http://api/rest/users/a%20b");
    /// ```
    pub fn request(
        &self,
        method: &str,
        template: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<OutgoingRequest, TemplateError> {
        let path = expand_template(template, |name| {
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
        })?;

        let uri = match &self.config.api_url {
            Some(base) if path.starts_with('/') => format!("{}{path}", base.trim_end_matches('/')),
            Some(base) => format!("{}/{path}", base.trim_end_matches('/')),
            None => path,
        };

        let mut request = OutgoingRequest::new(uri);
        request.set_method(method);
        Ok(request)
    }

    /// Send `request`, `on_complete` is called once the transport is done.
    ///
    /// See [`OutgoingRequest::execute`].
    pub fn execute<F>(&self, request: &OutgoingRequest, on_complete: F) -> Result<(), RequestError>
    where
        F: FnOnce(Completion) + 'static,
    {
        self.dispatch(request, Some(Box::new(on_complete)))
    }

    /// Send `request` without completion callback.
    pub fn send(&self, request: &OutgoingRequest) -> Result<(), RequestError> {
        self.dispatch(request, None)
    }

    /// Send `request` synchronously and return its completion.
    ///
    /// Returns [`RequestError::Incomplete`] if the transport returns without a final state.
    pub fn call(&self, request: &OutgoingRequest) -> Result<Completion, RequestError> {
        let mut request = request.clone();
        request.set_async(false);

        let slot = Rc::new(RefCell::new(None));
        let slot2 = slot.clone();
        self.execute(&request, move |completion| *slot2.borrow_mut() = Some(completion))?;

        let completion = slot.borrow_mut().take();
        completion.ok_or(RequestError::Incomplete)
    }

    fn dispatch(&self, request: &OutgoingRequest, on_complete: Option<OnComplete>) -> Result<(), RequestError> {
        let Prepared { mut request, cookies } = if self.config.anti_cache {
            let mut request = request.clone();
            self.conditional(&mut request)?;
            request.prepare()?
        } else {
            request.prepare()?
        };

        {
            let mut jar = self.cookies.borrow_mut();
            for cookie in &cookies {
                jar.write(cookie);
            }
            if let Some(value) = jar.header_value() {
                if request.header("cookie").is_none() {
                    request.headers.push(("Cookie".to_owned(), value));
                }
            }
        }

        if self.config.debug {
            *self.last_request.borrow_mut() = Some(request.clone());
        }

        debug!("{} {}", request.method(), request.url());

        let is_async = request.is_async();
        let _url = request.url().to_owned();
        let dispatch = Rc::new(Dispatch::new(self.config.anti_cache, self.cache.clone(), on_complete));
        let notify = dispatch.clone();

        let response = self
            .transport
            .send(request, Box::new(move |response: &Response| notify.notify(response)));

        if !is_async && !dispatch.is_completed() {
            match response {
                Some(response) => {
                    if !dispatch.is_notified() {
                        warning!("synchronous transport did not notify completion: {_url}");
                    }
                    dispatch.complete(response);
                }
                None => {
                    warning!("synchronous transport returned no response: {_url}");
                }
            }
        }

        Ok(())
    }

    /// Add the anti cache parameter and the validators of the cached record, if any.
    fn conditional(&self, request: &mut OutgoingRequest) -> Result<(), EncodeError> {
        if !request.has_query_parameter(ANTI_CACHE_PARAM) {
            request.add_query_parameter(ANTI_CACHE_PARAM, anti_cache_value());
        }

        let url = request.url()?;
        let cache = self.cache.borrow();
        let Some(record) = cache.lookup(&url) else {
            return Ok(());
        };

        if let Some(etag) = &record.validators.etag {
            if !request.has_header("if-none-match") {
                request.add_header("If-None-Match", etag);
            }
        }
        if let Some(last_modified) = &record.validators.last_modified {
            if !request.has_header("if-modified-since") {
                request.add_header("If-Modified-Since", last_modified);
            }
        }

        Ok(())
    }
}

/// Returns the current unix time in milliseconds.
fn anti_cache_value() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod test;
