use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use super::*;
use crate::{
    cache::signature,
    entity::ResponseEntity,
    transport::{OnStateChange, ReadyState, Response},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Synchronous, notifies every state change.
    Notify,
    /// Synchronous, never notifies.
    Silent,
    /// Asynchronous, notifies on [`MockTransport::fire`].
    Async,
}

type Reply = (u16, Vec<(&'static str, &'static str)>, &'static str);

/// Scripted transport replying from a queue, `200` with an empty body once exhausted.
struct MockTransport {
    mode: Mode,
    replies: RefCell<VecDeque<Reply>>,
    sent: RefCell<Vec<PreparedRequest>>,
    pending: RefCell<Vec<(Response, OnStateChange)>>,
}

impl MockTransport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            replies: RefCell::new(VecDeque::new()),
            sent: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    fn reply(self, status: u16, headers: &[(&'static str, &'static str)], text: &'static str) -> Self {
        self.replies.borrow_mut().push_back((status, headers.to_vec(), text));
        self
    }

    fn sent(&self) -> Vec<PreparedRequest> {
        self.sent.borrow().clone()
    }

    /// Deliver pending asynchronous responses.
    fn fire(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for (response, mut on_state_change) in pending {
            on_state_change(&response);
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, request: PreparedRequest, mut on_state_change: OnStateChange) -> Option<Response> {
        let (status, headers, text) = self.replies.borrow_mut().pop_front().unwrap_or((200, vec![], ""));
        let mut response = Response::done(request.url(), status).with_text(text);
        for (name, value) in headers {
            response = response.with_header(name, value);
        }

        let opened = Response::new(request.url()).with_state(ReadyState::Opened);
        self.sent.borrow_mut().push(request);

        match self.mode {
            Mode::Notify => {
                on_state_change(&opened);
                on_state_change(&response);
                Some(response)
            }
            Mode::Silent => Some(response),
            Mode::Async => {
                self.pending.borrow_mut().push((response, on_state_change));
                None
            }
        }
    }
}

const JSON: (&str, &str) = ("Content-Type", "application/json");

fn anti_cache(transport: MockTransport) -> Session<MockTransport> {
    Session::with_config(transport, Config::default().with_anti_cache(true))
}

fn counter() -> (Rc<Cell<usize>>, impl FnOnce(Completion) + 'static) {
    let count = Rc::new(Cell::new(0));
    let count2 = count.clone();
    (count, move |_| count2.set(count2.get() + 1))
}

// ===== Errors =====

#[test]
fn test_configuration_error_before_transport() {
    let session = Session::new(MockTransport::new(Mode::Notify));
    let mut request = OutgoingRequest::new("/r");
    request.set_entity(json!({"a": 1})).add_form_parameter("b", "c").add_cookie("k", "v");

    let (count, on_complete) = counter();
    let err = request.execute(&session, on_complete).unwrap_err();

    assert!(err.is_configuration());
    assert!(session.transport().sent().is_empty());
    assert_eq!(count.get(), 0);
    // no cookie is written for a request that never leaves
    assert!(session.cookies().is_empty());
}

#[test]
fn test_call_incomplete() {
    let session = Session::new(MockTransport::new(Mode::Async));
    let err = OutgoingRequest::new("/r").call(&session).unwrap_err();
    assert!(matches!(err, RequestError::Incomplete));
}

// ===== Dispatch =====

#[test]
fn test_sync_notified_completes_once() {
    let session = Session::new(MockTransport::new(Mode::Notify).reply(200, &[], "ok"));
    let mut request = OutgoingRequest::new("/r");
    request.set_async(false);

    let (count, on_complete) = counter();
    request.execute(&session, on_complete).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_sync_silent_workaround() {
    let session = Session::new(MockTransport::new(Mode::Silent).reply(200, &[JSON], r#"{"v":1}"#));

    let completion = OutgoingRequest::new("/r").call(&session).unwrap();
    assert_eq!(completion.status, 200);
    assert_eq!(completion.entity().and_then(ResponseEntity::as_json), Some(&json!({"v": 1})));

    let mut request = OutgoingRequest::new("/r");
    request.set_async(false);
    let (count, on_complete) = counter();
    request.execute(&session, on_complete).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_async() {
    let session = Session::new(MockTransport::new(Mode::Async).reply(201, &[], "made"));

    let (count, on_complete) = counter();
    OutgoingRequest::new("/r").execute(&session, on_complete).unwrap();
    assert_eq!(count.get(), 0);

    session.transport().fire();
    assert_eq!(count.get(), 1);
    session.transport().fire();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_non_success_passed_through() {
    let session = Session::new(MockTransport::new(Mode::Notify).reply(500, &[JSON], r#"{"e":1}"#));
    let completion = OutgoingRequest::new("/r").call(&session).unwrap();

    assert_eq!(completion.status, 500);
    assert!(!completion.is_success());
    assert!(matches!(completion.entity, Ok(None)));
    assert_eq!(completion.response.text(), r#"{"e":1}"#);
}

// ===== Conditional cache =====

#[test]
fn test_cache_round_trip() {
    let session = anti_cache(
        MockTransport::new(Mode::Notify)
            .reply(200, &[("ETag", "\"abc\""), JSON], r#"{"v":1}"#)
            .reply(304, &[], ""),
    );
    let mut request = OutgoingRequest::new("/r");
    request.add_query_parameter("q", "1");

    let first = request.call(&session).unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(session.cache().borrow().len(), 1);
    assert!(session.cache().borrow().contains("/r?q=1"));

    let second = request.call(&session).unwrap();
    assert_eq!(second.status, 304);
    assert_eq!(second.entity().and_then(ResponseEntity::as_json), Some(&json!({"v": 1})));

    let sent = session.transport().sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].url().starts_with("/r?q=1&resteasy_jsapi_anti_cache="));
    assert_eq!(signature(sent[0].url()), signature(sent[1].url()));
    assert_eq!(sent[0].header("if-none-match"), None);
    assert_eq!(sent[1].header("if-none-match"), Some("\"abc\""));
    assert_eq!(sent[1].header("if-modified-since"), None);
}

#[test]
fn test_cache_single_record() {
    let session = anti_cache(
        MockTransport::new(Mode::Notify)
            .reply(200, &[("ETag", "\"a\""), JSON], r#"{"v":1}"#)
            .reply(200, &[("ETag", "\"b\""), ("Last-Modified", "Mon, 19 Oct 2026 10:00:00 GMT"), JSON], r#"{"v":2}"#)
            .reply(304, &[], ""),
    );
    let request = OutgoingRequest::new("/r");

    request.call(&session).unwrap();
    request.call(&session).unwrap();
    {
        let cache = session.cache().borrow();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("/r").unwrap().entity, r#"{"v":2}"#);
    }

    let third = request.call(&session).unwrap();
    assert_eq!(third.entity().and_then(ResponseEntity::as_json), Some(&json!({"v": 2})));

    let sent = session.transport().sent();
    assert_eq!(sent[2].header("if-none-match"), Some("\"b\""));
    assert_eq!(sent[2].header("if-modified-since"), Some("Mon, 19 Oct 2026 10:00:00 GMT"));
}

#[test]
fn test_cache_miss_not_modified() {
    let session = anti_cache(MockTransport::new(Mode::Notify).reply(304, &[], ""));
    let completion = OutgoingRequest::new("/r").call(&session).unwrap();
    assert_eq!(completion.status, 304);
    assert!(matches!(completion.entity, Ok(None)));
}

#[test]
fn test_cache_disabled() {
    let session = Session::new(MockTransport::new(Mode::Notify).reply(200, &[("ETag", "\"a\"")], "x"));
    OutgoingRequest::new("/r").call(&session).unwrap();

    assert!(session.cache().borrow().is_empty());
    assert_eq!(session.transport().sent()[0].url(), "/r");
}

#[test]
fn test_explicit_anti_cache_kept() {
    let session = anti_cache(MockTransport::new(Mode::Notify));
    let mut request = OutgoingRequest::new("/r");
    request.add_query_parameter(ANTI_CACHE_PARAM, 7u64);
    request.call(&session).unwrap();

    assert_eq!(session.transport().sent()[0].url(), "/r?resteasy_jsapi_anti_cache=7");
    assert!(session.cache().borrow().contains("/r"));
}

#[test]
fn test_shared_cache() {
    let cache = Rc::new(RefCell::new(ConditionalCache::new()));
    let config = Config::default().with_anti_cache(true);

    let first = Session::with_cache(MockTransport::new(Mode::Async), config.clone(), cache.clone());
    OutgoingRequest::new("/r").send(&first).unwrap();
    first.transport().fire();
    assert_eq!(cache.borrow().len(), 1);

    let second = Session::with_cache(MockTransport::new(Mode::Notify), config, cache.clone());
    assert!(Rc::ptr_eq(second.cache(), &cache));
}

#[test]
fn test_cache_limit() {
    let session = Session::with_config(
        MockTransport::new(Mode::Notify),
        Config::default().with_anti_cache(true).with_cache_limit(1),
    );
    OutgoingRequest::new("/a").call(&session).unwrap();
    OutgoingRequest::new("/b").call(&session).unwrap();

    let cache = session.cache().borrow();
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("/b"));
}

// ===== Ambient state =====

#[test]
fn test_cookies() {
    let session = Session::new(MockTransport::new(Mode::Notify));
    session.set_cookie("lang", "en");

    let mut request = OutgoingRequest::new("/r");
    request.add_cookie("a b", "1");
    request.call(&session).unwrap();
    OutgoingRequest::new("/s").call(&session).unwrap();

    assert_eq!(session.cookies().get("a%20b"), Some("1"));
    let sent = session.transport().sent();
    assert_eq!(sent[0].header("cookie"), Some("lang=en; a%20b=1"));
    assert_eq!(sent[1].header("cookie"), Some("lang=en; a%20b=1"));
}

#[test]
fn test_debug_last_request() {
    let session = Session::new(MockTransport::new(Mode::Notify));
    OutgoingRequest::new("/r").call(&session).unwrap();
    assert!(session.last_request().is_none());

    let session = Session::with_config(MockTransport::new(Mode::Notify), Config::default().with_debug(true));
    let mut request = OutgoingRequest::new("/r");
    request.set_method("POST").add_form_parameter("a", "b");
    request.call(&session).unwrap();

    let last = session.last_request().unwrap();
    assert_eq!(last.method(), "POST");
    assert!(!last.is_async());
    assert_eq!(last.header("content-type"), Some("application/x-www-form-urlencoded"));
}

#[test]
fn test_templated_request() {
    let session = Session::with_config(
        MockTransport::new(Mode::Notify),
        Config::default().with_api_url("http://localhost/rest/"),
    );

    let request = session
        .request("GET", "/users/{id}/items/{item: [0-9]+}", &[
            ("id", ParamValue::from("j doe")),
            ("item", ParamValue::from(42)),
        ])
        .unwrap();
    assert_eq!(request.uri(), "http://localhost/rest/users/j%20doe/items/42");

    let err = session.request("GET", "/users/{id}", &[]).unwrap_err();
    assert_eq!(err, TemplateError::Missing("id".into()));
}
