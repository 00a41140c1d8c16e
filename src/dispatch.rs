//! Completion logic of one dispatched request.
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    cache::{CacheRecord, ConditionalCache, Validators, signature},
    entity::{EntityError, ResponseEntity},
    log::{trace, warning},
    transport::Response,
};

/// Outcome handed to the completion callback.
#[derive(Debug)]
pub struct Completion {
    /// Response status, `0` for network failures.
    pub status: u16,
    /// The transport object.
    pub response: Response,
    /// Parsed entity of a `2xx` response, or the cached entity of a `304` response.
    ///
    /// Non-success responses carry no entity, see [`Response::text`] for the raw body.
    pub entity: Result<Option<ResponseEntity>, EntityError>,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the entity, `None` if there is none or it failed to parse.
    pub fn entity(&self) -> Option<&ResponseEntity> {
        self.entity.as_ref().ok()?.as_ref()
    }
}

pub(crate) type OnComplete = Box<dyn FnOnce(Completion)>;

/// Per request dispatcher state.
///
/// Shared between the state change notification and the sending side, so the completion logic
/// runs exactly once whichever observes the final state first.
pub(crate) struct Dispatch {
    anti_cache: bool,
    cache: Rc<RefCell<ConditionalCache>>,
    notified: Cell<bool>,
    completed: Cell<bool>,
    on_complete: RefCell<Option<OnComplete>>,
}

impl Dispatch {
    pub(crate) fn new(
        anti_cache: bool,
        cache: Rc<RefCell<ConditionalCache>>,
        on_complete: Option<OnComplete>,
    ) -> Self {
        Self {
            anti_cache,
            cache,
            notified: Cell::new(false),
            completed: Cell::new(false),
            on_complete: RefCell::new(on_complete),
        }
    }

    /// Handle a state change notification.
    pub(crate) fn notify(&self, response: &Response) {
        self.notified.set(true);
        trace!("state change: {:?}", response.ready_state());
        if response.is_done() {
            self.complete(response.clone());
        }
    }

    /// Returns `true` if any state change notification was observed.
    pub(crate) fn is_notified(&self) -> bool {
        self.notified.get()
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.completed.get()
    }

    /// Run the completion logic, once.
    pub(crate) fn complete(&self, response: Response) {
        if !response.is_done() || self.completed.replace(true) {
            return;
        }

        let status = response.status();

        let entity = match status {
            200..300 => ResponseEntity::classify(response.content_type(), response.text()),
            304 => self.cached(&response),
            _ => Ok(None),
        };

        if self.anti_cache && status != 304 && status != 0 {
            let record = CacheRecord {
                signature: signature(response.url()).into_owned(),
                validators: Validators {
                    etag: response.etag().map(ToOwned::to_owned),
                    last_modified: response.last_modified().map(ToOwned::to_owned),
                },
                entity: response.text().to_owned(),
                content_type: response.content_type().map(ToOwned::to_owned),
            };
            self.cache.borrow_mut().insert(record);
        }

        let on_complete = self.on_complete.borrow_mut().take();
        if let Some(on_complete) = on_complete {
            on_complete(Completion { status, response, entity });
        }
    }

    fn cached(&self, response: &Response) -> Result<Option<ResponseEntity>, EntityError> {
        let cache = self.cache.borrow();
        match cache.lookup(response.url()) {
            Some(record) => ResponseEntity::classify(record.content_type.as_deref(), &record.entity),
            None => {
                warning!("not modified without cached entity: {}", response.url());
                Ok(None)
            }
        }
    }
}
