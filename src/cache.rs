//! Conditional cache store.
//!
//! Records the validators and the raw entity of the last good response per url [`signature`], so
//! a `304 Not Modified` response can be answered with the previous entity.
use fnv::FnvHashMap;
use std::{borrow::Cow, collections::VecDeque};

use crate::log::trace;

/// Query parameter used to defeat intermediate caches.
pub const ANTI_CACHE_PARAM: &str = "resteasy_jsapi_anti_cache";

/// Returns the cache key of a url: the url with every `resteasy_jsapi_anti_cache=<digits>` query
/// pair removed.
///
/// A query left empty loses its `?`.
///
/// ```
/// use rest_request::cache::signature;
///
/// assert_eq!(signature("/r?resteasy_jsapi_anti_cache=17&a=1"), "/r?a=1");
/// assert_eq!(signature("/r?resteasy_jsapi_anti_cache=17"), "/r");
/// assert_eq!(signature("/r?a=1"), "/r?a=1");
/// ```
pub fn signature(url: &str) -> Cow<'_, str> {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let Some((base, query)) = rest.split_once('?') else {
        return Cow::Borrowed(url);
    };

    if !query.split('&').any(is_anti_cache) {
        return Cow::Borrowed(url);
    }

    let mut out = String::with_capacity(url.len());
    out.push_str(base);

    let mut pairs = query.split('&').filter(|pair| !is_anti_cache(pair));
    if let Some(first) = pairs.next() {
        out.push('?');
        out.push_str(first);
        for pair in pairs {
            out.push('&');
            out.push_str(pair);
        }
    }

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }

    Cow::Owned(out)
}

fn is_anti_cache(pair: &str) -> bool {
    match pair.split_once('=') {
        Some((ANTI_CACHE_PARAM, value)) => {
            !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

// ===== Record =====

/// Response validators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Last good response for a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRecord {
    pub signature: String,
    pub validators: Validators,
    /// Raw response text.
    pub entity: String,
    /// Response `Content-Type`, used to classify the entity when it is served again.
    pub content_type: Option<String>,
}

// ===== Store =====

/// Last write wins map of [`CacheRecord`] by signature.
///
/// Unbounded by default, see [`ConditionalCache::with_limit`].
#[derive(Debug, Default)]
pub struct ConditionalCache {
    records: FnvHashMap<String, CacheRecord>,
    /// Signatures, least recently written first.
    order: VecDeque<String>,
    limit: Option<usize>,
}

impl ConditionalCache {
    /// Create new unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new store holding at most `limit` records.
    ///
    /// Once full, inserting a new signature evicts the least recently written record. A limit of
    /// zero is treated as one.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Insert record, replacing any record with the same signature.
    ///
    /// Returns the evicted record, if any.
    pub fn insert(&mut self, record: CacheRecord) -> Option<CacheRecord> {
        let replaced = self.remove(&record.signature);

        let evicted = match self.limit {
            Some(limit) if self.records.len() >= limit => self
                .order
                .pop_front()
                .and_then(|signature| self.records.remove(&signature)),
            _ => None,
        };

        trace!("cache insert: {}", record.signature);
        self.order.push_back(record.signature.clone());
        self.records.insert(record.signature.clone(), record);

        replaced.or(evicted)
    }

    pub fn get(&self, signature: &str) -> Option<&CacheRecord> {
        self.records.get(signature)
    }

    /// Returns the record for the signature of `url`.
    pub fn lookup(&self, url: &str) -> Option<&CacheRecord> {
        self.get(&signature(url))
    }

    pub fn remove(&mut self, signature: &str) -> Option<CacheRecord> {
        let record = self.records.remove(signature)?;
        self.order.retain(|key| key != signature);
        Some(record)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.records.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    /// Iterate records, least recently written first.
    pub fn iter(&self) -> impl Iterator<Item = &CacheRecord> {
        self.order.iter().filter_map(|signature| self.records.get(signature))
    }
}
