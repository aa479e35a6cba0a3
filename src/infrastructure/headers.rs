use crate::types::{Result, constants::headers::AUTHORIZATION};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::{Arc, PoisonError, RwLock};

/// Header state owned by one sub-client and read at request time.
///
/// Clones share the same map, so a `PostgrestClient` derived with
/// [`schema()`](crate::postgrest::PostgrestClient::schema) observes credential
/// updates made to its parent. Distinct sub-clients each get their own store.
#[derive(Debug, Clone, Default)]
pub struct SharedHeaders {
    inner: Arc<RwLock<HeaderMap>>,
}

impl SharedHeaders {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(headers)),
        }
    }

    /// Case-insensitive lookup returning an owned string value
    pub fn get(&self, name: &str) -> Option<String> {
        let headers = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Parses and stores a header, replacing any previous value
    pub fn insert(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.insert_value(name, value);
        Ok(())
    }

    pub fn insert_value(&self, name: HeaderName, value: HeaderValue) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// Stores `Authorization: Bearer <token>`
    pub fn set_bearer(&self, token: &str) -> Result<()> {
        self.insert(AUTHORIZATION, &bearer(token))
    }

    /// Copy of the current headers for attaching to an outgoing request
    pub fn snapshot(&self) -> HeaderMap {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Independent store seeded with the current headers
    pub fn detached(&self) -> Self {
        Self::new(self.snapshot())
    }
}

/// Formats a bearer header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Builds a `HeaderMap` from string pairs, rejecting invalid names or values
pub fn header_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    Ok(map)
}
