use crate::auth::Session;
use crate::realtime::RealtimeClientOptions;
use crate::types::{
    DEFAULT_FUNCTION_CLIENT_TIMEOUT, DEFAULT_POSTGREST_CLIENT_TIMEOUT, DEFAULT_SCHEMA,
    DEFAULT_STORAGE_CLIENT_TIMEOUT, client_info, constants::headers::CLIENT_INFO,
};
use std::collections::HashMap;
use std::time::Duration;

/// Options accepted by [`create_client`](crate::create_client).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Postgres schema used by `table`, `from` and `rpc`
    pub schema: String,
    /// Extra headers sent by every sub-client. An `Authorization` entry
    /// replaces the default `Bearer <api key>`.
    pub headers: HashMap<String, String>,
    /// Refresh sessions in the background before they expire
    pub auto_refresh_token: bool,
    pub postgrest_client_timeout: Duration,
    pub storage_client_timeout: Duration,
    pub function_client_timeout: Duration,
    pub realtime: RealtimeClientOptions,
    /// Previously persisted session, installed when the client is created
    pub session: Option<Session>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            headers: HashMap::from([(CLIENT_INFO.to_string(), client_info())]),
            auto_refresh_token: true,
            postgrest_client_timeout: Duration::from_secs(DEFAULT_POSTGREST_CLIENT_TIMEOUT),
            storage_client_timeout: Duration::from_secs(DEFAULT_STORAGE_CLIENT_TIMEOUT),
            function_client_timeout: Duration::from_secs(DEFAULT_FUNCTION_CLIENT_TIMEOUT),
            realtime: RealtimeClientOptions::default(),
            session: None,
        }
    }
}

impl ClientOptions {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_auto_refresh_token(mut self, enabled: bool) -> Self {
        self.auto_refresh_token = enabled;
        self
    }

    pub fn with_realtime(mut self, realtime: RealtimeClientOptions) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Value of a user-supplied header, matched case-insensitively
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
