/// Header names shared by every sub-client
pub mod headers {
    pub const API_KEY: &str = "apiKey";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CLIENT_INFO: &str = "X-Client-Info";
    pub const ACCEPT_PROFILE: &str = "Accept-Profile";
    pub const CONTENT_PROFILE: &str = "Content-Profile";
    pub const PREFER: &str = "Prefer";
}

/// Service paths appended to the project URL
pub mod paths {
    pub const REST: &str = "rest/v1";
    pub const AUTH: &str = "auth/v1";
    pub const STORAGE: &str = "storage/v1";
    pub const FUNCTIONS: &str = "functions/v1";
    pub const REALTIME: &str = "realtime/v1";
}

/// Phoenix protocol event strings (magic strings layer)
pub mod phoenix_events {
    pub const CLOSE: &str = "phx_close";
    pub const ERROR: &str = "phx_error";
    pub const JOIN: &str = "phx_join";
    pub const REPLY: &str = "phx_reply";
    pub const LEAVE: &str = "phx_leave";
    pub const HEARTBEAT: &str = "heartbeat";
}

/// Phoenix protocol topics
pub const PHOENIX_TOPIC: &str = "phoenix";

/// Realtime event carrying a refreshed access token
pub const ACCESS_TOKEN_EVENT: &str = "access_token";

/// Protocol version
pub const VSN: &str = "1.0.0";

/// Default schema for PostgREST requests
pub const DEFAULT_SCHEMA: &str = "public";

/// Default HTTP timeouts (seconds)
pub const DEFAULT_POSTGREST_CLIENT_TIMEOUT: u64 = 120;
pub const DEFAULT_STORAGE_CLIENT_TIMEOUT: u64 = 20;
pub const DEFAULT_FUNCTION_CLIENT_TIMEOUT: u64 = 5;

/// Default heartbeat interval (milliseconds)
pub const HEARTBEAT_INTERVAL: u64 = 25000;

/// Default realtime connect timeout (milliseconds)
pub const REALTIME_TIMEOUT: u64 = 10000;

/// Refresh sessions this many seconds before they expire
pub const EXPIRY_MARGIN: u64 = 10;

/// Value sent in the `X-Client-Info` header
pub fn client_info() -> String {
    format!("supabase-rs/{}", env!("CARGO_PKG_VERSION"))
}
