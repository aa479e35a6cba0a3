use super::{Client, ClientOptions};
use crate::infrastructure::join_url;
use crate::types::{
    Result, SupabaseError,
    constants::{headers::AUTHORIZATION, paths},
};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// JWT-shaped legacy keys (`anon`, `service_role`)
static JWT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_=-]+\.[A-Za-z0-9_=-]+\.?[A-Za-z0-9_.+/=-]*$")
        .expect("API key pattern is valid")
});

/// Opaque publishable/secret keys
static OPAQUE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sb_(publishable|secret)_[A-Za-z0-9_-]+$").expect("API key pattern is valid")
});

/// Service endpoints derived from the project URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub auth: String,
    pub storage: String,
    pub functions: String,
    pub realtime: String,
}

impl Endpoints {
    pub(crate) fn new(supabase_url: &str) -> Self {
        let realtime = join_url(supabase_url, paths::REALTIME);
        let realtime = match realtime.split_once("://") {
            Some(("https", rest)) => format!("wss://{}", rest),
            Some(("http", rest)) => format!("ws://{}", rest),
            _ => realtime,
        };

        Self {
            rest: join_url(supabase_url, paths::REST),
            auth: join_url(supabase_url, paths::AUTH),
            storage: join_url(supabase_url, paths::STORAGE),
            functions: join_url(supabase_url, paths::FUNCTIONS),
            realtime,
        }
    }
}

/// Checks the credential pair and returns the normalized project URL
pub(crate) fn validate_credentials(supabase_url: &str, supabase_key: &str) -> Result<String> {
    let supabase_url = supabase_url.trim();
    let supabase_key = supabase_key.trim();

    if supabase_url.is_empty() {
        return Err(SupabaseError::config("supabase_url is required"));
    }
    if supabase_key.is_empty() {
        return Err(SupabaseError::config("supabase_key is required"));
    }

    let parsed = Url::parse(supabase_url).map_err(|_| SupabaseError::config("Invalid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(SupabaseError::config("Invalid URL"));
    }

    if !JWT_KEY.is_match(supabase_key) && !OPAQUE_KEY.is_match(supabase_key) {
        return Err(SupabaseError::config("Invalid API key"));
    }

    Ok(supabase_url.trim_end_matches('/').to_string())
}

/// Creates a [`Client`] for a Supabase project.
///
/// Validation and sub-client construction never touch the network. When
/// `options.session` carries a persisted session it is installed on the auth
/// client, which propagates its token to every sub-client before returning.
/// A custom `Authorization` header takes precedence over the session.
///
/// # Errors
///
/// Returns [`SupabaseError::Config`] when the URL or key is missing or malformed.
///
/// # Example
///
/// ```no_run
/// use supabase_rs::create_client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client =
///     create_client("https://xyzcompany.supabase.co", "public-anon-key.jwt.sig", None).await?;
/// let rows = client.table("countries").select("*").execute().await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_client(
    supabase_url: &str,
    supabase_key: &str,
    options: Option<ClientOptions>,
) -> Result<Client> {
    let mut options = options.unwrap_or_default();
    let session = options.session.take();
    let custom_authorization = options.header(AUTHORIZATION).is_some();

    let client = Client::new(supabase_url, supabase_key, options)?;
    match session {
        Some(_) if custom_authorization => {
            tracing::debug!("Custom Authorization header set, persisted session ignored");
        }
        Some(session) => client.auth().restore_session(session).await,
        None => {}
    }
    Ok(client)
}
