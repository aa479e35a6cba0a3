use crate::types::{Result, SupabaseError};
use reqwest::Response;
use std::time::Duration;

/// Builds the reqwest client used by one sub-client
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Passes successful responses through and turns failures into [`SupabaseError::Api`]
///
/// Backend services report errors as JSON with one of `message`, `msg`,
/// `error_description` or `error`; the raw body is used when none is present.
pub async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    tracing::debug!("Request failed with status {}: {}", status, message);

    Err(SupabaseError::Api {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Joins a base endpoint and a path with exactly one `/`
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let body = r#"{"code":"42P01","message":"relation \"x\" does not exist"}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("relation \"x\" does not exist")
        );
    }

    #[test]
    fn test_error_message_falls_back_to_error_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn test_error_message_non_json() {
        assert_eq!(error_message("Bad Gateway"), None);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://x.supabase.co/", "/rest/v1"),
            "https://x.supabase.co/rest/v1"
        );
        assert_eq!(join_url("http://localhost:54321", "auth/v1"), "http://localhost:54321/auth/v1");
    }
}
