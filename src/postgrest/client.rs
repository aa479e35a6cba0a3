use super::builder::QueryBuilder;
use crate::infrastructure::{SharedHeaders, build_http_client, join_url};
use crate::types::Result;
use reqwest::Method;
use std::time::Duration;

/// Client for the PostgREST query layer.
///
/// Cloning is cheap; clones and schema-bound copies share header state.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    url: String,
    schema: String,
    headers: SharedHeaders,
    http: reqwest::Client,
}

impl PostgrestClient {
    pub fn new(
        url: impl Into<String>,
        schema: impl Into<String>,
        headers: SharedHeaders,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            schema: schema.into(),
            headers,
            http: build_http_client(timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    /// Headers attached to every query, read when the query executes
    pub fn headers(&self) -> &SharedHeaders {
        &self.headers
    }

    /// Replaces the bearer token used for subsequent queries
    pub fn auth(&self, token: &str) -> Result<()> {
        self.headers.set_bearer(token)
    }

    /// Copy of this client targeting another schema
    pub fn schema(&self, schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..self.clone()
        }
    }

    /// Starts a query against a table or view
    pub fn from(&self, table: &str) -> QueryBuilder {
        self.builder(Method::GET, table)
    }

    pub fn table(&self, table: &str) -> QueryBuilder {
        self.from(table)
    }

    /// Calls a Postgres function with named arguments
    pub fn rpc(&self, function: &str, params: serde_json::Value) -> QueryBuilder {
        self.builder(Method::POST, &format!("rpc/{}", function))
            .body(params)
    }

    fn builder(&self, method: Method, path: &str) -> QueryBuilder {
        QueryBuilder::new(
            self.http.clone(),
            join_url(&self.url, path),
            self.schema.clone(),
            self.headers.clone(),
            method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PostgrestClient {
        PostgrestClient::new(
            "http://localhost:54321/rest/v1",
            "public",
            SharedHeaders::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_schema_copy_shares_headers() {
        let client = client();
        let other = client.schema("new_schema");

        assert_eq!(other.schema_name(), "new_schema");
        assert_eq!(client.schema_name(), "public");

        client.auth("token").unwrap();
        assert_eq!(
            other.headers().get("Authorization").as_deref(),
            Some("Bearer token")
        );
    }

    #[test]
    fn test_table_and_rpc_urls() {
        let client = client();
        assert_eq!(
            client.table("sample").url(),
            "http://localhost:54321/rest/v1/sample"
        );
        assert_eq!(
            client.rpc("test_fn", serde_json::json!({})).url(),
            "http://localhost:54321/rest/v1/rpc/test_fn"
        );
    }
}
