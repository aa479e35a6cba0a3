//! Environment-driven configuration.

use crate::client::{Client, ClientOptions, create_client};
use crate::types::{Result, SupabaseError};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

/// Project credentials read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl SupabaseConfig {
    /// Reads `SUPABASE_URL` and `SUPABASE_KEY`, loading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(URL_VAR, KEY_VAR)
    }

    /// Reads the credentials from custom variable names
    pub fn from_vars(url_var: &str, key_var: &str) -> Result<Self> {
        Ok(Self {
            url: read_var(url_var)?,
            key: read_var(key_var)?,
        })
    }

    pub async fn connect(&self, options: Option<ClientOptions>) -> Result<Client> {
        create_client(&self.url, &self.key, options).await
    }
}

fn read_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SupabaseError::Config(format!("{} is not set", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable() {
        let err = SupabaseConfig::from_vars(
            "SUPABASE_RS_TEST_UNSET_URL",
            "SUPABASE_RS_TEST_UNSET_KEY",
        )
        .unwrap_err();
        match err {
            SupabaseError::Config(message) => {
                assert_eq!(message, "SUPABASE_RS_TEST_UNSET_URL is not set")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
