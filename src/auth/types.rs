use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Auth state transitions reported to
/// [`on_auth_state_change`](super::AuthClient::on_auth_state_change) listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    PasswordRecovery,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    MfaChallengeVerified,
}

impl AuthChangeEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::MfaChallengeVerified => "MFA_CHALLENGE_VERIFIED",
        }
    }
}

impl std::fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A signed-in session as returned by the auth server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds, relative to issue time
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Absolute expiry as a unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_in: None,
            expires_at: None,
            user: None,
        }
    }

    /// Fills `expires_at` from `expires_in` when the server omitted it
    pub(crate) fn stamp_expiry(mut self) -> Self {
        if self.expires_at.is_none()
            && let Some(expires_in) = self.expires_in
        {
            self.expires_at = Some(unix_now() + expires_in);
        }
        self
    }

    /// Seconds until expiry, saturating at zero. `None` when the expiry is unknown.
    pub fn expires_after(&self) -> Option<u64> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_sub(unix_now()))
    }

    /// Whether the session expires within `margin` seconds
    pub fn is_expired(&self, margin: u64) -> bool {
        self.expires_after()
            .is_some_and(|remaining| remaining <= margin)
    }
}

/// Result of a sign-up; the session is absent when email confirmation is pending
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
