use crate::auth::{AuthChangeEvent, Session};
use crate::infrastructure::{SharedHeaders, bearer};
use crate::realtime::RealtimeAuth;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::sync::Arc;

/// Copies the bearer token of a new session into every sub-client.
///
/// Holds handles to the header state of the options object and of each
/// sub-client, so it can run from inside an auth listener without borrowing
/// the composed client.
pub(crate) struct CredentialPropagator<R> {
    pub supabase_key: String,
    pub options: SharedHeaders,
    pub postgrest: SharedHeaders,
    pub auth: SharedHeaders,
    pub storage: SharedHeaders,
    pub functions: SharedHeaders,
    pub realtime: Arc<R>,
}

impl<R> Clone for CredentialPropagator<R> {
    fn clone(&self) -> Self {
        Self {
            supabase_key: self.supabase_key.clone(),
            options: self.options.clone(),
            postgrest: self.postgrest.clone(),
            auth: self.auth.clone(),
            storage: self.storage.clone(),
            functions: self.functions.clone(),
            realtime: Arc::clone(&self.realtime),
        }
    }
}

impl<R: RealtimeAuth> CredentialPropagator<R> {
    /// Token to install for an event, or `None` when nothing changes
    fn token_for<'a>(
        &'a self,
        event: AuthChangeEvent,
        session: Option<&'a Session>,
    ) -> Option<&'a str> {
        match (event, session) {
            (_, Some(session)) => Some(&session.access_token),
            (AuthChangeEvent::SignedOut, None) => Some(&self.supabase_key),
            _ => None,
        }
    }

    pub fn apply(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let Some(token) = self.token_for(event, session) else {
            tracing::debug!("Auth event {} without session, headers unchanged", event);
            return;
        };

        // Build the value once so either every header changes or none does
        let value = match HeaderValue::from_str(&bearer(token)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "Ignoring auth event {}: token is not a valid header value ({})",
                    event,
                    e
                );
                return;
            }
        };

        for headers in [
            &self.options,
            &self.postgrest,
            &self.auth,
            &self.storage,
            &self.functions,
        ] {
            headers.insert_value(AUTHORIZATION, value.clone());
        }
        self.realtime.set_auth(token);

        tracing::info!("Propagated credentials for auth event {}", event);
    }
}
