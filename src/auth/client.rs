use super::types::{AuthChangeEvent, AuthResponse, Session, User};
use crate::infrastructure::{
    SharedHeaders, TaskManager, bearer, build_http_client, check_response, join_url,
};
use crate::types::{EXPIRY_MARGIN, Result, SupabaseError};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

type Listener = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static>;

const AUTH_CLIENT_TIMEOUT: u64 = 30;

struct AuthInner {
    url: String,
    headers: SharedHeaders,
    http: reqwest::Client,
    session: RwLock<Option<Session>>,
    listeners: Mutex<HashMap<Uuid, Listener>>,
    auto_refresh_token: bool,
    refresh_tasks: Mutex<TaskManager>,
}

/// Client for the GoTrue auth service.
///
/// Holds the current session in memory and notifies listeners registered with
/// [`on_auth_state_change()`](Self::on_auth_state_change) whenever it changes.
/// Clones share the session, the listeners and the header state.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthInner>,
}

/// Handle returned by [`AuthClient::on_auth_state_change`]
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    auth: Weak<AuthInner>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stops delivering events to the listener. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(auth) = self.auth.upgrade() {
            auth.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

impl AuthClient {
    pub fn new(
        url: impl Into<String>,
        headers: SharedHeaders,
        auto_refresh_token: bool,
    ) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(AUTH_CLIENT_TIMEOUT))?;

        Ok(Self {
            inner: Arc::new(AuthInner {
                url: url.into(),
                headers,
                http,
                session: RwLock::new(None),
                listeners: Mutex::new(HashMap::new()),
                auto_refresh_token,
                refresh_tasks: Mutex::new(TaskManager::new()),
            }),
        })
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Headers sent with every auth request
    pub fn headers(&self) -> &SharedHeaders {
        &self.inner.headers
    }

    /// Registers a listener for auth state changes.
    ///
    /// Listeners run synchronously on the task that caused the change and must
    /// not block.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));

        Subscription {
            id,
            auth: Arc::downgrade(&self.inner),
        }
    }

    fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let listeners: Vec<Listener> = {
            let listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.values().cloned().collect()
        };

        tracing::debug!("Auth event {} -> {} listener(s)", event, listeners.len());
        for listener in listeners {
            listener(event, session);
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let response = self
            .request(Method::POST, "signup", None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: serde_json::Value = check_response(response).await?.json().await?;

        // Auto-confirmed projects answer with a session, others with the bare user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            let session = session.stamp_expiry();
            self.save_session(session.clone()).await;
            self.notify(AuthChangeEvent::SignedIn, Some(&session));
            return Ok(AuthResponse {
                user: session.user.clone(),
                session: Some(session),
            });
        }

        Ok(AuthResponse {
            user: Some(serde_json::from_value(body)?),
            session: None,
        })
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .token_request("password", json!({ "email": email, "password": password }))
            .await?;

        tracing::info!("Signed in");
        self.save_session(session.clone()).await;
        self.notify(AuthChangeEvent::SignedIn, Some(&session));
        Ok(session)
    }

    /// Exchanges the stored refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or_else(|| SupabaseError::Auth("Auth session missing".to_string()))?;

        let session = self
            .token_request("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;

        tracing::debug!("Session refreshed");
        self.save_session(session.clone()).await;
        self.notify(AuthChangeEvent::TokenRefreshed, Some(&session));
        Ok(session)
    }

    /// Installs a session from externally obtained tokens after validating the access token
    pub async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        let user = self.fetch_user(access_token).await?;

        let mut session = Session::new(access_token, refresh_token);
        session.user = Some(user);

        self.save_session(session.clone()).await;
        self.notify(AuthChangeEvent::SignedIn, Some(&session));
        Ok(session)
    }

    /// Installs a previously persisted session without contacting the server
    pub async fn restore_session(&self, session: Session) {
        tracing::debug!("Restoring persisted session");
        self.save_session(session.clone()).await;
        self.notify(AuthChangeEvent::InitialSession, Some(&session));
    }

    /// Current session, refreshed first when it is about to expire and
    /// auto-refresh is enabled
    pub async fn get_session(&self) -> Result<Option<Session>> {
        let current = self.inner.session.read().await.clone();
        match current {
            Some(session) if self.inner.auto_refresh_token && session.is_expired(EXPIRY_MARGIN) => {
                self.refresh_session().await.map(Some)
            }
            other => Ok(other),
        }
    }

    /// Fetches the user behind the current session
    pub async fn get_user(&self) -> Result<User> {
        let access_token = self
            .get_session()
            .await?
            .map(|s| s.access_token)
            .ok_or_else(|| SupabaseError::Auth("Auth session missing".to_string()))?;

        self.fetch_user(&access_token).await
    }

    /// Ends the session locally and on the server.
    ///
    /// Listeners always receive `SIGNED_OUT`; a failed remote logout is logged
    /// and does not keep the local session alive.
    pub async fn sign_out(&self) -> Result<()> {
        let session = self.inner.session.write().await.take();
        self.cancel_refresh();

        if let Some(session) = session {
            let result = self
                .request(Method::POST, "logout", Some(&session.access_token))
                .send()
                .await;
            match result {
                Ok(response) => {
                    if let Err(e) = check_response(response).await {
                        tracing::warn!("Remote logout failed: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Remote logout failed: {}", e),
            }
        }

        tracing::info!("Signed out");
        self.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn token_request(&self, grant_type: &str, body: serde_json::Value) -> Result<Session> {
        let response = self
            .request(Method::POST, "token", None)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        let session: Session = check_response(response)
            .await
            .map_err(auth_error)?
            .json()
            .await?;
        Ok(session.stamp_expiry())
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User> {
        let response = self
            .request(Method::GET, "user", Some(access_token))
            .send()
            .await?;
        Ok(check_response(response)
            .await
            .map_err(auth_error)?
            .json()
            .await?)
    }

    /// Request carrying the client headers, with the bearer swapped for a user token when given
    fn request(
        &self,
        method: Method,
        path: &str,
        user_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut headers: HeaderMap = self.inner.headers.snapshot();
        if let Some(token) = user_token
            && let Ok(value) = HeaderValue::from_str(&bearer(token))
        {
            headers.insert(AUTHORIZATION, value);
        }

        self.inner
            .http
            .request(method, join_url(&self.inner.url, path))
            .headers(headers)
    }

    async fn save_session(&self, session: Session) {
        let refresh_in = session.expires_after();
        *self.inner.session.write().await = Some(session);

        if self.inner.auto_refresh_token
            && let Some(remaining) = refresh_in
        {
            self.schedule_refresh(Duration::from_secs(remaining.saturating_sub(EXPIRY_MARGIN)));
        }
    }

    fn schedule_refresh(&self, delay: Duration) {
        let weak = Arc::downgrade(&self.inner);
        let mut tasks = self
            .inner
            .refresh_tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tasks.abort_all();

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::debug!("No async runtime available, auto-refresh disabled for this session");
            return;
        }

        tracing::debug!("Scheduling session refresh in {:?}", delay);
        tasks.spawn("session refresh", async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(e) = (AuthClient { inner }).refresh_session().await {
                tracing::error!("Automatic session refresh failed: {}", e);
            }
        });
    }

    fn cancel_refresh(&self) {
        self.inner
            .refresh_tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_all();
    }
}

fn auth_error(err: SupabaseError) -> SupabaseError {
    match err {
        SupabaseError::Api { status, message } => {
            SupabaseError::Auth(format!("{} (status {})", message, status))
        }
        other => other,
    }
}
