//! Session lifecycle and the authenticated request path.
//!
//! [`SessionManager`] owns the bearer token and the signed-in [`User`]. Every
//! call that needs credentials goes through
//! [`SessionManager::authenticated_request`], which attaches the token and
//! turns a `401` into a local sign-out.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use inventario_auth::{
    Action, GuardDecision, NewUser, Resource, Route, User, authorize, can_view, decide, decode_unverified,
    validate_claims,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{cancellable, ensure_success, read_json};
use crate::token_store::TokenStore;

/// What the rest of the console knows about the current session.
#[derive(Clone, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    /// `true` until the persisted token has been resolved.
    pub loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("loading", &self.loading)
            .finish()
    }
}

/// Method, body, query string and cancellation for one authenticated call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub json: Option<Value>,
    pub query: Vec<(String, String)>,
    pub cancel: Option<CancellationToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            json: None,
            query: Vec::new(),
            cancel: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::validation(e.to_string()))?;
        self.json = Some(value);
        Ok(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_cancel(mut self, cancel: &CancellationToken) -> Self {
        self.cancel = Some(cancel.clone());
        self
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Owner of the bearer token and the signed-in user.
pub struct SessionManager {
    api_url: String,
    http: Client,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
    root: Mutex<CancellationToken>,
}

impl SessionManager {
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self::with_client(config.api_url.clone(), http, store))
    }

    /// Build around an existing HTTP client. The session starts unresolved;
    /// call [`SessionManager::init`] before routing.
    pub fn with_client(api_url: impl Into<String>, http: Client, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http,
            store,
            state: RwLock::new(SessionState {
                loading: true,
                ..SessionState::default()
            }),
            root: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Resolve the persisted token, if any, into a signed-in user.
    ///
    /// Never fails: a missing, expired or rejected token leaves the session
    /// anonymous (and removes the token from the store).
    pub async fn init(&self) {
        self.state.write().loading = true;

        let persisted = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted session");
                None
            }
        };

        let resolved = match persisted {
            Some(token) => self.resolve_persisted(token).await,
            None => None,
        };

        let mut state = self.state.write();
        match resolved {
            Some((token, user)) => {
                state.token = Some(token);
                state.user = Some(user);
            }
            None => {
                state.token = None;
                state.user = None;
            }
        }
        state.loading = false;
    }

    async fn resolve_persisted(&self, token: String) -> Option<(String, User)> {
        match decode_unverified(&token) {
            Ok(claims) => {
                if let Err(e) = validate_claims(&claims, Utc::now()) {
                    info!(reason = %e, "discarding persisted token");
                    self.forget_persisted();
                    return None;
                }
            }
            Err(e) => debug!(reason = %e, "persisted token is opaque, asking the backend"),
        }

        match self.fetch_profile(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, rol = %user.rol, "session restored");
                Some((token, user))
            }
            Err(e) => {
                warn!(error = %e, "persisted token rejected");
                self.forget_persisted();
                None
            }
        }
    }

    /// Re-fetch the profile for the current token (e.g. after the user
    /// edited their own account).
    pub async fn refresh(&self) -> ClientResult<User> {
        let resp = self.authenticated_request("/auth/me", RequestOptions::get()).await?;
        let user: User = read_json(ensure_success(resp).await?).await?;
        self.state.write().user = Some(user.clone());
        Ok(user)
    }

    /// Cancel everything in flight. The token stays persisted.
    pub fn teardown(&self) {
        let mut root = self.root.lock();
        root.cancel();
        *root = CancellationToken::new();
        debug!("session torn down");
    }

    /// Token for one screen; cancelled by [`SessionManager::teardown`].
    pub fn child_token(&self) -> CancellationToken {
        self.root.lock().child_token()
    }

    // ---------------------------------------------------------------------
    // Authentication
    // ---------------------------------------------------------------------

    /// Exchange credentials for a token, then load the profile it belongs to.
    ///
    /// The token is persisted only once the profile is known; a failure at
    /// any step (including persisting) leaves no session behind.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("email and password are required"));
        }

        let span = info_span!("login", request_id = %Uuid::now_v7());
        async {
            let resp = self
                .http
                .post(self.url("/auth/login"))
                .form(&[("username", email), ("password", password)])
                .send()
                .await?;
            let TokenResponse { access_token } = read_json(ensure_success(resp).await?).await?;

            let user = self.fetch_profile(&access_token).await?;

            self.store.save(&access_token)?;

            {
                let mut state = self.state.write();
                state.token = Some(access_token);
                state.user = Some(user.clone());
                state.loading = false;
            }

            info!(user_id = %user.id, rol = %user.rol, "signed in");
            Ok::<_, ClientError>(user)
        }
        .instrument(span)
        .await
    }

    /// Create an account through the public registration endpoint. Does not
    /// touch the current session.
    pub async fn register(&self, new_user: &NewUser) -> ClientResult<User> {
        validate_new_user(new_user)?;

        let resp = self
            .http
            .post(self.url("/auth/registro"))
            .json(new_user)
            .send()
            .instrument(info_span!("register", request_id = %Uuid::now_v7()))
            .await?;
        let user: User = read_json(ensure_success(resp).await?).await?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Drop the token and the user. Cannot fail: a store that refuses to be
    /// emptied is logged and the in-memory session is cleared regardless.
    pub fn logout(&self) {
        {
            let mut state = self.state.write();
            state.token = None;
            state.user = None;
            state.loading = false;
        }
        self.forget_persisted();
        info!("signed out");
    }

    fn forget_persisted(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear persisted session");
        }
    }

    async fn fetch_profile(&self, token: &str) -> ClientResult<User> {
        let resp = self.http.get(self.url("/auth/me")).bearer_auth(token).send().await?;
        read_json(ensure_success(resp).await?).await
    }

    // ---------------------------------------------------------------------
    // Authenticated calls
    // ---------------------------------------------------------------------

    /// Send a request with the session's bearer token.
    ///
    /// Fails with [`ClientError::NotAuthenticated`] without touching the
    /// network when there is no token. A `401` signs the session out and
    /// yields [`ClientError::SessionExpired`]. Other statuses are returned
    /// as-is for the caller to interpret.
    pub async fn authenticated_request(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        let token = self.state.read().token.clone().ok_or(ClientError::NotAuthenticated)?;

        let span = info_span!(
            "api_request",
            method = %options.method,
            path,
            request_id = %Uuid::now_v7(),
        );

        async move {
            let mut req = self
                .http
                .request(options.method, self.url(path))
                .bearer_auth(token)
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = &options.json {
                req = req.json(body);
            }
            if !options.query.is_empty() {
                req = req.query(&options.query);
            }

            let send = async { req.send().await.map_err(ClientError::from) };
            let resp = cancellable(options.cancel.as_ref(), send).await?;

            if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
                info!("session expired");
                self.logout();
                return Err(ClientError::SessionExpired);
            }

            debug!(status = resp.status().as_u16(), "response");
            Ok(resp)
        }
        .instrument(span)
        .await
    }

    /// `GET path` and decode a successful JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> ClientResult<T> {
        self.call_json(path, RequestOptions::get(), cancel).await
    }

    /// Send `body` with `method` and decode a successful JSON body.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::method(method).with_json(body)?;
        self.call_json(path, options, cancel).await
    }

    /// Send a request whose success body is irrelevant (deletes, restores).
    pub async fn send_empty(&self, method: Method, path: &str, cancel: &CancellationToken) -> ClientResult<()> {
        let options = RequestOptions::method(method).with_cancel(cancel);
        let resp = self.authenticated_request(path, options).await?;
        cancellable(Some(cancel), ensure_success(resp)).await?;
        Ok(())
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let resp = self.authenticated_request(path, options.with_cancel(cancel)).await?;
        cancellable(Some(cancel), async { read_json(ensure_success(resp).await?).await }).await
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.state.read().user.as_ref().is_some_and(User::is_admin)
    }

    pub fn can(&self, resource: Resource, action: Action) -> bool {
        can_view(self.state.read().user.as_ref(), resource, action)
    }

    /// [`SessionManager::can`] as a `Result`, checked before any request.
    pub fn require(&self, resource: Resource, action: Action) -> ClientResult<()> {
        authorize(self.state.read().user.as_ref(), resource, action)?;
        Ok(())
    }

    pub fn guard(&self, route: Route) -> GuardDecision {
        let state = self.state.read();
        decide(state.loading, state.user.as_ref(), route)
    }
}

/// Field rules belong to the backend; only an empty password is stopped here.
fn validate_new_user(new_user: &NewUser) -> ClientResult<()> {
    if new_user.password.is_empty() {
        return Err(ClientError::validation("password is required"));
    }
    Ok(())
}
