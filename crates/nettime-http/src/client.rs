//! netTime HTTP client: session lifecycle and authenticated transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace, warn};

use nettime_core::error::{AuthError, RemoteError, StateError, TransportError};
use nettime_core::task::{TaskId, TaskPoller, TaskStarted, TaskStatus};
use nettime_core::{AccessToken, Credentials, Error, Result, TaskApi};

use crate::config::ClientConfig;
use crate::endpoints::*;
use crate::session::{ActiveSession, session_headers};

/// Client for one netTime server and one user.
///
/// The client owns a single session. Every operation takes `&mut self`, so
/// one instance never has two requests in flight; run several clients for
/// concurrency.
///
/// A request answered with `401` triggers one [`reconnect`](Self::reconnect)
/// and one retry. A second `401` is returned to the caller.
///
/// # Example
///
/// ```no_run
/// use nettime_core::{BaseUrl, Credentials, Query};
/// use nettime_http::{ClientConfig, ElementsOptions, NetTimeClient};
///
/// # async fn example() -> Result<(), nettime_core::Error> {
/// let config = ClientConfig::new(BaseUrl::new("https://nettime.example.com")?);
/// let mut client = NetTimeClient::login(config, Credentials::new("admin", "secret")).await?;
///
/// let employees = client
///     .get_employees(Query::id_and_nif(), &ElementsOptions::default())
///     .await?;
/// println!("{employees}");
///
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct NetTimeClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Credentials,
    session: Option<ActiveSession>,
    poller: TaskPoller,
}

impl NetTimeClient {
    /// Create a disconnected client.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nettime-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http {
                message: e.to_string(),
            })?;

        let poller = TaskPoller::new(config.poll().clone());

        Ok(Self {
            http,
            config,
            credentials,
            session: None,
            poller,
        })
    }

    /// Create a client and connect it.
    pub async fn login(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let mut client = Self::new(config, credentials)?;
        client.connect().await?;
        Ok(client)
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True iff a token and the headers derived from it are held.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the current session token.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.session.as_ref().map(|s| &s.token)
    }

    /// Returns the headers sent with every authenticated request.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.session.as_ref().map(|s| &s.headers)
    }

    /// Returns the server settings fetched at login.
    pub fn settings(&self) -> Option<&serde_json::Value> {
        self.session.as_ref().map(|s| &s.settings)
    }

    /// Returns the user's role, read from the settings at login.
    pub fn role(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.role.as_deref())
    }

    /// Log in, unless already connected.
    ///
    /// On success the token, its headers, the server settings and the role
    /// are stored together. On failure the client stays disconnected.
    ///
    /// # Errors
    ///
    /// [`AuthError`] when the login endpoint answers non-2xx or `ok: false`,
    /// or hands back no token.
    #[instrument(skip(self), fields(url = %self.config.base_url(), username = %self.credentials.username()))]
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected");
            return Ok(());
        }

        info!("Logging in");

        let form = LoginForm {
            username: self.credentials.username(),
            pwd: self.credentials.password(),
        };

        let response = self
            .http
            .post(self.config.base_url().endpoint(LOGIN))
            .form(&form)
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.request_timeout()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::LoginFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let login: LoginResponse = decode(response).await?;
        if !login.ok {
            return Err(AuthError::LoginRejected {
                message: login.message,
            }
            .into());
        }

        let token = AccessToken::new(login.access_token.unwrap_or_default());
        let headers = session_headers(&token)?;

        // Settings need the new headers but must not go through the retrying
        // transport: a 401 here would recurse into another login.
        let timeout = self.config.request_timeout();
        let response = self
            .http
            .get(self.config.base_url().endpoint(SETTINGS))
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let settings: serde_json::Value = decode(check_status(response).await?).await?;

        let session = ActiveSession::new(token, headers, settings);
        info!(role = ?session.role, "Connected");
        self.session = Some(session);

        Ok(())
    }

    /// Drop the current session and log in again.
    #[instrument(skip(self), fields(url = %self.config.base_url()))]
    pub async fn reconnect(&mut self) -> Result<()> {
        info!("Reconnecting");
        self.session = None;
        self.connect().await
    }

    /// Log out.
    ///
    /// The local session is cleared whatever the logout call returns; a
    /// failed logout is still reported.
    ///
    /// # Errors
    ///
    /// [`StateError::NotConnected`] when there is no session.
    #[instrument(skip(self), fields(url = %self.config.base_url()))]
    pub async fn disconnect(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(StateError::NotConnected)?;
        let timeout = self.config.request_timeout();

        let outcome = match self
            .http
            .post(self.config.base_url().endpoint(LOGOUT))
            .headers(session.headers)
            .body("")
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(e) => Err(transport_error(e, timeout)),
        };

        match &outcome {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Logout failed, local session cleared anyway"),
        }

        outcome
    }

    /// Authenticated GET with URL-encoded parameters.
    pub async fn get<Q, R>(&mut self, path: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let timeout = self.config.request_timeout();
        self.get_with_timeout(path, params, timeout).await
    }

    /// Authenticated GET with an explicit timeout.
    #[instrument(skip(self, params, timeout))]
    pub async fn get_with_timeout<Q, R>(
        &mut self,
        path: &str,
        params: &Q,
        timeout: Duration,
    ) -> Result<R>
    where
        Q: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.config.base_url().endpoint(path);
        debug!("GET");
        trace!(params = ?serde_json::to_value(params).ok(), "query parameters");

        let response = self
            .execute(timeout, |http| http.get(&url).query(params))
            .await?;

        decode(response).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post<B, R>(&mut self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let timeout = self.config.request_timeout();
        self.post_with_timeout(path, body, timeout).await
    }

    /// Authenticated POST with an explicit timeout.
    #[instrument(skip(self, body, timeout))]
    pub async fn post_with_timeout<B, R>(
        &mut self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.config.base_url().endpoint(path);
        debug!("POST");

        let response = self
            .execute(timeout, |http| http.post(&url).json(body))
            .await?;

        decode(response).await
    }

    /// Start a server job at `path` and wait for its result.
    pub(crate) async fn run_task<Q>(&mut self, path: &str, params: &Q) -> Result<serde_json::Value>
    where
        Q: Serialize + ?Sized + Sync,
    {
        let started: TaskStarted = self.get(path, params).await?;
        debug!(task_id = %started.task_id, "Async task started");

        let poller = self.poller.clone();
        poller.wait_result(self, started.task_id).await
    }

    /// Send a request built by `build`, retrying once after a reconnect if
    /// the server rejects the session.
    async fn execute<F>(&mut self, timeout: Duration, build: F) -> Result<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder + Sync,
    {
        let mut reconnected = false;

        loop {
            let headers = self
                .session
                .as_ref()
                .ok_or(StateError::NotConnected)?
                .headers
                .clone();

            let response = build(&self.http)
                .headers(headers)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| transport_error(e, timeout))?;

            if response.status() == StatusCode::UNAUTHORIZED {
                if !reconnected {
                    warn!("Session rejected, reconnecting once");
                    self.reconnect().await?;
                    reconnected = true;
                    continue;
                }
                // The fresh session was refused as well.
                self.session = None;
            }

            return check_status(response).await;
        }
    }
}

#[async_trait]
impl TaskApi for NetTimeClient {
    async fn task_status(&mut self, task: &TaskId) -> Result<TaskStatus> {
        self.get(ASYNC_STATUS, &TaskQuery { task_id: task.as_str() })
            .await
    }

    async fn task_response(&mut self, task: &TaskId) -> Result<serde_json::Value> {
        self.get(ASYNC_RESPONSE, &TaskQuery { task_id: task.as_str() })
            .await
    }
}

impl std::fmt::Debug for NetTimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetTimeClient")
            .field("url", self.config.base_url())
            .field("credentials", &self.credentials)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Turn a non-2xx response into a [`RemoteError`] carrying the raw body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    trace!(status = %status, "response");

    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::new(status.as_u16(), body).into())
    }
}

/// Decode a JSON body. An empty body decodes as `null`.
async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
    let bytes = response.bytes().await.map_err(|e| TransportError::Http {
        message: e.to_string(),
    })?;

    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };

    serde_json::from_slice(bytes).map_err(|e| {
        Error::from(TransportError::Decode {
            message: e.to_string(),
        })
    })
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}
