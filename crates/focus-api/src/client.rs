//! Shared HTTP client.
//!
//! Every request goes through [`ApiClient::send`], which:
//! 1. joins the path onto the validated base URL, pushes escaped path
//!    segments (record ids, tokens) and appends query pairs
//! 2. refuses to send unless the final URL is https or loopback
//! 3. attaches the session's bearer token, if any
//! 4. maps transport failures and non-2xx statuses onto [`ApiError`]
//! 5. tears the session down on 401

use std::time::Instant;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use focus_auth::Session;
use focus_core::{ApiError, RequestScope};
use focus_settings::{ApiSettings, SecureBaseUrl, SettingsError, is_secure_or_loopback};

/// Credential source for one request.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Bearer<'a> {
    /// The session's current token.
    Session,
    /// A token not yet installed in the session (OAuth token callback).
    Explicit(&'a SecretString),
}

/// One outgoing request.
pub(crate) struct Call<'a> {
    pub method: Method,
    pub path: &'a str,
    /// Appended to `path` one escaped segment each.
    pub segments: Vec<&'a str>,
    pub scope: RequestScope,
    pub query: Vec<(&'a str, &'a str)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Bearer<'a>,
}

impl<'a> Call<'a> {
    pub fn new(method: Method, path: &'a str, scope: RequestScope) -> Self {
        Self {
            method,
            path,
            segments: Vec::new(),
            scope,
            query: Vec::new(),
            body: None,
            bearer: Bearer::Session,
        }
    }

    pub fn segment(mut self, segment: &'a str) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn query(mut self, pairs: Vec<(&'a str, &'a str)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode {
            endpoint: self.path.to_owned(),
            message: format!("failed to encode request body: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn bearer(mut self, bearer: Bearer<'a>) -> Self {
        self.bearer = bearer;
        self
    }
}

/// HTTP client bound to one API origin and one session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: SecureBaseUrl,
    session: Session,
}

impl ApiClient {
    /// Validate the base URL and build the connection pool.
    pub fn new(settings: &ApiSettings, session: Session) -> Result<Self, SettingsError> {
        let base = settings.secure_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| SettingsError::InvalidValue(format!("HTTP client: {e}")))?;
        debug!(base_url = %base, timeout_ms = settings.request_timeout_ms, "API client ready");
        Ok(Self {
            http,
            base,
            session,
        })
    }

    /// The validated API origin.
    pub fn base_url(&self) -> &SecureBaseUrl {
        &self.base
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Send and decode a JSON response body.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, call: Call<'_>) -> Result<T, ApiError> {
        let (resource, body) = self.send(call).await?;
        decode(&resource, &body)
    }

    /// Send and discard the response body.
    pub(crate) async fn execute(&self, call: Call<'_>) -> Result<(), ApiError> {
        let _ = self.send(call).await?;
        Ok(())
    }

    /// Returns the request path and the response body.
    async fn send(&self, call: Call<'_>) -> Result<(String, String), ApiError> {
        let url = self.url_for(call.path, &call.segments, &call.query)?;
        let resource = url.path().to_owned();

        let mut request = self.http.request(call.method.clone(), url.clone());
        let session_bearer;
        let token = match call.bearer {
            Bearer::Session => {
                session_bearer = self.session.bearer();
                session_bearer.as_ref()
            }
            Bearer::Explicit(t) => Some(t),
        };
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            let timed_out = e.is_timeout();
            warn!(method = %call.method, path = %resource, timed_out, "request failed: {e}");
            ApiError::transport(e.to_string(), timed_out)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ApiError::transport(format!("failed to read response body: {e}"), e.is_timeout())
        })?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            method = %call.method,
            path = %resource,
            status = status.as_u16(),
            elapsed_ms,
            "api request"
        );

        if status.is_success() {
            return Ok((resource, text));
        }

        let err = ApiError::from_status(status.as_u16(), text, call.scope, &resource);
        if matches!(err, ApiError::Authentication) && matches!(call.bearer, Bearer::Session) {
            self.session.reject();
        }
        warn!(
            method = %call.method,
            path = %resource,
            status = status.as_u16(),
            code = err.code(),
            "api request rejected"
        );
        Err(err)
    }

    fn url_for(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let invalid = |detail: String| {
            ApiError::transport(format!("invalid request URL for {path}: {detail}"), false)
        };
        let mut url = Url::parse(&self.base.endpoint(path)).map_err(|e| invalid(e.to_string()))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| invalid("base cannot carry path segments".into()))?
                .pop_if_empty()
                .extend(segments);
        }
        if !query.is_empty() {
            let _ = url.query_pairs_mut().extend_pairs(query);
        }
        if !is_secure_or_loopback(&url) {
            error!(url = %url, "refusing to send request over insecure transport");
            return Err(ApiError::InsecureTransport {
                url: url.to_string(),
            });
        }
        Ok(url)
    }
}

/// Decode a response body into the endpoint's declared shape.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_owned(),
        message: e.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
