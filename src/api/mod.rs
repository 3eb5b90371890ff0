//! Blocking client for the FareFlow REST API.
//!
//! One `ApiClient` owns the HTTP agent and the logged-in [`Session`]; every
//! backend call goes through it. Resource groups live in their own files as
//! further `impl ApiClient` blocks.

mod auth;
mod categories;
mod charges;
mod drivers;
mod expenses;
mod reports;

pub use categories::CategoryKind;
pub use reports::AggregateKind;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ureq::{Agent, RequestBuilder};

use crate::config::{ApiSettings, Session};
use crate::error::{FareflowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

pub struct ApiClient {
    agent: Agent,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Option<Session>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        ApiClient {
            agent,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Bearer token for an authenticated call, refusing expired sessions
    /// before anything goes over the wire.
    fn bearer(&self) -> Result<String> {
        let session = self.session.as_ref().ok_or(FareflowError::NotLoggedIn)?;
        if session.is_expired() {
            warn!("session token expired, refusing request");
            return Err(FareflowError::SessionExpired);
        }
        Ok(format!("Bearer {}", session.token))
    }

    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let auth = self.bearer()?;
        let body = self.execute(Method::Get, path, query, None, Some(auth))?;
        decode(path, &body)
    }

    pub(crate) fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let auth = self.bearer()?;
        let body = self.execute(Method::Post, path, &[], Some(encode(body)?), Some(auth))?;
        decode(path, &body)
    }

    pub(crate) fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let auth = self.bearer()?;
        let body = self.execute(Method::Put, path, &[], Some(encode(body)?), Some(auth))?;
        decode(path, &body)
    }

    /// PUT with no request body whose response body is ignored
    pub(crate) fn put_empty(&self, path: &str) -> Result<()> {
        let auth = self.bearer()?;
        self.execute(Method::Put, path, &[], None, Some(auth))?;
        Ok(())
    }

    /// POST without a bearer token (login)
    pub(crate) fn post_anonymous<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = self.execute(Method::Post, path, &[], Some(encode(body)?), None)?;
        decode(path, &body)
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
        auth: Option<String>,
    ) -> Result<String> {
        let url = self.url(path);
        let started = Instant::now();
        debug!(method = method.as_str(), %url, "sending request");

        let result = match method {
            Method::Get => prepare(self.agent.get(url.as_str()), query, auth.as_deref()).call(),
            Method::Post | Method::Put => {
                let req = if method == Method::Post {
                    self.agent.post(url.as_str())
                } else {
                    self.agent.put(url.as_str())
                };
                let req = prepare(req, query, auth.as_deref());
                match body {
                    Some(json) => req.header("Content-Type", "application/json").send(json.as_bytes()),
                    None => req.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| FareflowError::Network {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FareflowError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            method = method.as_str(),
            %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        if (200..300).contains(&status) {
            Ok(text)
        } else {
            warn!(method = method.as_str(), %url, status, "request failed");
            Err(status_error(status, &text))
        }
    }
}

fn prepare<B>(
    mut req: RequestBuilder<B>,
    query: &[(&str, String)],
    auth: Option<&str>,
) -> RequestBuilder<B> {
    for (key, value) in query {
        req = req.query(*key, value);
    }
    req = req.header("Accept", "application/json");
    if let Some(auth) = auth {
        req = req.header("Authorization", auth);
    }
    req
}

fn encode<B: Serialize>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(|e| FareflowError::Validation(e.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| FareflowError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Map a non-2xx response onto the error taxonomy, keeping the server's
/// own message where it sent one.
pub(crate) fn status_error(status: u16, body: &str) -> FareflowError {
    let message = server_message(body);
    match status {
        401 => FareflowError::Unauthorized,
        403 => FareflowError::Forbidden(
            message.unwrap_or_else(|| "you do not have access to this resource".to_string()),
        ),
        _ => FareflowError::Api {
            status,
            message: message.unwrap_or_else(|| "no response body".to_string()),
        },
    }
}

fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }
    Some(trimmed.to_string())
}
