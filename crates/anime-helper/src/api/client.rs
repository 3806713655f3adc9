//! Resilient HTTP transport with retry and jittered exponential backoff.
//!
//! Every upstream call in the service goes through [`HttpClient`]. Transient
//! statuses (429 and the 5xx gateway family) and network-level failures are
//! retried up to three attempts; any other status is handed back to the
//! caller as a normal response.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Statuses treated as transient failures even though they are valid responses
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Total attempts per request, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Transport-level failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt exceeded its timeout
    #[error("Upstream timed out")]
    Timeout,

    /// Upstream kept answering with a transient status
    #[error("{status} upstream")]
    Status { status: u16 },

    /// Connection, TLS or body read failure
    #[error("Request failed: {0}")]
    Network(String),
}

/// Fully resolved request handed to a backend
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Buffered upstream response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Caller-supplied request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub json: Option<Value>,
    /// Overrides the policy timeout for this request
    pub timeout: Option<Duration>,
}

/// Something that can perform a single HTTP exchange.
///
/// The production implementation is [`ReqwestBackend`]; tests substitute
/// scripted backends.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpBackend`] over a shared reqwest client
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    pub fn new() -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(e.to_string())
    }
}

/// Retry schedule for upstream requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubled after each retry
    pub initial_backoff: Duration,
    /// Upper bound of the uniform random jitter added to each sleep
    pub max_jitter: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(700),
            max_jitter: Duration::from_millis(400),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no sleeping between attempts
    pub fn immediate() -> Self {
        Self {
            initial_backoff: Duration::ZERO,
            max_jitter: Duration::ZERO,
            ..Self::default()
        }
    }

    fn delay(&self, backoff: Duration) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

/// HTTP client with retry logic and a fixed identifying User-Agent
#[derive(Clone)]
pub struct HttpClient {
    backend: Arc<dyn HttpBackend>,
    user_agent: String,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Create a client over reqwest with the default retry policy
    pub fn new(user_agent: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::with_backend(
            Arc::new(ReqwestBackend::new()?),
            user_agent,
            RetryPolicy::default(),
        ))
    }

    pub fn with_backend(
        backend: Arc<dyn HttpBackend>,
        user_agent: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            user_agent: user_agent.into(),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Make a request with retry logic
    ///
    /// Transient statuses and transport failures are retried; after the last
    /// attempt the failure is returned. Other statuses, including 4xx, come
    /// back as `Ok`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: merge_headers(&self.user_agent, options.headers),
            body: options.json,
            timeout: options.timeout.unwrap_or(self.policy.timeout),
        };

        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 1;

        loop {
            debug!(method = method.as_str(), url = %url, attempt, "Making upstream request");

            let outcome = match self.backend.send(&request).await {
                Ok(response) if RETRY_STATUSES.contains(&response.status) => {
                    Err(TransportError::Status {
                        status: response.status,
                    })
                }
                other => other,
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay(backoff);
                    warn!(
                        url = %url,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Transient upstream failure, retrying"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(url = %url, attempts = attempt, error = %e, "Upstream request failed");
                    return Err(e);
                }
            }
        }
    }

    /// GET with query-string parameters
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<HttpResponse, TransportError> {
        let url = with_query(url, query)?;
        self.request(Method::Get, &url, RequestOptions::default()).await
    }

    /// POST a JSON body
    pub async fn post_json(
        &self,
        url: &str,
        body: Value,
        headers: Vec<(String, String)>,
    ) -> Result<HttpResponse, TransportError> {
        let options = RequestOptions {
            headers,
            json: Some(body),
            timeout: None,
        };
        self.request(Method::Post, url, options).await
    }
}

/// Identifying User-Agent first, then caller headers. A caller header with
/// the same name (case-insensitive) replaces the default.
fn merge_headers(user_agent: &str, caller: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut headers = vec![("User-Agent".to_string(), user_agent.to_string())];
    for (name, value) in caller {
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => headers.push((name, value)),
        }
    }
    headers
}

fn with_query(url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
    if query.is_empty() {
        return Ok(url.to_string());
    }
    reqwest::Url::parse_with_params(url, query)
        .map(String::from)
        .map_err(|e| TransportError::Network(format!("Invalid URL {}: {}", url, e)))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend shared by the crate's tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued outcomes in order and records every request.
    /// When the queue runs dry, the fallback outcome is returned.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        fallback: Result<HttpResponse, TransportError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: Err(TransportError::Network("script exhausted".to_string())),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn always(outcome: Result<HttpResponse, TransportError>) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: outcome,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpBackend for ScriptedBackend {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }

    /// Routes by URL substring; first matching route wins. Each route keeps
    /// its own script, falling back to its last outcome once exhausted.
    pub struct RoutedBackend {
        routes: Vec<(String, Mutex<VecDeque<Result<HttpResponse, TransportError>>>)>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RoutedBackend {
        pub fn new() -> Self {
            Self {
                routes: Vec::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn route(
            mut self,
            url_contains: &str,
            outcomes: Vec<Result<HttpResponse, TransportError>>,
        ) -> Self {
            self.routes
                .push((url_contains.to_string(), Mutex::new(outcomes.into())));
            self
        }

        pub fn calls_to(&self, url_contains: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.url.contains(url_contains))
                .count()
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpBackend for RoutedBackend {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            for (needle, script) in &self.routes {
                if request.url.contains(needle.as_str()) {
                    let mut script = script.lock().unwrap();
                    return if script.len() > 1 {
                        script.pop_front().unwrap()
                    } else {
                        script
                            .front()
                            .cloned()
                            .unwrap_or_else(|| Err(TransportError::Network("no outcome".into())))
                    };
                }
            }
            Err(TransportError::Network(format!("no route for {}", request.url)))
        }
    }

    pub fn ok_json(body: Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, body.to_string()))
    }

    pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(code, ""))
    }
}
