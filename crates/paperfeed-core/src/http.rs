//! Blocking HTTP requests over a shared async client.
//!
//! Requests run on a small shared tokio runtime via `block_on`, so callers
//! (the arXiv pager, the KV store client) stay synchronous.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Timeouts applied to the shared client
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install HTTP settings. Only the first call wins, and only if it happens
/// before the shared client is first used.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring {config:?}");
    }
}

fn http_config() -> HttpConfig {
    *HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Error from a single HTTP exchange
#[derive(Debug)]
pub enum HttpError {
    /// Server answered with a non-success status
    Status { status: u16, message: String },
    /// Connect, TLS, timeout or body read failure
    Transport { message: String },
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Transport { message } => write!(f, "HTTP error: {message}"),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Create transport error from reqwest error
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                message: e.without_url().to_string(),
            },
            None => Self::Transport {
                message: e.without_url().to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`HttpError::Status`], keeping a body excerpt.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(HttpError::Status {
            status: self.status,
            message: excerpt(&self.body, 200),
        })
    }
}

fn excerpt(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let config = http_config();
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(concat!("paperfeed/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("paperfeed-http")
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Send a request and read the whole body, blocking the calling thread.
///
/// Non-2xx statuses are returned as a normal [`Response`]; only transport
/// failures become errors. Use [`Response::error_for_status`] where any
/// non-success is fatal.
pub fn send(request: reqwest::RequestBuilder) -> Result<Response, HttpError> {
    SHARED_RUNTIME.handle().block_on(async {
        let resp = request.send().await.map_err(HttpError::from_reqwest)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(HttpError::from_reqwest)?;
        Ok(Response { status, body })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        Response {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn success_range() {
        assert!(response(200, "").is_success());
        assert!(response(204, "").is_success());
        assert!(!response(301, "").is_success());
        assert!(!response(401, "").is_success());
    }

    #[test]
    fn error_for_status_keeps_body_excerpt() {
        let err = response(503, "  service down  ").error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(format!("{err}"), "HTTP 503: service down");
    }

    #[test]
    fn error_for_status_passes_success() {
        let ok = response(200, "fine").error_for_status().unwrap();
        assert_eq!(ok.body, "fine");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("ééééé", 3), "ééé...");
        assert_eq!(excerpt("abc", 3), "abc");
    }

    #[test]
    fn display_transport() {
        let err = HttpError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: connection refused");
        assert_eq!(err.status(), None);
    }
}
