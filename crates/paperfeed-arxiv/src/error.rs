//! Error types for the arXiv source and the normalizer

use paperfeed_core::HttpError;

/// The search API could not be queried or answered with something unusable.
///
/// Fatal for a result sequence: once yielded, the sequence ends.
#[derive(Debug)]
pub enum SourceError {
    /// Network failure or non-2xx response
    Http(HttpError),
    /// arXiv returned its error feed (bad query syntax, out-of-range paging)
    Api { message: String },
    /// Response body is not a readable Atom feed
    Parse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "arXiv request failed: {e}"),
            Self::Api { message } => write!(f, "arXiv API error: {message}"),
            Self::Parse(msg) => write!(f, "arXiv feed parse error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// A single feed entry could not be turned into an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    MalformedRecord { id: String, reason: String },
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord { id, reason } => write!(f, "malformed record {id}: {reason}"),
        }
    }
}

impl std::error::Error for NormalizeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api_error() {
        let err = SourceError::Api {
            message: "incorrect id format".to_string(),
        };
        assert_eq!(format!("{err}"), "arXiv API error: incorrect id format");
    }

    #[test]
    fn http_error_is_source() {
        let err = SourceError::from(HttpError::Status {
            status: 503,
            message: "busy".to_string(),
        });
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{err}").contains("HTTP 503"));
    }

    #[test]
    fn display_malformed_record() {
        let err = NormalizeError::MalformedRecord {
            id: "http://arxiv.org/abs/1".to_string(),
            reason: "bad published".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "malformed record http://arxiv.org/abs/1: bad published"
        );
    }
}
