//! Store error taxonomy

use crate::reply::ReplyError;

/// Failure talking to the key/value service.
///
/// `Unavailable` means persistence as a whole is off (no credentials, service
/// unreachable); `Read` and `Write` are scoped to one operation.
#[derive(Debug)]
pub enum StoreError {
    Unavailable(String),
    Read { op: &'static str, message: String },
    Write { op: &'static str, message: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            Self::Read { op, message } => write!(f, "store read failed ({op}): {message}"),
            Self::Write { op, message } => write!(f, "store write failed ({op}): {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn read(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Read {
            op,
            message: err.to_string(),
        }
    }

    pub fn write(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Write {
            op,
            message: err.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The service rejected the token (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Read { message, .. } | Self::Write { message, .. }
                if message.starts_with(ReplyError::UNAUTHORIZED_PREFIX)
        )
    }
}
