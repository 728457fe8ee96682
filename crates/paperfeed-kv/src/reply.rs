//! Strict parsing of `{"result": T}` reply envelopes

use paperfeed_core::Response;
use serde::de::DeserializeOwned;

/// Why a reply could not be turned into the expected result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// Non-2xx status; message from the `error` field when present
    Status { status: u16, message: String },
    /// 2xx with an `{"error": ...}` body
    Server(String),
    /// Body is not an envelope, or `result` has the wrong shape
    Malformed(String),
}

impl ReplyError {
    pub(crate) const UNAUTHORIZED_PREFIX: &'static str = "HTTP 401";
}

impl std::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Server(msg) => write!(f, "server error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed reply: {msg}"),
        }
    }
}

impl std::error::Error for ReplyError {}

/// Decode a full HTTP response into `T`.
pub fn decode<T: DeserializeOwned>(resp: &Response) -> Result<T, ReplyError> {
    if !resp.is_success() {
        let message = match parse_result::<serde_json::Value>(&resp.body) {
            Err(ReplyError::Server(msg)) => msg,
            _ => resp.body.trim().to_string(),
        };
        return Err(ReplyError::Status {
            status: resp.status,
            message,
        });
    }
    parse_result(&resp.body)
}

/// Parse an envelope body: `result` must be present and match `T`.
pub fn parse_result<T: DeserializeOwned>(body: &str) -> Result<T, ReplyError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ReplyError::Malformed(e.to_string()))?;
    let serde_json::Value::Object(mut map) = value else {
        return Err(ReplyError::Malformed("expected a JSON object".to_string()));
    };
    if let Some(err) = map.remove("error") {
        let msg = match err {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(ReplyError::Server(msg));
    }
    let result = map
        .remove("result")
        .ok_or_else(|| ReplyError::Malformed("missing `result` field".to_string()))?;
    serde_json::from_value(result)
        .map_err(|e| ReplyError::Malformed(format!("unexpected `result`: {e}")))
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
    fn string_result() {
        let ok: String = parse_result(r#"{"result":"OK"}"#).unwrap();
        assert_eq!(ok, "OK");
    }

    #[test]
    fn null_result_is_none() {
        let v: Option<String> = parse_result(r#"{"result":null}"#).unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn missing_result_is_malformed() {
        let err = parse_result::<Option<String>>("{}").unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = parse_result::<u64>(r#"{"result":"three"}"#).unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
        let err = parse_result::<Vec<String>>(r#"{"result":[1,2]}"#).unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_result::<String>("<html>").unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
        let err = parse_result::<String>("[1]").unwrap_err();
        assert!(matches!(err, ReplyError::Malformed(_)));
    }

    #[test]
    fn error_field() {
        let err = parse_result::<String>(r#"{"error":"WRONGTYPE Operation"}"#).unwrap_err();
        assert_eq!(err, ReplyError::Server("WRONGTYPE Operation".to_string()));
    }

    #[test]
    fn decode_status_uses_error_field() {
        let err = decode::<String>(&response(400, r#"{"error":"ERR syntax error"}"#)).unwrap_err();
        assert_eq!(
            err,
            ReplyError::Status {
                status: 400,
                message: "ERR syntax error".to_string()
            }
        );
    }

    #[test]
    fn decode_401_display_prefix() {
        let err = decode::<String>(&response(401, "Unauthorized")).unwrap_err();
        assert!(format!("{err}").starts_with(ReplyError::UNAUTHORIZED_PREFIX));
    }

    #[test]
    fn decode_success() {
        let members: Vec<String> = decode(&response(200, r#"{"result":["c","b"]}"#)).unwrap();
        assert_eq!(members, vec!["c", "b"]);
    }
}
