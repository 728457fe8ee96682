//! RestStore against an in-process fake of the REST service.
//!
//! The fake speaks the same wire format (JSON command array in, `{"result"}`
//! or `{"error"}` out) and enforces bearer tokens.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use paperfeed_core::SHARED_RUNTIME;
use paperfeed_kv::{KvStore, RestStore, SetOptions, StoreConfig};

const WRITE_TOKEN: &str = "write-token";
const READ_TOKEN: &str = "read-token";

#[derive(Default)]
struct FakeKv {
    strings: HashMap<String, String>,
    zsets: HashMap<String, HashMap<String, f64>>,
    commands: Vec<Vec<String>>,
    /// Canned raw reply to PING instead of `{"result":"PONG"}`
    ping_reply: Option<(StatusCode, &'static str)>,
}

impl FakeKv {
    fn exec(&mut self, cmd: &[String]) -> Result<Value, String> {
        let name = cmd.first().map(|s| s.to_ascii_uppercase()).unwrap_or_default();
        let args = cmd.get(1..).unwrap_or_default();
        match (name.as_str(), args) {
            ("PING", _) => Ok(json!("PONG")),
            ("SET", [key, value, rest @ ..]) => {
                if !(rest.is_empty() || (rest.len() == 2 && rest[0] == "EX")) {
                    return Err("ERR syntax error".to_string());
                }
                self.strings.insert(key.clone(), value.clone());
                Ok(json!("OK"))
            }
            ("GET", [key]) => Ok(self.strings.get(key).map_or(Value::Null, |v| json!(v))),
            ("ZADD", [key, ..]) if self.strings.contains_key(key) => {
                Err("WRONGTYPE Operation against a key holding the wrong kind of value".to_string())
            }
            ("ZADD", [key, flag, pairs @ ..]) if flag == "CH" && pairs.len() % 2 == 0 => {
                let set = self.zsets.entry(key.clone()).or_default();
                let mut changed = 0;
                for pair in pairs.chunks(2) {
                    let score: f64 = pair[0].parse().map_err(|_| "ERR not a float".to_string())?;
                    if set.insert(pair[1].clone(), score) != Some(score) {
                        changed += 1;
                    }
                }
                Ok(json!(changed))
            }
            ("ZREVRANGE", [key, start, stop]) => {
                let mut members: Vec<(&String, &f64)> =
                    self.zsets.get(key).map(|s| s.iter().collect()).unwrap_or_default();
                members.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| b.0.cmp(a.0)));
                let len = members.len() as i64;
                let norm = |i: i64| if i < 0 { len + i } else { i };
                let (start, stop) = (
                    norm(start.parse().map_err(|_| "ERR index".to_string())?).max(0),
                    norm(stop.parse().map_err(|_| "ERR index".to_string())?).min(len - 1),
                );
                if start > stop {
                    return Ok(json!([]));
                }
                Ok(json!(
                    members[start as usize..=stop as usize]
                        .iter()
                        .map(|(m, _)| m.as_str())
                        .collect::<Vec<_>>()
                ))
            }
            _ => Err(format!("ERR unknown command '{name}'")),
        }
    }
}

type Shared = Arc<Mutex<FakeKv>>;

async fn handle(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(cmd): Json<Vec<String>>,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let read_only = matches!(
        cmd.first().map(String::as_str),
        Some("GET" | "ZREVRANGE" | "PING")
    );
    let allowed = auth == format!("Bearer {WRITE_TOKEN}")
        || (read_only && auth == format!("Bearer {READ_TOKEN}"));
    if !allowed {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response();
    }

    let mut kv = state.lock().unwrap();
    kv.commands.push(cmd.clone());
    if let (Some("PING"), Some(reply)) = (cmd.first().map(String::as_str), kv.ping_reply) {
        return reply.into_response();
    }
    match kv.exec(&cmd) {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))).into_response(),
        Err(error) => (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response(),
    }
}

/// Start the fake on the shared runtime; returns its base URL and state.
fn start_fake() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/", post(handle))
        .with_state(state.clone());
    let listener = SHARED_RUNTIME
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();
    SHARED_RUNTIME.spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), state)
}

fn store(url: &str) -> RestStore {
    RestStore::new(StoreConfig::new(url, WRITE_TOKEN).with_read_only_token(READ_TOKEN))
}

#[test]
fn probe_auth_accepts_valid_token() {
    let (url, _) = start_fake();
    assert!(store(&url).probe_auth().unwrap());
}

#[test]
fn probe_auth_false_on_401() {
    let (url, _) = start_fake();
    let bad = RestStore::new(StoreConfig::new(&url, "wrong"));
    assert!(!bad.probe_auth().unwrap());
}

#[test]
fn probe_auth_unreachable_is_unavailable() {
    // Port 9 (discard) on localhost is closed in test environments.
    let dead = RestStore::new(StoreConfig::new("http://127.0.0.1:9/", WRITE_TOKEN));
    assert!(dead.probe_auth().unwrap_err().is_unavailable());
}

#[test]
fn auth_check_tolerates_ping_server_error() {
    let (url, state) = start_fake();
    state.lock().unwrap().ping_reply =
        Some((StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"ERR busy"}"#));
    assert!(store(&url).probe_auth().unwrap());
}

#[test]
fn auth_check_tolerates_malformed_ping_reply() {
    let (url, state) = start_fake();
    state.lock().unwrap().ping_reply = Some((StatusCode::OK, "<html>gateway</html>"));
    assert!(store(&url).probe_auth().unwrap());
}

#[test]
fn set_then_get() {
    let (url, _) = start_fake();
    let store = store(&url);
    assert!(store.set("paper:a", r#"{"id":"a"}"#, SetOptions::default()).unwrap());
    assert_eq!(store.get("paper:a").unwrap().as_deref(), Some(r#"{"id":"a"}"#));
}

#[test]
fn get_absent_key_is_none() {
    let (url, _) = start_fake();
    assert_eq!(store(&url).get("paper:missing").unwrap(), None);
}

#[test]
fn set_with_ttl_sends_ex() {
    let (url, state) = start_fake();
    let opts = SetOptions {
        ttl_seconds: Some(60),
    };
    assert!(store(&url).set("k", "v", opts).unwrap());
    let kv = state.lock().unwrap();
    assert_eq!(kv.commands.last().unwrap(), &vec!["SET", "k", "v", "EX", "60"]);
}

#[test]
fn reads_use_read_only_token() {
    let (url, _) = start_fake();
    // Write token wrong, read token right: reads succeed, writes fail with 401.
    let store = RestStore::new(StoreConfig::new(&url, "wrong").with_read_only_token(READ_TOKEN));
    assert_eq!(store.get("k").unwrap(), None);
    let err = store.set("k", "v", SetOptions::default()).unwrap_err();
    assert!(err.is_unauthorized(), "{err}");
}

#[test]
fn zadd_counts_added_and_updated() {
    let (url, _) = start_fake();
    let store = store(&url);
    assert_eq!(store.zadd("climate_papers", &[("a", 1.0), ("b", 2.0)]).unwrap(), 2);
    assert_eq!(store.zadd("climate_papers", &[("a", 1.0)]).unwrap(), 0);
    assert_eq!(store.zadd("climate_papers", &[("a", 5.0)]).unwrap(), 1);
    assert_eq!(
        store.zrevrange("climate_papers", 0, -1).unwrap(),
        vec!["a", "b"]
    );
}

#[test]
fn zadd_empty_sends_nothing() {
    let (url, state) = start_fake();
    assert_eq!(store(&url).zadd("climate_papers", &[]).unwrap(), 0);
    assert!(state.lock().unwrap().commands.is_empty());
}

#[test]
fn zrevrange_orders_by_score_descending() {
    let (url, _) = start_fake();
    let store = store(&url);
    store
        .zadd("z", &[("old", 100.0), ("new", 300.0), ("mid", 200.0)])
        .unwrap();
    assert_eq!(store.zrevrange("z", 0, 1).unwrap(), vec!["new", "mid"]);
    assert_eq!(store.zrevrange("z", 0, -1).unwrap(), vec!["new", "mid", "old"]);
    assert!(store.zrevrange("absent", 0, -1).unwrap().is_empty());
}

#[test]
fn server_error_is_write_error() {
    let (url, _) = start_fake();
    let store = store(&url);
    assert!(store.set("k", "v", SetOptions::default()).unwrap());
    let err = store.zadd("k", &[("m", 1.0)]).unwrap_err();
    match err {
        paperfeed_kv::StoreError::Write { op, message } => {
            assert_eq!(op, "ZADD");
            assert!(message.contains("WRONGTYPE"), "{message}");
        }
        other => panic!("expected write error, got {other}"),
    }
}
