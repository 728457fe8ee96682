//! Command arrays as sent in the POST body

use crate::store::SetOptions;

pub fn ping() -> Vec<String> {
    vec!["PING".to_string()]
}

/// `SET key value [EX ttl]`
pub fn set(key: &str, value: &str, opts: &SetOptions) -> Vec<String> {
    let mut cmd = vec!["SET".to_string(), key.to_string(), value.to_string()];
    if let Some(ttl) = opts.ttl_seconds {
        cmd.push("EX".to_string());
        cmd.push(ttl.to_string());
    }
    cmd
}

pub fn get(key: &str) -> Vec<String> {
    vec!["GET".to_string(), key.to_string()]
}

/// `ZADD key CH score member [score member ...]`
///
/// `CH` makes the reply count updated scores as well as new members.
pub fn zadd(key: &str, members: &[(&str, f64)]) -> Vec<String> {
    let mut cmd = Vec::with_capacity(3 + members.len() * 2);
    cmd.push("ZADD".to_string());
    cmd.push(key.to_string());
    cmd.push("CH".to_string());
    for (member, score) in members {
        cmd.push(score.to_string());
        cmd.push((*member).to_string());
    }
    cmd
}

pub fn zrevrange(key: &str, start: i64, stop: i64) -> Vec<String> {
    vec![
        "ZREVRANGE".to_string(),
        key.to_string(),
        start.to_string(),
        stop.to_string(),
    ]
}
