//! Structured logging for the dashboard core.
//!
//! One JSON object per line on stdout. Every record carries a timestamp, a
//! monotonic sequence number, a level, a domain, and an event name, with the
//! remaining fields under `data`. Levels filter via `LOG_LEVEL`, domains via
//! `LOG_DOMAINS` (comma-separated or "all"), and `LOG_JSON=0` switches to a
//! terse plain format for interactive shells.
//!
//! Credentials never reach a log line: any field whose key mentions an api
//! key, token, authorization header, or credential is redacted before
//! emission.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Auth,       // Token exchange
    Catalog,    // Project/dataset/space/deployment/job listings
    Dataset,    // Three-step dataset loads, table parsing
    Deployment, // Deployment + asset resolution
    Scoring,    // Prediction requests and parsing
    Jobs,       // Job-run triggers
    Session,    // Selections, form transitions
    System,     // Startup, configuration
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Auth => "auth",
            Domain::Catalog => "catalog",
            Domain::Dataset => "dataset",
            Domain::Deployment => "deployment",
            Domain::Scoring => "scoring",
            Domain::Jobs => "jobs",
            Domain::Session => "session",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Sequence counter and redaction
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

const SECRET_KEY_HINTS: [&str; 5] = ["apikey", "api_key", "authorization", "token", "credential"];

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted: Vec<String> = fields
        .keys()
        .filter(|key| {
            let lower = key.to_ascii_lowercase();
            SECRET_KEY_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .cloned()
        .collect();
    for key in redacted {
        fields.insert(key, Value::String("[REDACTED]".to_string()));
    }
    fields
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain, event, fields);
}

fn emit_record(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let mut data = sanitize_fields(fields);
    let msg = data
        .remove("msg")
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_default();

    let plain = matches!(std::env::var("LOG_JSON").as_deref(), Ok("0") | Ok("false"));
    if plain {
        println!(
            "{} {:5} [{}] {} {}",
            ts_now(),
            level.as_str().to_uppercase(),
            domain.as_str(),
            event,
            msg
        );
        return;
    }

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    if !msg.is_empty() {
        entry.insert("msg".to_string(), json!(msg));
    }
    entry.insert("data".to_string(), Value::Object(data));
    println!("{}", Value::Object(entry));
}

// =============================================================================
// Domain-specific helpers
// =============================================================================

/// One line per remote round trip.
pub fn log_http(domain: Domain, method: &str, path: &str, status: u16, elapsed_ms: f64) {
    let level = if status >= 400 { Level::Warn } else { Level::Debug };
    log(
        level,
        domain,
        "http",
        obj(&[
            ("method", v_str(method)),
            ("path", v_str(path)),
            ("status", json!(status)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_sanitize_redacts_secret_keys() {
        let fields = obj(&[
            ("apikey", v_str("sk-123")),
            ("Authorization", v_str("Bearer abc")),
            ("access_token", v_str("tok")),
            ("project_id", v_str("p-1")),
        ]);
        let clean = sanitize_fields(fields);
        assert_eq!(clean.get("apikey").unwrap(), "[REDACTED]");
        assert_eq!(clean.get("Authorization").unwrap(), "[REDACTED]");
        assert_eq!(clean.get("access_token").unwrap(), "[REDACTED]");
        assert_eq!(clean.get("project_id").unwrap(), "p-1");
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }
}
