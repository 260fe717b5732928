//! Status snapshots — the normalized result of one successful refresh.
//!
//! A snapshot replaces its predecessor wholesale; there is no merging.
//! Missing optional leaves normalize to None/empty. Only a malformed
//! top-level body is an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{BoardError, BoardResult},
    render::PLACEHOLDER,
};

/// Sample-name lists are capped at this many entries.
pub const SAMPLE_NAME_CAP: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub online:         bool,
    pub players_online: Option<i64>,
    pub players_max:    Option<i64>,
    pub sample_names:   Vec<String>,
    pub motd:           String,
    pub address:        Option<String>,
    pub version:        String,
    pub protocol:       Option<String>,
    pub ping_ms:        Option<i64>,
    /// Poll time. The service API exposes no server-side timestamp,
    /// so this is when *we* asked, not when the server last changed.
    pub fetched_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub stars:          i64,
    pub forks:          i64,
    pub watchers:       i64,
    pub language:       Option<String>,
    pub last_pushed_at: Option<DateTime<Utc>>,
    pub html_url:       String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusSnapshot {
    Service(ServiceStatus),
    Repository(RepositoryStatus),
}

impl ServiceStatus {
    /// Normalize a service-status body (api.mcsrvstat.us shape).
    pub fn from_json(body: &Value, fetched_at: DateTime<Utc>) -> BoardResult<Self> {
        if !body.is_object() {
            return Err(BoardError::Malformed(
                "expected a JSON object at the top level".to_string(),
            ));
        }

        let players = body.get("players");
        let players_online = players.and_then(|p| p.get("online")).and_then(Value::as_i64);
        let players_max = players.and_then(|p| p.get("max")).and_then(Value::as_i64);
        let sample_names: Vec<String> = players
            .and_then(|p| p.get("sample"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                    .take(SAMPLE_NAME_CAP)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // motd.clean is an array of lines on v2, a bare string on
        // older proxies.
        let motd = match body.pointer("/motd/clean") {
            Some(Value::Array(lines)) => lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            Some(Value::String(line)) => line.clone(),
            _ => String::new(),
        };

        let ip = body.get("ip").and_then(Value::as_str);
        let port = body.get("port").and_then(Value::as_i64);
        let address = ip.map(|ip| match port {
            Some(port) => format!("{ip}:{port}"),
            None => ip.to_string(),
        });

        let version = body
            .get("version")
            .and_then(Value::as_str)
            .or_else(|| body.get("software").and_then(Value::as_str))
            .unwrap_or(PLACEHOLDER)
            .to_string();

        let protocol = match body.get("protocol") {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        let ping_ms = body
            .pointer("/debug/ping")
            .and_then(Value::as_f64)
            .map(|p| p.round() as i64)
            .or_else(|| body.get("latency").and_then(Value::as_i64));

        Ok(Self {
            online: body.get("online").and_then(Value::as_bool).unwrap_or(false),
            players_online,
            players_max,
            sample_names,
            motd,
            address,
            version,
            protocol,
            ping_ms,
            fetched_at,
        })
    }
}

impl RepositoryStatus {
    /// Normalize a repository body (GitHub v3 shape).
    pub fn from_json(body: &Value) -> BoardResult<Self> {
        if !body.is_object() {
            return Err(BoardError::Malformed(
                "expected a JSON object at the top level".to_string(),
            ));
        }

        let watchers = body
            .get("watchers_count")
            .and_then(Value::as_i64)
            .or_else(|| body.get("subscribers_count").and_then(Value::as_i64))
            .unwrap_or(0);

        // Most-specific activity timestamp wins.
        let last_pushed_at = ["pushed_at", "updated_at", "created_at"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .and_then(|raw| raw.parse::<DateTime<Utc>>().ok());

        Ok(Self {
            stars: body
                .get("stargazers_count")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            forks: body.get("forks_count").and_then(Value::as_i64).unwrap_or(0),
            watchers,
            language: body
                .get("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            last_pushed_at,
            html_url: body
                .get("html_url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}
