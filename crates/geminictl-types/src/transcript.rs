use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::SystemTime;

/// A single Gemini CLI session file.
///
/// Unknown fields are captured in `extra` so a rewrite (projectHash update on
/// move) round-trips data this tool does not interpret.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub session_id: String,
    pub project_hash: String,
    pub start_time: String,
    pub last_updated: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,

    // Filesystem metadata attached by the reader, not part of the JSON.
    #[serde(skip)]
    pub file_path: PathBuf,
    #[serde(skip)]
    pub file_modified: Option<SystemTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub timestamp: String,
    /// "user" or "gemini"
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thoughts: Vec<Thought>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A chain-of-thought step attached to an assistant message.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Thought {
    pub subject: String,
    pub description: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TokenStats {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub cached: u64,
    #[serde(default)]
    pub thoughts: u64,
    #[serde(default)]
    pub tool: u64,
    #[serde(default)]
    pub total: u64,
}

impl Transcript {
    /// Last-activity timestamp for aggregation: the declared `lastUpdated`
    /// when it parses as RFC 3339, otherwise the file's modification time.
    pub fn last_update(&self) -> DateTime<Utc> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.last_updated) {
            return ts.with_timezone(&Utc);
        }
        self.file_modified
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
    }
}
