// ── Recorded sessions ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::{MacAddress, SessionId};

/// A recorded data-capture session. Sessions outlive pairing, so
/// `devices` may name MACs the registry no longer knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub devices: Vec<MacAddress>,
}

/// Payload produced by downloading a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExport {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl SessionExport {
    /// Build an export named after the session, with path-hostile
    /// characters replaced.
    pub fn for_session(session: &Session, bytes: Vec<u8>) -> Self {
        let stem: String = session
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = if stem.is_empty() { session.id.to_string() } else { stem };
        Self {
            filename: format!("{stem}.csv"),
            bytes,
        }
    }
}
