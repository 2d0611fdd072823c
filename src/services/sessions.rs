//! Player game session lookups.
//!
//! Mock data: every id resolves except the sentinels `000` and `404`, which
//! exist so callers can exercise the not-found path.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Session ids that always miss.
pub const MISSING_SESSION_IDS: [&str; 2] = ["000", "404"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub player_name: String,
    pub current_scene: String,
    pub last_updated_at: String,
}

pub fn session_by_id(id: &str) -> Option<GameSession> {
    tracing::debug!(session_id = %id, "Fetching game session");

    if MISSING_SESSION_IDS.contains(&id) {
        tracing::warn!(session_id = %id, "Session not found");
        return None;
    }

    let session = GameSession {
        id: id.to_string(),
        player_name: "Astra".to_string(),
        current_scene: "TheCrossroads".to_string(),
        last_updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    tracing::debug!(session_id = %id, scene = %session.current_scene, "Session found");
    Some(session)
}
