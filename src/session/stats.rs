use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::SessionState;

/// Statistics about a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current lifecycle state
    pub state: SessionState,

    /// When the session was started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of encoded chunks sent to the remote endpoint
    pub chunks_sent: usize,

    /// Number of inbound audio chunks scheduled for playback
    pub chunks_played: usize,

    /// Number of completed transcript turns
    pub turns_count: usize,
}
