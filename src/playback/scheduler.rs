// Gapless playback scheduling
//
// Inbound audio chunks arrive asynchronously and decode with varying latency,
// but must play back-to-back with no gap and no overlap. The scheduler keeps
// a single monotonic cursor on the output timeline: each buffer starts at
// max(cursor, device clock) and the cursor advances by exactly that buffer's
// duration at scheduling time. Chunks are assumed to arrive in the order the
// remote endpoint produced them; nothing here reorders.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, warn};

use super::device::{PlaybackBuffer, PlaybackDevice, PlaybackId};

/// Schedules decoded buffers for sequential playback and tracks every buffer
/// currently queued or playing so a barge-in can cancel them all at once.
pub struct PlaybackScheduler {
    /// Output-timeline offset at which the next buffer should begin
    cursor: f64,
    /// Buffers scheduled but not yet finished (id → scheduled start time)
    active: HashMap<PlaybackId, f64>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self {
            cursor: 0.0,
            active: HashMap::new(),
        }
    }

    /// Schedule a buffer for gapless playback after everything already queued
    pub fn schedule(
        &mut self,
        device: &mut dyn PlaybackDevice,
        buffer: PlaybackBuffer,
    ) -> Result<PlaybackId> {
        let start_at = self.cursor.max(device.now());
        let duration = buffer.duration_secs();

        let id = device.play(buffer, start_at)?;
        self.active.insert(id, start_at);
        self.cursor = start_at + duration;

        debug!(
            "Scheduled buffer {} at {:.3}s ({:.3}s), cursor now {:.3}s",
            id, start_at, duration, self.cursor
        );

        Ok(id)
    }

    /// Handle natural completion of one buffer
    ///
    /// The cursor was already advanced at scheduling time, so completion only
    /// drops the buffer from the active set.
    pub fn on_complete(&mut self, id: PlaybackId) {
        if self.active.remove(&id).is_none() {
            debug!("Completion for unknown buffer {} (already cancelled?)", id);
        }
    }

    /// Barge-in: stop every queued or playing buffer and rewind the cursor
    ///
    /// The cursor resets to zero rather than the device's current time, so
    /// the first post-interruption chunk schedules as soon as possible.
    pub fn interrupt(&mut self, device: &mut dyn PlaybackDevice) {
        let pending = self.active.len();

        for (&id, _) in self.active.iter() {
            if let Err(e) = device.cancel(id) {
                warn!("Failed to cancel buffer {}: {}", id, e);
            }
        }
        self.active.clear();
        self.cursor = 0.0;

        if pending > 0 {
            debug!("Interrupted playback, cancelled {} buffers", pending);
        }
    }

    /// Current cursor position in seconds
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Number of buffers scheduled but not yet finished
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}
