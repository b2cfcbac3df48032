//! Transcript assembly
//!
//! Recognition text arrives as partial fragments for both sides of the
//! conversation. Fragments accumulate per speaker until the remote endpoint
//! signals a turn boundary, at which point the accumulated text is reified
//! into ordered `TranscriptTurn` records and the accumulators reset.

use serde::{Deserialize, Serialize};

/// Which side of the conversation a turn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user's recognized speech
    User,
    /// The model's spoken reply
    Model,
}

/// One complete turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub text: String,
}

/// Accumulates transcript fragments into per-turn records
///
/// Fragments concatenate in arrival order with no deduplication. Flushing is
/// driven solely by the remote turn-complete signal; there is no timeout or
/// size-based auto-flush.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    input: String,
    output: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment of the user's recognized speech
    pub fn append_input(&mut self, text: &str) {
        self.input.push_str(text);
    }

    /// Append a fragment of the model's spoken reply
    pub fn append_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Reify the accumulated text into turn records and reset
    ///
    /// Emits the user turn first if non-empty, then the model turn if
    /// non-empty. An empty flush emits nothing.
    pub fn flush(&mut self) -> Vec<TranscriptTurn> {
        let mut turns = Vec::new();

        if !self.input.is_empty() {
            turns.push(TranscriptTurn {
                role: Role::User,
                text: std::mem::take(&mut self.input),
            });
        }

        if !self.output.is_empty() {
            turns.push(TranscriptTurn {
                role: Role::Model,
                text: std::mem::take(&mut self.output),
            });
        }

        turns
    }

    /// Whether both accumulators are empty
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}
