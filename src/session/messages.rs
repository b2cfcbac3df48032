use serde::{Deserialize, Serialize};

/// One inbound message from the remote endpoint
///
/// Every field is optional and independently present: a single message may
/// carry a transcript fragment alone, or an audio chunk together with a
/// turn-complete flag. The session dispatches the facets in a fixed order
/// (see `LiveSession::handle_message`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerMessage {
    /// Fragment of the user's recognized speech
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_transcription: Option<String>,

    /// Fragment of the model's spoken reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_transcription: Option<String>,

    /// The current turn is complete; accumulated transcript text should be
    /// reified into turn records
    pub turn_complete: bool,

    /// Base64-encoded PCM audio (mono, 24000 Hz)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    /// The user barged in; all queued playback should be cancelled
    pub interrupted: bool,
}
