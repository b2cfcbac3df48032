use serde::{Deserialize, Serialize};

/// Configuration for a live voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSessionConfig {
    /// Unique session identifier (e.g., "live-2026-08-24-demo")
    pub session_id: String,

    /// Which synthesized voice the remote endpoint should speak with
    pub voice: String,

    /// Persona / behavior text sent to the remote endpoint at connect time
    pub system_instruction: String,

    /// Whether to request transcription of the user's speech
    pub transcribe_input: bool,

    /// Whether to request transcription of the model's spoken reply
    pub transcribe_output: bool,

    /// Capture sample rate in Hz (wire format is PCM at this rate)
    pub input_sample_rate: u32,

    /// Playback sample rate in Hz for inbound audio
    pub output_sample_rate: u32,

    /// Samples per captured frame
    pub frame_samples: usize,
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            voice: "Puck".to_string(),
            system_instruction: "You are a helpful and charismatic AI companion. \
                                 Keep your answers brief and conversational."
                .to_string(),
            transcribe_input: true,
            transcribe_output: true,
            input_sample_rate: 16000,  // Outbound wire format
            output_sample_rate: 24000, // Inbound wire format
            frame_samples: 4096,
        }
    }
}
