pub mod audio;
pub mod config;
pub mod playback;
pub mod session;
pub mod transcript;

pub use audio::{AudioFrame, CaptureConfig, CaptureDevice, EncodedChunk};
pub use config::Config;
pub use playback::{PlaybackBuffer, PlaybackDevice, PlaybackId, PlaybackScheduler};
pub use session::{
    LiveConnection, LiveEndpoint, LiveSession, LiveSessionConfig, ServerEvent, ServerEvents,
    ServerMessage, SessionState, SessionStats,
};
pub use transcript::{Role, TranscriptAccumulator, TranscriptTurn};
