//! Live session management
//!
//! This module provides the `LiveSession` abstraction that manages:
//! - Microphone capture and PCM wire encoding
//! - One duplex connection to a remote conversational endpoint
//! - Gapless playback of the endpoint's reply audio, with barge-in
//! - Transcript turn assembly
//! - Session lifecycle, statistics, and deterministic teardown

mod config;
mod endpoint;
mod messages;
mod session;
mod stats;

pub use config::LiveSessionConfig;
pub use endpoint::{LiveConnection, LiveEndpoint, ServerEvent, ServerEvents};
pub use messages::ServerMessage;
pub use session::{LiveSession, SessionState};
pub use stats::SessionStats;
