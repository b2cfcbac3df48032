//! Gapless playback of inbound audio
//!
//! This module provides the scheduling half of the live session's output
//! path:
//! - A `PlaybackDevice` trait over the platform output context
//! - A `PlaybackScheduler` that keeps consecutive buffers back-to-back on
//!   the output timeline and cancels them en masse on barge-in

mod device;
mod scheduler;

pub use device::{PlaybackBuffer, PlaybackDevice, PlaybackId};
pub use scheduler::PlaybackScheduler;
