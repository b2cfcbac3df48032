use anyhow::Result;
use tokio::sync::mpsc;

/// Identifier for one buffer handed to the output device
pub type PlaybackId = u64;

/// A decoded, device-ready audio buffer (mono float samples)
#[derive(Debug, Clone)]
pub struct PlaybackBuffer {
    /// Decoded samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl PlaybackBuffer {
    /// Buffer duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Speaker output device trait
///
/// Implementations wrap a platform output context (or a test double). The
/// device exposes a monotonic clock over its output timeline; buffers are
/// started at explicit offsets on that timeline.
#[async_trait::async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Acquire the device
    ///
    /// Returns a channel receiver that reports the id of each buffer whose
    /// playback finished naturally, in completion order.
    async fn start(&mut self) -> Result<mpsc::Receiver<PlaybackId>>;

    /// Current position of the device clock, in seconds
    fn now(&self) -> f64;

    /// Begin playback of a buffer at the given timeline offset
    ///
    /// Returns the id under which the buffer can later be cancelled.
    fn play(&mut self, buffer: PlaybackBuffer, start_at: f64) -> Result<PlaybackId>;

    /// Stop one scheduled or playing buffer immediately
    ///
    /// Cancelled buffers do not report natural completion. Cancelling an id
    /// that already finished is a no-op.
    fn cancel(&mut self, id: PlaybackId) -> Result<()>;

    /// Release the device
    async fn stop(&mut self) -> Result<()>;

    /// Get device name for logging
    fn name(&self) -> &str;
}
