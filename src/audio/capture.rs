use anyhow::Result;
use tokio::sync::mpsc;

/// One captured block of raw audio (mono float samples in [-1, 1])
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw samples as produced by the input device
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioFrame {
    /// Frame duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Configuration for the capture pipeline
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Input sample rate in Hz
    pub sample_rate: u32,
    /// Samples per frame (determines capture cadence)
    pub frame_samples: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // Wire format expects 16kHz mono
            frame_samples: 4096,
        }
    }
}

/// Microphone capture device trait
///
/// Implementations wrap a platform input device (or a test double). The frame
/// stream is continuous and non-restartable: once `start` succeeds, frames
/// arrive at a fixed cadence until `stop` releases the device, and the
/// receiver closing means the device is gone for good.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device and start capturing
    ///
    /// Returns a channel receiver that will receive audio frames in capture
    /// order. Fails with a permission or unavailability error if the device
    /// cannot be acquired; partial acquisition must not leak.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}
