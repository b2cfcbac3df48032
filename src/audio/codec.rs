// PCM wire codec for the live session
//
// Outbound: float samples from the capture device are converted to 16-bit
// signed PCM, packed little-endian, and base64-encoded with a MIME-style
// descriptor (`audio/pcm;rate=16000`).
//
// Inbound: base64 chunks from the remote endpoint decode to float sample
// buffers at the output sample rate (24kHz mono).

use anyhow::{bail, Context, Result};
use base64::Engine;

use super::capture::AudioFrame;
use crate::playback::PlaybackBuffer;

/// Scale factor between float samples in [-1, 1] and 16-bit PCM
const PCM_SCALE: f32 = 32768.0;

/// One encoded audio chunk ready to send over the wire
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    /// Base64-encoded 16-bit little-endian PCM bytes
    pub data: String,
    /// MIME-style format descriptor, e.g. "audio/pcm;rate=16000"
    pub mime_type: String,
}

/// Build the MIME descriptor for raw PCM at the given sample rate
pub fn pcm_mime_type(sample_rate: u32) -> String {
    format!("audio/pcm;rate={}", sample_rate)
}

/// Encode a captured frame into its wire representation
///
/// Samples are scaled by 32768 and cast to i16. Input outside [-1, 1]
/// saturates at the i16 range (the platform-native cast behavior; clipping
/// audio is a known edge case, not corrected here).
pub fn encode_frame(frame: &AudioFrame) -> EncodedChunk {
    let mut bytes = Vec::with_capacity(frame.samples.len() * 2);
    for &sample in &frame.samples {
        let pcm = (sample * PCM_SCALE) as i16;
        bytes.extend_from_slice(&pcm.to_le_bytes());
    }

    EncodedChunk {
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        mime_type: pcm_mime_type(frame.sample_rate),
    }
}

/// Decode a base64 PCM chunk from the remote endpoint into a playable buffer
pub fn decode_chunk(data: &str, sample_rate: u32) -> Result<PlaybackBuffer> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .context("Failed to base64-decode audio chunk")?;

    if bytes.len() % 2 != 0 {
        bail!("PCM chunk has odd byte count: {}", bytes.len());
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / PCM_SCALE)
        .collect();

    Ok(PlaybackBuffer {
        samples,
        sample_rate,
    })
}
