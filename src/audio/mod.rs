pub mod capture;
pub mod codec;

pub use capture::{AudioFrame, CaptureConfig, CaptureDevice};
pub use codec::{decode_chunk, encode_frame, pcm_mime_type, EncodedChunk};
