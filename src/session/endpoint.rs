use anyhow::Result;
use futures::stream::BoxStream;

use super::config::LiveSessionConfig;
use super::messages::ServerMessage;
use crate::audio::EncodedChunk;

/// One inbound event on the duplex stream
#[derive(Debug)]
pub enum ServerEvent {
    /// The remote endpoint accepted the session and is ready for audio
    Opened,
    /// A content message (transcript fragments, audio, control flags)
    Message(ServerMessage),
    /// The remote endpoint closed the session; not an error
    Closed,
    /// The transport failed; fatal to this session
    Error(String),
}

/// Stream of inbound events, in arrival order
pub type ServerEvents = BoxStream<'static, ServerEvent>;

/// A remote conversational endpoint capable of live duplex sessions
///
/// `connect` performs the handshake and returns the outbound half (the
/// connection) together with the inbound event stream. Session readiness is
/// signalled in-band via `ServerEvent::Opened`.
#[async_trait::async_trait]
pub trait LiveEndpoint: Send + Sync {
    async fn connect(
        &self,
        config: &LiveSessionConfig,
    ) -> Result<(Box<dyn LiveConnection>, ServerEvents)>;
}

/// Outbound half of one live duplex connection
#[async_trait::async_trait]
pub trait LiveConnection: Send {
    /// Send one encoded audio chunk
    ///
    /// Chunks must be sent in capture order. Failures are fatal to the
    /// session; there are no retries at this layer.
    async fn send(&mut self, chunk: EncodedChunk) -> Result<()>;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;
}
