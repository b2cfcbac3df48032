// Test doubles for the live session: a scripted capture device, a playback
// device with a manually-advanced clock, and a scripted remote endpoint.

#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use aura_live::{
    AudioFrame, CaptureDevice, EncodedChunk, LiveConnection, LiveEndpoint, LiveSessionConfig,
    PlaybackBuffer, PlaybackDevice, PlaybackId, ServerEvent, ServerEvents, ServerMessage,
};
use base64::Engine;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Capture device fed by the test through a channel
pub struct MockCaptureDevice {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    capturing: bool,
    released: Arc<AtomicBool>,
}

impl MockCaptureDevice {
    pub fn new() -> (Self, mpsc::Sender<AudioFrame>, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::channel(64);
        let released = Arc::new(AtomicBool::new(false));
        let device = Self {
            rx: Some(rx),
            capturing: false,
            released: Arc::clone(&released),
        };
        (device, tx, released)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MockCaptureDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        match self.rx.take() {
            Some(rx) => {
                self.capturing = true;
                Ok(rx)
            }
            None => bail!("Capture device already started"),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "mock-capture"
    }
}

/// Capture device whose acquisition always fails
pub struct FailingCaptureDevice;

#[async_trait::async_trait]
impl CaptureDevice for FailingCaptureDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        bail!("Microphone permission denied")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "failing-capture"
    }
}

/// Observable state of the manual playback device
pub struct ManualPlaybackState {
    /// Device clock in seconds, advanced by the test
    pub clock: Mutex<f64>,
    /// Every play call: (id, start_at, duration)
    pub plays: Mutex<Vec<(PlaybackId, f64, f64)>>,
    /// Ids cancelled by barge-in or teardown
    pub cancelled: Mutex<Vec<PlaybackId>>,
    /// Whether the device has been released
    pub released: AtomicBool,
    completion_tx: mpsc::Sender<PlaybackId>,
}

impl ManualPlaybackState {
    pub fn set_clock(&self, seconds: f64) {
        *self.clock.lock().unwrap() = seconds;
    }

    /// Report natural completion of one buffer
    pub async fn complete(&self, id: PlaybackId) {
        self.completion_tx.send(id).await.unwrap();
    }

    pub fn plays(&self) -> Vec<(PlaybackId, f64, f64)> {
        self.plays.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<PlaybackId> {
        self.cancelled.lock().unwrap().clone()
    }
}

/// Playback device with a test-controlled clock
pub struct ManualPlaybackDevice {
    state: Arc<ManualPlaybackState>,
    completions: Option<mpsc::Receiver<PlaybackId>>,
    next_id: PlaybackId,
}

impl ManualPlaybackDevice {
    pub fn new() -> (Self, Arc<ManualPlaybackState>) {
        let (completion_tx, completions) = mpsc::channel(64);
        let state = Arc::new(ManualPlaybackState {
            clock: Mutex::new(0.0),
            plays: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
            completion_tx,
        });
        let device = Self {
            state: Arc::clone(&state),
            completions: Some(completions),
            next_id: 1,
        };
        (device, state)
    }
}

#[async_trait::async_trait]
impl PlaybackDevice for ManualPlaybackDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<PlaybackId>> {
        match self.completions.take() {
            Some(rx) => Ok(rx),
            None => bail!("Playback device already started"),
        }
    }

    fn now(&self) -> f64 {
        *self.state.clock.lock().unwrap()
    }

    fn play(&mut self, buffer: PlaybackBuffer, start_at: f64) -> Result<PlaybackId> {
        let id = self.next_id;
        self.next_id += 1;
        self.state
            .plays
            .lock()
            .unwrap()
            .push((id, start_at, buffer.duration_secs()));
        Ok(id)
    }

    fn cancel(&mut self, id: PlaybackId) -> Result<()> {
        self.state.cancelled.lock().unwrap().push(id);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.state.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "manual-playback"
    }
}

/// Playback device whose acquisition always fails
pub struct FailingPlaybackDevice;

#[async_trait::async_trait]
impl PlaybackDevice for FailingPlaybackDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<PlaybackId>> {
        bail!("No output device available")
    }

    fn now(&self) -> f64 {
        0.0
    }

    fn play(&mut self, _buffer: PlaybackBuffer, _start_at: f64) -> Result<PlaybackId> {
        bail!("No output device available")
    }

    fn cancel(&mut self, _id: PlaybackId) -> Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "failing-playback"
    }
}

/// What the scripted connection observed
pub struct ConnectionLog {
    pub sent: Mutex<Vec<EncodedChunk>>,
    pub closed: AtomicBool,
    pub fail_sends: AtomicBool,
}

impl ConnectionLog {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

struct ScriptedConnection {
    log: Arc<ConnectionLog>,
}

#[async_trait::async_trait]
impl LiveConnection for ScriptedConnection {
    async fn send(&mut self, chunk: EncodedChunk) -> Result<()> {
        if self.log.fail_sends.load(Ordering::SeqCst) {
            bail!("Transport send failed");
        }
        self.log.sent.lock().unwrap().push(chunk);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Endpoint whose inbound events the test scripts through a channel
pub struct ScriptedEndpoint {
    inner: Mutex<Option<(mpsc::Receiver<ServerEvent>, Arc<ConnectionLog>)>>,
}

pub fn scripted_endpoint() -> (
    Arc<ScriptedEndpoint>,
    mpsc::Sender<ServerEvent>,
    Arc<ConnectionLog>,
) {
    let (event_tx, event_rx) = mpsc::channel(64);
    let log = Arc::new(ConnectionLog {
        sent: Mutex::new(Vec::new()),
        closed: AtomicBool::new(false),
        fail_sends: AtomicBool::new(false),
    });
    let endpoint = Arc::new(ScriptedEndpoint {
        inner: Mutex::new(Some((event_rx, Arc::clone(&log)))),
    });
    (endpoint, event_tx, log)
}

#[async_trait::async_trait]
impl LiveEndpoint for ScriptedEndpoint {
    async fn connect(
        &self,
        _config: &LiveSessionConfig,
    ) -> Result<(Box<dyn LiveConnection>, ServerEvents)> {
        let (rx, log) = self
            .inner
            .lock()
            .unwrap()
            .take()
            .context("Endpoint already connected")?;

        let events = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed();

        Ok((Box::new(ScriptedConnection { log }), events))
    }
}

/// Endpoint whose handshake always fails
pub struct FailingEndpoint;

#[async_trait::async_trait]
impl LiveEndpoint for FailingEndpoint {
    async fn connect(
        &self,
        _config: &LiveSessionConfig,
    ) -> Result<(Box<dyn LiveConnection>, ServerEvents)> {
        bail!("Connection refused")
    }
}

/// Base64 PCM silence of the given sample count (16-bit mono)
pub fn silence_b64(samples: usize) -> String {
    base64::engine::general_purpose::STANDARD.encode(vec![0u8; samples * 2])
}

/// Wrap a server message in its transport event
pub fn message(msg: ServerMessage) -> ServerEvent {
    ServerEvent::Message(msg)
}

/// A message carrying only an audio chunk
pub fn audio_message(data: String) -> ServerEvent {
    ServerEvent::Message(ServerMessage {
        audio: Some(data),
        ..Default::default()
    })
}
