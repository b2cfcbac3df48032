use super::config::LiveSessionConfig;
use super::endpoint::{LiveConnection, LiveEndpoint, ServerEvent, ServerEvents};
use super::messages::ServerMessage;
use super::stats::SessionStats;
use crate::audio::{decode_chunk, encode_frame, AudioFrame, CaptureDevice};
use crate::playback::{PlaybackDevice, PlaybackId, PlaybackScheduler};
use crate::transcript::{TranscriptAccumulator, TranscriptTurn};
use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    Errored,
}

/// A live voice session that manages audio capture, duplex streaming to a
/// remote conversational endpoint, gapless playback of the reply audio, and
/// transcript collection
pub struct LiveSession {
    /// Session configuration
    config: LiveSessionConfig,

    /// Current lifecycle state
    state: Arc<Mutex<SessionState>>,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Number of encoded chunks sent to the remote endpoint
    chunks_sent: Arc<AtomicUsize>,

    /// Number of inbound audio chunks scheduled for playback
    chunks_played: Arc<AtomicUsize>,

    /// Completed transcript turns, in conversation order
    transcript: Arc<Mutex<Vec<TranscriptTurn>>>,

    /// Handle for the session run task
    run_task: Arc<Mutex<Option<JoinHandle<()>>>>,

    /// Stop signal; flipping to true tears the session down
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

/// Everything the run task owns: the connection, both device handles, the
/// playback scheduler, and the transcript accumulator. Held by exactly one
/// task; handlers take it by mutable reference.
struct SessionContext {
    conn: Option<Box<dyn LiveConnection>>,
    capture: Option<Box<dyn CaptureDevice>>,
    playback: Option<Box<dyn PlaybackDevice>>,
    scheduler: PlaybackScheduler,
    accumulator: TranscriptAccumulator,
    transcript: Arc<Mutex<Vec<TranscriptTurn>>>,
    chunks_sent: Arc<AtomicUsize>,
    chunks_played: Arc<AtomicUsize>,
    output_sample_rate: u32,
}

impl LiveSession {
    /// Create a new live session
    pub fn new(config: LiveSessionConfig) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);

        Self {
            config,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            started_at: Utc::now(),
            chunks_sent: Arc::new(AtomicUsize::new(0)),
            chunks_played: Arc::new(AtomicUsize::new(0)),
            transcript: Arc::new(Mutex::new(Vec::new())),
            run_task: Arc::new(Mutex::new(None)),
            stop_tx,
            stop_rx,
        }
    }

    /// Start the session
    ///
    /// Acquires both audio devices, connects to the remote endpoint, and
    /// suspends until the endpoint signals readiness. On success the session
    /// is `Open` and streaming; on any failure every partially-acquired
    /// resource has been released. A `stop` arriving while still connecting
    /// unwinds the same way and returns `Ok`.
    pub async fn start(
        &self,
        mut capture: Box<dyn CaptureDevice>,
        mut playback: Box<dyn PlaybackDevice>,
        endpoint: Arc<dyn LiveEndpoint>,
    ) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if *state != SessionState::Idle {
                warn!("Session already started (state: {:?})", *state);
                return Ok(());
            }
            *state = SessionState::Connecting;
        }

        info!("Starting live session: {}", self.config.session_id);

        // Acquire the input device first; a permission or availability error
        // here is fatal to the start, with nothing else to unwind yet
        let mut frames = match capture.start().await {
            Ok(rx) => rx,
            Err(e) => {
                self.set_state(SessionState::Errored).await;
                return Err(e).context("Failed to acquire capture device");
            }
        };
        debug!("Capture device acquired: {}", capture.name());

        let completions = match playback.start().await {
            Ok(rx) => rx,
            Err(e) => {
                release_capture(&mut capture).await;
                self.set_state(SessionState::Errored).await;
                return Err(e).context("Failed to acquire playback device");
            }
        };
        debug!("Playback device acquired: {}", playback.name());

        let mut stop_rx = self.stop_rx.clone();

        // Remote handshake, cancellable by stop
        let connect_result = tokio::select! {
            result = endpoint.connect(&self.config) => result,
            _ = stop_rx.changed() => {
                info!("Stop requested while connecting");
                release_capture(&mut capture).await;
                release_playback(&mut playback).await;
                self.set_state(SessionState::Closed).await;
                return Ok(());
            }
        };

        let (mut conn, mut events) = match connect_result {
            Ok(pair) => pair,
            Err(e) => {
                release_capture(&mut capture).await;
                release_playback(&mut playback).await;
                self.set_state(SessionState::Errored).await;
                return Err(e).context("Failed to connect to remote endpoint");
            }
        };

        // Wait for the remote "session ready" signal before wiring capture
        // into the send path
        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(ServerEvent::Opened) => break,
                    Some(ServerEvent::Message(_)) => {
                        debug!("Ignoring message before session ready");
                    }
                    Some(ServerEvent::Error(e)) => {
                        release_connection(&mut conn).await;
                        release_capture(&mut capture).await;
                        release_playback(&mut playback).await;
                        self.set_state(SessionState::Errored).await;
                        anyhow::bail!("Remote endpoint failed during handshake: {}", e);
                    }
                    Some(ServerEvent::Closed) | None => {
                        release_connection(&mut conn).await;
                        release_capture(&mut capture).await;
                        release_playback(&mut playback).await;
                        self.set_state(SessionState::Closed).await;
                        anyhow::bail!("Remote endpoint closed before session ready");
                    }
                },
                _ = stop_rx.changed() => {
                    info!("Stop requested while connecting");
                    release_connection(&mut conn).await;
                    release_capture(&mut capture).await;
                    release_playback(&mut playback).await;
                    self.set_state(SessionState::Closed).await;
                    return Ok(());
                }
            }
        }

        // Frames captured during the handshake predate the open session
        while frames.try_recv().is_ok() {}

        self.set_state(SessionState::Open).await;
        info!("Live session open: {}", self.config.session_id);

        let ctx = SessionContext {
            conn: Some(conn),
            capture: Some(capture),
            playback: Some(playback),
            scheduler: PlaybackScheduler::new(),
            accumulator: TranscriptAccumulator::new(),
            transcript: Arc::clone(&self.transcript),
            chunks_sent: Arc::clone(&self.chunks_sent),
            chunks_played: Arc::clone(&self.chunks_played),
            output_sample_rate: self.config.output_sample_rate,
        };

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(run_session(ctx, frames, completions, events, stop_rx, state));

        {
            let mut handle = self.run_task.lock().await;
            *handle = Some(task);
        }

        Ok(())
    }

    /// Stop the session
    ///
    /// This is also the cancellation path: safe to call from any state,
    /// repeat-safe, and guaranteed to release devices, cancel all scheduled
    /// playback, and close the connection.
    pub async fn stop(&self) -> Result<()> {
        let _ = self.stop_tx.send(true);

        let task = {
            let mut handle = self.run_task.lock().await;
            handle.take()
        };

        match task {
            Some(task) => {
                if let Err(e) = task.await {
                    error!("Session task panicked: {}", e);
                }
                info!("Live session stopped: {}", self.config.session_id);
            }
            None => {
                debug!("Stop with no running session task");
            }
        }

        Ok(())
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let turns_count = self.transcript.lock().await.len();

        SessionStats {
            state: self.state().await,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            chunks_sent: self.chunks_sent.load(Ordering::SeqCst),
            chunks_played: self.chunks_played.load(Ordering::SeqCst),
            turns_count,
        }
    }

    /// Get the accumulated transcript (completed turns only)
    pub async fn transcript(&self) -> Vec<TranscriptTurn> {
        let transcript = self.transcript.lock().await;
        transcript.clone()
    }

    async fn set_state(&self, state: SessionState) {
        *self.state.lock().await = state;
    }
}

/// The single event loop that owns the session context
///
/// All work runs here: capture frames are encoded and forwarded, inbound
/// messages are dispatched, playback completions are recorded. Each arm's
/// events arrive in the order their source produced them.
async fn run_session(
    mut ctx: SessionContext,
    mut frames: mpsc::Receiver<AudioFrame>,
    mut completions: mpsc::Receiver<PlaybackId>,
    mut events: ServerEvents,
    mut stop_rx: watch::Receiver<bool>,
    state: Arc<Mutex<SessionState>>,
) {
    debug!("Session loop started");

    let mut completions_open = true;

    let outcome = loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                info!("Stop requested");
                break SessionState::Closed;
            }

            frame = frames.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = forward_frame(&mut ctx, frame).await {
                        error!("Failed to send audio chunk: {:#}", e);
                        break SessionState::Errored;
                    }
                }
                None => {
                    error!("Capture stream ended unexpectedly");
                    break SessionState::Errored;
                }
            },

            event = events.next() => match event {
                Some(ServerEvent::Message(msg)) => {
                    if let Err(e) = handle_message(&mut ctx, msg).await {
                        error!("Failed to handle message: {:#}", e);
                        break SessionState::Errored;
                    }
                }
                Some(ServerEvent::Closed) | None => {
                    info!("Remote endpoint closed the session");
                    break SessionState::Closed;
                }
                Some(ServerEvent::Error(e)) => {
                    error!("Transport error: {}", e);
                    break SessionState::Errored;
                }
                Some(ServerEvent::Opened) => {
                    debug!("Duplicate session-ready signal ignored");
                }
            },

            done = completions.recv(), if completions_open => match done {
                Some(id) => ctx.scheduler.on_complete(id),
                None => completions_open = false,
            },
        }
    };

    *state.lock().await = SessionState::Closing;
    teardown(&mut ctx).await;
    *state.lock().await = outcome;

    debug!("Session loop finished ({:?})", outcome);
}

/// Encode one captured frame and forward it to the remote endpoint
///
/// Frames are sent as soon as they are ready, without batching. A send
/// failure is fatal to the session; there are no retries.
async fn forward_frame(ctx: &mut SessionContext, frame: AudioFrame) -> Result<()> {
    let chunk = encode_frame(&frame);

    if let Some(conn) = ctx.conn.as_mut() {
        conn.send(chunk).await?;
        ctx.chunks_sent.fetch_add(1, Ordering::SeqCst);
    }

    Ok(())
}

/// Dispatch one inbound message
///
/// The facets of a message are independent and handled in a fixed order:
/// transcript fragments first (input, then output), then turn-complete,
/// then the audio chunk, then interruption.
async fn handle_message(ctx: &mut SessionContext, msg: ServerMessage) -> Result<()> {
    if let Some(text) = &msg.input_transcription {
        ctx.accumulator.append_input(text);
    }

    if let Some(text) = &msg.output_transcription {
        ctx.accumulator.append_output(text);
    }

    if msg.turn_complete {
        let turns = ctx.accumulator.flush();
        if !turns.is_empty() {
            let mut transcript = ctx.transcript.lock().await;
            transcript.extend(turns);
        }
    }

    if let Some(data) = &msg.audio {
        match decode_chunk(data, ctx.output_sample_rate) {
            Ok(buffer) => {
                if let Some(playback) = ctx.playback.as_mut() {
                    ctx.scheduler
                        .schedule(playback.as_mut(), buffer)
                        .context("Failed to schedule playback")?;
                    ctx.chunks_played.fetch_add(1, Ordering::SeqCst);
                }
            }
            Err(e) => {
                // Undecodable audio is skipped; the session continues
                warn!("Skipping undecodable audio chunk: {:#}", e);
            }
        }
    }

    if msg.interrupted {
        if let Some(playback) = ctx.playback.as_mut() {
            ctx.scheduler.interrupt(playback.as_mut());
        }
    }

    Ok(())
}

/// Release everything the session owns
///
/// Safe to run on every exit path and safe to run twice: each resource is
/// taken out of its slot before release, scheduled playback is cancelled,
/// and the playback cursor ends at zero.
async fn teardown(ctx: &mut SessionContext) {
    if let Some(mut conn) = ctx.conn.take() {
        if let Err(e) = conn.close().await {
            warn!("Failed to close connection: {:#}", e);
        }
    }

    if let Some(mut capture) = ctx.capture.take() {
        if let Err(e) = capture.stop().await {
            warn!("Failed to release capture device: {:#}", e);
        }
    }

    if let Some(mut playback) = ctx.playback.take() {
        ctx.scheduler.interrupt(playback.as_mut());
        if let Err(e) = playback.stop().await {
            warn!("Failed to release playback device: {:#}", e);
        }
    }
}

async fn release_connection(conn: &mut Box<dyn LiveConnection>) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection: {:#}", e);
    }
}

async fn release_capture(capture: &mut Box<dyn CaptureDevice>) {
    if let Err(e) = capture.stop().await {
        warn!("Failed to release capture device: {:#}", e);
    }
}

async fn release_playback(playback: &mut Box<dyn PlaybackDevice>) {
    if let Err(e) = playback.stop().await {
        warn!("Failed to release playback device: {:#}", e);
    }
}
