//! Dedicated audio output thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. It is created on, and
//! never leaves, a single OS thread. Everything else asks that thread for new
//! sinks over a channel; `Sink` itself is `Send` and is handed out freely.

use std::sync::mpsc;
use std::thread;

use rodio::{OutputStream, Sink};
use tokio::sync::oneshot;

use crate::error::PlayerError;

// ── Commands ───────────────────────────────────────────────────────

enum OutputCommand {
    /// Create a sink on the default output device.
    CreateSink {
        reply: oneshot::Sender<Result<Sink, PlayerError>>,
    },

    /// Shut down the audio thread, releasing the output stream.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the audio output thread.
pub struct AudioOutput {
    cmd_tx: mpsc::Sender<OutputCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioOutput {
    /// Spawn the audio thread and open the default output device.
    ///
    /// Device errors are reported back through a one-shot init channel.
    pub fn spawn() -> Result<Self, PlayerError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<OutputCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), PlayerError>>();

        let thread = thread::Builder::new()
            .name("novelvox-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| PlayerError::Output(format!("failed to spawn audio thread: {e}")))?;

        init_rx
            .recv()
            .map_err(|_| PlayerError::Output("audio thread died during startup".into()))??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Create a new, empty sink on the output device.
    pub async fn create_sink(&self) -> Result<Sink, PlayerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(OutputCommand::CreateSink { reply })
            .map_err(|_| PlayerError::Output("audio thread is not running".into()))?;
        rx.await
            .map_err(|_| PlayerError::Output("audio thread dropped the request".into()))?
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<OutputCommand>, init_tx: &mpsc::Sender<Result<(), PlayerError>>) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(PlayerError::Output(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }
        tracing::info!("Audio output initialized on default device");

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                OutputCommand::CreateSink { reply } => {
                    let sink =
                        Sink::try_new(&stream_handle).map_err(|e| PlayerError::Output(e.to_string()));
                    let _ = reply.send(sink);
                }
                OutputCommand::Shutdown => break,
            }
        }

        // `_stream` is dropped here, on the audio thread.
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        // The thread may already be gone.
        let _ = self.cmd_tx.send(OutputCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
