// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor controller — runs an `EditorSession` on one Tokio task.
//
// The task owns the session outright. Commands arrive over an unbounded
// channel and are handled in order. Threshold changes are debounced: each
// one aborts the pending recompute and schedules a fresh one that sleeps for
// the debounce interval and then binarizes on the blocking pool. Results come
// back to the owner task, which installs them only if they are the latest.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, GrayImage};
use threshold_core::error::{Result, ThresholdError};
use threshold_core::{BrushMode, BrushSettings, BrushSize, Point, Size};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::EditorEvent;
use crate::session::{EditorSession, ThresholdJob, ThresholdOutcome};

/// Capacity of the event broadcast channel per subscriber.
const EVENT_CAPACITY: usize = 64;

/// Point-in-time view of the session state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub threshold_value: f64,
    pub cutoff: u8,
    pub brush: BrushSettings,
    pub can_undo: bool,
    pub can_redo: bool,
    pub generation: u64,
    pub degraded: bool,
    pub overridden_pixels: usize,
    /// A threshold recompute is scheduled or running.
    pub recompute_pending: bool,
    pub rendered: Option<Arc<GrayImage>>,
}

enum Command {
    SetThreshold(f64),
    BeginStroke { point: Point, viewport: Size },
    ContinueStroke { from: Point, to: Point, viewport: Size },
    Undo,
    Redo,
    Reset,
    SetBrushSize(f32),
    SetBrushPreset(BrushSize),
    SetBrushMode(BrushMode),
    ReplaceSource(Box<DynamicImage>),
    Export {
        path: Option<PathBuf>,
        reply: oneshot::Sender<Result<PathBuf>>,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Settle(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// A finished (or failed) recompute reported back to the owner task.
struct Finished {
    generation: u64,
    outcome: Option<ThresholdOutcome>,
}

/// Owner-side state of the editor actor.
pub struct EditorController {
    session: EditorSession,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    in_flight: Option<u64>,
    settle_waiters: Vec<oneshot::Sender<SessionSnapshot>>,
    results: mpsc::UnboundedSender<Finished>,
}

impl EditorController {
    /// Move `session` onto a new task and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime. The initial threshold
    /// recompute is scheduled immediately.
    pub fn spawn(mut session: EditorSession) -> EditorHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let forward = event_tx.clone();
        session.subscribe(move |event| {
            // No subscribers is not an error.
            let _ = forward.send(event.clone());
        });

        let debounce = session.config().debounce();
        let initial = session.initial_job();
        let mut controller = Self {
            session,
            debounce,
            pending: None,
            in_flight: None,
            settle_waiters: Vec::new(),
            results: result_tx,
        };
        controller.schedule(initial, Duration::ZERO);

        tokio::spawn(controller.run(command_rx, result_rx));
        info!(debounce_ms = debounce.as_millis() as u64, "Editor controller started");

        EditorHandle {
            commands: command_tx,
            events: event_tx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<Finished>,
    ) {
        loop {
            tokio::select! {
                // Commands first, so queued slider moves invalidate older
                // results before those are looked at.
                biased;

                command = commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }

                Some(finished) = results.recv() => self.finish(finished),
            }
        }

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        debug!("Editor controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetThreshold(value) => {
                let job = self.session.set_threshold_value(value);
                self.schedule(job, self.debounce);
            }
            Command::BeginStroke { point, viewport } => {
                if let Err(err) = self.session.begin_stroke(point, viewport) {
                    warn!(error = %err, "Stroke rejected");
                }
            }
            Command::ContinueStroke { from, to, viewport } => {
                if let Err(err) = self.session.continue_stroke(from, to, viewport) {
                    warn!(error = %err, "Stroke segment rejected");
                }
            }
            Command::Undo => {
                self.session.undo();
            }
            Command::Redo => {
                self.session.redo();
            }
            Command::Reset => {
                let job = self.session.reset();
                self.schedule(job, Duration::ZERO);
            }
            Command::SetBrushSize(size) => self.session.set_brush_size(size),
            Command::SetBrushPreset(preset) => self.session.set_brush_preset(preset),
            Command::SetBrushMode(mode) => self.session.set_brush_mode(mode),
            Command::ReplaceSource(image) => {
                let job = self.session.replace_source(*image);
                self.schedule(job, Duration::ZERO);
            }
            Command::Export { path, reply } => {
                let result = match path {
                    Some(path) => self.session.export_to(&path),
                    None => self.session.export(),
                };
                if let Err(err) = &result {
                    warn!(error = %err, "Export failed");
                }
                let _ = reply.send(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Settle(reply) => {
                if self.in_flight.is_none() {
                    let _ = reply.send(self.snapshot());
                } else {
                    self.settle_waiters.push(reply);
                }
            }
            Command::Shutdown => {}
        }
    }

    /// Replace any pending recompute with `job`, run after `delay`.
    fn schedule(&mut self, job: ThresholdJob, delay: Duration) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let generation = job.generation();
        let results = self.results.clone();
        self.in_flight = Some(generation);
        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = match tokio::task::spawn_blocking(move || job.run()).await {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!(error = %err, generation, "Threshold worker panicked");
                    None
                }
            };
            let _ = results.send(Finished {
                generation,
                outcome,
            });
        }));
    }

    fn finish(&mut self, finished: Finished) {
        if let Some(outcome) = finished.outcome {
            self.session.apply_threshold(outcome);
        }
        if self.in_flight == Some(finished.generation) {
            self.in_flight = None;
            self.pending = None;
            let snapshot = self.snapshot();
            for waiter in self.settle_waiters.drain(..) {
                let _ = waiter.send(snapshot.clone());
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            threshold_value: self.session.threshold_value(),
            cutoff: self.session.cutoff(),
            brush: self.session.brush(),
            can_undo: self.session.can_undo(),
            can_redo: self.session.can_redo(),
            generation: self.session.generation(),
            degraded: self.session.is_degraded(),
            overridden_pixels: self.session.mask().overridden_count(),
            recompute_pending: self.in_flight.is_some(),
            rendered: self.session.rendered_image(),
        }
    }
}

/// Cloneable handle to a running [`EditorController`].
///
/// The controller stops once every handle is dropped or
/// [`EditorHandle::shutdown`] is called.
#[derive(Debug, Clone)]
pub struct EditorHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<EditorEvent>,
}

impl EditorHandle {
    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn set_threshold(&self, value: f64) -> Result<()> {
        self.send(Command::SetThreshold(value))
    }

    pub fn begin_stroke(&self, point: Point, viewport: Size) -> Result<()> {
        self.send(Command::BeginStroke { point, viewport })
    }

    pub fn continue_stroke(&self, from: Point, to: Point, viewport: Size) -> Result<()> {
        self.send(Command::ContinueStroke { from, to, viewport })
    }

    pub fn undo(&self) -> Result<()> {
        self.send(Command::Undo)
    }

    pub fn redo(&self) -> Result<()> {
        self.send(Command::Redo)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    pub fn set_brush_size(&self, size: f32) -> Result<()> {
        self.send(Command::SetBrushSize(size))
    }

    pub fn set_brush_preset(&self, preset: BrushSize) -> Result<()> {
        self.send(Command::SetBrushPreset(preset))
    }

    pub fn set_brush_mode(&self, mode: BrushMode) -> Result<()> {
        self.send(Command::SetBrushMode(mode))
    }

    pub fn replace_source(&self, image: DynamicImage) -> Result<()> {
        self.send(Command::ReplaceSource(Box::new(image)))
    }

    /// Export to the configured location.
    pub async fn export(&self) -> Result<PathBuf> {
        self.request(|reply| Command::Export { path: None, reply }).await?
    }

    pub async fn export_to(&self, path: impl Into<PathBuf>) -> Result<PathBuf> {
        let path = path.into();
        self.request(|reply| Command::Export {
            path: Some(path),
            reply,
        })
        .await?
    }

    /// State after every previously sent command has been handled.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Like [`EditorHandle::snapshot`], but also waits for the latest
    /// threshold recompute to land.
    pub async fn settled(&self) -> Result<SessionSnapshot> {
        self.request(Command::Settle).await
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ThresholdError::SessionClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply))?;
        response.await.map_err(|_| ThresholdError::SessionClosed)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SetThreshold(_) => "SetThreshold",
            Self::BeginStroke { .. } => "BeginStroke",
            Self::ContinueStroke { .. } => "ContinueStroke",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Reset => "Reset",
            Self::SetBrushSize(_) => "SetBrushSize",
            Self::SetBrushPreset(_) => "SetBrushPreset",
            Self::SetBrushMode(_) => "SetBrushMode",
            Self::ReplaceSource(_) => "ReplaceSource",
            Self::Export { .. } => "Export",
            Self::Snapshot(_) => "Snapshot",
            Self::Settle(_) => "Settle",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}
