//! Playback queue manager — the core coordinator.
//!
//! A single stateful synthesis engine has to be shared across overlapping
//! requests: a streaming generator appending sentences, a user replaying a
//! message, pause/resume/cancel taps, and the engine's own asynchronous
//! lifecycle callbacks. [`SpeechPipeline`] serializes all of that through
//! one consumer loop:
//!
//! ```text
//!   callers ──commands──▶ ┌────────────┐ ◀──events── engine
//!                         │ worker task │
//!                         └─────┬──────┘
//!                               └──▶ watch: { phase, progress }
//! ```
//!
//! The worker owns the FIFO utterance queue and a single in-flight slot;
//! because every mutation happens on the loop, at most one utterance is
//! ever submitted to the engine and the slot is released on every exit
//! path (natural end, engine fault, cancellation).
//!
//! Callers never block and never see an error: playback is a best-effort
//! layer over text that is already displayed, so failures degrade to
//! silence with the pipeline back in `Idle`.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::config::PlaybackConfig;
use crate::engine::{EngineEvent, SpeechEngine, SpeechRequest};
use crate::error::EngineError;
use crate::segment::UtteranceUnit;
use crate::voice::select_voice;

/// How long progress holds at 100 before resetting for the next utterance,
/// so observers can render a brief "complete" state.
const COMPLETION_HOLD: Duration = Duration::from_millis(200);

// ── Published state ────────────────────────────────────────────────

/// Current phase of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Nothing is playing. Initial state and the state between utterances.
    Idle,

    /// An utterance is being spoken.
    Speaking,

    /// Playback is paused mid-utterance.
    Paused,
}

/// The read-only projection published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Current phase.
    pub phase: PlaybackPhase,

    /// Progress through the current utterance, 0–100. Meaningful only
    /// while `phase != Idle`; non-decreasing within one utterance.
    pub progress_percent: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            progress_percent: 0.0,
        }
    }
}

// ── Commands ───────────────────────────────────────────────────────

/// A caller operation routed to the worker loop.
enum Command {
    Play { text: String, append: bool },
    Pause,
    Resume,
    Cancel,
}

// ── Handle ─────────────────────────────────────────────────────────

/// Cloneable handle to a playback coordinator.
///
/// Created by [`spawn`](Self::spawn); one coordinator per session or UI
/// scope. All methods are non-blocking and infallible — operations are
/// messages to the worker, and a worker that is gone makes them no-ops.
/// Dropping the last handle tears the coordinator down (engine stopped,
/// queue cleared).
#[derive(Clone)]
pub struct SpeechPipeline {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<PlaybackState>,
}

impl SpeechPipeline {
    /// Spawn the coordinator worker and return a handle to it.
    ///
    /// `engine_events` is the receiver half of the channel the engine
    /// sends its lifecycle events into. `engine: None` models a platform
    /// with no synthesis capability: every operation becomes a no-op and
    /// the published phase stays `Idle` permanently.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(
        engine: Option<Box<dyn SpeechEngine>>,
        engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        config: PlaybackConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PlaybackState::default());
        let (hold_tx, hold_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            engine,
            config,
            queue: VecDeque::new(),
            in_flight: None,
            generation: 0,
            state_tx,
            hold_tx,
        };
        tokio::spawn(worker.run(cmd_rx, engine_events, hold_rx));

        Self { cmd_tx, state_rx }
    }

    /// Speak `text`.
    ///
    /// With `append = false` (replace semantics) any current playback is
    /// stopped and the queue is cleared first; with `append = true` the
    /// text queues behind whatever is already playing or waiting.
    /// Whitespace-only text is ignored.
    pub fn play(&self, text: impl Into<String>, append: bool) {
        let _ = self.cmd_tx.send(Command::Play {
            text: text.into(),
            append,
        });
    }

    /// Pause the current utterance. No-op unless speaking.
    pub fn pause(&self) {
        let _ = self.cmd_tx.send(Command::Pause);
    }

    /// Resume a paused utterance. No-op unless paused.
    pub fn resume(&self) {
        let _ = self.cmd_tx.send(Command::Resume);
    }

    /// Stop playback and discard everything queued. Idempotent, valid
    /// from any phase; always lands in `Idle` with an empty queue.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(Command::Cancel);
    }

    /// Snapshot of the current published state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        *self.state_rx.borrow()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_rx.clone()
    }
}

// ── Worker ─────────────────────────────────────────────────────────

/// The single in-flight slot. Occupied from submit until the terminal
/// event (plus completion hold) releases it — this *is* the single-flight
/// lock, held structurally rather than as a flag to remember. The stage
/// attributes terminal events to the utterance they belong to: a stop we
/// requested keeps the slot in [`FlightStage::Stopping`] until the engine
/// acknowledges, so a late ack can never vacate a successor's slot.
struct InFlight {
    /// Character count of the submitted text, for progress math.
    chars: usize,

    stage: FlightStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightStage {
    /// Submitted and (presumably) playing.
    Playing,

    /// Ended naturally; progress is holding at 100.
    Cooling,

    /// We stopped it (cancel or replace) and are waiting for the engine's
    /// terminal event before the slot can be reused.
    Stopping,
}

struct Worker {
    engine: Option<Box<dyn SpeechEngine>>,
    config: PlaybackConfig,
    queue: VecDeque<UtteranceUnit>,
    in_flight: Option<InFlight>,
    /// Bumped whenever the slot is force-released; stale completion-hold
    /// timers carry the old value and are ignored.
    generation: u64,
    state_tx: watch::Sender<PlaybackState>,
    hold_tx: mpsc::UnboundedSender<u64>,
}

impl Worker {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut engine_rx: mpsc::UnboundedReceiver<EngineEvent>,
        mut hold_rx: mpsc::UnboundedReceiver<u64>,
    ) {
        let mut engine_closed = false;
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    // All handles dropped — session over.
                    None => break,
                },
                event = engine_rx.recv(), if !engine_closed => match event {
                    Some(event) => self.handle_engine_event(event),
                    None => engine_closed = true,
                },
                Some(generation) = hold_rx.recv() => {
                    self.handle_hold_elapsed(generation);
                }
            }
        }

        if let Some(engine) = &self.engine {
            engine.stop();
        }
        self.queue.clear();
        self.in_flight = None;
        self.set_phase(PlaybackPhase::Idle);
        self.set_progress(0.0);
        tracing::debug!("speech pipeline worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Play { text, append } => self.play(text, append),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Cancel => self.cancel(),
        }
    }

    // ── Caller operations ──────────────────────────────────────────

    fn play(&mut self, text: String, append: bool) {
        if self.engine.is_none() {
            tracing::debug!("no speech engine available — ignoring play");
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        if !append {
            self.queue.clear();
            match self.in_flight.as_ref().map(|f| f.stage) {
                Some(FlightStage::Playing) => {
                    // The engine is busy with the old utterance: stop it
                    // and let its terminal event release the slot, at
                    // which point drain submits the replacement.
                    if let Some(engine) = &self.engine {
                        engine.stop();
                    }
                    self.mark_stopping();
                }
                // Completion hold — nothing left at the engine.
                Some(FlightStage::Cooling) => self.release_slot(),
                // Already stopping — the pending ack will drain for us.
                Some(FlightStage::Stopping) | None => {}
            }
        }

        self.queue.push_back(UtteranceUnit { text });
        self.drain();
    }

    fn pause(&mut self) {
        if self.phase() != PlaybackPhase::Speaking {
            return;
        }
        if let Some(engine) = &self.engine {
            engine.pause();
        }
        // Phase flips when the engine confirms with EngineEvent::Paused.
    }

    fn resume(&mut self) {
        if self.phase() != PlaybackPhase::Paused {
            return;
        }
        if let Some(engine) = &self.engine {
            engine.resume();
        }
    }

    fn cancel(&mut self) {
        if let Some(engine) = &self.engine {
            engine.stop();
        }
        self.queue.clear();
        match self.in_flight.as_ref().map(|f| f.stage) {
            Some(FlightStage::Playing) => {
                // Publish idle right away, but keep the slot held until
                // the engine acknowledges the stop — a later play must
                // not race the stopped utterance's terminal event.
                self.mark_stopping();
                self.set_phase(PlaybackPhase::Idle);
                self.set_progress(0.0);
            }
            Some(FlightStage::Cooling) => self.release_slot(),
            Some(FlightStage::Stopping) | None => {
                self.set_phase(PlaybackPhase::Idle);
                self.set_progress(0.0);
            }
        }
    }

    fn mark_stopping(&mut self) {
        if let Some(flight) = self.in_flight.as_mut() {
            flight.stage = FlightStage::Stopping;
        }
    }

    /// Pop and submit the next queued utterance, unless the slot is
    /// occupied, the queue is empty, or there is no engine. Fire-and-forget:
    /// progress continues only via engine events.
    fn drain(&mut self) {
        if self.in_flight.is_some() || self.queue.is_empty() {
            return;
        }
        let Some(engine) = &self.engine else {
            return;
        };
        let Some(unit) = self.queue.pop_front() else {
            return;
        };

        // Voice inventory is queried fresh every time — engines populate
        // it asynchronously and it may have been empty a moment ago.
        let voices = engine.voices();
        let voice = select_voice(
            &voices,
            self.config.preferred_voice.as_deref(),
            &self.config.language,
        )
        .cloned();
        if voice.is_none() {
            tracing::debug!(
                language = %self.config.language,
                "no matching voice — engine default will be used"
            );
        }

        let chars = unit.text.chars().count();
        let request = SpeechRequest {
            text: unit.text,
            voice,
            pitch: self.config.clamped_pitch(),
            rate: self.config.clamped_rate(),
        };
        self.in_flight = Some(InFlight {
            chars,
            stage: FlightStage::Playing,
        });
        tracing::debug!(chars, queued = self.queue.len(), "submitting utterance");
        engine.submit(request);
    }

    // ── Engine lifecycle events ────────────────────────────────────

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                // A Started for an utterance we already stopped stays silent.
                if self
                    .in_flight
                    .as_ref()
                    .is_some_and(|f| f.stage == FlightStage::Playing)
                {
                    self.set_phase(PlaybackPhase::Speaking);
                }
            }
            EngineEvent::Paused => {
                if self.phase() == PlaybackPhase::Speaking {
                    self.set_phase(PlaybackPhase::Paused);
                }
            }
            EngineEvent::Resumed => {
                if self.phase() == PlaybackPhase::Paused {
                    self.set_phase(PlaybackPhase::Speaking);
                }
            }
            EngineEvent::Boundary { char_index } => self.update_progress(char_index),
            EngineEvent::Ended => self.handle_ended(),
            EngineEvent::Error(fault) => self.handle_fault(&fault),
        }
    }

    #[allow(clippy::cast_precision_loss)] // progress % — sub-ulp precision not needed
    fn update_progress(&mut self, char_index: usize) {
        let Some(flight) = self.in_flight.as_ref() else {
            return;
        };
        if flight.stage != FlightStage::Playing || flight.chars == 0 {
            return;
        }
        let percent = (char_index as f32 / flight.chars as f32 * 100.0).clamp(0.0, 100.0);
        // Engine contract says boundaries are non-decreasing; enforce it
        // anyway so published progress never moves backwards.
        if percent > self.progress() {
            self.set_progress(percent);
        }
    }

    fn handle_ended(&mut self) {
        let Some(stage) = self.in_flight.as_ref().map(|f| f.stage) else {
            return;
        };
        match stage {
            // Ack of our own stop; no completion hold for a cut-off
            // utterance.
            FlightStage::Stopping => {
                self.release_slot();
                self.drain();
            }
            FlightStage::Cooling => {}
            FlightStage::Playing => {
                self.mark_cooling();
                self.set_progress(100.0);

                // Hold the completed state briefly before resetting, so a
                // consumer can render it. A cancel or replace in the
                // meantime bumps the generation and the timer message is
                // ignored.
                let generation = self.generation;
                let hold_tx = self.hold_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(COMPLETION_HOLD).await;
                    let _ = hold_tx.send(generation);
                });
            }
        }
    }

    fn mark_cooling(&mut self) {
        if let Some(flight) = self.in_flight.as_mut() {
            flight.stage = FlightStage::Cooling;
        }
    }

    fn handle_hold_elapsed(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if !self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.stage == FlightStage::Cooling)
        {
            return;
        }
        self.release_slot();
        self.drain();
    }

    fn handle_fault(&mut self, fault: &EngineError) {
        let stopping = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.stage == FlightStage::Stopping);
        if stopping || fault.is_interruption() {
            // Our own cancel/replace (or an engine-side interruption) —
            // the queue is already in its intended state.
            self.release_slot();
            self.drain();
            return;
        }

        tracing::warn!(%fault, "speech synthesis failed — dropping remaining queue");
        self.queue.clear();
        self.release_slot();
    }

    /// Vacate the in-flight slot and return to a clean idle state.
    /// Invalidates any pending completion-hold timer.
    fn release_slot(&mut self) {
        self.in_flight = None;
        self.generation += 1;
        self.set_phase(PlaybackPhase::Idle);
        self.set_progress(0.0);
    }

    // ── State publication ──────────────────────────────────────────

    fn phase(&self) -> PlaybackPhase {
        self.state_tx.borrow().phase
    }

    fn progress(&self) -> f32 {
        self.state_tx.borrow().progress_percent
    }

    fn set_phase(&self, phase: PlaybackPhase) {
        self.state_tx.send_if_modified(|state| {
            if state.phase == phase {
                return false;
            }
            tracing::debug!(old = ?state.phase, new = ?phase, "playback phase transition");
            state.phase = phase;
            true
        });
    }

    fn set_progress(&self, percent: f32) {
        self.state_tx.send_if_modified(|state| {
            if (state.progress_percent - percent).abs() < f32::EPSILON {
                return false;
            }
            state.progress_percent = percent;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initial_state_is_idle() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let pipeline = SpeechPipeline::spawn(None, rx, PlaybackConfig::default());
        let state = pipeline.state();
        assert_eq!(state.phase, PlaybackPhase::Idle);
        assert!(state.progress_percent.abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn operations_without_engine_are_noops() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let pipeline = SpeechPipeline::spawn(None, rx, PlaybackConfig::default());

        pipeline.play("Hello there.", false);
        pipeline.pause();
        pipeline.resume();
        pipeline.cancel();
        tokio::task::yield_now().await;

        assert_eq!(pipeline.state().phase, PlaybackPhase::Idle);
    }

    #[test]
    fn default_state_has_zero_progress() {
        let state = PlaybackState::default();
        assert_eq!(state.phase, PlaybackPhase::Idle);
        assert!(state.progress_percent.abs() < f32::EPSILON);
    }
}
