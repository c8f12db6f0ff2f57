//! Speech engine boundary — engine-agnostic interface for voice synthesis.
//!
//! This module defines the [`SpeechEngine`] trait that abstracts over the
//! platform synthesis capability (system TTS, a local model, a network
//! service, …). The pipeline operates on a trait object
//! (`Box<dyn SpeechEngine>`) so that engines can be swapped without
//! touching the queue logic.
//!
//! Control flows one way, results flow back another:
//!
//! - The pipeline calls [`submit`](SpeechEngine::submit) /
//!   [`pause`](SpeechEngine::pause) / [`resume`](SpeechEngine::resume) /
//!   [`stop`](SpeechEngine::stop) — all fire-and-forget.
//! - The engine reports lifecycle progress by sending [`EngineEvent`]s into
//!   the `tokio::sync::mpsc` sender it was constructed with; the paired
//!   receiver is handed to [`SpeechPipeline::spawn`] and consumed in the
//!   same loop that handles caller commands. There are no callbacks into
//!   pipeline state from engine threads.
//!
//! [`SpeechPipeline::spawn`]: crate::pipeline::SpeechPipeline::spawn

use crate::error::EngineError;
use crate::voice::VoiceDescriptor;

// ── Requests ───────────────────────────────────────────────────────

/// One synthesis request handed to the engine.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// Text of a single utterance.
    pub text: String,

    /// Resolved voice, or `None` to use the engine's own default.
    pub voice: Option<VoiceDescriptor>,

    /// Pitch multiplier (already clamped).
    pub pitch: f32,

    /// Speaking-rate multiplier (already clamped).
    pub rate: f32,
}

// ── Lifecycle events ───────────────────────────────────────────────

/// Lifecycle events an engine delivers for submitted utterances.
///
/// Events are assumed to arrive in the order the engine produced them and,
/// within one utterance, with non-decreasing boundary offsets.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Audio output for the current utterance has begun.
    Started,

    /// The engine honoured a pause request.
    Paused,

    /// The engine honoured a resume request.
    Resumed,

    /// The engine reached a word boundary at the given character offset
    /// into the utterance text.
    Boundary {
        /// Character offset (not byte offset) into the submitted text.
        char_index: usize,
    },

    /// The current utterance finished playing naturally.
    Ended,

    /// The current utterance terminated abnormally.
    Error(EngineError),
}

// ── Engine trait ───────────────────────────────────────────────────

/// Backend-agnostic voice-synthesis engine.
///
/// Implementations must be `Send` so the pipeline worker can own them.
/// Every method is fire-and-forget: outcomes are reported as
/// [`EngineEvent`]s on the engine's event channel, never as return values.
/// At most one request is in flight at a time — the pipeline enforces
/// this, so implementations need not queue internally.
pub trait SpeechEngine: Send {
    /// Begin synthesizing and playing one utterance.
    fn submit(&self, request: SpeechRequest);

    /// Pause the current utterance. Only called while audio is playing.
    fn pause(&self);

    /// Resume a paused utterance.
    fn resume(&self);

    /// Stop the current utterance immediately.
    ///
    /// The engine should follow up with [`EngineEvent::Error`] carrying
    /// [`EngineError::Interrupted`] (or a bare [`EngineEvent::Ended`]) so
    /// the pipeline can release its in-flight slot.
    fn stop(&self);

    /// The engine's current voice inventory.
    ///
    /// Engines may populate this asynchronously — an empty list is a valid
    /// answer early in the session. The pipeline queries it fresh on every
    /// drain and never caches it.
    fn voices(&self) -> Vec<VoiceDescriptor>;
}
