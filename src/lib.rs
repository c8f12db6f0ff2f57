//! Incremental speech playback.
//!
//! `narrate` turns text — including text that arrives progressively from a
//! streaming generation process — into spoken audio through an external
//! voice-synthesis engine, while letting the caller pause, resume, or
//! cancel at any time and observe live progress.
//!
//! ```text
//!   stream ─▶ SentenceSegmenter ─▶ SpeechPipeline ─▶ dyn SpeechEngine
//!                                        │
//!                                        └─▶ watch: { phase, progress }
//! ```
//!
//! The pieces:
//!
//! - [`SentenceSegmenter`] accumulates streamed fragments and emits
//!   complete sentences ([`UtteranceUnit`]s).
//! - [`SpeechPipeline`] owns the FIFO utterance queue and time-multiplexes
//!   the single engine across requests: one utterance in flight at a time,
//!   replace-vs-append semantics, pause/resume/cancel, and automatic
//!   advance to the next queued utterance.
//! - [`select_voice`] picks the best [`VoiceDescriptor`] from the engine's
//!   (asynchronously populated) inventory plus the user's preference.
//! - [`StreamingSpeaker`] wires a stream through the segmenter into the
//!   queue.
//!
//! Playback is a best-effort layer: no operation blocks, no failure
//! reaches the caller. Engine faults resolve to an idle pipeline and the
//! published state simply reports it.
//!
//! # Example
//!
//! ```no_run
//! use narrate::{PlaybackConfig, SpeechPipeline, StreamingSpeaker};
//!
//! # fn make_engine(_tx: tokio::sync::mpsc::UnboundedSender<narrate::EngineEvent>)
//! # -> Box<dyn narrate::SpeechEngine> { unimplemented!() }
//! # async fn demo() {
//! let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
//! let engine = make_engine(event_tx);
//! let pipeline = SpeechPipeline::spawn(Some(engine), event_rx, PlaybackConfig::default());
//!
//! // Stream a reply as it is generated…
//! let mut speaker = StreamingSpeaker::new(pipeline.clone());
//! speaker.push("Hello! How ");
//! speaker.push("are you today?");
//! speaker.finish();
//!
//! // …or replay a whole message, replacing whatever is queued.
//! pipeline.play("Hello! How are you today?", false);
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod stream;
pub mod voice;

// Re-export key types for convenience
pub use config::PlaybackConfig;
pub use engine::{EngineEvent, SpeechEngine, SpeechRequest};
pub use error::EngineError;
pub use pipeline::{PlaybackPhase, PlaybackState, SpeechPipeline};
pub use segment::{BoundaryRules, PunctuationRules, SentenceSegmenter, UtteranceUnit};
pub use stream::StreamingSpeaker;
pub use voice::{VoiceDescriptor, VoiceQuality, select_voice};
