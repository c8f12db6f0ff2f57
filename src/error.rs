//! Engine fault taxonomy.
//!
//! The pipeline itself never returns errors to callers — playback is a
//! best-effort layer and every failure resolves to an idle, consistent
//! state. What *does* carry error codes is the engine's lifecycle channel:
//! [`EngineError`] is the payload of [`EngineEvent::Error`] and the queue
//! manager keys its handling on which variant arrives.
//!
//! [`EngineEvent::Error`]: crate::engine::EngineEvent::Error

/// Faults reported by a voice-synthesis engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// No synthesis capability exists on the running platform.
    #[error("No speech synthesis engine available")]
    Unavailable,

    /// The engine stopped because *we* told it to (cancel or replace).
    ///
    /// Expected and benign — the operation that triggered the stop has
    /// already put the queue in its intended state.
    #[error("Playback interrupted")]
    Interrupted,

    /// Genuine synthesis failure (malformed voice, internal engine fault).
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

impl EngineError {
    /// Whether this fault was caused by an intentional stop from this side.
    #[must_use]
    pub const fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interruption_classification() {
        assert!(EngineError::Interrupted.is_interruption());
        assert!(!EngineError::Unavailable.is_interruption());
        assert!(!EngineError::Synthesis("bad voice".into()).is_interruption());
    }
}
