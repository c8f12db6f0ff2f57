//! Wiring for streaming generation sources.
//!
//! Bundles a [`SentenceSegmenter`] with a [`SpeechPipeline`] handle so
//! that text arriving fragment-by-fragment starts playing as soon as the
//! first sentence is complete, instead of waiting for the whole message.

use crate::pipeline::SpeechPipeline;
use crate::segment::SentenceSegmenter;

/// Feeds a streaming text source into the playback queue.
///
/// Each completed sentence is enqueued with append semantics, so a
/// session's utterances play in the order they were generated and never
/// disturb playback already in progress.
pub struct StreamingSpeaker {
    segmenter: SentenceSegmenter,
    pipeline: SpeechPipeline,
}

impl StreamingSpeaker {
    /// Create a speaker for one generation stream.
    #[must_use]
    pub fn new(pipeline: SpeechPipeline) -> Self {
        Self::with_segmenter(pipeline, SentenceSegmenter::new())
    }

    /// Create a speaker with custom segmentation.
    #[must_use]
    pub fn with_segmenter(pipeline: SpeechPipeline, segmenter: SentenceSegmenter) -> Self {
        Self {
            segmenter,
            pipeline,
        }
    }

    /// Feed the next text fragment from the stream.
    pub fn push(&mut self, fragment: &str) {
        for unit in self.segmenter.feed(fragment) {
            self.pipeline.play(unit.text, true);
        }
    }

    /// Signal that the stream is done; enqueues any buffered remainder.
    pub fn finish(&mut self) {
        if let Some(unit) = self.segmenter.flush() {
            self.pipeline.play(unit.text, true);
        }
    }
}
