//! Streaming sentence segmentation.
//!
//! Generation sources deliver text a few tokens at a time; the synthesis
//! engine wants whole sentences. [`SentenceSegmenter`] sits between the
//! two: it accumulates fragments and emits complete utterance units as
//! sentence boundaries appear, holding the (possibly incomplete) tail until
//! more text or a [`flush`](SentenceSegmenter::flush) arrives.
//!
//! The boundary heuristic is deliberately simple — punctuation followed by
//! whitespace — and is known to mis-split abbreviations and decimal
//! numbers. It lives behind the [`BoundaryRules`] trait so a locale-aware
//! algorithm can replace it without touching the playback queue.

/// One indivisible chunk of text queued for synthesis.
///
/// Never split further once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceUnit {
    /// The text to speak.
    pub text: String,
}

impl UtteranceUnit {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

// ── Boundary strategy ──────────────────────────────────────────────

/// Strategy for locating sentence boundaries in buffered text.
pub trait BoundaryRules: Send {
    /// Byte offsets at which `text` may be cut into complete sentences.
    ///
    /// Each offset points just past a boundary (terminator run plus any
    /// trailing whitespace) and must be strictly inside `text` — a
    /// terminator at the very end of the buffer is *not* a boundary,
    /// because the sentence may still be growing.
    fn split_offsets(&self, text: &str) -> Vec<usize>;
}

/// Default rules: split after `.` `!` `?` or newline, plus any following
/// whitespace. Consecutive terminators collapse to one boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationRules;

impl BoundaryRules for PunctuationRules {
    fn split_offsets(&self, text: &str) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut chars = text.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if !is_terminator(c) {
                continue;
            }

            // Swallow the rest of the terminator run ("?!", "...").
            while chars.peek().is_some_and(|&(_, next)| is_terminator(next)) {
                chars.next();
            }
            // Swallow trailing whitespace.
            while chars.peek().is_some_and(|&(_, next)| next.is_whitespace()) {
                chars.next();
            }
            // A boundary only counts if content follows it.
            if let Some(&(idx, _)) = chars.peek() {
                offsets.push(idx);
            }
        }

        offsets
    }
}

const fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

// ── Segmenter ──────────────────────────────────────────────────────

/// Accumulates streaming text fragments into complete utterance units.
pub struct SentenceSegmenter {
    buffer: String,
    rules: Box<dyn BoundaryRules>,
}

impl SentenceSegmenter {
    /// Create a segmenter with the default punctuation rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Box::new(PunctuationRules))
    }

    /// Create a segmenter with custom boundary rules.
    #[must_use]
    pub fn with_rules(rules: Box<dyn BoundaryRules>) -> Self {
        Self {
            buffer: String::new(),
            rules,
        }
    }

    /// Append a fragment and return any sentences it completed, in order.
    ///
    /// The last (possibly incomplete) segment stays buffered. Emitted units
    /// are trimmed; pure punctuation is emitted as-is.
    pub fn feed(&mut self, fragment: &str) -> Vec<UtteranceUnit> {
        self.buffer.push_str(fragment);

        let offsets = self.rules.split_offsets(&self.buffer);
        if offsets.is_empty() {
            return Vec::new();
        }

        let mut units = Vec::new();
        let mut start = 0;
        for &end in &offsets {
            let segment = self.buffer[start..end].trim();
            if !segment.is_empty() {
                units.push(UtteranceUnit::new(segment));
            }
            start = end;
        }
        self.buffer.drain(..start);

        units
    }

    /// Emit whatever remains buffered, once the upstream stream is done.
    ///
    /// Returns `None` if the buffer holds only whitespace.
    pub fn flush(&mut self) -> Option<UtteranceUnit> {
        let remainder = std::mem::take(&mut self.buffer);
        let trimmed = remainder.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(UtteranceUnit::new(trimmed))
        }
    }

    /// The buffered, not-yet-emitted tail.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(units: &[UtteranceUnit]) -> Vec<&str> {
        units.iter().map(|u| u.text.as_str()).collect::<Vec<_>>()
    }

    #[test]
    fn streamed_fragments_emit_at_boundaries() {
        let mut seg = SentenceSegmenter::new();

        assert!(seg.feed("Bonjour").is_empty());
        assert!(seg.feed(" comment").is_empty());

        let units = seg.feed(" allez-vous? Je");
        assert_eq!(texts(&units), vec!["Bonjour comment allez-vous?"]);

        assert!(seg.feed(" suis bien.").is_empty());

        let last = seg.flush().unwrap();
        assert_eq!(last.text, "Je suis bien.");
        assert!(seg.flush().is_none());
    }

    #[test]
    fn no_terminator_never_emits_until_flush() {
        let mut seg = SentenceSegmenter::new();
        assert!(seg.feed("a sentence without any ending").is_empty());
        assert_eq!(seg.flush().unwrap().text, "a sentence without any ending");
    }

    #[test]
    fn multiple_sentences_in_one_fragment() {
        let mut seg = SentenceSegmenter::new();
        let units = seg.feed("One. Two! Three? Four");
        assert_eq!(texts(&units), vec!["One.", "Two!", "Three?"]);
        assert_eq!(seg.pending(), "Four");
    }

    #[test]
    fn consecutive_terminators_collapse() {
        let mut seg = SentenceSegmenter::new();
        let units = seg.feed("Really?! Yes");
        assert_eq!(texts(&units), vec!["Really?!"]);
    }

    #[test]
    fn newline_is_a_boundary() {
        let mut seg = SentenceSegmenter::new();
        let units = seg.feed("first line\nsecond line");
        assert_eq!(texts(&units), vec!["first line"]);
        assert_eq!(seg.pending(), "second line");
    }

    #[test]
    fn pure_punctuation_is_emitted() {
        let mut seg = SentenceSegmenter::new();
        let units = seg.feed("... and then");
        assert_eq!(texts(&units), vec!["..."]);
    }

    #[test]
    fn trailing_terminator_waits_for_flush() {
        let mut seg = SentenceSegmenter::new();
        assert!(seg.feed("Complete sentence.").is_empty());
        assert_eq!(seg.flush().unwrap().text, "Complete sentence.");
    }

    #[test]
    fn flush_of_whitespace_is_none() {
        let mut seg = SentenceSegmenter::new();
        seg.feed("Done. ");
        let _ = seg.flush();
        assert!(seg.flush().is_none());

        let mut seg = SentenceSegmenter::new();
        seg.feed("   ");
        assert!(seg.flush().is_none());
    }

    #[test]
    fn custom_rules_are_honoured() {
        struct NeverSplit;
        impl BoundaryRules for NeverSplit {
            fn split_offsets(&self, _text: &str) -> Vec<usize> {
                Vec::new()
            }
        }

        let mut seg = SentenceSegmenter::with_rules(Box::new(NeverSplit));
        assert!(seg.feed("One. Two. Three.").is_empty());
        assert_eq!(seg.flush().unwrap().text, "One. Two. Three.");
    }
}
