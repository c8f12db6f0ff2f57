//! Voice selection — pick the best available voice for a request.
//!
//! Selection is a pure function over the engine's current voice inventory
//! plus an optional user preference; identical inputs always yield the
//! identical choice. The inventory may be empty early in a session (engines
//! populate it asynchronously), in which case the engine's own default is
//! used.

use serde::{Deserialize, Serialize};

/// Voice display names known to sound good on common platforms.
///
/// Used as a tiebreaker when no user preference matches and no voice
/// carries an enhanced-quality hint.
const PREFERRED_VOICE_NAMES: &[&str] = &[
    "Samantha",
    "Daniel",
    "Karen",
    "Moira",
    "Tessa",
    "Google US English",
    "Google UK English Female",
];

/// Quality hint attached to a voice by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceQuality {
    /// Baseline quality.
    Standard,

    /// Enhanced / premium voice.
    Enhanced,
}

/// One synthesis voice offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Voice identifier (engine-specific).
    pub id: String,

    /// BCP-47 language tag, e.g. `"en-US"`.
    pub language: String,

    /// Human-readable display name.
    pub name: String,

    /// Whether synthesis runs on-device (`true`) or over the network.
    pub is_local: bool,

    /// Quality hint, if the engine provides one.
    pub quality: Option<VoiceQuality>,
}

/// Choose the best voice from `available` for `language`, honouring
/// `preferred_id` when it matches.
///
/// Resolution order:
/// 1. Exact match on `preferred_id`.
/// 2. Enhanced-quality voices, network voices first.
/// 3. Curated known-good display names.
/// 4. Network voice for the target language.
/// 5. Any voice for the target language.
/// 6. `None` — the engine falls back to its own default.
///
/// Pure and side-effect free; an empty `available` list yields `None`.
#[must_use]
pub fn select_voice<'a>(
    available: &'a [VoiceDescriptor],
    preferred_id: Option<&str>,
    language: &str,
) -> Option<&'a VoiceDescriptor> {
    if let Some(id) = preferred_id {
        if let Some(voice) = available.iter().find(|v| v.id == id) {
            return Some(voice);
        }
    }

    let enhanced = || {
        available
            .iter()
            .filter(|v| v.quality == Some(VoiceQuality::Enhanced))
    };
    if let Some(voice) = enhanced().find(|v| !v.is_local).or_else(|| enhanced().next()) {
        return Some(voice);
    }

    if let Some(voice) = available
        .iter()
        .find(|v| PREFERRED_VOICE_NAMES.contains(&v.name.as_str()))
    {
        return Some(voice);
    }

    let for_language = || available.iter().filter(|v| language_matches(&v.language, language));
    for_language()
        .find(|v| !v.is_local)
        .or_else(|| for_language().next())
}

/// Compare the primary language subtags of two tags, case-insensitively.
///
/// `"fr-CA"` matches target `"fr"`; `"en-GB"` does not match `"fr"`.
fn language_matches(tag: &str, target: &str) -> bool {
    primary_subtag(tag).eq_ignore_ascii_case(primary_subtag(target))
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}
