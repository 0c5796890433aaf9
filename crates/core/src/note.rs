//! Note value object and the sanitization applied before synthesis.
//!
//! Client editors send note sequences in a couple of historical shapes
//! (`note` vs `note_name` for the pitch label, Unicode accidental glyphs,
//! out-of-range volumes). [`sanitize_notes`] accepts those shapes and
//! produces one canonical [`Note`] form, or rejects the sequence with a
//! [`CoreError::Validation`] describing the offending note.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound notes are clamped to (0 would be silence on most synths).
pub const MIN_VOLUME: i32 = 1;

/// MIDI velocity ceiling.
pub const MAX_VOLUME: i32 = 127;

/// Volume assumed when the client omits one.
pub const DEFAULT_VOLUME: f64 = 100.0;

/// Confidence assumed when the client omits one.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Tolerance when reconciling `duration` against `end - start`. Client
/// editors round to milliseconds, so anything tighter rejects valid input.
pub const DURATION_EPSILON: f64 = 1e-3;

/// Pitch grammar: letter A-G, optional sharp/flat marker, optional octave
/// digit. Matched after glyph canonicalization and uppercasing.
fn pitch_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new("^[A-G][#b]?[0-9]?$").expect("pitch grammar regex"))
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A note as submitted by a client, before sanitization.
///
/// The pitch label is accepted under either `note` or `note_name`; numeric
/// fields that have defaults are optional here and filled in by
/// [`sanitize_notes`].
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    /// Pitch label, e.g. `"C#4"`. Also accepted as `note_name`.
    #[serde(alias = "note_name")]
    pub note: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Duration in seconds. Must reconcile with `end - start` when present.
    pub duration: Option<f64>,
    /// Volume 0-127. Out-of-range values are clamped, not rejected.
    pub volume: Option<f64>,
    #[serde(default)]
    pub vibrato: bool,
    #[serde(default)]
    pub breathy: bool,
    /// Detection confidence, defaults to 1.0.
    pub confidence: Option<f64>,
}

/// A sanitized note, immutable once embedded in a persisted artifact row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Canonical pitch label (`A`-`G`, `#`/`b`, optional octave digit).
    pub note: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    /// Volume clamped to [`MIN_VOLUME`]..=[`MAX_VOLUME`].
    pub volume: i32,
    pub vibrato: bool,
    pub breathy: bool,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Canonicalize a pitch label and validate it against the pitch grammar.
///
/// Unicode accidentals (`♯`, `♭`) are folded to their ASCII spellings and
/// the note letter is uppercased, so `"c♯4"` becomes `"C#4"`.
pub fn normalize_pitch(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let canonical: String = trimmed
        .chars()
        .enumerate()
        .map(|(i, c)| match c {
            '♯' => '#',
            '♭' => 'b',
            _ if i == 0 => c.to_ascii_uppercase(),
            _ => c,
        })
        .collect();

    if pitch_grammar().is_match(&canonical) {
        Ok(canonical)
    } else {
        Err(CoreError::Validation(format!(
            "Unrecognized pitch label '{trimmed}'"
        )))
    }
}

/// Sanitize a submitted note sequence into canonical [`Note`]s.
///
/// Policy: volume is clamped into range rather than rejected; every other
/// malformed field (bad pitch, non-finite numbers, negative start,
/// `end < start`, duration that does not reconcile) fails the whole
/// sequence. An empty sequence is rejected.
pub fn sanitize_notes(input: &[NoteInput]) -> Result<Vec<Note>, CoreError> {
    if input.is_empty() {
        return Err(CoreError::Validation(
            "Note sequence must not be empty".to_string(),
        ));
    }

    input
        .iter()
        .enumerate()
        .map(|(i, raw)| sanitize_note(raw).map_err(|e| annotate(i, e)))
        .collect()
}

/// Prefix a per-note validation error with the note's position.
fn annotate(index: usize, err: CoreError) -> CoreError {
    match err {
        CoreError::Validation(msg) => CoreError::Validation(format!("note {index}: {msg}")),
        other => other,
    }
}

fn sanitize_note(raw: &NoteInput) -> Result<Note, CoreError> {
    let note = normalize_pitch(&raw.note)?;

    if !raw.start.is_finite() || raw.start < 0.0 {
        return Err(CoreError::Validation(format!(
            "start must be a non-negative number, got {}",
            raw.start
        )));
    }
    if !raw.end.is_finite() || raw.end < raw.start {
        return Err(CoreError::Validation(format!(
            "end must be a number >= start, got start={} end={}",
            raw.start, raw.end
        )));
    }

    let span = raw.end - raw.start;
    let duration = match raw.duration {
        Some(d) => {
            if !d.is_finite() || d < 0.0 {
                return Err(CoreError::Validation(format!(
                    "duration must be a non-negative number, got {d}"
                )));
            }
            if (d - span).abs() > DURATION_EPSILON {
                return Err(CoreError::Validation(format!(
                    "duration {d} does not match end - start = {span}"
                )));
            }
            d
        }
        None => span,
    };

    let volume = raw.volume.unwrap_or(DEFAULT_VOLUME);
    if !volume.is_finite() {
        return Err(CoreError::Validation(format!(
            "volume must be a number, got {volume}"
        )));
    }
    let volume = (volume.round() as i32).clamp(MIN_VOLUME, MAX_VOLUME);

    let confidence = raw.confidence.unwrap_or(DEFAULT_CONFIDENCE);
    if !confidence.is_finite() || confidence < 0.0 {
        return Err(CoreError::Validation(format!(
            "confidence must be a non-negative number, got {confidence}"
        )));
    }

    Ok(Note {
        note,
        start: raw.start,
        end: raw.end,
        duration,
        volume,
        vibrato: raw.vibrato,
        breathy: raw.breathy,
        confidence,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input(note: &str, start: f64, end: f64) -> NoteInput {
        NoteInput {
            note: note.to_string(),
            start,
            end,
            duration: None,
            volume: None,
            vibrato: false,
            breathy: false,
            confidence: None,
        }
    }

    #[test]
    fn normalize_plain_pitch() {
        assert_eq!(normalize_pitch("C4").unwrap(), "C4");
        assert_eq!(normalize_pitch("G").unwrap(), "G");
        assert_eq!(normalize_pitch("Bb2").unwrap(), "Bb2");
    }

    #[test]
    fn normalize_folds_unicode_accidentals() {
        assert_eq!(normalize_pitch("C♯4").unwrap(), "C#4");
        assert_eq!(normalize_pitch("E♭3").unwrap(), "Eb3");
    }

    #[test]
    fn normalize_uppercases_letter() {
        assert_eq!(normalize_pitch("c#4").unwrap(), "C#4");
        assert_eq!(normalize_pitch(" a3 ").unwrap(), "A3");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert_matches!(normalize_pitch("H4"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_pitch("C##4"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_pitch("C42"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_pitch(""), Err(CoreError::Validation(_)));
        assert_matches!(normalize_pitch("do"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_sequence_rejected() {
        assert_matches!(sanitize_notes(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn volume_clamped_not_rejected() {
        let mut a = input("C4", 0.0, 1.0);
        a.volume = Some(300.0);
        let mut b = input("D4", 1.0, 2.0);
        b.volume = Some(-5.0);

        let notes = sanitize_notes(&[a, b]).unwrap();
        assert_eq!(notes[0].volume, MAX_VOLUME);
        assert_eq!(notes[1].volume, MIN_VOLUME);
    }

    #[test]
    fn volume_defaults_to_100() {
        let notes = sanitize_notes(&[input("C4", 0.0, 1.0)]).unwrap();
        assert_eq!(notes[0].volume, 100);
    }

    #[test]
    fn nan_volume_rejected() {
        let mut a = input("C4", 0.0, 1.0);
        a.volume = Some(f64::NAN);
        assert_matches!(sanitize_notes(&[a]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn end_before_start_rejected() {
        let result = sanitize_notes(&[input("C4", 1.0, 0.5)]);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("note 0"));
    }

    #[test]
    fn negative_start_rejected() {
        assert_matches!(
            sanitize_notes(&[input("C4", -0.1, 1.0)]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn duration_reconciled_within_epsilon() {
        let mut a = input("C4", 0.0, 1.0);
        a.duration = Some(1.0004);
        let notes = sanitize_notes(&[a]).unwrap();
        assert_eq!(notes[0].duration, 1.0004);
    }

    #[test]
    fn duration_mismatch_rejected() {
        let mut a = input("C4", 0.0, 1.0);
        a.duration = Some(1.5);
        assert_matches!(sanitize_notes(&[a]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn missing_duration_filled_from_span() {
        let notes = sanitize_notes(&[input("C4", 0.5, 2.0)]).unwrap();
        assert_eq!(notes[0].duration, 1.5);
    }

    #[test]
    fn note_name_alias_accepted() {
        let raw = serde_json::json!({
            "note_name": "c♯4",
            "start": 0.0,
            "end": 1.0,
            "volume": 80
        });
        let parsed: NoteInput = serde_json::from_value(raw).unwrap();
        let notes = sanitize_notes(&[parsed]).unwrap();
        assert_eq!(notes[0].note, "C#4");
        assert_eq!(notes[0].volume, 80);
    }

    #[test]
    fn expressive_flags_default_false() {
        let notes = sanitize_notes(&[input("C4", 0.0, 1.0)]).unwrap();
        assert!(!notes[0].vibrato);
        assert!(!notes[0].breathy);
        assert_eq!(notes[0].confidence, DEFAULT_CONFIDENCE);
    }
}
