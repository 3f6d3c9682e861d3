//! Musical pitch representation and the device pitch code
//!
//! The device format stores pitches as a single non-negative integer code.
//! Which octave the code `60` lands in depends on a configurable reference
//! octave (the "middle C" convention, [`MiddleC`]): the code is
//! `12 * (octave + reference_offset) + semitone`.
//!
//! A [`Note`] may carry its own reference or be "naive". A naive note cannot
//! be encoded on its own; encode sites thread the enclosing settings'
//! reference through [`Note::to_code_with`] instead of relying on any ambient
//! state.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConvertError, Result};

/// Enumeration of the 17 note spellings the document format accepts
///
/// - 7 naturals (C, D, E, F, G, A, B)
/// - 5 sharps (C#, D#, F#, G#, A#)
/// - 5 flats (Db, Eb, Gb, Ab, Bb)
///
/// Enharmonic spellings map to the same semitone offset; spelling is
/// preserved through serialization but ignored by pitch equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    #[serde(rename = "C#")]
    Cs,
    Db,
    D,
    #[serde(rename = "D#")]
    Ds,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    Fs,
    Gb,
    G,
    #[serde(rename = "G#")]
    Gs,
    Ab,
    A,
    #[serde(rename = "A#")]
    As,
    Bb,
    B,
}

/// Semitone position -> preferred spelling, matching the device-format
/// convention: sharps everywhere except Eb and Bb.
const SEMITONE_SPELLINGS: [NoteName; 12] = [
    NoteName::C,
    NoteName::Cs,
    NoteName::D,
    NoteName::Eb,
    NoteName::E,
    NoteName::F,
    NoteName::Fs,
    NoteName::G,
    NoteName::Gs,
    NoteName::A,
    NoteName::Bb,
    NoteName::B,
];

impl NoteName {
    /// Semitone offset within the octave (0-11); enharmonic spellings agree
    pub fn semitone(&self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::Cs | NoteName::Db => 1,
            NoteName::D => 2,
            NoteName::Ds | NoteName::Eb => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::Fs | NoteName::Gb => 6,
            NoteName::G => 7,
            NoteName::Gs | NoteName::Ab => 8,
            NoteName::A => 9,
            NoteName::As | NoteName::Bb => 10,
            NoteName::B => 11,
        }
    }

    /// Canonical spelling for a semitone position
    pub fn from_semitone(semitone: i32) -> NoteName {
        SEMITONE_SPELLINGS[semitone.rem_euclid(12) as usize]
    }

    /// Convert the note name to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::Db => "Db",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::Eb => "Eb",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::Gb => "Gb",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::Ab => "Ab",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::Bb => "Bb",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "C" => Ok(NoteName::C),
            "C#" => Ok(NoteName::Cs),
            "Db" => Ok(NoteName::Db),
            "D" => Ok(NoteName::D),
            "D#" => Ok(NoteName::Ds),
            "Eb" => Ok(NoteName::Eb),
            "E" => Ok(NoteName::E),
            "F" => Ok(NoteName::F),
            "F#" => Ok(NoteName::Fs),
            "Gb" => Ok(NoteName::Gb),
            "G" => Ok(NoteName::G),
            "G#" => Ok(NoteName::Gs),
            "Ab" => Ok(NoteName::Ab),
            "A" => Ok(NoteName::A),
            "A#" => Ok(NoteName::As),
            "Bb" => Ok(NoteName::Bb),
            "B" => Ok(NoteName::B),
            _ => Err(ConvertError::InvalidPitchSyntax(s.to_string())),
        }
    }
}

/// The reference octave: which octave number middle C (code 60) falls in
///
/// The device allows three conventions. Each fixes both the code offset and
/// the range of octaves that remain addressable by codes 0-127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MiddleC {
    C3,
    C4,
    C5,
}

impl MiddleC {
    /// Octave number of the lowest addressable octave, used as the code
    /// offset: `code = 12 * (octave + offset) + semitone`
    pub fn offset(&self) -> i32 {
        match self {
            MiddleC::C3 => 2,
            MiddleC::C4 => 1,
            MiddleC::C5 => 0,
        }
    }

    /// Inclusive octave range addressable under this reference
    pub fn octave_range(&self) -> (i32, i32) {
        match self {
            MiddleC::C3 => (-2, 8),
            MiddleC::C4 => (-1, 9),
            MiddleC::C5 => (0, 10),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MiddleC::C3 => "C3",
            MiddleC::C4 => "C4",
            MiddleC::C5 => "C5",
        }
    }
}

impl Default for MiddleC {
    fn default() -> Self {
        MiddleC::C3
    }
}

impl fmt::Display for MiddleC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MiddleC {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "C3" => Ok(MiddleC::C3),
            "C4" => Ok(MiddleC::C4),
            "C5" => Ok(MiddleC::C5),
            _ => Err(ConvertError::InvalidPitchSyntax(s.to_string())),
        }
    }
}

/// Octave range accepted for notes that carry no reference yet. The union of
/// the three per-reference ranges.
const NAIVE_OCTAVE_RANGE: (i32, i32) = (-2, 10);

/// A pitch: spelling, octave, and (optionally) the reference octave it is
/// interpreted under
///
/// Notes serialize as their text form (`"Eb3"`, `"C-2"`); the reference is
/// never part of the serialized form and deserialized notes are naive.
#[derive(Debug, Clone, Copy)]
pub struct Note {
    pub name: NoteName,
    pub octave: i32,
    pub middle_c: Option<MiddleC>,
}

impl Note {
    /// Create a note, validating the octave against the reference's range
    /// (or the widest range for a naive note)
    pub fn new(name: NoteName, octave: i32, middle_c: Option<MiddleC>) -> Result<Note> {
        let (low, high) = match middle_c {
            Some(reference) => reference.octave_range(),
            None => NAIVE_OCTAVE_RANGE,
        };
        if octave < low || octave > high {
            return Err(ConvertError::OctaveOutOfRange {
                octave,
                low,
                high,
                middle_c: middle_c.map(|m| m.as_str()).unwrap_or("(none)"),
            });
        }
        Ok(Note {
            name,
            octave,
            middle_c,
        })
    }

    /// Decode a device pitch code under the given reference
    pub fn from_code(code: i64, middle_c: MiddleC) -> Result<Note> {
        let name = NoteName::from_semitone(code.rem_euclid(12) as i32);
        let octave = code.div_euclid(12) as i32 - middle_c.offset();
        Note::new(name, octave, Some(middle_c))
    }

    /// Encode to the device pitch code. Fails for a naive note.
    pub fn to_code(&self) -> Result<i64> {
        let middle_c = self.middle_c.ok_or(ConvertError::MissingReference)?;
        Ok(self.code_under(middle_c))
    }

    /// Encode to the device pitch code, substituting `fallback` for a naive
    /// note. A note that carries its own reference keeps it.
    pub fn to_code_with(&self, fallback: MiddleC) -> i64 {
        self.code_under(self.middle_c.unwrap_or(fallback))
    }

    /// Attach a reference to this note, revalidating the octave
    pub fn with_reference(self, middle_c: MiddleC) -> Result<Note> {
        Note::new(self.name, self.octave, Some(middle_c))
    }

    fn code_under(&self, middle_c: MiddleC) -> i64 {
        (12 * (self.octave + middle_c.offset()) + self.name.semitone()) as i64
    }
}

/// Pitch equality: by encoded code when both notes carry a reference (so
/// enharmonic spellings are equal and references are part of identity), and
/// structurally by (semitone, octave) when either side is naive.
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        match (self.middle_c, other.middle_c) {
            (Some(a), Some(b)) => self.code_under(a) == other.code_under(b),
            _ => {
                self.name.semitone() == other.name.semitone() && self.octave == other.octave
            }
        }
    }
}

/// Ordering follows equality: by code when both notes carry a reference,
/// structurally by (octave, semitone) when either side is naive.
impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.middle_c, other.middle_c) {
            (Some(a), Some(b)) => Some(self.code_under(a).cmp(&other.code_under(b))),
            _ => Some(
                (self.octave, self.name.semitone()).cmp(&(other.octave, other.name.semitone())),
            ),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

impl FromStr for Note {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConvertError::InvalidPitchSyntax(s.to_string());

        let name_len = match s.as_bytes().get(1) {
            Some(b'#') | Some(b'b') => 2,
            _ => 1,
        };
        if s.len() <= name_len {
            return Err(invalid());
        }
        let name: NoteName = s[..name_len].parse().map_err(|_| invalid())?;
        let octave: i32 = s[name_len..].parse().map_err(|_| invalid())?;
        if octave < NAIVE_OCTAVE_RANGE.0 || octave > NAIVE_OCTAVE_RANGE.1 {
            return Err(invalid());
        }
        Note::new(name, octave, None)
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MIDDLE_CS: [MiddleC; 3] = [MiddleC::C3, MiddleC::C4, MiddleC::C5];

    #[test]
    fn test_code_roundtrip_all_references() {
        for middle_c in ALL_MIDDLE_CS {
            for code in 0..=127 {
                let note = Note::from_code(code, middle_c).unwrap();
                assert_eq!(note.to_code().unwrap(), code, "code {code} under {middle_c}");
            }
        }
    }

    #[test]
    fn test_from_code_uses_flat_spellings_for_eb_and_bb() {
        let eb = Note::from_code(3, MiddleC::C3).unwrap();
        assert_eq!(eb.name, NoteName::Eb);
        let bb = Note::from_code(10, MiddleC::C3).unwrap();
        assert_eq!(bb.name, NoteName::Bb);
        let cs = Note::from_code(1, MiddleC::C3).unwrap();
        assert_eq!(cs.name, NoteName::Cs);
    }

    #[test]
    fn test_parse_roundtrip() {
        for text in ["C3", "Bb0", "F#-1", "C-2", "A#10", "Gb8"] {
            let note: Note = text.parse().unwrap();
            assert_eq!(note.to_string(), text);
            assert_eq!(note.middle_c, None);
        }
    }

    #[test]
    fn test_parse_invalid() {
        for text in ["H2", "C", "Cb3", "E#4", "C#", "Fb1", "C11", "B-3", "c3", ""] {
            assert!(
                text.parse::<Note>().is_err(),
                "{text:?} should not parse as a note"
            );
        }
    }

    #[test]
    fn test_enharmonic_spellings_are_equal() {
        let fs: Note = "F#3".parse().unwrap();
        let gb: Note = "Gb3".parse().unwrap();
        assert_eq!(fs, gb);
        // Spellings stay distinct in the text form
        assert_ne!(fs.to_string(), gb.to_string());

        let fs = fs.with_reference(MiddleC::C4).unwrap();
        let gb = gb.with_reference(MiddleC::C4).unwrap();
        assert_eq!(fs, gb);
        assert_eq!(fs.to_code().unwrap(), gb.to_code().unwrap());
    }

    #[test]
    fn test_reference_is_part_of_identity() {
        let under_c3 = Note::new(NoteName::A, 2, Some(MiddleC::C3)).unwrap();
        let under_c4 = Note::new(NoteName::A, 2, Some(MiddleC::C4)).unwrap();
        assert_ne!(under_c3, under_c4);
        // Codes differ by 12 per step of reference offset
        assert_eq!(
            under_c3.to_code().unwrap() - under_c4.to_code().unwrap(),
            12
        );
    }

    #[test]
    fn test_cross_reference_equality_is_true_pitch_equality() {
        // C1 under C3 and C2 under C4 are the same sounding pitch (code 36)
        let a = Note::new(NoteName::C, 1, Some(MiddleC::C3)).unwrap();
        let b = Note::new(NoteName::C, 2, Some(MiddleC::C4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_octave_validation_per_reference() {
        assert!(Note::new(NoteName::C, -2, Some(MiddleC::C3)).is_ok());
        assert!(Note::new(NoteName::C, -2, Some(MiddleC::C4)).is_err());
        assert!(Note::new(NoteName::C, 9, Some(MiddleC::C4)).is_ok());
        assert!(Note::new(NoteName::C, 9, Some(MiddleC::C3)).is_err());
        assert!(Note::new(NoteName::C, 10, Some(MiddleC::C5)).is_ok());
        assert!(Note::new(NoteName::C, -1, Some(MiddleC::C5)).is_err());
    }

    #[test]
    fn test_naive_note_cannot_encode() {
        let naive: Note = "C2".parse().unwrap();
        assert_eq!(naive.to_code(), Err(ConvertError::MissingReference));
    }

    #[test]
    fn test_to_code_with_fallback() {
        let naive: Note = "C0".parse().unwrap();
        assert_eq!(naive.to_code_with(MiddleC::C5), 0);
        assert_eq!(naive.to_code_with(MiddleC::C3), 24);

        // A note with its own reference ignores the fallback
        let aware = Note::new(NoteName::C, 0, Some(MiddleC::C5)).unwrap();
        assert_eq!(aware.to_code_with(MiddleC::C3), 0);
    }

    #[test]
    fn test_ordering_by_code() {
        let low = Note::new(NoteName::B, 1, Some(MiddleC::C3)).unwrap();
        let high = Note::new(NoteName::C, 2, Some(MiddleC::C3)).unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_ordering_agrees_with_equality_for_mixed_pairs() {
        let naive: Note = "C3".parse().unwrap();
        let aware = Note::new(NoteName::C, 3, Some(MiddleC::C4)).unwrap();
        assert_eq!(naive, aware);
        assert_eq!(naive.partial_cmp(&aware), Some(Ordering::Equal));

        let higher = Note::new(NoteName::D, 3, Some(MiddleC::C4)).unwrap();
        assert!(naive < higher);
        assert_ne!(naive, higher);
    }

    #[test]
    fn test_serde_string_form() {
        let note = Note::new(NoteName::Eb, 3, Some(MiddleC::C3)).unwrap();
        let yaml = serde_yaml::to_string(&note).unwrap();
        assert_eq!(yaml.trim(), "Eb3");

        let parsed: Note = serde_yaml::from_str("Eb3").unwrap();
        assert_eq!(parsed, note);
        assert_eq!(parsed.middle_c, None);
    }
}
