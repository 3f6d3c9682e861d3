//! Error types for device/document conversion
//!
//! Every failure in the conversion core is reported through [`ConvertError`]
//! and propagates unchanged to the entry points in [`crate::api`]. There is no
//! partial success: an operation either completes or fails with the first
//! error detected. Absent input fields fall back to defaults instead of
//! erroring; malformed ones do not.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Top-level conversion error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConvertError {
    /// Text did not parse as `<letter>[#|b]<octave>` with octave in [-2, 10]
    #[error("{0:?} is not a valid note. Try something like \"C3\", \"Bb0\" or \"F#-1\"")]
    InvalidPitchSyntax(String),

    /// Octave outside the range allowed by the reference octave
    #[error("octave {octave} is outside the allowed range [{low}, {high}] for middle C == {middle_c}")]
    OctaveOutOfRange {
        octave: i32,
        low: i32,
        high: i32,
        middle_c: &'static str,
    },

    /// A naive note was encoded with no reference octave in reach
    #[error("a note without a reference octave cannot be encoded; supply `middle_c` on the note or through settings")]
    MissingReference,

    /// A key column's decoded pitches span more than one octave
    #[error("keyswitch column `{field}` uses pitches from more than one octave ({octaves:?}); a single shared root octave is required")]
    MultiOctaveKeyswitchSpan { field: &'static str, octaves: Vec<i32> },

    /// A key column is mapped but has no root octave to encode against
    #[error("`root_octaves.{0}` must be defined since the `{0}` column is mapped")]
    UndefinedRootOctave(&'static str),

    /// A color label has no entry in the settings color table
    #[error("color label {0:?} is not defined in the settings color table")]
    UnresolvedColor(String),

    /// A color string is not of the form `#RRGGBB`
    #[error("{0:?} is not a valid `#RRGGBB` color")]
    InvalidColor(String),

    /// An index or value fell outside a fixed enum/menu bijection
    #[error("{value} is not a valid {domain} option")]
    EnumMappingFailure { domain: &'static str, value: i64 },

    /// More keyswitch rows than the device format can address
    #[error("instrument {instrument:?} has more than 64 keyswitches ({count})")]
    TooManyKeyswitches { instrument: String, count: usize },

    /// A required sub-settings group is absent from the whole cascade
    #[error("`{0}` must exist on a settings object somewhere in the hierarchy")]
    UndefinedSubSettings(&'static str),

    /// A cell value's runtime type does not match its column
    #[error("column `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// The document text form failed to (de)serialize
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The device record text form failed to (de)serialize
    #[error("malformed device record: {0}")]
    MalformedRecord(String),

    /// File writing failed at the output boundary
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::MalformedDocument(err.to_string())
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::MalformedRecord(err.to_string())
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io(err.to_string())
    }
}
