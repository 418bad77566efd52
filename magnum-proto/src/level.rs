//! Level identifier mapping
//!
//! Quartz-protocol routers address each signal plane ("level") by a
//! single character; locally we index levels densely from zero. The
//! alphabet is fixed by the protocol: `V` is the video/primary plane at
//! index 0, followed by the audio planes.
//!
//! `Level` is a validated newtype: it can only be built through
//! [`Level::from_code`] or [`Level::from_index`], so `code()` and
//! `index()` are infallible.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// The fixed alphabet of level codes, in dense-index order.
pub const LEVEL_CODES: &str = "VABCDEFGHIJKLMNOPQRSTUWXYZ";

/// Number of levels addressable by the protocol.
pub const MAX_LEVELS: usize = 26;

/// A validated signal level: a dense index bijective with its wire code.
///
/// Serializes as its wire code; deserialization goes through the same
/// validation as [`Level::from_code`], so no out-of-alphabet value can
/// enter through serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Level(u8);

impl Level {
    /// The video/primary level (wire code `V`, index 0).
    pub const VIDEO: Level = Level(0);

    /// Map a wire code to a level.
    ///
    /// Codes outside the fixed alphabet are a mapping error, never an
    /// out-of-range index.
    pub fn from_code(code: char) -> Result<Self, LevelError> {
        LEVEL_CODES
            .find(code)
            .map(|idx| Level(idx as u8))
            .ok_or(LevelError::UnknownCode(code))
    }

    /// Map a dense index to a level.
    pub fn from_index(index: usize) -> Result<Self, LevelError> {
        if index < MAX_LEVELS {
            Ok(Level(index as u8))
        } else {
            Err(LevelError::IndexOutOfRange(index))
        }
    }

    /// The dense zero-based index of this level.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The single-character wire code of this level.
    pub fn code(self) -> char {
        LEVEL_CODES.as_bytes()[self.0 as usize] as char
    }
}

impl TryFrom<char> for Level {
    type Error = LevelError;

    fn try_from(code: char) -> Result<Self, LevelError> {
        Level::from_code(code)
    }
}

impl From<Level> for char {
    fn from(level: Level) -> char {
        level.code()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn video_is_index_zero() {
        assert_eq!(Level::from_code('V').unwrap(), Level::VIDEO);
        assert_eq!(Level::VIDEO.index(), 0);
        assert_eq!(Level::VIDEO.code(), 'V');
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert!(matches!(
            Level::from_code('v'),
            Err(LevelError::UnknownCode('v'))
        ));
        assert!(matches!(
            Level::from_code('!'),
            Err(LevelError::UnknownCode('!'))
        ));
        // 'V' occupies the slot the plain alphabet would give 'V'; there
        // is no second V, so every alphabet character is still covered.
        assert!(Level::from_code('Z').is_ok());
    }

    #[test]
    fn index_out_of_range_is_an_error() {
        assert!(Level::from_index(MAX_LEVELS - 1).is_ok());
        assert!(matches!(
            Level::from_index(MAX_LEVELS),
            Err(LevelError::IndexOutOfRange(26))
        ));
    }

    #[test]
    fn round_trips_over_full_alphabet() {
        for (idx, code) in LEVEL_CODES.chars().enumerate() {
            let level = Level::from_code(code).unwrap();
            assert_eq!(level.index(), idx);
            assert_eq!(Level::from_index(idx).unwrap().code(), code);
        }
    }

    #[test]
    fn serde_round_trips_as_wire_code() {
        let level = Level::from_code('A').unwrap();
        let json = serde_json::to_string(&level).unwrap();
        assert_eq!(json, "\"A\"");
        assert_eq!(serde_json::from_str::<Level>(&json).unwrap(), level);
    }

    #[test]
    fn serde_rejects_values_outside_the_alphabet() {
        // Lowercase code is not in the alphabet.
        assert!(serde_json::from_str::<Level>("\"v\"").is_err());
        // A raw index is not a valid representation at all; it must not
        // construct a level past the end of the alphabet.
        assert!(serde_json::from_str::<Level>("200").is_err());
    }

    proptest! {
        #[test]
        fn from_code_never_panics(c in any::<char>()) {
            let _ = Level::from_code(c);
        }

        #[test]
        fn index_round_trip(idx in 0usize..MAX_LEVELS) {
            let level = Level::from_index(idx).unwrap();
            prop_assert_eq!(Level::from_code(level.code()).unwrap().index(), idx);
        }
    }
}
