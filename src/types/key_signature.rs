use crate::types::interval::{Interval, Spanned};
use std::fmt;

/// Major or minor mode of a key signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

// Spelled tonics indexed by accidentals + 7, majors first.
const MAJOR_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

/// A key signature in force over a region of the tick timeline.
///
/// `accidentals` counts sharps (positive) or flats (negative), -7..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySignature {
    pub accidentals: i8,
    pub mode: Mode,
    pub interval: Interval,
}

impl KeySignature {
    pub fn new(accidentals: i8, mode: Mode, interval: Interval) -> Self {
        Self {
            accidentals,
            mode,
            interval,
        }
    }

    /// C major over the given interval; the fallback when a piece carries no
    /// key signature data at all.
    pub fn c_major(interval: Interval) -> Self {
        Self::new(0, Mode::Major, interval)
    }

    /// Spelled tonic name, e.g. `"Eb"` for three flats major.
    pub fn name(&self) -> &'static str {
        let idx = (self.accidentals + 7) as usize;
        match self.mode {
            Mode::Major => MAJOR_NAMES[idx],
            Mode::Minor => MINOR_NAMES[idx],
        }
    }
}

impl Spanned for KeySignature {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{} major", self.name()),
            Mode::Minor => write!(f, "{} minor", self.name()),
        }
    }
}
