use crate::types::interval::{Interval, Spanned};
use crate::types::pitch::pitch_name;
use std::fmt;

/// Which hand a note has been assigned to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hand {
    Left,
    Right,
    #[default]
    Unassigned,
}

/// A pitch bound to a closed tick interval, plus held/hand metadata.
///
/// Identity is the full tuple, not reference: several notes may share one
/// interval (a chord). Notes are never mutated in place; later pipeline
/// stages produce derived copies via [`Note::held`] and [`Note::with_hand`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    interval: Interval,
    pitch: u8,
    held_over: bool,
    hand: Hand,
}

impl Note {
    pub fn new(interval: Interval, pitch: u8) -> Self {
        Self {
            interval,
            pitch,
            held_over: false,
            hand: Hand::Unassigned,
        }
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn start(&self) -> u32 {
        self.interval.low()
    }

    pub fn stop(&self) -> u32 {
        self.interval.high()
    }

    /// True if this copy of the note carried over from an earlier column.
    /// Held-over status is a property of the column view, not of the note's
    /// permanent identity.
    pub fn is_held_over(&self) -> bool {
        self.held_over
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Derived copy with the held-over flag set.
    pub fn held(&self, held_over: bool) -> Self {
        Self {
            held_over,
            ..self.clone()
        }
    }

    /// Derived copy assigned to `hand`.
    pub fn with_hand(&self, hand: Hand) -> Self {
        Self {
            hand,
            ..self.clone()
        }
    }

    /// Derived copy over a different interval (e.g. trimmed at a measure
    /// boundary).
    pub fn with_interval(&self, interval: Interval) -> Self {
        Self {
            interval,
            ..self.clone()
        }
    }
}

impl Spanned for Note {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_name(self.pitch), self.interval)?;
        if self.held_over {
            write!(f, " (held)")?;
        }
        Ok(())
    }
}
