use crate::types::interval::{Interval, Spanned};
use std::fmt;

/// A tempo in force over a region of the tick timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    pub bpm: u32,
    pub interval: Interval,
}

impl Tempo {
    pub fn new(bpm: u32, interval: Interval) -> Self {
        Self { bpm, interval }
    }
}

impl Spanned for Tempo {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm", self.bpm)
    }
}
