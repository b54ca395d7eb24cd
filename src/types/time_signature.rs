use crate::types::interval::{Interval, Spanned};
use std::fmt;

/// A time signature in force over a region of the tick timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
    pub interval: Interval,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8, interval: Interval) -> Self {
        Self {
            numerator,
            denominator,
            interval,
        }
    }

    /// Length of one measure of this signature, in ticks:
    /// `numerator * (4 / denominator) * ticks-per-quarter`.
    ///
    /// The float detour keeps signatures like 3/8 or 2/2 exact at any
    /// power-of-two denominator.
    pub fn ticks_per_measure(&self, tpq: u32) -> u32 {
        let quarters = self.numerator as f64 * 4.0 / self.denominator as f64;
        (quarters * tpq as f64).round() as u32
    }

    /// Pickup comparison: fewer beats at the same beat unit. Signatures with
    /// different denominators are not comparable and never count as smaller.
    pub fn is_smaller_than(&self, other: &TimeSignature) -> bool {
        self.denominator == other.denominator && self.numerator < other.numerator
    }

    /// True if numerator and denominator match, wherever the regions lie.
    pub fn same_signature(&self, other: &TimeSignature) -> bool {
        self.numerator == other.numerator && self.denominator == other.denominator
    }
}

impl Spanned for TimeSignature {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
