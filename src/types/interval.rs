use crate::Result;
use crate::error::Error;
use std::fmt;

/// A closed range `[low, high]` on the non-negative integer tick timeline.
///
/// Valid intervals always satisfy `high > low` (minimum span of one tick).
/// Intervals are immutable; the "mutating" operations return new values.
///
/// Natural order is by `low`, with `high` breaking ties. The derived `Ord`
/// relies on the field declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    low: u32,
    high: u32,
}

impl Interval {
    /// Creates the interval `[low, high]`.
    ///
    /// Fails with [`Error::InvalidInterval`] unless `high > low`.
    pub fn new(low: u32, high: u32) -> Result<Self> {
        if high <= low {
            return Err(Error::InvalidInterval { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// Half-open span. `[0, 479]` has length 479.
    pub fn length(&self) -> u32 {
        self.high - self.low
    }

    /// Inclusive span. `[0, 479]` has duration 480.
    pub fn duration(&self) -> u32 {
        self.length() + 1
    }

    /// True if the two closed intervals share at least one tick.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.low <= other.high && other.low <= self.high
    }

    /// True if `tick` falls within this interval, endpoints included.
    pub fn contains_point(&self, tick: u32) -> bool {
        self.low <= tick && tick <= self.high
    }

    /// True if `other` lies fully within this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.low <= other.low && other.high <= self.high
    }

    /// Returns a copy moved by `offset` ticks. Fails if either endpoint
    /// would leave the non-negative timeline.
    pub fn shifted(&self, offset: i64) -> Result<Self> {
        let low = self.low as i64 + offset;
        let high = self.high as i64 + offset;
        if low < 0 || high < 0 || high > u32::MAX as i64 {
            return Err(Error::InvalidInterval {
                low: self.low,
                high: self.high,
            });
        }
        Interval::new(low as u32, high as u32)
    }

    /// Returns a copy with the same `low` and a `high` grown by `amount`.
    pub fn grown(&self, amount: u32) -> Self {
        Self {
            low: self.low,
            high: self.high + amount,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Capability for anything that associates itself with an [`Interval`]:
/// a pitched note, a time-signature region, a column, a measure.
pub trait Spanned {
    fn interval(&self) -> Interval;
}

impl Spanned for Interval {
    fn interval(&self) -> Interval {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_and_zero_length() {
        assert!(Interval::new(10, 10).is_err());
        assert!(Interval::new(10, 5).is_err());
        assert!(Interval::new(0, 0).is_err());
        assert_eq!(
            Interval::new(7, 3),
            Err(Error::InvalidInterval { low: 7, high: 3 })
        );
    }

    #[test]
    fn test_spans() {
        let iv = Interval::new(0, 479).unwrap();
        assert_eq!(iv.length(), 479);
        assert_eq!(iv.duration(), 480);
    }

    #[test]
    fn test_overlap_and_containment() {
        let a = Interval::new(0, 10).unwrap();
        let b = Interval::new(10, 20).unwrap();
        let c = Interval::new(11, 20).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));

        assert!(a.contains_point(0));
        assert!(a.contains_point(10));
        assert!(!a.contains_point(11));

        assert!(Interval::new(0, 30).unwrap().contains(&c));
        assert!(!a.contains(&b));
    }

    #[test]
    fn test_natural_order() {
        let mut list = vec![
            Interval::new(5, 20).unwrap(),
            Interval::new(0, 10).unwrap(),
            Interval::new(5, 15).unwrap(),
        ];
        list.sort();
        assert_eq!(list[0], Interval::new(0, 10).unwrap());
        assert_eq!(list[1], Interval::new(5, 15).unwrap());
        assert_eq!(list[2], Interval::new(5, 20).unwrap());
    }

    #[test]
    fn test_shifted_and_grown() {
        let iv = Interval::new(480, 959).unwrap();
        assert_eq!(iv.shifted(480).unwrap(), Interval::new(960, 1439).unwrap());
        assert_eq!(iv.shifted(-480).unwrap(), Interval::new(0, 479).unwrap());
        assert!(iv.shifted(-481).is_err());

        assert_eq!(iv.grown(480), Interval::new(480, 1439).unwrap());
        assert_eq!(iv.grown(0), iv);
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::new(0, 479).unwrap().to_string(), "[0, 479]");
    }
}
