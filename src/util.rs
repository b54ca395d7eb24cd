use crate::Result;
use crate::error::Error;
use crate::types::interval::Interval;

/// Materializes consecutive intervals from a set of start ticks.
///
/// Sorted distinct points `{t0 < t1 < ... < tn}` plus an explicit final tick
/// produce `[t0, t1-1], [t1, t2-1], ..., [tn, final_tick]`. This is how both
/// column and metadata-region boundaries become intervals.
///
/// Fails with [`Error::InvalidStartTicks`] unless `final_tick > tn`.
pub fn intervals_from_start_ticks(points: &[u32], final_tick: u32) -> Result<Vec<Interval>> {
    let mut points = points.to_vec();
    points.sort_unstable();
    points.dedup();

    let Some(&last) = points.last() else {
        return Ok(Vec::new());
    };
    if final_tick <= last {
        return Err(Error::InvalidStartTicks {
            last_start: last,
            final_tick,
        });
    }

    let mut out = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        out.push(Interval::new(pair[0], pair[1] - 1)?);
    }
    out.push(Interval::new(last, final_tick)?);
    Ok(out)
}

/// Assigns contiguous regions to raw timed metadata events: each event is in
/// force from its own tick up to the tick before the next one; the last runs
/// to `sequence_end`. Same-tick duplicates (the same meta event sent on
/// several tracks at once) collapse to the later-listed one.
pub fn regions_from_events<E, T>(
    events: &[(u32, E)],
    sequence_end: u32,
    make: impl Fn(&E, Interval) -> T,
) -> Result<Vec<T>>
where
    E: Clone,
{
    let mut events = events.to_vec();
    events.sort_by_key(|(tick, _)| *tick);

    let mut out = Vec::with_capacity(events.len());
    for (i, (tick, payload)) in events.iter().enumerate() {
        let next_tick = match events.get(i + 1) {
            Some((next, _)) => *next,
            None => sequence_end + 1,
        };
        if *tick == next_tick {
            continue;
        }
        out.push(make(payload, Interval::new(*tick, next_tick - 1)?));
    }
    Ok(out)
}

/// A value assignable exactly once. The single allowed transition is
/// `Unset -> Set(v)`; a second attempt is rejected and does not overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteOnce<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> WriteOnce<T> {
    /// Returns true if the value was stored, false if one was already set.
    pub fn set(&mut self, value: T) -> bool {
        match self {
            WriteOnce::Unset => {
                *self = WriteOnce::Set(value);
                true
            }
            WriteOnce::Set(_) => false,
        }
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            WriteOnce::Unset => None,
            WriteOnce::Set(value) => Some(value),
        }
    }
}
