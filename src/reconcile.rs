//! Pairs raw start/stop events of one kind into closed-interval notes.

use crate::Result;
use crate::error::Error;
use crate::types::interval::Interval;
use crate::types::note::Note;
use crate::types::pitch::pitch_name;
use std::fmt;

/// One raw note-on or note-off, as delivered by the event source. Which of
/// the two it is comes from the stream it arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub tick: u32,
    pub pitch: u8,
}

impl NoteEvent {
    pub fn new(tick: u32, pitch: u8) -> Self {
        Self { tick, pitch }
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ tick {}", pitch_name(self.pitch), self.tick)
    }
}

/// Pairs every start with the first remaining stop of the same pitch at a
/// strictly later tick, in tick order.
///
/// A start and stop at the *same* tick are never a valid pair (a zero-length
/// note is never produced); the scan keeps looking past them. When two starts
/// of one pitch compete for a stop, the earliest surviving start wins the
/// earliest valid stop. The pairing is driven purely by
/// nearest-available-stop-in-scan-order, not by duration matching, so
/// ambiguous overlapping unisons resolve deterministically but not always
/// musically; notation software output is known to produce such streams.
///
/// Any events left unconsumed afterwards make the whole call fail with
/// [`Error::UnpairedEvents`], carrying the full leftover lists of both kinds.
pub fn pair_events(starts: &[NoteEvent], stops: &[NoteEvent]) -> Result<Vec<Note>> {
    let mut starts: Vec<NoteEvent> = starts.to_vec();
    let mut stops: Vec<NoteEvent> = stops.to_vec();
    starts.sort_by_key(|event| event.tick);
    stops.sort_by_key(|event| event.tick);

    let mut notes = Vec::with_capacity(starts.len());
    let mut unpaired_starts = Vec::new();

    for start in starts {
        let found = stops
            .iter()
            .position(|stop| stop.pitch == start.pitch && stop.tick > start.tick);

        match found {
            Some(i) => {
                let stop = stops.remove(i);
                notes.push(Note::new(Interval::new(start.tick, stop.tick)?, start.pitch));
            }
            None => unpaired_starts.push(start),
        }
    }

    if !unpaired_starts.is_empty() || !stops.is_empty() {
        return Err(Error::UnpairedEvents {
            starts: unpaired_starts,
            stops,
        });
    }

    Ok(notes)
}
