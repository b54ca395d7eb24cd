//! Slices the note timeline into vertical columns and voices each column
//! across two hands.

use crate::Result;
use crate::index::IntervalIndex;
use crate::types::interval::{Interval, Spanned};
use crate::types::note::{Hand, Note};
use crate::util::intervals_from_start_ticks;
use std::fmt;

/// Hand-reach limits driving the voicing heuristic. The defaults model a
/// human hand: a major ninth of reach, six notes at most, split around
/// middle C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    /// Widest reach from a hand's anchor note, in semitones.
    pub span_max: u8,
    /// Most notes one hand claims.
    pub notes_max: usize,
    /// Single notes below this pitch go left, at or above it go right.
    pub split_pitch: u8,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            span_max: 14,
            notes_max: 6,
            split_pitch: 60,
        }
    }
}

/// All notes sounding within one boundary-to-boundary tick slice, split into
/// left hand, right hand, and an unplayable middle remainder.
///
/// Notes held over from an earlier column bleed in as derived copies flagged
/// [`Note::is_held_over`]; no new note ever starts inside a column, because
/// column boundaries are cut at every distinct note start tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    interval: Interval,
    notes: Vec<Note>,
    left: Vec<Note>,
    middle: Vec<Note>,
    right: Vec<Note>,
}

impl Column {
    pub fn new(notes: Vec<Note>, interval: Interval, policy: &SplitPolicy) -> Self {
        let mut notes: Vec<Note> = notes
            .into_iter()
            .map(|note| {
                if note.start() < interval.low() {
                    note.held(true)
                } else {
                    note
                }
            })
            .collect();
        notes.sort_by_key(|note| note.pitch());

        let (left, middle, right) = split_hands(&notes, policy);
        Self {
            interval,
            notes,
            left,
            middle,
            right,
        }
    }

    /// All notes, sorted by pitch.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn left(&self) -> &[Note] {
        &self.left
    }

    pub fn middle(&self) -> &[Note] {
        &self.middle
    }

    pub fn right(&self) -> &[Note] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// True when every member note's interval equals the column's own, i.e.
    /// nothing bleeds in from an earlier column or out past this one.
    pub fn is_pure(&self) -> bool {
        self.notes
            .iter()
            .all(|note| note.interval() == self.interval)
    }

    /// Distance between the lowest and highest notes, in semitones.
    pub fn span(&self) -> u8 {
        match (self.notes.first(), self.notes.last()) {
            (Some(low), Some(high)) => high.pitch() - low.pitch(),
            _ => 0,
        }
    }
}

impl Spanned for Column {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |notes: &[Note]| {
            notes
                .iter()
                .map(Note::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{} => LH: {}  ->  M: {}  ->  RH: {}",
            self.interval,
            join(&self.left),
            join(&self.middle),
            join(&self.right)
        )
    }
}

/// Greedy two-pointer voicing over pitch-sorted notes.
///
/// The left hand grows from the lowest pitch while within `span_max` of its
/// anchor (the first note claimed) and under `notes_max`; the right hand
/// grows symmetrically from the top, additionally stopping before it would
/// cross the left hand's highest claim. Whatever neither hand reaches lands
/// in the middle. A lone right-hand-empty cluster at or above the split
/// pitch transfers wholesale to the right hand: a one-handed high passage is
/// right-hand music.
fn split_hands(notes: &[Note], policy: &SplitPolicy) -> (Vec<Note>, Vec<Note>, Vec<Note>) {
    if notes.is_empty() {
        return (Vec::new(), Vec::new(), Vec::new());
    }

    if notes.len() == 1 {
        let note = &notes[0];
        return if note.pitch() < policy.split_pitch {
            (vec![note.with_hand(Hand::Left)], Vec::new(), Vec::new())
        } else {
            (Vec::new(), Vec::new(), vec![note.with_hand(Hand::Right)])
        };
    }

    let size = notes.len();
    let mut left = Vec::new();
    let mut right = Vec::new();

    // Fill up the left hand from the bottom.
    let mut i = 0;
    let anchor = notes[0].pitch();
    while i < size {
        if notes[i].pitch() - anchor > policy.span_max {
            break;
        }
        if left.len() == policy.notes_max {
            break;
        }
        left.push(notes[i].with_hand(Hand::Left));
        i += 1;
    }
    let left_thumb = i as isize - 1;

    // Fill up the right hand from the top, never crossing the left thumb.
    let mut j = size - 1;
    let anchor = notes[size - 1].pitch();
    while j > 0 {
        if anchor - notes[j].pitch() > policy.span_max {
            break;
        }
        if right.len() == policy.notes_max {
            break;
        }
        if j as isize <= left_thumb {
            break;
        }
        right.push(notes[j].with_hand(Hand::Right));
        j -= 1;
    }
    let right_thumb = j + 1;

    // Whatever is left between the thumbs is unreachable.
    let mut middle = Vec::new();
    let mut k = (left_thumb + 1) as usize;
    while k < right_thumb {
        middle.push(notes[k].clone());
        k += 1;
    }

    right.reverse();

    if right.is_empty() && left.first().is_some_and(|low| low.pitch() >= policy.split_pitch) {
        right = left
            .drain(..)
            .map(|note| note.with_hand(Hand::Right))
            .collect();
    }

    (left, middle, right)
}

/// Computes the column boundaries (every distinct note start tick, with the
/// final boundary provided explicitly), queries the note index per slice,
/// and voices each column.
pub fn assemble(
    index: &IntervalIndex<Note>,
    final_tick: u32,
    policy: &SplitPolicy,
) -> Result<Vec<Column>> {
    let starts: Vec<u32> = index
        .intervals()
        .iter()
        .map(|interval| interval.low())
        .collect();

    let mut columns = Vec::with_capacity(starts.len());
    for range in intervals_from_start_ticks(&starts, final_tick)? {
        let notes: Vec<Note> = index.query(range).into_iter().cloned().collect();
        columns.push(Column::new(notes, range, policy));
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iv(low: u32, high: u32) -> Interval {
        Interval::new(low, high).unwrap()
    }

    fn note(low: u32, high: u32, pitch: u8) -> Note {
        Note::new(iv(low, high), pitch)
    }

    fn column(pitches: &[u8]) -> Column {
        let notes = pitches.iter().map(|&p| note(0, 479, p)).collect();
        Column::new(notes, iv(0, 479), &SplitPolicy::default())
    }

    fn pitches(notes: &[Note]) -> Vec<u8> {
        notes.iter().map(Note::pitch).collect()
    }

    #[test]
    fn test_single_note_goes_by_split_pitch() {
        let below = column(&[59]);
        assert_eq!(pitches(below.left()), vec![59]);
        assert!(below.right().is_empty());
        assert_eq!(below.left()[0].hand(), Hand::Left);

        let at = column(&[60]);
        assert_eq!(pitches(at.right()), vec![60]);
        assert!(at.left().is_empty());
        assert_eq!(at.right()[0].hand(), Hand::Right);
    }

    #[test]
    fn test_partition_invariant() {
        for pitches_in in [
            vec![36, 40, 43, 72, 76, 79],
            vec![36, 48, 60, 72, 84],
            vec![60, 62, 64, 65, 67, 69, 71, 72],
            vec![21, 108],
        ] {
            let col = column(&pitches_in);
            assert_eq!(
                col.left().len() + col.middle().len() + col.right().len(),
                col.len(),
                "pitches {pitches_in:?}"
            );
            // no note lands in two hands
            let mut all = pitches(col.left());
            all.extend(pitches(col.middle()));
            all.extend(pitches(col.right()));
            all.sort_unstable();
            assert_eq!(all, pitches_in);
        }
    }

    #[test]
    fn test_two_chords_two_hands() {
        let col = column(&[36, 40, 43, 72, 76, 79]);
        assert_eq!(pitches(col.left()), vec![36, 40, 43]);
        assert!(col.middle().is_empty());
        assert_eq!(pitches(col.right()), vec![72, 76, 79]);
    }

    #[test]
    fn test_unreachable_middle() {
        let col = column(&[36, 48, 60, 72, 84]);
        assert_eq!(pitches(col.left()), vec![36, 48]);
        assert_eq!(pitches(col.middle()), vec![60]);
        assert_eq!(pitches(col.right()), vec![72, 84]);
    }

    #[test]
    fn test_note_cap() {
        // Seven reachable notes from the bottom: the left hand stops at six.
        let col = column(&[60, 61, 62, 63, 64, 65, 66]);
        assert_eq!(col.left().len() + col.right().len(), 7);
        assert!(col.left().len() <= 6);
        assert!(col.right().len() <= 6);
    }

    #[test]
    fn test_high_cluster_transfers_to_right_hand() {
        // Everything within one reach, all at or above middle C: the left
        // hand would claim it all, so it moves to the right hand.
        let col = column(&[60, 64, 67]);
        assert!(col.left().is_empty());
        assert_eq!(pitches(col.right()), vec![60, 64, 67]);
        assert!(col.right().iter().all(|n| n.hand() == Hand::Right));
    }

    #[test]
    fn test_low_cluster_stays_left() {
        let col = column(&[40, 44, 47]);
        assert_eq!(pitches(col.left()), vec![40, 44, 47]);
        assert!(col.right().is_empty());
    }

    #[test]
    fn test_assemble_marks_holdovers() {
        let index = IntervalIndex::build(vec![note(0, 959, 48), note(480, 959, 72)]);
        let columns = assemble(&index, 959, &SplitPolicy::default()).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].interval(), iv(0, 479));
        assert_eq!(columns[1].interval(), iv(480, 959));

        assert!(!columns[0].notes()[0].is_held_over());
        let held: Vec<bool> = columns[1].notes().iter().map(Note::is_held_over).collect();
        assert_eq!(held, vec![true, false]);

        // held-over status never leaks back into the note's native column
        assert!(columns[0].notes().iter().all(|n| !n.is_held_over()));
    }

    #[test]
    fn test_purity() {
        let index = IntervalIndex::build(vec![
            note(0, 479, 60),
            note(0, 479, 64),
            note(480, 1439, 48),
            note(960, 1439, 72),
        ]);
        let columns = assemble(&index, 1439, &SplitPolicy::default()).unwrap();

        assert_eq!(columns.len(), 3);
        assert!(columns[0].is_pure());
        // the bass extends past the second column and bleeds into the third
        assert!(!columns[1].is_pure());
        assert!(!columns[2].is_pure());
    }

    #[test]
    fn test_empty_column_is_valid() {
        let col = Column::new(Vec::new(), iv(0, 479), &SplitPolicy::default());
        assert!(col.is_empty());
        assert!(col.is_pure());
        assert_eq!(col.span(), 0);
    }
}
