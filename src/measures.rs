//! Groups columns into time-signature-driven measures, with pickup
//! detection and write-once numbering.

use crate::Result;
use crate::columns::Column;
use crate::error::Error;
use crate::index::IntervalIndex;
use crate::types::interval::{Interval, Spanned};
use crate::types::key_signature::KeySignature;
use crate::types::note::Note;
use crate::types::tempo::Tempo;
use crate::types::time_signature::TimeSignature;
use crate::util::WriteOnce;
use std::fmt;

/// A metric grouping of columns bounded by time-signature-derived ticks.
///
/// `number` and `is_pickup` follow write-once semantics: the first
/// assignment sticks, later attempts are rejected without overwriting.
#[derive(Debug, Clone)]
pub struct Measure {
    interval: Interval,
    columns: Vec<Column>,
    time_signature: TimeSignature,
    key_signature: KeySignature,
    tempo: Tempo,
    number: WriteOnce<i32>,
    is_pickup: WriteOnce<bool>,
}

impl Measure {
    pub fn new(
        mut columns: Vec<Column>,
        interval: Interval,
        time_signature: TimeSignature,
        key_signature: KeySignature,
        tempo: Tempo,
    ) -> Self {
        columns.sort_by_key(|col| col.interval());
        Self {
            interval,
            columns,
            time_signature,
            key_signature,
            tempo,
            number: WriteOnce::Unset,
            is_pickup: WriteOnce::Unset,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn number(&self) -> Option<i32> {
        self.number.get().copied()
    }

    /// First assignment wins; returns false (and keeps the old value) on a
    /// second attempt.
    pub fn set_number(&mut self, number: i32) -> bool {
        self.number.set(number)
    }

    pub fn is_pickup(&self) -> bool {
        self.is_pickup.get().copied().unwrap_or(false)
    }

    /// Write-once, like [`Measure::set_number`].
    pub fn set_pickup(&mut self, is_pickup: bool) -> bool {
        self.is_pickup.set(is_pickup)
    }

    /// The measure's retained notes, sorted by pitch then interval.
    ///
    /// A column can span several measures, so a column query alone would
    /// hand this measure notes that finished long before it starts; any note
    /// whose `high` precedes the measure's `low` is excluded here without
    /// altering the column. Survivors that bleed across a boundary come back
    /// as derived copies clamped to the measure's own interval.
    pub fn notes(&self) -> Vec<Note> {
        self.collect_notes(|col| col.notes())
    }

    /// Retained left-hand notes, trimmed and deduplicated like
    /// [`Measure::notes`].
    pub fn left_notes(&self) -> Vec<Note> {
        self.collect_notes(|col| col.left())
    }

    pub fn middle_notes(&self) -> Vec<Note> {
        self.collect_notes(|col| col.middle())
    }

    pub fn right_notes(&self) -> Vec<Note> {
        self.collect_notes(|col| col.right())
    }

    fn collect_notes(&self, select: impl Fn(&Column) -> &[Note]) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .columns
            .iter()
            .flat_map(|col| select(col).iter())
            .filter(|note| note.stop() >= self.interval.low())
            .map(|note| self.trimmed(note))
            .collect();
        notes.sort_by_key(|note| (note.pitch(), note.interval()));
        notes.dedup_by(|a, b| a.pitch() == b.pitch() && a.interval() == b.interval());
        notes
    }

    /// Derived copy clamped to the measure's interval. A remainder of a
    /// single tick cannot be expressed as a closed interval and keeps the
    /// note's full span.
    fn trimmed(&self, note: &Note) -> Note {
        let low = note.start().max(self.interval.low());
        let high = note.stop().min(self.interval.high());
        match Interval::new(low, high) {
            Ok(clamped) if clamped != note.interval() => note.with_interval(clamped),
            _ => note.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }
}

impl Spanned for Measure {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.number().map_or("?".to_string(), |n| n.to_string());
        write!(
            f,
            "m.{} {}: {}, {} note(s)",
            number,
            self.interval,
            self.time_signature,
            self.len()
        )
    }
}

/// The metadata region in force at `point`. Points in a gap between regions
/// (or past the last) borrow the nearest preceding region; points before the
/// first region borrow the first.
fn active_at<T: Spanned + Copy>(index: &IntervalIndex<T>, point: u32) -> Option<T> {
    if let Some(hit) = index.query_point(point).first() {
        return Some(**hit);
    }
    let all = index.to_vec();
    match all.iter().rev().find(|elem| elem.interval().low() <= point) {
        Some(preceding) => Some(**preceding),
        None => all.first().map(|first| **first),
    }
}

/// Computes measure intervals by walking forward from tick 0, advancing by
/// the active signature's measure length each step until the walk passes
/// `final_tick`, then materializing consecutive boundary pairs. The last
/// measure may extend past the final sounding tick; only its start must lie
/// within the piece.
pub fn measure_intervals(
    signatures: &IntervalIndex<TimeSignature>,
    final_tick: u32,
    tpq: u32,
) -> Result<Vec<Interval>> {
    if signatures.is_empty() {
        return Err(Error::NoTimeSignatures);
    }

    let mut boundaries = vec![0u32];
    let mut marker = 0u32;
    loop {
        let Some(signature) = active_at(signatures, marker) else {
            return Err(Error::NoTimeSignatures);
        };
        let step = signature.ticks_per_measure(tpq);
        // a zero step would walk in place forever
        if step == 0 {
            return Err(Error::ZeroLengthMeasure {
                numerator: signature.numerator,
                denominator: signature.denominator,
            });
        }
        marker += step;
        boundaries.push(marker);
        if marker > final_tick {
            break;
        }
    }

    boundaries
        .windows(2)
        .map(|pair| Interval::new(pair[0], pair[1] - 1))
        .collect()
}

/// Builds the measure list: per interval, the overlapping columns plus the
/// metadata in force at the measure's start; then runs pickup detection and
/// numbering over the finished, ordered list.
pub fn assemble(
    columns: &IntervalIndex<Column>,
    signatures: &IntervalIndex<TimeSignature>,
    key_signatures: &IntervalIndex<KeySignature>,
    tempos: &IntervalIndex<Tempo>,
    final_tick: u32,
    tpq: u32,
) -> Result<Vec<Measure>> {
    let mut measures = Vec::new();

    for range in measure_intervals(signatures, final_tick, tpq)? {
        let matches: Vec<Column> = columns.query(range).into_iter().cloned().collect();
        let Some(signature) = active_at(signatures, range.low()) else {
            return Err(Error::NoTimeSignatures);
        };
        let key = active_at(key_signatures, range.low())
            .unwrap_or_else(|| KeySignature::c_major(range));
        let tempo = active_at(tempos, range.low()).unwrap_or_else(|| Tempo::new(120, range));
        measures.push(Measure::new(matches, range, signature, key, tempo));
    }

    let has_pickup = detect_pickup(&measures, tpq);
    if has_pickup {
        measures[0].set_pickup(true);
    }

    let mut number = if has_pickup { 0 } else { 1 };
    for measure in &mut measures {
        measure.set_number(number);
        number += 1;
    }

    Ok(measures)
}

/// Retroactive pickup detection over the finished measure list. The first
/// measure is a pickup when any of the following hold:
///
/// 1. its signature is smaller than the second measure's;
/// 2. the last measure's signature is smaller than the second-to-last's and
///    the first and last signatures together sum to the home signature
///    (a split measure across the repeat);
/// 3. the first two measures share a signature but the first sounding note
///    starts more than half a quarter note after the measure does (a
///    silent lead-in).
fn detect_pickup(measures: &[Measure], tpq: u32) -> bool {
    if measures.len() < 2 {
        return false;
    }

    // Wholly silent measures at either end carry no metric evidence; the
    // heuristics read the first and last sounding measures instead.
    let Some(first_idx) = measures.iter().position(|m| !m.is_empty()) else {
        return false;
    };
    let Some(last_idx) = measures.iter().rposition(|m| !m.is_empty()) else {
        return false;
    };
    if first_idx + 1 >= measures.len() || last_idx == 0 {
        return false;
    }

    let first = &measures[first_idx];
    let second = &measures[first_idx + 1];
    let last = &measures[last_idx];
    let penultimate = &measures[last_idx - 1];

    let first_sig = first.time_signature();
    let second_sig = second.time_signature();
    let last_sig = last.time_signature();

    let smaller_opening = first_sig.is_smaller_than(&second_sig);

    let complementary_close = last_sig.is_smaller_than(&penultimate.time_signature())
        && first_sig.denominator == last_sig.denominator
        && first_sig.numerator + last_sig.numerator == penultimate.time_signature().numerator;

    let silent_lead_in = first_sig.same_signature(&second_sig)
        && first.columns().first().is_some_and(|col| {
            col.interval().low() - first.interval().low() > tpq / 2
        });

    smaller_opening || complementary_close || silent_lead_in
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{self, SplitPolicy};
    use pretty_assertions::assert_eq;

    fn iv(low: u32, high: u32) -> Interval {
        Interval::new(low, high).unwrap()
    }

    fn note(low: u32, high: u32, pitch: u8) -> Note {
        Note::new(iv(low, high), pitch)
    }

    fn sig_index(sigs: &[(u8, u8, u32, u32)]) -> IntervalIndex<TimeSignature> {
        IntervalIndex::build(
            sigs.iter()
                .map(|&(num, den, low, high)| TimeSignature::new(num, den, iv(low, high)))
                .collect(),
        )
    }

    fn column_index(notes: Vec<Note>, final_tick: u32) -> IntervalIndex<Column> {
        let note_index = IntervalIndex::build(notes);
        let columns = columns::assemble(&note_index, final_tick, &SplitPolicy::default()).unwrap();
        IntervalIndex::build(columns)
    }

    fn plain_assemble(
        notes: Vec<Note>,
        sigs: &IntervalIndex<TimeSignature>,
        final_tick: u32,
    ) -> Vec<Measure> {
        let keys = IntervalIndex::build(vec![KeySignature::c_major(iv(0, final_tick))]);
        let tempos = IntervalIndex::build(vec![Tempo::new(120, iv(0, final_tick))]);
        assemble(
            &column_index(notes, final_tick),
            sigs,
            &keys,
            &tempos,
            final_tick,
            480,
        )
        .unwrap()
    }

    #[test]
    fn test_measure_walk_boundaries() {
        // 4/4 at resolution 480: a piece ending at tick 1919 fits in one
        // measure; one tick more spills into a second.
        let sigs = sig_index(&[(4, 4, 0, 1919)]);
        assert_eq!(
            measure_intervals(&sigs, 1919, 480).unwrap(),
            vec![iv(0, 1919)]
        );
        assert_eq!(
            measure_intervals(&sigs, 1920, 480).unwrap(),
            vec![iv(0, 1919), iv(1920, 3839)]
        );
    }

    #[test]
    fn test_measure_walk_follows_signature_changes() {
        let sigs = sig_index(&[(4, 4, 0, 1919), (3, 4, 1920, 4799)]);
        assert_eq!(
            measure_intervals(&sigs, 4799, 480).unwrap(),
            vec![iv(0, 1919), iv(1920, 3359), iv(3360, 4799)]
        );
    }

    #[test]
    fn test_no_time_signatures_rejected() {
        let sigs: IntervalIndex<TimeSignature> = IntervalIndex::build(vec![]);
        assert_eq!(
            measure_intervals(&sigs, 1919, 480),
            Err(Error::NoTimeSignatures)
        );
    }

    #[test]
    fn test_zero_numerator_signature_rejected() {
        // A 0/4 signature would advance the walk by nothing; the walk must
        // fail instead of looping.
        let sigs = sig_index(&[(0, 4, 0, 1919)]);
        assert_eq!(
            measure_intervals(&sigs, 1919, 480),
            Err(Error::ZeroLengthMeasure {
                numerator: 0,
                denominator: 4,
            })
        );
    }

    #[test]
    fn test_gap_between_regions_uses_preceding() {
        let sigs = sig_index(&[(4, 4, 100, 959), (3, 4, 2000, 2999)]);

        let in_gap = active_at(&sigs, 1500).unwrap();
        assert_eq!((in_gap.numerator, in_gap.denominator), (4, 4));

        let past_end = active_at(&sigs, 3500).unwrap();
        assert_eq!((past_end.numerator, past_end.denominator), (3, 4));

        let before_first = active_at(&sigs, 50).unwrap();
        assert_eq!((before_first.numerator, before_first.denominator), (4, 4));
    }

    #[test]
    fn test_write_once_fields() {
        let sigs = sig_index(&[(4, 4, 0, 1919)]);
        let mut measures = plain_assemble(vec![note(0, 479, 60)], &sigs, 1919);
        let measure = &mut measures[0];

        // assemble already numbered it
        assert_eq!(measure.number(), Some(1));
        assert!(!measure.set_number(7));
        assert_eq!(measure.number(), Some(1));

        assert!(!measure.is_pickup());
        assert!(measure.set_pickup(true));
        assert!(!measure.set_pickup(false));
        assert!(measure.is_pickup());
    }

    #[test]
    fn test_notes_trimmed_to_measure() {
        // One monolithic column spans both measures: the eighth and quarter
        // end long before measure two starts and must not appear in it.
        let notes = vec![
            note(0, 249, 59),
            note(0, 479, 57),
            note(0, 3839, 55),
            note(0, 3839, 52),
            note(0, 3839, 48),
        ];
        let sigs = sig_index(&[(4, 4, 0, 3839)]);
        let measures = plain_assemble(notes, &sigs, 3839);

        assert_eq!(measures.len(), 2);
        assert_eq!(measures[0].len(), 5);
        let second = measures[1].notes();
        let pitches: Vec<u8> = second.iter().map(Note::pitch).collect();
        assert_eq!(pitches, vec![48, 52, 55]);
        // carried-over notes come back clamped to the measure
        assert!(second.iter().all(|n| n.interval() == iv(1920, 3839)));
    }

    #[test]
    fn test_single_tick_remainder_keeps_note_interval() {
        // The bass pokes exactly one tick into measure two; a closed
        // interval cannot span a single tick, so the copy keeps its own.
        let notes = vec![note(0, 1920, 48), note(1920, 3839, 72)];
        let sigs = sig_index(&[(4, 4, 0, 3839)]);
        let measures = plain_assemble(notes, &sigs, 3839);

        let second = measures[1].notes();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].interval(), iv(0, 1920));
        assert_eq!(second[1].interval(), iv(1920, 3839));
    }

    #[test]
    fn test_pickup_from_smaller_opening_signature() {
        let sigs = sig_index(&[(1, 4, 0, 479), (4, 4, 480, 2399)]);
        let notes = vec![note(0, 479, 67), note(480, 2399, 60)];
        let measures = plain_assemble(notes, &sigs, 2399);

        assert_eq!(measures.len(), 2);
        assert!(measures[0].is_pickup());
        assert_eq!(measures[0].number(), Some(0));
        assert_eq!(measures[1].number(), Some(1));
    }

    #[test]
    fn test_pickup_from_silent_lead_in() {
        // Uniform 4/4, but the first sound arrives two beats in.
        let sigs = sig_index(&[(4, 4, 0, 3839)]);
        let measures = plain_assemble(vec![note(960, 3839, 64)], &sigs, 3839);

        assert_eq!(measures.len(), 2);
        assert!(measures[0].is_pickup());
        assert_eq!(measures[0].number(), Some(0));
    }

    #[test]
    fn test_pickup_detected_past_silent_first_measure() {
        // A whole measure of silence, then a late entry in measure two: the
        // lead-in heuristic reads the first sounding measure, not the empty
        // one.
        let sigs = sig_index(&[(4, 4, 0, 5759)]);
        let notes = vec![note(2400, 3839, 64), note(3840, 5759, 60)];
        let measures = plain_assemble(notes, &sigs, 5759);

        assert_eq!(measures.len(), 3);
        assert!(measures[0].is_empty());
        assert!(measures[0].is_pickup());
        assert_eq!(measures[0].number(), Some(0));
        assert_eq!(measures[1].number(), Some(1));
    }

    #[test]
    fn test_no_pickup_in_plain_piece() {
        let sigs = sig_index(&[(4, 4, 0, 3839)]);
        let measures = plain_assemble(
            vec![note(0, 1919, 60), note(1920, 3839, 62)],
            &sigs,
            3839,
        );

        assert_eq!(measures.len(), 2);
        assert!(!measures[0].is_pickup());
        assert_eq!(measures[0].number(), Some(1));
        assert_eq!(measures[1].number(), Some(2));
    }

    #[test]
    fn test_pickup_from_complementary_split_measure() {
        // The opening is not smaller than what follows, but the opening and
        // closing measures together make one 4/4 home measure, so the split
        // still marks the first measure as a pickup.
        let sigs = sig_index(&[
            (3, 4, 0, 1439),
            (2, 4, 1440, 2399),
            (4, 4, 2400, 4319),
            (1, 4, 4320, 4799),
        ]);
        let notes = vec![
            note(0, 1439, 67),
            note(1440, 2399, 60),
            note(2400, 4319, 62),
            note(4320, 4799, 64),
        ];
        let measures = plain_assemble(notes, &sigs, 4799);

        assert_eq!(measures.len(), 4);
        assert!(measures[0].is_pickup());
        assert_eq!(measures[0].number(), Some(0));
    }

    #[test]
    fn test_hand_lists_are_tagged_and_trimmed() {
        let notes = vec![note(0, 3839, 36), note(0, 3839, 72), note(0, 479, 74)];
        let sigs = sig_index(&[(4, 4, 0, 3839)]);
        let measures = plain_assemble(notes, &sigs, 3839);

        let m2 = &measures[1];
        let left: Vec<u8> = m2.left_notes().iter().map(Note::pitch).collect();
        let right: Vec<u8> = m2.right_notes().iter().map(Note::pitch).collect();
        assert_eq!(left, vec![36]);
        // 74 ended in measure one
        assert_eq!(right, vec![72]);
        assert!(m2.right_notes().iter().all(|n| n.hand() == crate::Hand::Right));
    }
}
