//! Ties the pipeline together: notes in, indexed columns and numbered
//! measures out.

use crate::Result;
use crate::columns::{self, Column, SplitPolicy};
use crate::error::Error;
use crate::index::IntervalIndex;
use crate::measures::{self, Measure};
use crate::types::interval::{Interval, Spanned};
use crate::types::key_signature::KeySignature;
use crate::types::note::Note;
use crate::types::tempo::Tempo;
use crate::types::time_signature::TimeSignature;
use std::fmt;

/// A fully assembled piece: the note index, the voiced columns, and the
/// numbered measures, all built once at construction and read-only after.
#[derive(Debug, Clone)]
pub struct Piece {
    notes: IntervalIndex<Note>,
    columns: Vec<Column>,
    measures: Vec<Measure>,
    time_signatures: Vec<TimeSignature>,
    key_signatures: Vec<KeySignature>,
    tempos: Vec<Tempo>,
    tpq: u32,
    interval: Interval,
}

impl Piece {
    /// Assembles a piece with the default hand-split policy.
    ///
    /// Missing key signatures default to C major over the whole piece and a
    /// missing tempo map defaults to 120 bpm; missing time signatures are an
    /// error, because without them no measure boundary is defined.
    pub fn new(
        notes: Vec<Note>,
        time_signatures: Vec<TimeSignature>,
        key_signatures: Vec<KeySignature>,
        tempos: Vec<Tempo>,
        tpq: u32,
    ) -> Result<Self> {
        Self::with_policy(
            notes,
            time_signatures,
            key_signatures,
            tempos,
            tpq,
            SplitPolicy::default(),
        )
    }

    pub fn with_policy(
        notes: Vec<Note>,
        time_signatures: Vec<TimeSignature>,
        key_signatures: Vec<KeySignature>,
        tempos: Vec<Tempo>,
        tpq: u32,
        policy: SplitPolicy,
    ) -> Result<Self> {
        if tpq == 0 {
            return Err(Error::InvalidResolution { tpq });
        }
        if time_signatures.is_empty() {
            return Err(Error::NoTimeSignatures);
        }

        let note_index = IntervalIndex::build(notes);
        let Some(final_tick) = note_index.last_tick() else {
            return Err(Error::EmptyPiece);
        };
        let interval = Interval::new(0, final_tick)?;

        let mut key_signatures = key_signatures;
        if key_signatures.is_empty() {
            key_signatures.push(KeySignature::c_major(interval));
        }
        let mut tempos = tempos;
        if tempos.is_empty() {
            tempos.push(Tempo::new(120, interval));
        }

        let columns = columns::assemble(&note_index, final_tick, &policy)?;
        let column_index = IntervalIndex::build(columns.clone());
        let signature_index = IntervalIndex::build(time_signatures.clone());
        let key_index = IntervalIndex::build(key_signatures.clone());
        let tempo_index = IntervalIndex::build(tempos.clone());

        let measures = measures::assemble(
            &column_index,
            &signature_index,
            &key_index,
            &tempo_index,
            final_tick,
            tpq,
        )?;

        Ok(Self {
            notes: note_index,
            columns,
            measures,
            time_signatures,
            key_signatures,
            tempos,
            tpq,
            interval,
        })
    }

    /// All notes, ordered by start tick.
    pub fn notes(&self) -> Vec<&Note> {
        self.notes.to_vec()
    }

    /// Notes sounding anywhere within `window`.
    pub fn notes_in(&self, window: Interval) -> Vec<&Note> {
        self.notes.query(window)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Looks a measure up by its assigned number; a pickup measure is
    /// number 0, ordinary numbering starts at 1.
    pub fn measure(&self, number: i32) -> Option<&Measure> {
        self.measures
            .iter()
            .find(|measure| measure.number() == Some(number))
    }

    pub fn has_pickup(&self) -> bool {
        self.measures
            .first()
            .is_some_and(|measure| measure.is_pickup())
    }

    pub fn time_signatures(&self) -> &[TimeSignature] {
        &self.time_signatures
    }

    pub fn key_signatures(&self) -> &[KeySignature] {
        &self.key_signatures
    }

    pub fn tempos(&self) -> &[Tempo] {
        &self.tempos
    }

    /// Ticks per quarter note.
    pub fn tpq(&self) -> u32 {
        self.tpq
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Spanned for Piece {
    fn interval(&self) -> Interval {
        self.interval
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} note(s), {} column(s), {} measure(s) over {}",
            self.len(),
            self.columns.len(),
            self.measures.len(),
            self.interval
        )
    }
}
