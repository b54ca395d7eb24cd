use crate::reconcile::NoteEvent;
use thiserror::Error;

/// Failure taxonomy for the whole pipeline.
///
/// Contract violations (`InvalidInterval`, `InvalidResolution`, `EmptyPiece`,
/// `NoTimeSignatures`) surface at the point of violation and are never
/// silently coerced. `UnpairedEvents` is a data-quality condition from the
/// upstream event source, not a programming error, and is a distinct,
/// matchable variant carrying the full leftover event lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid interval [{low}, {high}]: high must be greater than low")]
    InvalidInterval { low: u32, high: u32 },

    #[error("final tick {final_tick} does not lie beyond the last start tick {last_start}")]
    InvalidStartTicks { last_start: u32, final_tick: u32 },

    #[error(
        "unpaired events remain after reconciliation: {} start(s), {} stop(s)",
        starts.len(),
        stops.len()
    )]
    UnpairedEvents {
        starts: Vec<NoteEvent>,
        stops: Vec<NoteEvent>,
    },

    #[error("time signature {numerator}/{denominator} produces a zero-length measure")]
    ZeroLengthMeasure { numerator: u8, denominator: u8 },

    #[error("piece carries no time signature data; metric analysis is impossible")]
    NoTimeSignatures,

    #[error("piece carries no notes")]
    EmptyPiece,

    #[error("invalid resolution: ticks per quarter must be positive (got {tpq})")]
    InvalidResolution { tpq: u32 },
}
