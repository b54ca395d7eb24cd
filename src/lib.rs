//! barline - Tick Timeline Reduction Library
//!
//! This library turns a raw timestamped stream of note start/stop events into
//! a queryable, hierarchical structure: notes are paired into closed tick
//! intervals, indexed in an augmented interval tree, sliced into vertical
//! columns with a two-hand voicing, and grouped into time-signature-driven
//! measures (with pickup detection).

pub mod columns;
pub mod error;
pub mod index;
pub mod measures;
pub mod piece;
pub mod reconcile;
pub mod types;
pub mod util;

#[cfg(feature = "midi")]
pub mod midi;

// Re-export commonly used types
pub use columns::Column;
pub use columns::SplitPolicy;
pub use error::Error;
pub use index::IntervalIndex;
pub use measures::Measure;
pub use piece::Piece;
pub use reconcile::NoteEvent;
pub use types::interval::Interval;
pub use types::interval::Spanned;
pub use types::key_signature::KeySignature;
pub use types::key_signature::Mode;
pub use types::note::Hand;
pub use types::note::Note;
pub use types::tempo::Tempo;
pub use types::time_signature::TimeSignature;

pub type Result<T> = std::result::Result<T, Error>;
