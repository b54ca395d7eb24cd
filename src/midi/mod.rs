//! MIDI import: flattens a Standard MIDI File into the raw event streams the
//! pipeline consumes and assembles a [`Piece`] from them.

use crate::columns::SplitPolicy;
use crate::piece::Piece;
use crate::reconcile::{self, NoteEvent};
use crate::types::interval::Interval;
use crate::types::key_signature::{KeySignature, Mode};
use crate::types::tempo::Tempo;
use crate::types::time_signature::TimeSignature;
use crate::util::regions_from_events;
use anyhow::{Context, Result, bail};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

pub fn piece_from_midi(midi_bytes: &[u8]) -> Result<Piece> {
    piece_from_midi_with_policy(midi_bytes, SplitPolicy::default())
}

pub fn piece_from_midi_with_policy(midi_bytes: &[u8], policy: SplitPolicy) -> Result<Piece> {
    let smf = Smf::parse(midi_bytes).context("not a parseable MIDI file")?;
    piece_from_smf(&smf, policy)
}

/// Merges all tracks into single start/stop/metadata streams and runs the
/// pipeline. Running status, velocities, and channels are dropped: only which
/// pitch sounds when survives into the piece.
fn piece_from_smf(smf: &Smf, policy: SplitPolicy) -> Result<Piece> {
    // MIDI format 2 tracks are independent sequences with no shared timeline.
    if smf.header.format == Format::Sequential {
        bail!("MIDI format 2 files are not supported");
    }

    let tpq = match smf.header.timing {
        Timing::Metrical(ppqn) => ppqn.as_int() as u32,
        Timing::Timecode(_, _) => bail!("timecode timing is not supported"),
    };

    let mut starts: Vec<NoteEvent> = Vec::new();
    let mut stops: Vec<NoteEvent> = Vec::new();
    let mut tempo_events: Vec<(u32, u32)> = Vec::new();
    let mut signature_events: Vec<(u32, (u8, u8))> = Vec::new();
    let mut key_events: Vec<(u32, (i8, Mode))> = Vec::new();
    let mut sequence_end = 0u32;

    for track in &smf.tracks {
        let mut tick = 0u32;
        for event in track {
            tick += event.delta.as_int();
            sequence_end = sequence_end.max(tick);

            match &event.kind {
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } => {
                        // A note-on with velocity 0 is a note-off in disguise.
                        if vel.as_int() == 0 {
                            stops.push(stop_event(tick, key.as_int()));
                        } else {
                            starts.push(NoteEvent::new(tick, key.as_int()));
                        }
                    }
                    MidiMessage::NoteOff { key, .. } => {
                        stops.push(stop_event(tick, key.as_int()));
                    }
                    _ => {}
                },
                TrackEventKind::Meta(meta) => match meta {
                    MetaMessage::Tempo(us_per_quarter) => {
                        let bpm =
                            (60_000_000.0 / us_per_quarter.as_int() as f64).round() as u32;
                        tempo_events.push((tick, bpm));
                    }
                    MetaMessage::TimeSignature(numerator, denominator_pow, _, _) => {
                        // The denominator arrives as a power of two and must
                        // fit in a u8 once expanded.
                        if *denominator_pow >= 8 {
                            bail!(
                                "time signature denominator 2^{} is out of range",
                                denominator_pow
                            );
                        }
                        signature_events.push((tick, (*numerator, 1u8 << denominator_pow)));
                    }
                    MetaMessage::KeySignature(accidentals, minor) => {
                        let mode = if *minor { Mode::Minor } else { Mode::Major };
                        key_events.push((tick, (*accidentals, mode)));
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    let notes = reconcile::pair_events(&starts, &stops)?;

    let mut time_signatures = regions_from_events(
        &signature_events,
        sequence_end,
        |&(numerator, denominator), interval| {
            TimeSignature::new(numerator, denominator, interval)
        },
    )?;
    if time_signatures.is_empty() {
        // The MIDI spec's default when no signature event is present.
        time_signatures.push(TimeSignature::new(4, 4, Interval::new(0, sequence_end)?));
    }

    let key_signatures = regions_from_events(
        &key_events,
        sequence_end,
        |&(accidentals, mode), interval| KeySignature::new(accidentals, mode, interval),
    )?;
    let tempos =
        regions_from_events(&tempo_events, sequence_end, |&bpm, interval| {
            Tempo::new(bpm, interval)
        })?;

    Ok(Piece::with_policy(
        notes,
        time_signatures,
        key_signatures,
        tempos,
        tpq,
        policy,
    )?)
}

/// A note-off at raw tick `t` means the note last sounds at `t - 1`; the
/// pipeline's intervals are closed on both ends.
fn stop_event(tick: u32, pitch: u8) -> NoteEvent {
    NoteEvent::new(tick.saturating_sub(1), pitch)
}
