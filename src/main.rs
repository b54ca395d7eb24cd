use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::Path;

use barline::{Measure, Note, SplitPolicy, midi};

fn check_midi_extension(file_path: &str) -> Result<()> {
    let path = Path::new(file_path);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", file_path))?;

    match extension.to_lowercase().as_str() {
        "mid" | "midi" | "smf" => Ok(()),
        _ => Err(anyhow::anyhow!(
            "Unsupported file extension: .{}",
            extension
        )),
    }
}

fn format_hand(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "-".to_string();
    }
    notes
        .iter()
        .map(Note::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_measure(measure: &Measure) {
    println!("{}", measure);
    println!("  RH: {}", format_hand(&measure.right_notes()));
    println!("   M: {}", format_hand(&measure.middle_notes()));
    println!("  LH: {}", format_hand(&measure.left_notes()));
}

fn main() -> Result<()> {
    let matches = Command::new("barline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assembles a MIDI file into hand-split columns and numbered measures")
        .arg(
            Arg::new("input")
                .help("Input MIDI file (.mid, .midi or .smf)")
                .required(true)
                .value_name("INPUT_FILE")
                .index(1),
        )
        .arg(
            Arg::new("measure")
                .help("Print a single measure by number (0 is the pickup, if any)")
                .long("measure")
                .short('m')
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("span")
                .help("Widest hand reach in semitones")
                .long("span")
                .value_name("SEMITONES")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("max-notes")
                .help("Most notes one hand claims")
                .long("max-notes")
                .value_name("COUNT")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("split-pitch")
                .help("Lone notes below this MIDI pitch go to the left hand")
                .long("split-pitch")
                .value_name("PITCH")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("verbose")
                .help("Print columns as well as measures")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input_file = matches.get_one::<String>("input").unwrap();
    let verbose = matches.get_flag("verbose");

    let defaults = SplitPolicy::default();
    let policy = SplitPolicy {
        span_max: matches
            .get_one::<u8>("span")
            .copied()
            .unwrap_or(defaults.span_max),
        notes_max: matches
            .get_one::<usize>("max-notes")
            .copied()
            .unwrap_or(defaults.notes_max),
        split_pitch: matches
            .get_one::<u8>("split-pitch")
            .copied()
            .unwrap_or(defaults.split_pitch),
    };

    check_midi_extension(input_file)
        .with_context(|| format!("Failed to detect input file format: {}", input_file))?;

    let midi_bytes = std::fs::read(input_file)
        .with_context(|| format!("Failed to read MIDI file: {}", input_file))?;
    let piece = midi::piece_from_midi_with_policy(&midi_bytes, policy)
        .with_context(|| format!("Failed to assemble piece from: {}", input_file))?;

    println!("{}: {}", input_file, piece);
    println!(
        "resolution {} tpq, pickup: {}",
        piece.tpq(),
        if piece.has_pickup() { "yes" } else { "no" }
    );
    println!();

    if let Some(&number) = matches.get_one::<i32>("measure") {
        let measure = piece
            .measure(number)
            .with_context(|| format!("No measure numbered {}", number))?;
        print_measure(measure);
        return Ok(());
    }

    for measure in piece.measures() {
        print_measure(measure);
    }

    if verbose {
        println!();
        for column in piece.columns() {
            println!("{}", column);
        }
    }

    Ok(())
}
