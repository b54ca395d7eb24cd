//! Pure pitch-number helpers. MIDI numbering: 60 is middle C (C4).

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Spelled name with octave for a MIDI pitch number, e.g. `60` -> `"C4"`.
pub fn pitch_name(pitch: u8) -> String {
    let class = PITCH_CLASSES[(pitch % 12) as usize];
    let octave = (pitch / 12) as i32 - 1;
    format!("{}{}", class, octave)
}
