// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The pitch table: note symbols to frequencies.
//!
//! Twelve-tone equal temperament anchored at A4 = 440 Hz. Resolution happens
//! once, at configuration load. An unknown symbol is a configuration error and
//! must never surface at press time.

/// The reference pitch for A4 in Hz.
const A4_FREQUENCY: f64 = 440.0;

/// Octave assumed when a note symbol carries no octave number.
const DEFAULT_OCTAVE: i32 = 4;

/// Typed error for unresolvable note symbols.
#[derive(Debug, thiserror::Error)]
#[error("unknown note symbol: {0}")]
pub struct UnknownNoteError(pub String);

/// Resolves a note symbol such as `C`, `F#`, or `A3` to its frequency in Hz.
///
/// Bare letters default to octave 4, so a layout row of `c d e f g a b`
/// spells out the middle octave.
pub fn frequency(symbol: &str) -> Result<f64, UnknownNoteError> {
    let symbol = symbol.trim();
    let mut chars = symbol.chars();

    let letter = chars
        .next()
        .ok_or_else(|| UnknownNoteError(symbol.to_string()))?;
    let mut semitone = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(UnknownNoteError(symbol.to_string())),
    };

    let rest: String = chars.collect();
    let rest = if let Some(stripped) = rest.strip_prefix('#') {
        semitone += 1;
        stripped.to_string()
    } else {
        rest
    };

    let octave = if rest.is_empty() {
        DEFAULT_OCTAVE
    } else {
        rest.parse::<i32>()
            .map_err(|_| UnknownNoteError(symbol.to_string()))?
    };
    if !(0..=8).contains(&octave) {
        return Err(UnknownNoteError(symbol.to_string()));
    }

    // Semitone offset relative to A4 (note index 9 in octave 4).
    let offset = semitone - 9 + (octave - 4) * 12;
    Ok(A4_FREQUENCY * 2f64.powf(offset as f64 / 12.0))
}
