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

//! Layout configuration.
//!
//! A layout YAML defines the grid: per-character note patches and sample
//! slots, plus rows of characters placing them on pads. Everything is
//! resolved and validated here at load time (note symbols through the pitch
//! table, envelope parameters, layout bounds) so the instrument itself never
//! sees an invalid binding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::grid::Pad;
use crate::led::Color;
use crate::pitch;
use crate::synth::engine::NotePatch;
use crate::synth::envelope::EnvelopeParams;
use crate::synth::oscillator::Waveform;

pub mod error;

pub use error::ConfigError;

/// What one pad does when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A synthesized note, identified by its note symbol (e.g. "C4").
    Note(String),
    /// A one-shot sample, identified by its layout character.
    Sample(String),
}

/// A sample slot resolved from the layout file.
#[derive(Debug, Clone)]
pub struct SampleSlot {
    pub file: PathBuf,
    pub color: Color,
    pub volume: f32,
}

fn default_grid_size() -> u8 {
    8
}

fn default_fps() -> u32 {
    30
}

fn default_amplitude() -> f32 {
    0.5
}

fn default_volume() -> f32 {
    1.0
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    name: String,
    #[serde(default = "default_grid_size")]
    grid_size: u8,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default)]
    notes: HashMap<char, RawNote>,
    #[serde(default)]
    samples: HashMap<char, RawSample>,
    layout: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNote {
    note: String,
    #[serde(default)]
    waveform: Waveform,
    #[serde(default)]
    envelope: EnvelopeParams,
    color: Color,
    #[serde(default = "default_amplitude")]
    amplitude: f32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSample {
    file: PathBuf,
    color: Color,
    #[serde(default = "default_volume")]
    volume: f32,
}

/// A fully resolved and validated layout.
pub struct Layout {
    name: String,
    grid_size: u8,
    fps: u32,
    bindings: HashMap<Pad, Binding>,
    /// Layout characters by pad, for display.
    symbols: HashMap<Pad, char>,
    note_patches: HashMap<String, NotePatch>,
    note_colors: HashMap<String, Color>,
    samples: HashMap<String, SampleSlot>,
}

impl Layout {
    /// Loads and validates a layout YAML file.
    pub fn load(path: &Path) -> Result<Layout, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let layout = Layout::parse(&contents)?;
        info!(
            path = ?path,
            name = layout.name,
            grid_size = layout.grid_size,
            notes = layout.note_patches.len(),
            samples = layout.samples.len(),
            "Layout loaded"
        );
        Ok(layout)
    }

    /// Parses and validates layout YAML.
    pub fn parse(contents: &str) -> Result<Layout, ConfigError> {
        let raw: RawConfig = serde_yml::from_str(contents)?;

        let mut note_patches = HashMap::new();
        let mut note_colors = HashMap::new();
        let mut note_symbols = HashMap::new();
        for (symbol, note) in &raw.notes {
            let frequency = pitch::frequency(&note.note).map_err(|source| {
                ConfigError::UnknownNote {
                    symbol: *symbol,
                    source,
                }
            })?;
            note.envelope.validate().map_err(|source| {
                ConfigError::InvalidEnvelope {
                    symbol: *symbol,
                    source,
                }
            })?;
            if !(note.amplitude > 0.0 && note.amplitude <= 1.0) {
                return Err(ConfigError::InvalidAmplitude {
                    symbol: *symbol,
                    amplitude: note.amplitude,
                });
            }

            note_patches.insert(
                note.note.clone(),
                NotePatch {
                    frequency,
                    waveform: note.waveform,
                    envelope: note.envelope,
                    amplitude: note.amplitude,
                },
            );
            note_colors.insert(note.note.clone(), note.color);
            note_symbols.insert(*symbol, note.note.clone());
        }

        let mut samples = HashMap::new();
        for (symbol, sample) in &raw.samples {
            samples.insert(
                symbol.to_string(),
                SampleSlot {
                    file: sample.file.clone(),
                    color: sample.color,
                    volume: sample.volume,
                },
            );
        }

        if raw.layout.len() > raw.grid_size as usize {
            return Err(ConfigError::TooManyRows {
                rows: raw.layout.len(),
                grid_size: raw.grid_size,
            });
        }

        // Layout rows are written top-first; row 0 of the file is the top of
        // the grid.
        let mut bindings = HashMap::new();
        let mut symbols = HashMap::new();
        let row_count = raw.layout.len();
        for (row_index, row) in raw.layout.iter().enumerate() {
            let columns = row.chars().count();
            if columns > raw.grid_size as usize {
                return Err(ConfigError::RowTooWide {
                    row: row_index,
                    columns,
                    grid_size: raw.grid_size,
                });
            }
            let y = (row_count - 1 - row_index) as u8;
            for (x, symbol) in row.chars().enumerate() {
                if symbol == '.' || symbol == ' ' {
                    continue;
                }
                let pad = Pad::new(x as u8, y);
                let binding = if let Some(note) = note_symbols.get(&symbol) {
                    Binding::Note(note.clone())
                } else if samples.contains_key(&symbol.to_string()) {
                    Binding::Sample(symbol.to_string())
                } else {
                    return Err(ConfigError::UnknownSymbol {
                        symbol,
                        row: row_index,
                    });
                };
                bindings.insert(pad, binding);
                symbols.insert(pad, symbol);
            }
        }

        Ok(Layout {
            name: raw.name,
            grid_size: raw.grid_size,
            fps: raw.fps,
            bindings,
            symbols,
            note_patches,
            note_colors,
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_size(&self) -> u8 {
        self.grid_size
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn binding(&self, pad: Pad) -> Option<&Binding> {
        self.bindings.get(&pad)
    }

    pub fn note_patch(&self, note: &str) -> Option<&NotePatch> {
        self.note_patches.get(note)
    }

    pub fn note_color(&self, note: &str) -> Option<Color> {
        self.note_colors.get(note).copied()
    }

    /// All pads bound to a note identity. A chord layout may bind the same
    /// note to several pads.
    pub fn note_pads(&self, note: &str) -> Vec<Pad> {
        let mut pads: Vec<Pad> = self
            .bindings
            .iter()
            .filter(|(_, binding)| matches!(binding, Binding::Note(n) if n == note))
            .map(|(pad, _)| *pad)
            .collect();
        pads.sort();
        pads
    }

    pub fn sample(&self, name: &str) -> Option<&SampleSlot> {
        self.samples.get(name)
    }

    /// All sample slots, for preloading.
    pub fn samples(&self) -> impl Iterator<Item = (&String, &SampleSlot)> {
        self.samples.iter()
    }

    /// The color a pad rests at: its binding's color, dimmed.
    pub fn idle_color(&self, pad: Pad) -> Color {
        let color = match self.bindings.get(&pad) {
            Some(Binding::Note(note)) => self.note_colors.get(note).copied(),
            Some(Binding::Sample(name)) => self.samples.get(name).map(|s| s.color),
            None => None,
        };
        color.map(|c| c.scale(0.25)).unwrap_or(Color::BLACK)
    }

    /// Renders the layout as an ASCII grid, top row first. Unbound pads show
    /// as dots.
    pub fn ascii_grid(&self) -> String {
        let mut out = String::new();
        for y in (0..self.grid_size).rev() {
            for x in 0..self.grid_size {
                let symbol = self.symbols.get(&Pad::new(x, y)).copied().unwrap_or('.');
                out.push(symbol);
                if x + 1 < self.grid_size {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const LAYOUT: &str = r#"
name: test
grid_size: 4
fps: 30
notes:
  q:
    note: C4
    waveform: sine
    envelope:
      attack: 0.01
      decay: 0.05
      sustain: 0.8
      release: 0.2
    color: {r: 0, g: 200, b: 0}
  w:
    note: E4
    waveform: square
    color: {r: 0, g: 0, b: 200}
samples:
  k:
    file: kick.wav
    color: {r: 200, g: 0, b: 0}
    volume: 0.8
layout:
  - "qw"
  - "k..."
"#;

    #[test]
    fn test_parse_resolves_bindings() {
        let layout = Layout::parse(LAYOUT).unwrap();
        assert_eq!(layout.grid_size(), 4);

        // Row 0 of the file is the top row: y is rows-1.
        assert_eq!(
            layout.binding(Pad::new(0, 1)),
            Some(&Binding::Note("C4".to_string()))
        );
        assert_eq!(
            layout.binding(Pad::new(1, 1)),
            Some(&Binding::Note("E4".to_string()))
        );
        assert_eq!(
            layout.binding(Pad::new(0, 0)),
            Some(&Binding::Sample("k".to_string()))
        );
        assert_eq!(layout.binding(Pad::new(1, 0)), None);
        assert_eq!(layout.binding(Pad::new(3, 3)), None);
    }

    #[test]
    fn test_parse_resolves_patches() {
        let layout = Layout::parse(LAYOUT).unwrap();
        let patch = layout.note_patch("C4").unwrap();
        assert!((patch.frequency - 261.63).abs() < 0.01);
        assert_eq!(patch.waveform, Waveform::Sine);
        assert_eq!(patch.envelope.sustain, 0.8);

        let sample = layout.sample("k").unwrap();
        assert_eq!(sample.volume, 0.8);
    }

    #[test]
    fn test_idle_color_is_dimmed_binding_color() {
        let layout = Layout::parse(LAYOUT).unwrap();
        assert_eq!(layout.idle_color(Pad::new(0, 1)), Color::new(0, 50, 0));
        assert_eq!(layout.idle_color(Pad::new(3, 3)), Color::BLACK);
    }

    #[test]
    fn test_note_pads_finds_all_pads() {
        let layout = Layout::parse(
            r#"
notes:
  q:
    note: C4
    color: {r: 0, g: 200, b: 0}
layout:
  - "q.q"
"#,
        )
        .unwrap();
        assert_eq!(layout.note_pads("C4"), vec![Pad::new(0, 0), Pad::new(2, 0)]);
    }

    #[test]
    fn test_unknown_note_symbol_fails() {
        let result = Layout::parse(
            r#"
notes:
  q:
    note: H9
    color: {r: 0, g: 0, b: 0}
layout:
  - "q"
"#,
        );
        assert!(matches!(result, Err(ConfigError::UnknownNote { .. })));
    }

    #[test]
    fn test_invalid_envelope_fails() {
        let result = Layout::parse(
            r#"
notes:
  q:
    note: C4
    envelope:
      attack: -1.0
    color: {r: 0, g: 0, b: 0}
layout:
  - "q"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidEnvelope { .. })));
    }

    #[test]
    fn test_undefined_layout_character_fails() {
        let result = Layout::parse(
            r#"
layout:
  - "z"
"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::UnknownSymbol { symbol: 'z', row: 0 })
        ));
    }

    #[test]
    fn test_layout_bounds_checked() {
        let too_wide = Layout::parse(
            r#"
grid_size: 2
layout:
  - "..."
"#,
        );
        assert!(matches!(too_wide, Err(ConfigError::RowTooWide { .. })));

        let too_tall = Layout::parse(
            r#"
grid_size: 1
layout:
  - "."
  - "."
"#,
        );
        assert!(matches!(too_tall, Err(ConfigError::TooManyRows { .. })));
    }

    #[test]
    fn test_malformed_yaml_fails() {
        assert!(matches!(
            Layout::parse("layout: [[["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Layout::load(Path::new("/does/not/exist.yaml")),
            Err(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        std::fs::write(&path, LAYOUT).unwrap();

        let layout = Layout::load(&path).unwrap();
        assert_eq!(layout.name(), "test");
        assert_eq!(layout.fps(), 30);
    }

    #[test]
    fn test_ascii_grid() {
        let layout = Layout::parse(LAYOUT).unwrap();
        let grid = layout.ascii_grid();
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], ". . . .");
        assert_eq!(rows[2], "q w . .");
        assert_eq!(rows[3], "k . . .");
    }
}
