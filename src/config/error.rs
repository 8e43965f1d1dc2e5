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

use std::path::PathBuf;

use crate::pitch::UnknownNoteError;
use crate::synth::envelope::EnvelopeError;

/// Typed error for layout load/validation failures. All of these are fatal at
/// startup; none can occur mid-session.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read layout {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse layout: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("layout character '{symbol}': {source}")]
    UnknownNote {
        symbol: char,
        source: UnknownNoteError,
    },

    #[error("layout character '{symbol}': {source}")]
    InvalidEnvelope {
        symbol: char,
        source: EnvelopeError,
    },

    #[error("layout character '{symbol}' amplitude {amplitude} is not in (0, 1]")]
    InvalidAmplitude { symbol: char, amplitude: f32 },

    #[error("layout row {row} uses character '{symbol}' which is not defined in notes or samples")]
    UnknownSymbol { symbol: char, row: usize },

    #[error("layout has {rows} rows but the grid is {grid_size}x{grid_size}")]
    TooManyRows { rows: usize, grid_size: u8 },

    #[error("layout row {row} has {columns} columns but the grid is {grid_size}x{grid_size}")]
    RowTooWide {
        row: usize,
        columns: usize,
        grid_size: u8,
    },
}
