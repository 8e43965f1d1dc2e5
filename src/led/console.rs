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

//! A terminal pad sink using ANSI truecolor.
//!
//! Renders the grid as colored blocks in a reserved region of the terminal.
//! Useful when no hardware grid is attached.

use std::io::{self, Write};

use parking_lot::Mutex;

use super::color::Color;
use super::PadSink;
use crate::grid::Pad;

/// Writes pad colors as colored blocks to stdout.
pub struct ConsoleSink {
    grid_size: u8,
    stdout: Mutex<io::Stdout>,
}

impl ConsoleSink {
    /// Creates a sink for a square grid and clears its display region.
    pub fn new(grid_size: u8) -> ConsoleSink {
        let sink = ConsoleSink {
            grid_size,
            stdout: Mutex::new(io::stdout()),
        };
        sink.clear();
        sink
    }

    /// Blanks the grid region.
    pub fn clear(&self) {
        let mut stdout = self.stdout.lock();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        for y in 0..self.grid_size {
            for x in 0..self.grid_size {
                let _ = Self::draw(&mut *stdout, self.grid_size, Pad::new(x, y), Color::BLACK);
            }
        }
        let _ = stdout.flush();
    }

    fn draw(out: &mut impl Write, grid_size: u8, pad: Pad, color: Color) -> io::Result<()> {
        // Row 0 of the grid is drawn at the bottom, matching hardware
        // orientation. Each pad is two columns wide.
        let row = grid_size.saturating_sub(pad.y + 1) as u16 + 1;
        let column = pad.x as u16 * 2 + 1;
        write!(
            out,
            "\x1b[{};{}H\x1b[48;2;{};{};{}m  \x1b[0m",
            row, column, color.r, color.g, color.b
        )
    }
}

impl PadSink for ConsoleSink {
    fn set(&self, pad: Pad, color: Color) {
        if pad.x >= self.grid_size || pad.y >= self.grid_size {
            return;
        }
        let mut stdout = self.stdout.lock();
        // Display errors degrade to a dark pad; never propagate.
        let _ = Self::draw(&mut *stdout, self.grid_size, pad, color);
        let _ = stdout.flush();
    }
}
