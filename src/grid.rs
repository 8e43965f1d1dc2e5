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

use std::fmt;
use std::time::Instant;

/// A single addressable cell of the button grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pad {
    pub x: u8,
    pub y: u8,
}

impl Pad {
    pub const fn new(x: u8, y: u8) -> Pad {
        Pad { x, y }
    }

    /// Euclidean distance to another pad, used by radial effects.
    pub fn distance(&self, other: Pad) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A press or release delivered by the input transport. The transport itself
/// (hardware grid, terminal, test harness) is outside of this crate's concern.
#[derive(Debug, Clone, Copy)]
pub struct PadEvent {
    pub pad: Pad,
    pub pressed: bool,
    pub timestamp: Instant,
}

impl PadEvent {
    pub fn press(pad: Pad) -> PadEvent {
        PadEvent {
            pad,
            pressed: true,
            timestamp: Instant::now(),
        }
    }

    pub fn release(pad: Pad) -> PadEvent {
        PadEvent {
            pad,
            pressed: false,
            timestamp: Instant::now(),
        }
    }
}
