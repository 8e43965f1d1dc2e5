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

use std::collections::HashMap;

use parking_lot::Mutex;

use super::color::Color;
use super::PadSink;
use crate::grid::Pad;

/// A pad sink that records writes, for tests.
#[derive(Default)]
pub struct MockSink {
    colors: Mutex<HashMap<Pad, Color>>,
    writes: Mutex<u64>,
}

impl MockSink {
    pub fn new() -> MockSink {
        MockSink::default()
    }

    /// The last color written to a pad.
    pub fn color(&self, pad: Pad) -> Option<Color> {
        self.colors.lock().get(&pad).copied()
    }

    /// Total number of writes across all pads.
    pub fn write_count(&self) -> u64 {
        *self.writes.lock()
    }
}

impl PadSink for MockSink {
    fn set(&self, pad: Pad, color: Color) {
        self.colors.lock().insert(pad, color);
        *self.writes.lock() += 1;
    }
}
