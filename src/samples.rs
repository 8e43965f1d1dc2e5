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

//! Pre-recorded sample pads.
//!
//! Samples are decoded entirely into memory at startup for zero-latency
//! triggering. Playback is one-shot; the monophonic cut-on-retrigger policy
//! for sample identities lives in the voice manager.

use std::sync::Arc;

use crate::audio::SampleSource;

pub mod loader;

pub use loader::{LoadedSample, SampleLoader};

/// A mixer source playing one loaded sample from start to end.
pub struct SamplePlayback {
    data: Arc<Vec<f32>>,
    position: usize,
    volume: f32,
}

impl SamplePlayback {
    pub fn new(data: Arc<Vec<f32>>, volume: f32) -> SamplePlayback {
        SamplePlayback {
            data,
            position: 0,
            volume,
        }
    }
}

impl SampleSource for SamplePlayback {
    fn next_sample(&mut self) -> Option<f32> {
        let sample = self.data.get(self.position)?;
        self.position += 1;
        Some(sample * self.volume)
    }
}
