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
// Core audio mixing logic shared by the CPAL and mock output paths.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::audio::SampleSource;
use crate::playsync::CancelHandle;

/// Sums the currently active mono sources into interleaved output frames.
/// Finished and cancelled sources are dropped inline during processing.
pub struct AudioMixer {
    active_sources: Arc<RwLock<Vec<ActiveSource>>>,
    num_channels: u16,
    sample_rate: u32,
    next_id: AtomicU64,
}

/// An active source in the mixer.
struct ActiveSource {
    id: u64,
    source: Box<dyn SampleSource>,
    finished: Arc<AtomicBool>,
    cancel_handle: CancelHandle,
}

impl AudioMixer {
    /// Creates a new mixer for the given output format.
    pub fn new(num_channels: u16, sample_rate: u32) -> Self {
        Self {
            active_sources: Arc::new(RwLock::new(Vec::new())),
            num_channels,
            sample_rate,
            next_id: AtomicU64::new(1),
        }
    }

    /// Adds a source. The finished flag is shared with the source's owner:
    /// setting it from either side drops the source on the next pass.
    pub fn add_source(
        &self,
        source: Box<dyn SampleSource>,
        finished: Arc<AtomicBool>,
        cancel_handle: CancelHandle,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.active_sources.write().push(ActiveSource {
            id,
            source,
            finished,
            cancel_handle,
        });
        id
    }

    /// Removes a source by ID.
    pub fn remove_source(&self, source_id: u64) {
        self.active_sources
            .write()
            .retain(|source| source.id != source_id);
    }

    /// Fills the interleaved output buffer with the sum of all active
    /// sources, mono sources fanned out to every channel. Output is clamped
    /// to [-1, 1].
    pub fn process_into(&self, out: &mut [f32]) {
        out.fill(0.0);
        let channels = self.num_channels as usize;
        if channels == 0 {
            return;
        }
        let frames = out.len() / channels;

        let mut sources = self.active_sources.write();
        sources.retain_mut(|active| {
            if active.finished.load(Ordering::Relaxed) || active.cancel_handle.is_cancelled() {
                active.finished.store(true, Ordering::Relaxed);
                return false;
            }

            for frame in 0..frames {
                match active.source.next_sample() {
                    Some(sample) => {
                        for value in &mut out[frame * channels..(frame + 1) * channels] {
                            *value += sample;
                        }
                    }
                    None => {
                        active.finished.store(true, Ordering::Relaxed);
                        return false;
                    }
                }
            }
            true
        });
        drop(sources);

        for value in out.iter_mut() {
            *value = value.clamp(-1.0, 1.0);
        }
    }

    /// Processes the given number of frames into a fresh buffer.
    pub fn process_frames(&self, num_frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; num_frames * self.num_channels as usize];
        self.process_into(&mut out);
        out
    }

    /// The number of currently active sources.
    pub fn source_count(&self) -> usize {
        self.active_sources.read().len()
    }

    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
