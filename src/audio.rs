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
use std::{error::Error, fmt, sync::Arc};

pub mod cpal;
pub mod mixer;
pub mod mock;
pub mod thread_priority;

use mixer::AudioMixer;

/// A generator of mono audio samples, pulled by the mixer. Voices and sample
/// playbacks both implement this.
pub trait SampleSource: Send + Sync {
    /// Returns the next sample, or None once the source is exhausted.
    fn next_sample(&mut self) -> Option<f32>;
}

/// An audio output device that continuously drains a mixer.
pub trait Device: fmt::Display + Send + Sync {
    /// The channel count and sample rate the device will run at. Used to
    /// construct the mixer before starting the stream.
    fn output_format(&self) -> Result<(u16, u32), Box<dyn Error>>;

    /// Starts draining the mixer. Returns once the stream is being set up;
    /// playback continues until [`Device::stop`].
    fn start(&self, mixer: Arc<AudioMixer>) -> Result<(), Box<dyn Error>>;

    /// False once the underlying device reported an error (e.g. it was
    /// disconnected). Device loss is recoverable: callers silence their
    /// voices and keep accepting input.
    fn is_healthy(&self) -> bool;

    /// Stops the output stream.
    fn stop(&self);
}

/// Lists the names of available output devices.
pub fn list_devices() -> Result<Vec<String>, Box<dyn Error>> {
    cpal::Device::list()
}

/// Gets a device with the given name. Names starting with "mock" return a
/// mock device that drains the mixer without producing sound.
pub fn get_device(name: &str) -> Result<Arc<dyn Device>, Box<dyn Error>> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(name)));
    }

    Ok(Arc::new(cpal::Device::get(name)?))
}
