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
use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use tracing::info;

use crate::audio::mixer::AudioMixer;
use crate::playsync::CancelHandle;

const MOCK_CHANNELS: u16 = 2;
const MOCK_SAMPLE_RATE: u32 = 44100;

/// A mock device. Drains the mixer without producing any sound.
#[derive(Clone)]
pub struct Device {
    name: String,
    healthy: Arc<AtomicBool>,
    cancel_handle: CancelHandle,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            healthy: Arc::new(AtomicBool::new(true)),
            cancel_handle: CancelHandle::new(),
        }
    }

    /// Simulates losing the device (for tests).
    pub fn disconnect(&self) {
        self.healthy.store(false, Ordering::Relaxed);
    }
}

impl crate::audio::Device for Device {
    fn output_format(&self) -> Result<(u16, u32), Box<dyn Error>> {
        Ok((MOCK_CHANNELS, MOCK_SAMPLE_RATE))
    }

    fn start(&self, mixer: Arc<AudioMixer>) -> Result<(), Box<dyn Error>> {
        let name = self.name.clone();
        let cancel_handle = self.cancel_handle.clone();
        info!(device = name, "Mock audio device started");

        thread::spawn(move || {
            // Drain roughly 10ms of audio per pass.
            let frames = (mixer.sample_rate() / 100) as usize;
            let mut buffer = vec![0.0f32; frames * mixer.num_channels() as usize];
            while !cancel_handle.wait_timeout(Duration::from_millis(10)) {
                mixer.process_into(&mut buffer);
            }
        });

        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.cancel_handle.cancel();
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
