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
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::audio::mixer::AudioMixer;
use crate::audio::thread_priority::{callback_thread_priority, configure_audio_thread_priority};
use crate::playsync::CancelHandle;

/// A CPAL-backed audio output device.
pub struct Device {
    name: String,
    healthy: Arc<AtomicBool>,
    cancel_handle: CancelHandle,
}

impl Device {
    /// Gets the device with the given name. "default" selects the host's
    /// default output device.
    pub fn get(name: &str) -> Result<Device, Box<dyn Error>> {
        // Verify the device exists up front so a bad name fails at startup.
        find_cpal_device(name)?;
        Ok(Device {
            name: name.to_string(),
            healthy: Arc::new(AtomicBool::new(true)),
            cancel_handle: CancelHandle::new(),
        })
    }

    /// Lists the names of all output devices known to CPAL.
    pub fn list() -> Result<Vec<String>, Box<dyn Error>> {
        let host = cpal::default_host();
        let mut names = Vec::new();
        for device in host.output_devices()? {
            names.push(device.name()?);
        }
        Ok(names)
    }
}

fn find_cpal_device(name: &str) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    if name == "default" {
        return host
            .default_output_device()
            .ok_or_else(|| "no default audio output device".into());
    }
    for device in host.output_devices()? {
        if device.name()? == name {
            return Ok(device);
        }
    }
    Err(format!("no audio output device named {}", name).into())
}

impl crate::audio::Device for Device {
    fn output_format(&self) -> Result<(u16, u32), Box<dyn Error>> {
        let device = find_cpal_device(&self.name)?;
        let config = device.default_output_config()?;
        Ok((config.channels(), config.sample_rate().0))
    }

    fn start(&self, mixer: Arc<AudioMixer>) -> Result<(), Box<dyn Error>> {
        let name = self.name.clone();
        let healthy = self.healthy.clone();
        let cancel_handle = self.cancel_handle.clone();

        // The stream is not Send, so it is created and kept alive on a
        // dedicated thread.
        thread::spawn(move || {
            let device = match find_cpal_device(&name) {
                Ok(device) => device,
                Err(e) => {
                    error!(device = name, error = %e, "Audio device disappeared before start");
                    healthy.store(false, Ordering::Relaxed);
                    return;
                }
            };

            let config = cpal::StreamConfig {
                channels: mixer.num_channels(),
                sample_rate: cpal::SampleRate(mixer.sample_rate()),
                buffer_size: cpal::BufferSize::Default,
            };

            let priority = callback_thread_priority();
            let mut priority_set = false;
            let error_healthy = healthy.clone();

            let stream = device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    configure_audio_thread_priority(priority, &mut priority_set);
                    mixer.process_into(data);
                },
                move |e| {
                    error!(error = %e, "Audio output stream error");
                    error_healthy.store(false, Ordering::Relaxed);
                },
                None,
            );

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!(device = name, error = %e, "Failed to create audio output stream");
                    healthy.store(false, Ordering::Relaxed);
                    return;
                }
            };

            if let Err(e) = stream.play() {
                error!(device = name, error = %e, "Failed to start audio output stream");
                healthy.store(false, Ordering::Relaxed);
                return;
            }

            info!(device = name, "Audio output stream started");
            cancel_handle.wait();
            drop(stream);
            info!(device = name, "Audio output stream stopped");
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
        write!(f, "{} (CPAL)", self.name)
    }
}
