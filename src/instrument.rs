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

//! The instrument itself.
//!
//! Routes pad events to the voice manager and the animation scheduler. The
//! two react to the same press independently: a short note can finish its
//! release while its fade is still running, and vice versa.

use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::audio::mixer::AudioMixer;
use crate::audio::Device;
use crate::config::{Binding, Layout};
use crate::grid::{Pad, PadEvent};
use crate::led::{Animation, AnimationKind, AnimationScheduler, Color, Curve, PadSink};
use crate::playsync::CancelHandle;
use crate::samples::{LoadedSample, SampleLoader};
use crate::synth::{SynthEngine, VoicePhase};

const BREATHE_PERIOD: Duration = Duration::from_secs(2);
const BREATHE_MIN_BRIGHTNESS: f32 = 0.3;
const PULSE_DURATION: Duration = Duration::from_millis(500);
const PULSE_MAX_BRIGHTNESS: f32 = 1.5;
const FADE_DURATION: Duration = Duration::from_millis(500);

/// A playable button-grid instrument: layout, voices, samples, and LEDs.
pub struct Instrument {
    layout: Layout,
    engine: SynthEngine,
    scheduler: AnimationScheduler,
    samples: HashMap<String, LoadedSample>,
    device: Arc<dyn Device>,
    /// Set once the device has been observed unhealthy and voices were
    /// silenced.
    silenced: AtomicBool,
}

impl Instrument {
    /// Builds the instrument: starts the audio device, preloads every sample
    /// in the layout, paints idle colors, and starts the animation ticker.
    pub fn new(
        layout: Layout,
        device: Arc<dyn Device>,
        sink: Arc<dyn PadSink>,
    ) -> Result<Instrument, Box<dyn Error>> {
        let (num_channels, sample_rate) = device.output_format()?;
        info!(
            device = %device,
            num_channels,
            sample_rate,
            "Starting audio device"
        );
        let mixer = Arc::new(AudioMixer::new(num_channels, sample_rate));
        device.start(mixer.clone())?;

        let mut loader = SampleLoader::new(sample_rate);
        let mut samples = HashMap::new();
        for (name, slot) in layout.samples() {
            samples.insert(name.clone(), loader.load(&slot.file)?);
        }

        let scheduler = AnimationScheduler::new(sink, layout.fps());
        for y in 0..layout.grid_size() {
            for x in 0..layout.grid_size() {
                let pad = Pad::new(x, y);
                scheduler.set_idle_color(pad, layout.idle_color(pad));
            }
        }
        scheduler.start_ticker();

        Ok(Instrument {
            layout,
            engine: SynthEngine::new(mixer),
            scheduler,
            samples,
            device,
            silenced: AtomicBool::new(false),
        })
    }

    /// Handles a pad press: sound plus press animation.
    pub fn on_press(&self, pad: Pad) {
        let audio_ok = self.check_device();

        match self.layout.binding(pad) {
            Some(Binding::Note(note)) => {
                let note = note.clone();
                let pads = self.layout.note_pads(&note);
                let color = self.layout.note_color(&note).unwrap_or(Color::WHITE);
                if audio_ok {
                    if let Some(patch) = self.layout.note_patch(&note) {
                        self.engine.press_note(&note, pads.clone(), patch);
                    }
                }
                self.scheduler.start(
                    Animation::Breathe {
                        color,
                        period: BREATHE_PERIOD,
                        min_brightness: BREATHE_MIN_BRIGHTNESS,
                    },
                    pads,
                );
            }
            Some(Binding::Sample(name)) => {
                let name = name.clone();
                let Some(slot) = self.layout.sample(&name) else {
                    return;
                };
                if audio_ok {
                    if let Some(sample) = self.samples.get(&name) {
                        self.engine.trigger_sample(&name, sample, slot.volume);
                    }
                }
                self.scheduler.start(
                    Animation::Pulse {
                        color: slot.color,
                        duration: PULSE_DURATION,
                        max_brightness: PULSE_MAX_BRIGHTNESS,
                    },
                    vec![pad],
                );
            }
            None => debug!(%pad, "Press on unbound pad"),
        }
    }

    /// Handles a pad release: begin the note's release ramp and fade the
    /// pads back to idle. Releases of samples and unbound pads are no-ops.
    pub fn on_release(&self, pad: Pad) {
        self.check_device();

        match self.layout.binding(pad) {
            Some(Binding::Note(note)) => {
                let note = note.clone();
                self.engine.release_note(&note);
                for pad in self.layout.note_pads(&note) {
                    self.scheduler.start(
                        Animation::Fade {
                            from: Color::WHITE,
                            to: self.layout.idle_color(pad),
                            duration: FADE_DURATION,
                            curve: Curve::EaseOut,
                        },
                        vec![pad],
                    );
                }
            }
            Some(Binding::Sample(_)) => {}
            None => debug!(%pad, "Release on unbound pad"),
        }
    }

    /// Verifies the audio device, force-silencing all voices once when it
    /// goes unhealthy. Events keep flowing either way.
    fn check_device(&self) -> bool {
        if self.device.is_healthy() {
            return true;
        }
        if !self.silenced.swap(true, Ordering::SeqCst) {
            warn!(device = %self.device, "Audio device lost; silencing all voices");
            self.engine.force_silence();
        }
        false
    }

    /// The identities of all live voices.
    pub fn active_notes(&self) -> Vec<String> {
        self.engine.active_notes()
    }

    pub fn note_phase(&self, note: &str) -> Option<VoicePhase> {
        self.engine.note_phase(note)
    }

    pub fn active_animation(&self, pad: Pad) -> Option<AnimationKind> {
        self.scheduler.active_animation(pad)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// Consumes pad events until the channel closes or the handle cancels.
    pub fn run(&self, events: Receiver<PadEvent>, cancel_handle: CancelHandle) {
        info!(layout = self.layout.name(), "Instrument running");
        loop {
            if cancel_handle.is_cancelled() {
                break;
            }
            match events.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    if event.pressed {
                        self.on_press(event.pad);
                    } else {
                        self.on_release(event.pad);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shutdown();
    }

    /// Stops audio and animations.
    pub fn shutdown(&self) {
        info!("Instrument shutting down");
        self.engine.force_silence();
        self.scheduler.shutdown();
        self.device.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::audio::mock;
    use crate::led::mock::MockSink;
    use crate::testutil::eventually;

    const LAYOUT: &str = r#"
name: test
grid_size: 4
notes:
  q:
    note: C4
    envelope:
      attack: 0.01
      decay: 0.01
      sustain: 0.5
      release: 0.05
    color: {r: 0, g: 200, b: 0}
  w:
    note: E4
    color: {r: 0, g: 0, b: 200}
layout:
  - "qwq"
"#;

    fn instrument() -> (Instrument, Arc<mock::Device>, Arc<MockSink>) {
        let layout = Layout::parse(LAYOUT).unwrap();
        let device = Arc::new(mock::Device::get("mock"));
        let sink = Arc::new(MockSink::new());
        let instrument = Instrument::new(layout, device.clone(), sink.clone()).unwrap();
        (instrument, device, sink)
    }

    #[test]
    fn test_press_sounds_note_and_breathes_pads() {
        let (instrument, _device, _sink) = instrument();
        instrument.on_press(Pad::new(1, 0));

        assert_eq!(instrument.active_notes(), vec!["E4"]);
        assert_eq!(
            instrument.active_animation(Pad::new(1, 0)),
            Some(AnimationKind::Breathe)
        );
        instrument.shutdown();
    }

    #[test]
    fn test_note_bound_to_two_pads_animates_both() {
        let (instrument, _device, _sink) = instrument();
        instrument.on_press(Pad::new(0, 0));

        assert_eq!(
            instrument.active_animation(Pad::new(0, 0)),
            Some(AnimationKind::Breathe)
        );
        assert_eq!(
            instrument.active_animation(Pad::new(2, 0)),
            Some(AnimationKind::Breathe)
        );
        assert_eq!(instrument.active_notes(), vec!["C4"]);
        instrument.shutdown();
    }

    #[test]
    fn test_release_starts_fade_and_release_ramp() {
        let (instrument, _device, _sink) = instrument();
        instrument.on_press(Pad::new(1, 0));
        eventually(
            || instrument.note_phase("E4") == Some(VoicePhase::Held),
            "voice never reached held",
        );

        instrument.on_release(Pad::new(1, 0));
        assert_eq!(
            instrument.active_animation(Pad::new(1, 0)),
            Some(AnimationKind::Fade)
        );
        eventually(
            || instrument.note_phase("E4").is_none(),
            "voice never finished releasing",
        );
        instrument.shutdown();
    }

    #[test]
    fn test_unbound_pad_is_ignored() {
        let (instrument, _device, _sink) = instrument();
        instrument.on_press(Pad::new(3, 3));
        instrument.on_release(Pad::new(3, 3));

        assert!(instrument.active_notes().is_empty());
        assert_eq!(instrument.active_animation(Pad::new(3, 3)), None);
        instrument.shutdown();
    }

    #[test]
    fn test_device_loss_silences_and_keeps_accepting() {
        let (instrument, device, _sink) = instrument();
        instrument.on_press(Pad::new(1, 0));
        assert_eq!(instrument.active_notes(), vec!["E4"]);

        device.disconnect();
        // The next event silences everything; no panic, no error.
        instrument.on_press(Pad::new(0, 0));
        assert!(instrument.active_notes().is_empty());

        // LEDs still respond.
        assert_eq!(
            instrument.active_animation(Pad::new(0, 0)),
            Some(AnimationKind::Breathe)
        );
        instrument.on_release(Pad::new(0, 0));
        instrument.shutdown();
    }

    #[test]
    fn test_run_consumes_events_until_cancelled() {
        let (instrument, _device, _sink) = instrument();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let cancel_handle = CancelHandle::new();

        sender.send(PadEvent::press(Pad::new(1, 0))).unwrap();
        let handle_clone = cancel_handle.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            handle_clone.cancel();
        });
        instrument.run(receiver, cancel_handle);

        // run() silences everything on the way out.
        assert!(instrument.active_notes().is_empty());
    }
}
