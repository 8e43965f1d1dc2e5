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

//! One sounding instance of a synthesized note.
//!
//! A voice is split into two halves: a [`VoiceHandle`] owned by the voice
//! manager (control: release, re-trigger, force-stop, phase queries) and a
//! [`VoiceSource`] owned by the mixer (sample generation). Control requests
//! travel over atomics; the generation side captures the live gain when it
//! observes a request, so the envelope stays continuous no matter when the
//! request arrived.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::envelope::{self, EnvelopeParams};
use super::oscillator::{Oscillator, Waveform};
use crate::audio::SampleSource;
use crate::grid::Pad;

/// The lifecycle phase of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePhase {
    Attacking,
    Held,
    Releasing,
    Finished,
}

impl VoicePhase {
    fn as_u8(self) -> u8 {
        match self {
            VoicePhase::Attacking => 0,
            VoicePhase::Held => 1,
            VoicePhase::Releasing => 2,
            VoicePhase::Finished => 3,
        }
    }

    fn from_u8(value: u8) -> VoicePhase {
        match value {
            0 => VoicePhase::Attacking,
            1 => VoicePhase::Held,
            2 => VoicePhase::Releasing,
            _ => VoicePhase::Finished,
        }
    }
}

/// State shared between the control and generation halves of a voice.
struct VoiceShared {
    phase: AtomicU8,
    release_requested: AtomicBool,
    retrigger_requested: AtomicBool,
    /// Observed by the mixer; setting it drops the source without waiting for
    /// the release envelope (used on device loss).
    finished: AtomicBool,
}

/// The voice manager's half of a voice.
pub struct VoiceHandle {
    note: String,
    pads: Vec<Pad>,
    shared: Arc<VoiceShared>,
    pressed_at: Instant,
    released_at: Option<Instant>,
}

impl VoiceHandle {
    /// The note identity this voice is sounding.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// The pads bound to this voice's note.
    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn phase(&self) -> VoicePhase {
        if self.shared.finished.load(Ordering::Acquire) {
            return VoicePhase::Finished;
        }
        VoicePhase::from_u8(self.shared.phase.load(Ordering::Acquire))
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == VoicePhase::Finished
    }

    pub fn pressed_at(&self) -> Instant {
        self.pressed_at
    }

    pub fn released_at(&self) -> Option<Instant> {
        self.released_at
    }

    /// Asks the generation side to begin the release ramp. The ramp starts
    /// from whatever gain is current when the request is observed.
    pub fn release(&mut self) {
        if self.is_finished() {
            return;
        }
        if self.released_at.is_none() {
            self.released_at = Some(Instant::now());
        }
        self.shared.release_requested.store(true, Ordering::Release);
    }

    /// Asks the generation side to restart the attack from the current gain.
    pub fn retrigger(&mut self) {
        if self.is_finished() {
            return;
        }
        self.released_at = None;
        self.pressed_at = Instant::now();
        self.shared
            .retrigger_requested
            .store(true, Ordering::Release);
    }

    /// Terminates the voice immediately, skipping the release envelope. The
    /// mixer drops the source on its next pass.
    pub fn force_stop(&self) {
        self.shared.finished.store(true, Ordering::Release);
        self.shared
            .phase
            .store(VoicePhase::Finished.as_u8(), Ordering::Release);
    }
}

/// The mixer's half of a voice: generates frequency- and envelope-shaped
/// samples until the release ramp hits zero.
pub struct VoiceSource {
    oscillator: Oscillator,
    envelope: EnvelopeParams,
    amplitude: f32,
    sample_rate: u32,
    shared: Arc<VoiceShared>,
    /// Samples generated since the most recent trigger.
    clock: u64,
    /// Gain carried into the attack ramp (zero on first press).
    start_gain: f32,
    /// Gain and clock captured when the release request was observed.
    release_from: Option<(f32, u64)>,
}

impl VoiceSource {
    fn gain_at_clock(&self) -> f32 {
        let elapsed = self.clock as f32 / self.sample_rate as f32;
        match self.release_from {
            Some((from, at)) => {
                let since_release = (self.clock - at) as f32 / self.sample_rate as f32;
                envelope::release_gain(&self.envelope, from, since_release)
            }
            None => envelope::held_gain(&self.envelope, self.start_gain, elapsed),
        }
    }
}

impl SampleSource for VoiceSource {
    fn next_sample(&mut self) -> Option<f32> {
        if self.shared.finished.load(Ordering::Acquire) {
            return None;
        }

        if self
            .shared
            .retrigger_requested
            .swap(false, Ordering::AcqRel)
        {
            // Restart the attack from the live gain so the re-trigger doesn't
            // snap the level back to zero.
            self.start_gain = self.gain_at_clock();
            self.clock = 0;
            self.release_from = None;
            self.shared
                .phase
                .store(VoicePhase::Attacking.as_u8(), Ordering::Release);
        }

        if self.shared.release_requested.swap(false, Ordering::AcqRel)
            && self.release_from.is_none()
        {
            self.release_from = Some((self.gain_at_clock(), self.clock));
            self.shared
                .phase
                .store(VoicePhase::Releasing.as_u8(), Ordering::Release);
        }

        let gain = self.gain_at_clock();
        if self.release_from.is_some() && gain <= 0.0 {
            self.shared.finished.store(true, Ordering::Release);
            self.shared
                .phase
                .store(VoicePhase::Finished.as_u8(), Ordering::Release);
            return None;
        }

        if self.release_from.is_none() {
            let elapsed = self.clock as f32 / self.sample_rate as f32;
            if elapsed >= self.envelope.attack
                && self.shared.phase.load(Ordering::Acquire) == VoicePhase::Attacking.as_u8()
            {
                self.shared
                    .phase
                    .store(VoicePhase::Held.as_u8(), Ordering::Release);
            }
        }

        let sample = self.oscillator.next_sample(self.sample_rate) * gain * self.amplitude;
        self.clock += 1;
        Some(sample)
    }
}

/// Starts a new voice, returning the control and generation halves.
pub fn start_voice(
    note: &str,
    pads: Vec<Pad>,
    waveform: Waveform,
    frequency: f64,
    envelope: EnvelopeParams,
    amplitude: f32,
    sample_rate: u32,
) -> (VoiceHandle, VoiceSource) {
    let shared = Arc::new(VoiceShared {
        phase: AtomicU8::new(VoicePhase::Attacking.as_u8()),
        release_requested: AtomicBool::new(false),
        retrigger_requested: AtomicBool::new(false),
        finished: AtomicBool::new(false),
    });

    let handle = VoiceHandle {
        note: note.to_string(),
        pads,
        shared: shared.clone(),
        pressed_at: Instant::now(),
        released_at: None,
    };
    let source = VoiceSource {
        oscillator: Oscillator::new(waveform, frequency),
        envelope,
        amplitude,
        sample_rate,
        shared,
        clock: 0,
        start_gain: 0.0,
        release_from: None,
    };

    (handle, source)
}
