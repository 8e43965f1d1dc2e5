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

//! Attack-decay-sustain-release amplitude shaping.
//!
//! The gain functions here are pure. The continuity contract: gain never jumps
//! at a phase boundary. Attack ramps from the gain that was current at trigger
//! time (zero on a fresh press, the live gain on a re-trigger), and release
//! ramps down from the gain that was current at release time, so a release
//! arriving mid-attack or mid-decay stays click-free.

use serde::{Deserialize, Serialize};

fn default_attack() -> f32 {
    0.01
}

fn default_decay() -> f32 {
    0.05
}

fn default_sustain() -> f32 {
    0.8
}

fn default_release() -> f32 {
    0.2
}

/// ADSR parameters. Times are in seconds, sustain is a level in [0, 1].
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeParams {
    #[serde(default = "default_attack")]
    pub attack: f32,
    #[serde(default = "default_decay")]
    pub decay: f32,
    #[serde(default = "default_sustain")]
    pub sustain: f32,
    #[serde(default = "default_release")]
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: default_attack(),
            decay: default_decay(),
            sustain: default_sustain(),
            release: default_release(),
        }
    }
}

/// Typed error for malformed envelope parameters, caught at config load.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("envelope {0} must not be negative (got {1})")]
    NegativeTime(&'static str, f32),

    #[error("envelope sustain must be within [0, 1] (got {0})")]
    SustainOutOfRange(f32),
}

impl EnvelopeParams {
    /// Validates the parameters. Called at configuration load so malformed
    /// envelopes prevent startup instead of surfacing mid-session.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EnvelopeError::NegativeTime(name, value));
            }
        }
        if !self.sustain.is_finite() || !(0.0..=1.0).contains(&self.sustain) {
            return Err(EnvelopeError::SustainOutOfRange(self.sustain));
        }
        Ok(())
    }
}

/// Gain for a voice that has not been released, `elapsed` seconds after its
/// trigger. `start_gain` is the gain the voice carried into the attack ramp.
pub fn held_gain(params: &EnvelopeParams, start_gain: f32, elapsed: f32) -> f32 {
    let elapsed = elapsed.max(0.0);
    let gain = if elapsed < params.attack {
        start_gain + (1.0 - start_gain) * (elapsed / params.attack)
    } else if elapsed < params.attack + params.decay {
        1.0 + (params.sustain - 1.0) * ((elapsed - params.attack) / params.decay)
    } else {
        params.sustain
    };
    gain.clamp(0.0, 1.0)
}

/// Gain for a releasing voice, `elapsed` seconds after the release event.
/// `from_gain` is the gain that was current when the release arrived.
pub fn release_gain(params: &EnvelopeParams, from_gain: f32, elapsed: f32) -> f32 {
    let elapsed = elapsed.max(0.0);
    if params.release <= 0.0 || elapsed >= params.release {
        return 0.0;
    }
    (from_gain * (1.0 - elapsed / params.release)).clamp(0.0, 1.0)
}
