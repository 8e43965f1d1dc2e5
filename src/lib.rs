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

//! A button-grid musical instrument.
//!
//! Pads on an NxN grid trigger synthesized notes (with ADSR envelopes and
//! polyphonic voice management) or one-shot samples, while an animation
//! scheduler paints per-pad LED feedback at a fixed frame rate. Input
//! transports and output sinks are injected; the core never assumes a
//! particular grid device.

pub mod audio;
pub mod config;
pub mod grid;
pub mod input;
pub mod instrument;
pub mod led;
pub mod pitch;
pub mod playsync;
pub mod samples;
pub mod synth;
#[cfg(test)]
pub mod testutil;
