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

//! Note synthesis: oscillators, ADSR envelopes, voices, and the voice
//! manager that owns their lifecycles.

pub mod engine;
pub mod envelope;
pub mod oscillator;
pub mod voice;

pub use engine::{NotePatch, SynthEngine};
pub use envelope::EnvelopeParams;
pub use oscillator::Waveform;
pub use voice::VoicePhase;
