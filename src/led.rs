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

//! Pad LED rendering: colors, animations, and the scheduler that ticks them.

use crate::grid::Pad;

pub mod animation;
pub mod color;
pub mod console;
pub mod mock;
pub mod scheduler;

pub use animation::{Animation, AnimationKind, Curve};
pub use color::Color;
pub use scheduler::AnimationScheduler;

/// Where rendered pad colors go. Implementations must tolerate being called
/// at the full tick rate.
pub trait PadSink: Send + Sync {
    fn set(&self, pad: Pad, color: Color);
}
