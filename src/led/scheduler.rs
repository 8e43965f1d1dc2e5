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

//! The animation scheduler.
//!
//! All active animations share one tick thread. Starting an animation on a
//! pad preempts whatever instance owned that pad; an expiring instance
//! writes its pads' idle colors exactly once and is removed. The number of
//! live instances can therefore never exceed the number of pads, no matter
//! how fast pads are mashed.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use spin_sleep::SpinSleeper;
use tracing::{debug, info};

use super::animation::{Animation, AnimationKind};
use super::color::Color;
use super::PadSink;
use crate::grid::Pad;
use crate::playsync::CancelHandle;

pub const DEFAULT_FPS: u32 = 30;

/// One running animation bound to a set of pads.
struct AnimationInstance {
    animation: Animation,
    pads: Vec<Pad>,
    started: Instant,
}

#[derive(Default)]
struct SchedulerState {
    /// Which instance owns each pad. At most one owner per pad.
    owners: HashMap<Pad, u64>,
    instances: HashMap<u64, AnimationInstance>,
    idle_colors: HashMap<Pad, Color>,
    next_id: u64,
}

impl SchedulerState {
    fn idle_color(&self, pad: Pad) -> Color {
        self.idle_colors.get(&pad).copied().unwrap_or(Color::BLACK)
    }

    /// Removes an instance, returning the pads it owned.
    fn remove_instance(&mut self, id: u64) -> Vec<Pad> {
        let Some(instance) = self.instances.remove(&id) else {
            return Vec::new();
        };
        for pad in &instance.pads {
            if self.owners.get(pad) == Some(&id) {
                self.owners.remove(pad);
            }
        }
        instance.pads
    }
}

/// Ticks all active animations on a single shared thread and writes the
/// resulting colors to the pad sink.
pub struct AnimationScheduler {
    state: Arc<Mutex<SchedulerState>>,
    sink: Arc<dyn PadSink>,
    frame_duration: Duration,
    cancel_handle: CancelHandle,
}

impl AnimationScheduler {
    pub fn new(sink: Arc<dyn PadSink>, fps: u32) -> AnimationScheduler {
        AnimationScheduler {
            state: Arc::new(Mutex::new(SchedulerState::default())),
            sink,
            frame_duration: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            cancel_handle: CancelHandle::new(),
        }
    }

    /// The color a pad shows when nothing animates it. Written on instance
    /// expiry and on explicit stops.
    pub fn set_idle_color(&self, pad: Pad, color: Color) {
        let mut state = self.state.lock();
        state.idle_colors.insert(pad, color);
        if !state.owners.contains_key(&pad) {
            self.sink.set(pad, color);
        }
    }

    /// Starts an animation on the given pads, preempting any instance that
    /// currently owns one of them. Preempted instances are cancelled whole;
    /// their pads outside the new set drop back to idle.
    pub fn start(&self, animation: Animation, pads: Vec<Pad>) -> u64 {
        let now = Instant::now();
        let mut state = self.state.lock();

        let mut preempted: Vec<u64> = pads
            .iter()
            .filter_map(|pad| state.owners.get(pad).copied())
            .collect();
        preempted.sort_unstable();
        preempted.dedup();
        for id in preempted {
            debug!(instance = id, "Animation preempted");
            for pad in state.remove_instance(id) {
                if !pads.contains(&pad) {
                    self.sink.set(pad, state.idle_color(pad));
                }
            }
        }

        state.next_id += 1;
        let id = state.next_id;
        for pad in &pads {
            state.owners.insert(*pad, id);
        }
        state.instances.insert(
            id,
            AnimationInstance {
                animation,
                pads,
                started: now,
            },
        );
        id
    }

    /// Stops whatever animates the given pad, restoring idle colors on every
    /// pad of that instance.
    pub fn stop(&self, pad: Pad) {
        let mut state = self.state.lock();
        let Some(id) = state.owners.get(&pad).copied() else {
            return;
        };
        for pad in state.remove_instance(id) {
            self.sink.set(pad, state.idle_color(pad));
        }
    }

    /// Stops all animations, restoring idle colors everywhere.
    pub fn stop_all(&self) {
        let mut state = self.state.lock();
        let ids: Vec<u64> = state.instances.keys().copied().collect();
        for id in ids {
            for pad in state.remove_instance(id) {
                self.sink.set(pad, state.idle_color(pad));
            }
        }
    }

    /// The kind of animation currently owning a pad, if any.
    pub fn active_animation(&self, pad: Pad) -> Option<AnimationKind> {
        let state = self.state.lock();
        let id = state.owners.get(&pad)?;
        state.instances.get(id).map(|i| i.animation.kind())
    }

    /// The number of running animation instances.
    pub fn active_count(&self) -> usize {
        self.state.lock().instances.len()
    }

    /// Renders one frame for all active instances. Called by the tick thread
    /// at the configured rate.
    fn tick(&self, now: Instant) {
        let mut state = self.state.lock();

        let expired: Vec<u64> = state
            .instances
            .iter()
            .filter(|(_, instance)| {
                instance
                    .animation
                    .duration()
                    .is_some_and(|d| now.duration_since(instance.started) >= d)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            for pad in state.remove_instance(id) {
                self.sink.set(pad, state.idle_color(pad));
            }
        }

        for instance in state.instances.values() {
            let elapsed = now.duration_since(instance.started);
            for (index, pad) in instance.pads.iter().enumerate() {
                if let Some(color) = instance.animation.color_at(elapsed, *pad, index) {
                    self.sink.set(*pad, color);
                }
            }
        }
    }

    /// Spawns the tick thread. The thread exits when [`Self::shutdown`] is
    /// called.
    pub fn start_ticker(&self) {
        let state = self.state.clone();
        let sink = self.sink.clone();
        let frame_duration = self.frame_duration;
        let cancel_handle = self.cancel_handle.clone();
        info!(
            fps = (1.0 / frame_duration.as_secs_f64()).round(),
            "Animation ticker started"
        );

        let scheduler = AnimationScheduler {
            state,
            sink,
            frame_duration,
            cancel_handle: cancel_handle.clone(),
        };
        thread::spawn(move || {
            let sleeper = SpinSleeper::default();
            while !cancel_handle.is_cancelled() {
                scheduler.tick(Instant::now());
                sleeper.sleep(frame_duration);
            }
        });
    }

    /// Stops the tick thread and restores all pads to idle.
    pub fn shutdown(&self) {
        self.cancel_handle.cancel();
        self.stop_all();
    }
}
