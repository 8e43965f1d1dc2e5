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

//! Animation kinds and their frame renderers.
//!
//! Every kind is a closed variant with its own parameters, resolved from
//! configuration before any rendering happens. Rendering is a function of
//! elapsed time, the target pad, and the pad's position within the
//! animation's pad list; the scheduler calls it once per pad per tick.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::color::Color;
use crate::grid::Pad;

/// Easing curves for time-interpolated animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Sine,
}

impl Curve {
    /// Maps linear progress in [0, 1] through the easing function.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t,
            Curve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Curve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            Curve::Sine => ((t * std::f32::consts::PI - std::f32::consts::FRAC_PI_2).sin() + 1.0) / 2.0,
        }
    }
}

/// The kind of an animation, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Breathe,
    Pulse,
    Fade,
    Ripple,
    Sparkle,
    Wave,
    RainbowCycle,
    Strobe,
}

/// A visual effect with its parameters.
#[derive(Debug, Clone)]
pub enum Animation {
    /// Sine-wave brightness modulation. Loops until stopped; bound to held
    /// notes.
    Breathe {
        color: Color,
        period: Duration,
        min_brightness: f32,
    },
    /// A single brightness swell and return. Press feedback.
    Pulse {
        color: Color,
        duration: Duration,
        max_brightness: f32,
    },
    /// Interpolation between two colors. Release feedback.
    Fade {
        from: Color,
        to: Color,
        duration: Duration,
        curve: Curve,
    },
    /// An outward-traveling ring from a center pad. Pads light as the
    /// wavefront passes and keep their last color until expiry.
    Ripple {
        center: Pad,
        color: Color,
        radius: f32,
        duration: Duration,
        fade_out: bool,
    },
    /// Random per-frame brightness jitter. Intentionally discontinuous.
    Sparkle {
        color: Color,
        duration: Option<Duration>,
        intensity: f32,
    },
    /// Breathe across a pad list with a per-pad phase offset.
    Wave {
        color: Color,
        period: Duration,
        phase_offset: Duration,
    },
    /// Continuous hue rotation at full saturation and value.
    RainbowCycle { period: Duration },
    /// Binary on/off flashing.
    Strobe {
        color: Color,
        frequency: f32,
        duration: Duration,
    },
}

impl Animation {
    pub fn kind(&self) -> AnimationKind {
        match self {
            Animation::Breathe { .. } => AnimationKind::Breathe,
            Animation::Pulse { .. } => AnimationKind::Pulse,
            Animation::Fade { .. } => AnimationKind::Fade,
            Animation::Ripple { .. } => AnimationKind::Ripple,
            Animation::Sparkle { .. } => AnimationKind::Sparkle,
            Animation::Wave { .. } => AnimationKind::Wave,
            Animation::RainbowCycle { .. } => AnimationKind::RainbowCycle,
            Animation::Strobe { .. } => AnimationKind::Strobe,
        }
    }

    /// How long the animation runs, or `None` for ones that loop until
    /// stopped or preempted.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Animation::Breathe { .. }
            | Animation::Wave { .. }
            | Animation::RainbowCycle { .. } => None,
            Animation::Pulse { duration, .. }
            | Animation::Fade { duration, .. }
            | Animation::Ripple { duration, .. }
            | Animation::Strobe { duration, .. } => Some(*duration),
            Animation::Sparkle { duration, .. } => *duration,
        }
    }

    /// Renders the color for one pad at the given elapsed time. Returns
    /// `None` when the pad should not be written this frame (expired, or not
    /// currently touched by the effect, as with a ripple wavefront).
    ///
    /// `pad_index` is the pad's position in the instance's pad list; only
    /// [`Animation::Wave`] uses it.
    pub fn color_at(&self, elapsed: Duration, pad: Pad, pad_index: usize) -> Option<Color> {
        if let Some(duration) = self.duration() {
            if elapsed >= duration {
                return None;
            }
        }
        let t = elapsed.as_secs_f32();

        match self {
            Animation::Breathe {
                color,
                period,
                min_brightness,
            } => {
                let phase = t / period.as_secs_f32();
                let brightness =
                    min_brightness + (1.0 - min_brightness) * (0.5 + 0.5 * (TAU * phase).sin());
                Some(color.scale(brightness))
            }
            Animation::Pulse {
                color,
                duration,
                max_brightness,
            } => {
                let progress = t / duration.as_secs_f32();
                let brightness =
                    1.0 + (max_brightness - 1.0) * (progress * std::f32::consts::PI).sin();
                Some(color.scale(brightness))
            }
            Animation::Fade {
                from,
                to,
                duration,
                curve,
            } => {
                let progress = curve.apply(t / duration.as_secs_f32());
                Some(from.lerp(*to, progress))
            }
            Animation::Ripple {
                center,
                color,
                radius,
                duration,
                fade_out,
            } => {
                let distance = pad.distance(*center) as f32;
                if distance == 0.0 || distance > *radius {
                    return None;
                }
                let wavefront = radius * t / duration.as_secs_f32();
                // Only the ring at the wavefront lights up each frame.
                if distance > wavefront || distance < wavefront - 1.0 {
                    return None;
                }
                let brightness = if *fade_out {
                    1.0 - distance / radius
                } else {
                    1.0
                };
                Some(color.scale(brightness))
            }
            Animation::Sparkle {
                color, intensity, ..
            } => {
                let jitter = rand::thread_rng().gen_range(-1.0f32..1.0);
                Some(color.scale(1.0 + jitter * intensity))
            }
            Animation::Wave {
                color,
                period,
                phase_offset,
            } => {
                let shifted = t + pad_index as f32 * phase_offset.as_secs_f32();
                let phase = (shifted % period.as_secs_f32()) / period.as_secs_f32();
                let brightness = 0.5 + 0.5 * (TAU * phase).sin();
                // Keep a floor so the trough stays visible.
                Some(color.scale(brightness * 0.7 + 0.3))
            }
            Animation::RainbowCycle { period } => {
                let hue = (t / period.as_secs_f32()).rem_euclid(1.0);
                Some(Color::from_hsv(hue, 1.0, 1.0))
            }
            Animation::Strobe {
                color, frequency, ..
            } => {
                let phase = (t * frequency).rem_euclid(1.0);
                if phase < 0.5 {
                    Some(*color)
                } else {
                    Some(Color::BLACK)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PAD: Pad = Pad::new(0, 0);

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_curves_hit_endpoints() {
        for curve in [
            Curve::Linear,
            Curve::EaseIn,
            Curve::EaseOut,
            Curve::EaseInOut,
            Curve::Sine,
        ] {
            assert!(curve.apply(0.0).abs() < 1e-5, "{curve:?} at 0");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-5, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_curve_ease_in_is_slow_at_start() {
        assert!(Curve::EaseIn.apply(0.25) < 0.25);
        assert!(Curve::EaseOut.apply(0.25) > 0.25);
    }

    #[test]
    fn test_breathe_reaches_min_brightness() {
        let animation = Animation::Breathe {
            color: Color::new(200, 100, 0),
            period: secs(2.0),
            min_brightness: 0.3,
        };
        // sin is -1 at 3/4 period.
        let dim = animation.color_at(secs(1.5), PAD, 0).unwrap();
        assert_eq!(dim, Color::new(200, 100, 0).scale(0.3));
        // sin is +1 at 1/4 period: full brightness.
        let bright = animation.color_at(secs(0.5), PAD, 0).unwrap();
        assert!(bright.r >= 199);
        assert!(bright.g >= 99);
    }

    #[test]
    fn test_breathe_loops() {
        let animation = Animation::Breathe {
            color: Color::WHITE,
            period: secs(2.0),
            min_brightness: 0.3,
        };
        assert!(animation.duration().is_none());
        assert!(animation.color_at(secs(100.0), PAD, 0).is_some());
    }

    #[test]
    fn test_pulse_peaks_mid_flight() {
        let animation = Animation::Pulse {
            color: Color::new(100, 100, 100),
            duration: secs(0.5),
            max_brightness: 1.5,
        };
        let start = animation.color_at(secs(0.0), PAD, 0).unwrap();
        let peak = animation.color_at(secs(0.25), PAD, 0).unwrap();
        assert_eq!(start, Color::new(100, 100, 100));
        assert!(peak.r >= 149);
        assert!(animation.color_at(secs(0.5), PAD, 0).is_none());
    }

    #[test]
    fn test_fade_interpolates() {
        let animation = Animation::Fade {
            from: Color::WHITE,
            to: Color::BLACK,
            duration: secs(1.0),
            curve: Curve::Linear,
        };
        assert_eq!(animation.color_at(secs(0.0), PAD, 0), Some(Color::WHITE));
        assert_eq!(
            animation.color_at(secs(0.5), PAD, 0),
            Some(Color::new(128, 128, 128))
        );
        assert!(animation.color_at(secs(1.0), PAD, 0).is_none());
    }

    #[test]
    fn test_ripple_wavefront() {
        let animation = Animation::Ripple {
            center: Pad::new(2, 2),
            color: Color::new(0, 0, 255),
            radius: 3.0,
            duration: secs(0.9),
            fade_out: false,
        };
        // At t=0.3 the wavefront radius is 1.0: direct neighbors light up.
        assert!(animation
            .color_at(secs(0.3), Pad::new(3, 2), 0)
            .is_some());
        // Pads further out are not touched yet.
        assert!(animation
            .color_at(secs(0.3), Pad::new(4, 2), 0)
            .is_none());
        // The center pad never lights.
        assert!(animation
            .color_at(secs(0.3), Pad::new(2, 2), 0)
            .is_none());
        // Once the front has moved on, the neighbor is no longer written.
        assert!(animation
            .color_at(secs(0.8), Pad::new(3, 2), 0)
            .is_none());
    }

    #[test]
    fn test_ripple_fades_with_distance() {
        let animation = Animation::Ripple {
            center: Pad::new(0, 0),
            color: Color::new(255, 0, 0),
            radius: 4.0,
            duration: secs(1.0),
            fade_out: true,
        };
        let near = animation.color_at(secs(0.25), Pad::new(1, 0), 0).unwrap();
        let far = animation.color_at(secs(0.75), Pad::new(3, 0), 0).unwrap();
        assert!(near.r > far.r);
    }

    #[test]
    fn test_sparkle_stays_in_range() {
        let animation = Animation::Sparkle {
            color: Color::new(200, 200, 200),
            duration: None,
            intensity: 0.5,
        };
        for i in 0..100 {
            let color = animation.color_at(secs(i as f64 * 0.033), PAD, 0).unwrap();
            assert!(color.r >= 100);
        }
    }

    #[test]
    fn test_sparkle_finite_duration_expires() {
        let animation = Animation::Sparkle {
            color: Color::WHITE,
            duration: Some(secs(1.0)),
            intensity: 0.5,
        };
        assert!(animation.color_at(secs(1.5), PAD, 0).is_none());
    }

    #[test]
    fn test_wave_offsets_pads() {
        let animation = Animation::Wave {
            color: Color::new(200, 200, 200),
            period: secs(2.0),
            phase_offset: secs(0.5),
        };
        let first = animation.color_at(secs(0.25), PAD, 0).unwrap();
        let second = animation.color_at(secs(0.25), PAD, 1).unwrap();
        assert_ne!(first, second);
        // Pad 1 at t is pad 0 at t + offset.
        let shifted = animation.color_at(secs(0.75), PAD, 0).unwrap();
        assert_eq!(second, shifted);
    }

    #[test]
    fn test_rainbow_cycles_hue() {
        let animation = Animation::RainbowCycle { period: secs(3.0) };
        let start = animation.color_at(secs(0.0), PAD, 0).unwrap();
        assert_eq!(start, Color::new(255, 0, 0));
        let third = animation.color_at(secs(1.0), PAD, 0).unwrap();
        assert_eq!(third, Color::new(0, 255, 0));
        // A full period returns to the starting hue.
        let wrapped = animation.color_at(secs(3.0), PAD, 0).unwrap();
        assert_eq!(wrapped, start);
    }

    #[test]
    fn test_strobe_alternates() {
        let animation = Animation::Strobe {
            color: Color::WHITE,
            frequency: 5.0,
            duration: secs(1.0),
        };
        assert_eq!(animation.color_at(secs(0.01), PAD, 0), Some(Color::WHITE));
        assert_eq!(animation.color_at(secs(0.15), PAD, 0), Some(Color::BLACK));
        assert_eq!(animation.color_at(secs(0.21), PAD, 0), Some(Color::WHITE));
        assert!(animation.color_at(secs(1.0), PAD, 0).is_none());
    }
}
