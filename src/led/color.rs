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

use serde::{Deserialize, Serialize};

/// An RGB pad color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Converts HSV to RGB. Hue is in [0, 1); saturation and value in [0, 1].
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Color {
        let hue = hue.rem_euclid(1.0) * 6.0;
        let c = value * saturation;
        let x = c * (1.0 - (hue % 2.0 - 1.0).abs());
        let m = value - c;

        let (r, g, b) = match hue as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Color {
            r: ((r + m) * 255.0) as u8,
            g: ((g + m) * 255.0) as u8,
            b: ((b + m) * 255.0) as u8,
        }
    }

    /// Linear interpolation between two colors. `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    /// Scales brightness. Factors above 1.0 saturate toward white per channel.
    pub fn scale(self, factor: f32) -> Color {
        let factor = factor.max(0.0);
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Color {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        assert_eq!(red.lerp(blue, 0.0), red);
        assert_eq!(red.lerp(blue, 1.0), blue);
        assert_eq!(red.lerp(blue, 2.0), blue);
    }

    #[test]
    fn test_lerp_midpoint() {
        let black = Color::BLACK;
        let white = Color::WHITE;
        let mid = black.lerp(white, 0.5);
        assert_eq!(mid, Color::new(128, 128, 128));
    }

    #[test]
    fn test_scale() {
        let color = Color::new(100, 200, 50);
        assert_eq!(color.scale(0.5), Color::new(50, 100, 25));
        assert_eq!(color.scale(0.0), Color::BLACK);
        // Over-brightening clips per channel.
        assert_eq!(color.scale(2.0), Color::new(200, 255, 100));
    }

    #[test]
    fn test_from_hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::new(255, 0, 0));
        assert_eq!(Color::from_hsv(1.0 / 3.0, 1.0, 1.0), Color::new(0, 255, 0));
        assert_eq!(Color::from_hsv(2.0 / 3.0, 1.0, 1.0), Color::new(0, 0, 255));
    }

    #[test]
    fn test_from_hsv_wraps() {
        assert_eq!(Color::from_hsv(1.0, 1.0, 1.0), Color::from_hsv(0.0, 1.0, 1.0));
        assert_eq!(Color::from_hsv(-0.5, 1.0, 1.0), Color::from_hsv(0.5, 1.0, 1.0));
    }

    #[test]
    fn test_from_hsv_desaturated() {
        assert_eq!(Color::from_hsv(0.0, 0.0, 1.0), Color::WHITE);
        assert_eq!(Color::from_hsv(0.0, 1.0, 0.0), Color::BLACK);
    }
}
