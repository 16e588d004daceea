/*
 *  display/color.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Channel quantisation and colour helpers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::{Rgb666, Rgb888};

/// Reduce 8-bit channels to the controller's 6-bit resolution
///
/// Plain truncation (`>> 2`), so 255 becomes 63 and 3 becomes 0.
#[inline]
pub fn quantize(r: u8, g: u8, b: u8) -> Rgb666 {
    Rgb666::new(r >> 2, g >> 2, b >> 2)
}

/// Convert HSV to RGB
///
/// `h` wraps, so any real hue is accepted. `s` and `v` are expected in [0, 1].
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb888 {
    let h = h.rem_euclid(1.0);

    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    // rem_euclid can round up to exactly 1.0 for tiny negative hues
    let (r, g, b) = match (h * 6.0) as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb888::new(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
