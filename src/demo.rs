/*
 *  demo.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Demo animations: scrolling rainbow and moving concentric rings
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

use clap::ValueEnum;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use serde::{Deserialize, Serialize};

use crate::display::color::hsv_to_rgb;
use crate::display::{UnicornHatMini, COLS, ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Diagonal rainbow drifting over time
    #[default]
    Rainbow,
    /// Rings radiating from a wandering centre
    Concentric,
}

/// Where the animation is: wall-clock seconds and frame counter
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    pub seconds: f64,
    pub step: u64,
}

impl Pattern {
    /// Colour of one visible pixel for this frame
    pub fn color_at(self, frame: Frame, x: usize, y: usize) -> Rgb888 {
        let (cols, rows) = (COLS as f64, ROWS as f64);
        let (x, y) = (x as f64, y as f64);

        let hue = match self {
            Pattern::Rainbow => frame.seconds / 4.0 + x / (cols * 2.0) + y / rows,
            Pattern::Concentric => {
                let step = frame.step as f64;
                let dx = (step / cols + 20.0).sin() * cols + rows;
                let dy = (step / rows).cos() * rows + rows;
                let sc = (step / rows).cos() * rows + cols;
                ((x - dx).powi(2) + (y - dy).powi(2)).sqrt() / sc
            }
        };
        hsv_to_rgb(hue, 1.0, 1.0)
    }

    /// Paint every visible pixel of `display` for this frame (no flush)
    pub fn render<SPI, CS>(self, display: &mut UnicornHatMini<SPI, CS>, frame: Frame)
    where
        SPI: SpiDevice,
        CS: OutputPin,
    {
        let (width, height) = display.shape();
        for y in 0..height {
            for x in 0..width {
                let c = self.color_at(frame, x, y);
                display.set_pixel(x as i32, y as i32, c.r(), c.g(), c.b());
            }
        }
    }
}
