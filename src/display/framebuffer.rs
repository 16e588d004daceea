/*
 *  display/framebuffer.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Logical 17x7 frame buffer and rotation-aware pixel addressing
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

use embedded_graphics::pixelcolor::{Rgb666, RgbColor};

use super::color::quantize;
use super::error::DisplayError;
use super::{COLS, PIXEL_COUNT, ROWS};

/// Display rotation, clockwise quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when the visible footprint is transposed (7 wide, 17 tall)
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Visible (width, height) under this rotation
    pub fn shape(self) -> (usize, usize) {
        if self.is_quarter_turn() {
            (ROWS, COLS)
        } else {
            (COLS, ROWS)
        }
    }

    /// Storage slot for a visible coordinate, `None` if it falls off the grid
    pub fn slot(self, x: i32, y: i32) -> Option<usize> {
        let (width, height) = self.shape();
        let x = usize::try_from(x).ok().filter(|&x| x < width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < height)?;

        let index = match self {
            Rotation::Deg0 => x * ROWS + y,
            Rotation::Deg90 => (COLS - 1 - y) * ROWS + x,
            Rotation::Deg180 => (COLS - 1 - x) * ROWS + (ROWS - 1 - y),
            Rotation::Deg270 => y * ROWS + (ROWS - 1 - x),
        };

        (index < PIXEL_COUNT).then_some(index)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = DisplayError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(DisplayError::InvalidRotation(other)),
        }
    }
}

/// 119 quantised pixels in unrotated `x * ROWS + y` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [Rgb666; PIXEL_COUNT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [Rgb666::BLACK; PIXEL_COUNT],
        }
    }

    /// Store one pixel at a visible coordinate; off-grid writes are dropped
    pub fn set_pixel(&mut self, rotation: Rotation, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if let Some(px) = rotation.slot(x, y).and_then(|slot| self.pixels.get_mut(slot)) {
            *px = quantize(r, g, b);
        }
    }

    pub fn set_all(&mut self, r: u8, g: u8, b: u8) {
        self.pixels.fill(quantize(r, g, b));
    }

    pub fn clear(&mut self) {
        self.set_all(0, 0, 0);
    }

    /// Stored value of a storage slot
    pub fn get(&self, slot: usize) -> Option<Rgb666> {
        self.pixels.get(slot).copied()
    }

    pub fn as_slice(&self) -> &[Rgb666] {
        &self.pixels
    }
}
