/*
 *  lib.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Driver for the Unicorn HAT Mini 17x7 RGB LED matrix
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

//! # unicornhatmini
//!
//! Two LED controller chips, each on its own SPI device and chip-select
//! GPIO, presented as one 17x7 RGB grid.
//!
//! ```no_run
//! use unicornhatmini::config::DisplayConfig;
//! use unicornhatmini::display::hardware;
//!
//! let mut display = hardware::open(&DisplayConfig::default())?;
//! display.set_brightness(0.2)?;
//! display.set_pixel(0, 0, 255, 0, 0);
//! display.show()?;
//! # Ok::<(), unicornhatmini::display::DisplayError>(())
//! ```
//!
//! Any `embedded-hal` 1.0 `SpiDevice` + `OutputPin` pair works; see
//! [`display::Panel`].

pub mod config;
pub mod demo;
pub mod display;

pub use display::{DisplayError, Panel, PanelId, Rotation, UnicornHatMini};
