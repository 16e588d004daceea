/*
 *  display/mod.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Display subsystem - logical grid, wiring table and panel transport
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

pub mod command;
pub mod color;
pub mod driver;
pub mod error;
pub mod framebuffer;
pub mod graphics;
pub mod hardware;
pub mod lut;
pub mod panel;

// Recording transport for tests and development without hardware
pub mod mock;

/// Logical grid columns (unrotated width)
pub const COLS: usize = 17;
/// Logical grid rows (unrotated height)
pub const ROWS: usize = 7;
pub const PIXEL_COUNT: usize = COLS * ROWS;

/// Display RAM per controller chip: 28 columns x 8 rows of channels
pub const PANEL_BUFFER_LEN: usize = 28 * 8;
pub const TRANSFER_BUFFER_LEN: usize = PANEL_BUFFER_LEN * 2;

// Re-exports for convenience
pub use driver::UnicornHatMini;
pub use error::DisplayError;
pub use framebuffer::{FrameBuffer, Rotation};
pub use hardware::HardwareDisplay;
pub use panel::{Panel, PanelId};
