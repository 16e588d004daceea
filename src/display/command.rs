/*
 *  display/command.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Wire command bytes for the LED matrix controller
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

// Reset and power
pub const SOFT_RESET: u8 = 0xCC; // Soft reset, all registers to defaults
pub const SYSTEM_CTRL: u8 = 0x35; // System control, 0x00 off / 0x03 on

// Output configuration
pub const GLOBAL_BRIGHTNESS: u8 = 0x37; // Global brightness, 6-bit
pub const COM_PIN_CTRL: u8 = 0x41; // Common pin enable mask
pub const ROW_PIN_CTRL: u8 = 0x42; // Row pin enable mask, 4 bytes
pub const SCROLL_CTRL: u8 = 0x20; // Hardware scroll control

// Display RAM
pub const WRITE_DISPLAY: u8 = 0x80; // Write display RAM, followed by start address
pub const READ_DISPLAY: u8 = 0x81; // Read display RAM (unused, no read path)

// Command arguments
pub const SYSTEM_OFF: u8 = 0x00;
pub const SYSTEM_ON: u8 = 0x03;
pub const SCROLL_OFF: u8 = 0x00;
pub const DISPLAY_START_ADDR: u8 = 0x00;
pub const PINS_ALL_ON: u8 = 0xFF;
pub const PINS_ALL_OFF: u8 = 0x00;

/// Brightness programmed at power-up, the lowest non-zero level
pub const DEFAULT_BRIGHTNESS: u8 = 0x01;

/// Largest value the global brightness register accepts
pub const MAX_BRIGHTNESS: u8 = 63;

/// SPI link parameters, the controller tops out well below typical spidev defaults
pub const SPI_MAX_SPEED_HZ: u32 = 600_000;
pub const SPI_BITS_PER_WORD: u8 = 8;

/// Settle time after a soft reset before the controller accepts commands
pub const RESET_SETTLE_MS: u32 = 10;
