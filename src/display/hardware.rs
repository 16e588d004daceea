/*
 *  display/hardware.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Linux spidev + sysfs GPIO wiring for a Raspberry Pi host
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

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use log::info;

use crate::config::{DisplayConfig, PanelConfig};
use super::command::SPI_BITS_PER_WORD;
use super::driver::UnicornHatMini;
use super::error::DisplayError;
use super::panel::{Panel, PanelId};

/// Driver over the Linux userspace SPI and GPIO interfaces
pub type HardwareDisplay = UnicornHatMini<SpidevDevice, SysfsPin>;

/// Open both panels as configured and run the power-up sequence
///
/// `config` supplies the spidev paths, chip-select GPIOs and clock; anything
/// unset falls back to the HAT's wiring (spidev0.0/BCM8, spidev0.1/BCM7,
/// 600 kHz).
pub fn open(config: &DisplayConfig) -> Result<HardwareDisplay, DisplayError> {
    let speed_hz = config.speed_hz_or_default();
    let left = open_panel(PanelId::Left, &config.left_or_default(), speed_hz)?;
    let right = open_panel(PanelId::Right, &config.right_or_default(), speed_hz)?;

    let mut delay = Delay;
    UnicornHatMini::new(left, right, &mut delay)
}

fn open_panel(
    id: PanelId,
    cfg: &PanelConfig,
    speed_hz: u32,
) -> Result<Panel<SpidevDevice, SysfsPin>, DisplayError> {
    info!("Opening {} panel on {} (CS GPIO{}, {} Hz)", id, cfg.bus, cfg.cs_pin, speed_hz);

    let mut spi = SpidevDevice::open(&cfg.bus).map_err(|e| {
        DisplayError::InitializationFailed(format!("Failed to open SPI {}: {:?}", cfg.bus, e))
    })?;
    let options = SpidevOptions::new()
        .bits_per_word(SPI_BITS_PER_WORD)
        .max_speed_hz(speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).map_err(|e| {
        DisplayError::InitializationFailed(format!("Failed to configure SPI {}: {:?}", cfg.bus, e))
    })?;

    // deselected (high) from the moment it becomes an output
    let cs = SysfsPin::new(cfg.cs_pin);
    cs.export().map_err(|e| {
        DisplayError::InitializationFailed(format!("Failed to export GPIO{}: {:?}", cfg.cs_pin, e))
    })?;
    cs.set_direction(Direction::High).map_err(|e| {
        DisplayError::InitializationFailed(format!("Failed to set GPIO{} as output: {:?}", cfg.cs_pin, e))
    })?;

    Ok(Panel::new(id, spi, cs))
}
