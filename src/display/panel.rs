/*
 *  display/panel.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  One controller chip: SPI link, chip-select line, buffer half
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

use std::fmt;

use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::spi::{Error as _, SpiDevice};
use log::{debug, warn};

use super::PANEL_BUFFER_LEN;
use super::error::DisplayError;

/// Which half of the display a panel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Left,
    Right,
}

impl PanelId {
    /// Byte offset of this panel's half in the shared transfer buffer
    pub const fn offset(self) -> usize {
        match self {
            PanelId::Left => 0,
            PanelId::Right => PANEL_BUFFER_LEN,
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelId::Left => write!(f, "left"),
            PanelId::Right => write!(f, "right"),
        }
    }
}

/// One LED controller chip
///
/// The chip-select pin is driven by hand around every command: the
/// controller latches a command on the rising edge, independent of whatever
/// the SPI peripheral does with its own CE line.
pub struct Panel<SPI, CS> {
    id: PanelId,
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Panel<SPI, CS>
where
    SPI: SpiDevice,
    CS: OutputPin,
{
    pub fn new(id: PanelId, spi: SPI, cs: CS) -> Self {
        Self { id, spi, cs }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn offset(&self) -> usize {
        self.id.offset()
    }

    /// Send one command (opcode plus arguments/payload) framed by chip-select
    ///
    /// Pin low, one SPI write, pin high. A failed write still releases the
    /// pin before the SPI error is returned.
    pub fn xfer(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        let id = self.id;
        let cs = ChipSelect::select(&mut self.cs, id)?;

        let sent = self.spi.write(data);
        let released = cs.release();

        if let Err(e) = sent {
            if let Err(release_err) = released {
                warn!("{} panel: chip-select release after failed write also failed: {}", id, release_err);
            }
            debug!("{} panel: SPI write of {} bytes failed: {:?}", id, data.len(), e);
            return Err(DisplayError::Spi { panel: id, kind: e.kind() });
        }
        released
    }

    /// Hand back the SPI device and pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

/// Chip-select held low for the lifetime of one command
///
/// `release()` drives the pin high and reports failure. If the guard is
/// dropped without it (early return, panic in the transport) the pin is
/// still driven high, best effort.
struct ChipSelect<'a, CS: OutputPin> {
    pin: Option<&'a mut CS>,
    panel: PanelId,
}

impl<'a, CS: OutputPin> ChipSelect<'a, CS> {
    fn select(pin: &'a mut CS, panel: PanelId) -> Result<Self, DisplayError> {
        pin.set_low().map_err(|e| {
            debug!("{} panel: chip-select low failed: {:?}", panel, e);
            DisplayError::Gpio { panel, kind: e.kind() }
        })?;
        Ok(Self { pin: Some(pin), panel })
    }

    fn release(mut self) -> Result<(), DisplayError> {
        let panel = self.panel;
        match self.pin.take() {
            Some(pin) => pin.set_high().map_err(|e| {
                debug!("{} panel: chip-select high failed: {:?}", panel, e);
                DisplayError::Gpio { panel, kind: e.kind() }
            }),
            None => Ok(()),
        }
    }
}

impl<CS: OutputPin> Drop for ChipSelect<'_, CS> {
    fn drop(&mut self) {
        if let Some(pin) = self.pin.take() {
            if pin.set_high().is_err() {
                warn!("{} panel: chip-select left low", self.panel);
            }
        }
    }
}
