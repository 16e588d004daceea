/*
 *  display/error.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Unified error types for display subsystem
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

use embedded_hal::{digital, spi};
use thiserror::Error;

use super::panel::PanelId;

/// Unified error type for all display operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// Rotation outside 0/90/180/270, rejected before any state changes
    #[error("Invalid rotation angle: {0} (must be 0, 90, 180, or 270)")]
    InvalidRotation(u16),

    /// Chip-select pin could not be driven
    #[error("GPIO error on {panel} panel: {kind:?}")]
    Gpio {
        panel: PanelId,
        kind: digital::ErrorKind,
    },

    /// SPI write failed
    #[error("SPI communication error on {panel} panel: {kind:?}")]
    Spi {
        panel: PanelId,
        kind: spi::ErrorKind,
    },

    /// Hardware could not be opened
    #[error("Display initialization failed: {0}")]
    InitializationFailed(String),

    /// Power-up sequence failed on one panel
    #[error("Display initialization failed on {panel} panel: {source}")]
    PanelInitFailed {
        panel: PanelId,
        #[source]
        source: Box<DisplayError>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DisplayError {
    /// Panel the error originated from, if it came off the wire
    pub fn panel(&self) -> Option<PanelId> {
        match self {
            DisplayError::Gpio { panel, .. }
            | DisplayError::Spi { panel, .. }
            | DisplayError::PanelInitFailed { panel, .. } => Some(*panel),
            _ => None,
        }
    }
}
