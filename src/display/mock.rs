/*
 *  display/mock.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Mock SPI, GPIO and delay for testing without hardware
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

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

use super::panel::PanelId;

/// Pin level as recorded by [`MockPin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// One recorded transport operation, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pin(PanelId, Level),
    Write(PanelId, Vec<u8>),
    DelayNs(u64),
}

/// Error raised by the mocks when failure injection is armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl digital::Error for MockError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl spi::Error for MockError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// Internal state for the mock bus (shared for inspection in tests)
#[derive(Debug, Default)]
struct MockBusState {
    events: Vec<Event>,
    fail_low: HashSet<PanelId>,
    fail_high: HashSet<PanelId>,
    fail_write: HashSet<PanelId>,
}

/// Shared recorder behind every mock handed out
///
/// Clone it freely, all clones see the same log. Hand `spi()`/`pin()` to a
/// [`Panel`](super::Panel) and `delay()` to the driver, then inspect
/// `events()`.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockBusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spi(&self, panel: PanelId) -> MockSpi {
        MockSpi { panel, bus: self.clone() }
    }

    pub fn pin(&self, panel: PanelId) -> MockPin {
        MockPin { panel, bus: self.clone() }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { bus: self.clone() }
    }

    fn lock(&self) -> MutexGuard<'_, MockBusState> {
        // a test that panicked mid-record still leaves a usable log
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every recorded operation so far
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Only the SPI writes, with the panel they went to
    pub fn writes(&self) -> Vec<(PanelId, Vec<u8>)> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Write(panel, bytes) => Some((*panel, bytes.clone())),
                _ => None,
            })
            .collect()
    }

    /// Last level driven on a panel's pin, `None` if never driven
    pub fn pin_level(&self, panel: PanelId) -> Option<Level> {
        self.lock().events.iter().rev().find_map(|e| match e {
            Event::Pin(p, level) if *p == panel => Some(*level),
            _ => None,
        })
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    pub fn fail_pin_low(&self, panel: PanelId) {
        self.lock().fail_low.insert(panel);
    }

    pub fn fail_pin_high(&self, panel: PanelId) {
        self.lock().fail_high.insert(panel);
    }

    pub fn fail_write(&self, panel: PanelId) {
        self.lock().fail_write.insert(panel);
    }

    /// Disarm all failure injection
    pub fn heal(&self) {
        let mut state = self.lock();
        state.fail_low.clear();
        state.fail_high.clear();
        state.fail_write.clear();
    }
}

/// Write-only SPI device that records what it was sent
#[derive(Debug, Clone)]
pub struct MockSpi {
    panel: PanelId,
    bus: MockBus,
}

impl spi::ErrorType for MockSpi {
    type Error = MockError;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut state = self.bus.lock();
        if state.fail_write.contains(&self.panel) {
            return Err(MockError);
        }

        let mut sent = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => sent.extend_from_slice(bytes),
                Operation::Transfer(read, write) => {
                    sent.extend_from_slice(write);
                    read.fill(0);
                }
                Operation::TransferInPlace(bytes) => {
                    sent.extend_from_slice(bytes);
                    bytes.fill(0);
                }
                Operation::Read(read) => read.fill(0),
                Operation::DelayNs(_) => {}
            }
        }
        state.events.push(Event::Write(self.panel, sent));
        Ok(())
    }
}

/// Output pin that records every level it is driven to
#[derive(Debug, Clone)]
pub struct MockPin {
    panel: PanelId,
    bus: MockBus,
}

impl digital::ErrorType for MockPin {
    type Error = MockError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.bus.lock();
        if state.fail_low.contains(&self.panel) {
            return Err(MockError);
        }
        state.events.push(Event::Pin(self.panel, Level::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.bus.lock();
        if state.fail_high.contains(&self.panel) {
            return Err(MockError);
        }
        state.events.push(Event::Pin(self.panel, Level::High));
        Ok(())
    }
}

/// Delay that returns immediately and records the requested time
#[derive(Debug, Clone)]
pub struct MockDelay {
    bus: MockBus,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.lock().events.push(Event::DelayNs(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus
            .lock()
            .events
            .push(Event::DelayNs(u64::from(ms) * 1_000_000));
    }
}
