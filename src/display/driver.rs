/*
 *  display/driver.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Dual-panel display driver: frame buffer, repack and flush
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
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, error, info, warn};

use super::command::*;
use super::error::DisplayError;
use super::framebuffer::{FrameBuffer, Rotation};
use super::lut::LUT;
use super::panel::{Panel, PanelId};
use super::{PANEL_BUFFER_LEN, TRANSFER_BUFFER_LEN};

/// Unicorn HAT Mini style display: two controller chips behind one 17x7 grid
///
/// Pixel writes only touch the frame buffer. Nothing reaches the LEDs until
/// [`show`](Self::show) repacks the whole frame and sends it.
///
/// Not internally synchronised. Keep one owner and issue all calls from it.
pub struct UnicornHatMini<SPI, CS> {
    frame: FrameBuffer,
    buf: [u8; TRANSFER_BUFFER_LEN],
    rotation: Rotation,
    panels: [Panel<SPI, CS>; 2],
}

impl<SPI, CS> UnicornHatMini<SPI, CS>
where
    SPI: SpiDevice,
    CS: OutputPin,
{
    /// Take ownership of both panels and run the power-up sequence on each
    ///
    /// The panels are put in left/right order by their [`PanelId`], so the
    /// arguments must be one of each.
    pub fn new<D: DelayNs>(
        left: Panel<SPI, CS>,
        right: Panel<SPI, CS>,
        delay: &mut D,
    ) -> Result<Self, DisplayError> {
        if left.id() != PanelId::Left || right.id() != PanelId::Right {
            return Err(DisplayError::InvalidConfiguration(format!(
                "expected left and right panels, got {} and {}",
                left.id(),
                right.id()
            )));
        }

        let mut display = Self {
            frame: FrameBuffer::new(),
            buf: [0; TRANSFER_BUFFER_LEN],
            rotation: Rotation::default(),
            panels: [left, right],
        };

        info!("Initializing display ({} panels)", display.panels.len());
        for index in 0..display.panels.len() {
            let panel = display.panels[index].id();
            display
                .init_panel(index, delay)
                .map_err(|e| DisplayError::PanelInitFailed { panel, source: Box::new(e) })?;
        }
        info!("Display initialized successfully.");

        Ok(display)
    }

    /// Configure and blank one chip before switching it on
    fn init_panel<D: DelayNs>(&mut self, index: usize, delay: &mut D) -> Result<(), DisplayError> {
        let offset = self.panels[index].offset();
        let blank = self.write_display_frame(offset);
        let panel = &mut self.panels[index];
        debug!("{} panel: power-up sequence", panel.id());

        panel.xfer(&[SOFT_RESET])?;
        delay.delay_ms(RESET_SETTLE_MS);
        panel.xfer(&[GLOBAL_BRIGHTNESS, DEFAULT_BRIGHTNESS])?;
        panel.xfer(&[SCROLL_CTRL, SCROLL_OFF])?;
        panel.xfer(&[SYSTEM_CTRL, SYSTEM_OFF])?;
        panel.xfer(&blank)?;
        panel.xfer(&[COM_PIN_CTRL, PINS_ALL_ON])?;
        panel.xfer(&[ROW_PIN_CTRL, PINS_ALL_ON, PINS_ALL_ON, PINS_ALL_ON, PINS_ALL_ON])?;
        panel.xfer(&[SYSTEM_CTRL, SYSTEM_ON])
    }

    /// Write-display opcode, start address and one panel's half of the buffer
    fn write_display_frame(&self, offset: usize) -> [u8; PANEL_BUFFER_LEN + 2] {
        let mut frame = [0; PANEL_BUFFER_LEN + 2];
        frame[0] = WRITE_DISPLAY;
        frame[1] = DISPLAY_START_ADDR;
        frame[2..].copy_from_slice(&self.buf[offset..offset + PANEL_BUFFER_LEN]);
        frame
    }

    /// Send the same command to every panel
    ///
    /// Every panel is attempted; the first failure is returned and any later
    /// one is logged.
    fn broadcast(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        let mut first = Ok(());
        for panel in self.panels.iter_mut() {
            if let Err(e) = panel.xfer(data) {
                first = keep_first(first, e);
            }
        }
        first
    }

    /// Set a pixel at a visible coordinate
    ///
    /// Coordinates outside the current [`shape`](Self::shape) are ignored.
    /// After a quarter turn the accepted range is 7 wide by 17 tall, so
    /// `(3, 10)` at 90 degrees is drawn rather than dropped.
    /// Channels are reduced to 6 bits by dropping the two low bits.
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        self.frame.set_pixel(self.rotation, x, y, r, g, b);
    }

    pub fn set_all(&mut self, r: u8, g: u8, b: u8) {
        self.frame.set_all(r, g, b);
    }

    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Set global brightness on both chips, 0.0 (off) to 1.0 (full)
    ///
    /// Out of range values are clamped, NaN counts as off.
    pub fn set_brightness(&mut self, level: f32) -> Result<(), DisplayError> {
        let value = brightness_register(level);
        debug!("Setting brightness {} -> {}", level, value);
        self.broadcast(&[GLOBAL_BRIGHTNESS, value])
    }

    /// Change how later `set_pixel` calls are mapped; stored pixels stay put
    pub fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = Rotation::try_from(degrees)?;
        debug!("Rotation {} -> {}", self.rotation.degrees(), degrees);
        self.rotation = rotation;
        Ok(())
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Visible (width, height): (17, 7), or (7, 17) after a quarter turn
    pub fn shape(&self) -> (usize, usize) {
        self.rotation.shape()
    }

    /// Repack the frame buffer into the transfer buffer and send it
    ///
    /// Both panels are written even if the left one fails; the first error
    /// is returned.
    pub fn show(&mut self) -> Result<(), DisplayError> {
        for (px, offsets) in self.frame.as_slice().iter().zip(LUT.iter()) {
            let [ro, go, bo] = offsets.map(usize::from);
            self.buf[ro] = px.r();
            self.buf[go] = px.g();
            self.buf[bo] = px.b();
        }

        let mut first = Ok(());
        for index in 0..self.panels.len() {
            let frame = self.write_display_frame(self.panels[index].offset());
            if let Err(e) = self.panels[index].xfer(&frame) {
                first = keep_first(first, e);
            }
        }
        first
    }

    /// Switch both chips off, leaving registers and RAM intact
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        info!("Shutting down display");
        let sequence: [&[u8]; 3] = [
            &[COM_PIN_CTRL, PINS_ALL_OFF],
            &[ROW_PIN_CTRL, PINS_ALL_OFF, PINS_ALL_OFF, PINS_ALL_OFF, PINS_ALL_OFF],
            &[SYSTEM_CTRL, SYSTEM_OFF],
        ];

        let mut first = Ok(());
        for panel in self.panels.iter_mut() {
            for cmd in sequence {
                if let Err(e) = panel.xfer(cmd) {
                    first = keep_first(first, e);
                }
            }
        }
        first
    }

    /// Blank the LEDs and switch both chips off
    ///
    /// Clears the frame, flushes it and runs [`shutdown`](Self::shutdown).
    /// Every step runs even if an earlier one fails; the first error is
    /// returned.
    pub fn close(&mut self) -> Result<(), DisplayError> {
        self.clear();
        let flushed = self.show();
        if let Err(e) = &flushed {
            error!("Error blanking display: {}", e);
        }
        let off = self.shutdown();
        if let Err(e) = &off {
            error!("Error shutting down display: {}", e);
        }
        flushed.and(off)
    }

    /// Stored 6-bit value of a storage slot (unrotated `x * 7 + y` order)
    pub fn pixel(&self, slot: usize) -> Option<Rgb666> {
        self.frame.get(slot)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Bytes staged by the last `show`
    pub fn transfer_buffer(&self) -> &[u8; TRANSFER_BUFFER_LEN] {
        &self.buf
    }

    /// Give the panels back without sending anything
    pub fn release(self) -> (Panel<SPI, CS>, Panel<SPI, CS>) {
        let [left, right] = self.panels;
        (left, right)
    }
}

fn keep_first(first: Result<(), DisplayError>, err: DisplayError) -> Result<(), DisplayError> {
    match first {
        Ok(()) => Err(err),
        Err(prev) => {
            warn!("Additional display error: {}", err);
            Err(prev)
        }
    }
}

/// Map 0.0..=1.0 onto the 6-bit global brightness register
pub fn brightness_register(level: f32) -> u8 {
    let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
    (f32::from(MAX_BRIGHTNESS) * level) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::{Event, MockBus, MockPin, MockSpi};

    fn display(bus: &MockBus) -> UnicornHatMini<MockSpi, MockPin> {
        let left = Panel::new(PanelId::Left, bus.spi(PanelId::Left), bus.pin(PanelId::Left));
        let right = Panel::new(PanelId::Right, bus.spi(PanelId::Right), bus.pin(PanelId::Right));
        UnicornHatMini::new(left, right, &mut bus.delay()).unwrap()
    }

    fn init_commands() -> Vec<Vec<u8>> {
        let mut blank = vec![0x80, 0x00];
        blank.extend(std::iter::repeat(0u8).take(224));
        vec![
            vec![0xCC],
            vec![0x37, 0x01],
            vec![0x20, 0x00],
            vec![0x35, 0x00],
            blank,
            vec![0x41, 0xFF],
            vec![0x42, 0xFF, 0xFF, 0xFF, 0xFF],
            vec![0x35, 0x03],
        ]
    }

    #[test]
    fn test_init_sequence() {
        let bus = MockBus::new();
        let _display = display(&bus);

        let mut expected = Vec::new();
        for id in [PanelId::Left, PanelId::Right] {
            for cmd in init_commands() {
                expected.push((id, cmd));
            }
        }
        assert_eq!(bus.writes(), expected);

        // settle delay sits between the reset and the brightness command
        let events = bus.events();
        let reset_at = events
            .iter()
            .position(|e| *e == Event::Write(PanelId::Left, vec![0xCC]))
            .unwrap();
        assert_eq!(events[reset_at + 2], Event::DelayNs(10_000_000));
    }

    #[test]
    fn test_init_failure_aborts() {
        let bus = MockBus::new();
        bus.fail_write(PanelId::Right);
        let left = Panel::new(PanelId::Left, bus.spi(PanelId::Left), bus.pin(PanelId::Left));
        let right = Panel::new(PanelId::Right, bus.spi(PanelId::Right), bus.pin(PanelId::Right));

        let err = UnicornHatMini::new(left, right, &mut bus.delay()).err().unwrap();

        assert_eq!(err.panel(), Some(PanelId::Right));
        assert!(matches!(
            err,
            DisplayError::PanelInitFailed { panel: PanelId::Right, ref source }
                if matches!(**source, DisplayError::Spi { panel: PanelId::Right, .. })
        ));
        assert_eq!(bus.writes().len(), init_commands().len());
    }

    #[test]
    fn test_panels_must_be_left_then_right() {
        let bus = MockBus::new();
        let a = Panel::new(PanelId::Right, bus.spi(PanelId::Right), bus.pin(PanelId::Right));
        let b = Panel::new(PanelId::Left, bus.spi(PanelId::Left), bus.pin(PanelId::Left));

        let err = UnicornHatMini::new(a, b, &mut bus.delay()).err().unwrap();

        assert!(matches!(err, DisplayError::InvalidConfiguration(_)));
        assert!(bus.events().is_empty());
    }

    #[test]
    fn test_rejected_rotation_keeps_state() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_rotation(90).unwrap();
        d.set_pixel(1, 2, 255, 255, 255);
        let before = d.frame_buffer().clone();

        assert_eq!(d.set_rotation(45), Err(DisplayError::InvalidRotation(45)));
        assert_eq!(d.rotation(), Rotation::Deg90);
        assert_eq!(d.frame_buffer(), &before);
    }

    #[test]
    fn test_rotation_does_not_move_stored_pixels() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_pixel(0, 0, 255, 0, 0);
        d.set_rotation(180).unwrap();
        assert_eq!(d.pixel(0), Some(Rgb666::new(63, 0, 0)));

        d.set_pixel(0, 0, 0, 0, 255);
        assert_eq!(d.pixel(118), Some(Rgb666::new(0, 0, 63)));
        assert_eq!(d.pixel(0), Some(Rgb666::new(63, 0, 0)));
    }

    #[test]
    fn test_shape_follows_rotation() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        for (deg, shape) in [(0, (17, 7)), (90, (7, 17)), (180, (17, 7)), (270, (7, 17))] {
            d.set_rotation(deg).unwrap();
            assert_eq!(d.shape(), shape);
        }
    }

    #[test]
    fn test_brightness_mapping() {
        assert_eq!(brightness_register(0.0), 0);
        assert_eq!(brightness_register(0.5), 31);
        assert_eq!(brightness_register(1.0), 63);
        assert_eq!(brightness_register(-2.0), 0);
        assert_eq!(brightness_register(7.5), 63);
        assert_eq!(brightness_register(f32::NAN), 0);
    }

    #[test]
    fn test_brightness_sent_to_both_panels() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();

        d.set_brightness(0.2).unwrap();

        assert_eq!(
            bus.writes(),
            vec![
                (PanelId::Left, vec![0x37, 12]),
                (PanelId::Right, vec![0x37, 12]),
            ]
        );
    }

    #[test]
    fn test_show_repacks_through_lut() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();

        d.set_pixel(0, 0, 255, 0, 0);
        d.set_pixel(16, 6, 0, 255, 0);
        d.show().unwrap();

        let buf = d.transfer_buffer();
        assert_eq!((buf[139], buf[138], buf[137]), (63, 0, 0));
        assert_eq!((buf[296], buf[298], buf[297]), (0, 63, 0));
        assert_eq!(buf.iter().filter(|b| **b != 0).count(), 2);

        let writes = bus.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, PanelId::Left);
        assert_eq!(&writes[0].1[..2], &[0x80, 0x00]);
        assert_eq!(&writes[0].1[2..], &buf[..224]);
        assert_eq!(writes[1].0, PanelId::Right);
        assert_eq!(&writes[1].1[2..], &buf[224..]);
    }

    #[test]
    fn test_show_is_idempotent() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_all(40, 80, 120);
        bus.clear_events();

        d.show().unwrap();
        let first_buf = *d.transfer_buffer();
        let first_events = bus.events();
        bus.clear_events();

        d.show().unwrap();
        assert_eq!(d.transfer_buffer(), &first_buf);
        assert_eq!(bus.events(), first_events);
    }

    #[test]
    fn test_show_after_clear_blanks_buffer() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_all(255, 255, 255);
        d.show().unwrap();
        assert!(d.transfer_buffer().iter().all(|b| *b == 63));

        d.clear();
        d.show().unwrap();
        assert!(d.transfer_buffer().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_show_attempts_right_panel_after_left_fails() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();
        bus.fail_write(PanelId::Left);

        let err = d.show().unwrap_err();

        assert!(matches!(err, DisplayError::Spi { panel: PanelId::Left, .. }));
        let writes = bus.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, PanelId::Right);
    }

    #[test]
    fn test_show_returns_first_of_two_errors() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.fail_pin_low(PanelId::Left);
        bus.fail_write(PanelId::Right);

        let err = d.show().unwrap_err();

        assert!(matches!(err, DisplayError::Gpio { panel: PanelId::Left, .. }));
    }

    #[test]
    fn test_shutdown_sequence() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_pixel(3, 3, 9, 9, 9);
        let before = d.frame_buffer().clone();
        bus.clear_events();

        d.shutdown().unwrap();

        assert_eq!(
            bus.writes(),
            vec![
                (PanelId::Left, vec![0x41, 0x00]),
                (PanelId::Left, vec![0x42, 0x00, 0x00, 0x00, 0x00]),
                (PanelId::Left, vec![0x35, 0x00]),
                (PanelId::Right, vec![0x41, 0x00]),
                (PanelId::Right, vec![0x42, 0x00, 0x00, 0x00, 0x00]),
                (PanelId::Right, vec![0x35, 0x00]),
            ]
        );
        assert!(!bus.writes().iter().any(|(_, cmd)| cmd == &vec![0xCC]));
        assert_eq!(d.frame_buffer(), &before);
    }

    #[test]
    fn test_brightness_reaches_right_when_left_fails() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();
        bus.fail_write(PanelId::Left);

        let err = d.set_brightness(1.0).unwrap_err();

        assert!(matches!(err, DisplayError::Spi { panel: PanelId::Left, .. }));
        assert_eq!(bus.writes(), vec![(PanelId::Right, vec![0x37, 63])]);
    }

    #[test]
    fn test_shutdown_reaches_right_when_left_fails() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();
        bus.fail_pin_low(PanelId::Left);

        let err = d.shutdown().unwrap_err();

        assert!(matches!(err, DisplayError::Gpio { panel: PanelId::Left, .. }));
        assert_eq!(
            bus.writes(),
            vec![
                (PanelId::Right, vec![0x41, 0x00]),
                (PanelId::Right, vec![0x42, 0x00, 0x00, 0x00, 0x00]),
                (PanelId::Right, vec![0x35, 0x00]),
            ]
        );
    }

    #[test]
    fn test_close_blanks_and_shuts_down() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        d.set_all(255, 255, 255);
        bus.clear_events();

        d.close().unwrap();

        assert!(d.frame_buffer().as_slice().iter().all(|p| *p == Rgb666::BLACK));
        let writes = bus.writes();
        assert_eq!(writes.len(), 8);
        assert_eq!(writes[0].1.len(), 226);
        assert!(writes[0].1[2..].iter().all(|b| *b == 0));
        assert_eq!(writes[7], (PanelId::Right, vec![0x35, 0x00]));
    }

    #[test]
    fn test_close_shuts_down_when_flush_fails() {
        let bus = MockBus::new();
        let mut d = display(&bus);
        bus.clear_events();
        bus.fail_write(PanelId::Left);

        let err = d.close().unwrap_err();

        assert!(matches!(err, DisplayError::Spi { panel: PanelId::Left, .. }));
        let right: Vec<Vec<u8>> = bus
            .writes()
            .into_iter()
            .filter(|(id, _)| *id == PanelId::Right)
            .map(|(_, cmd)| cmd)
            .collect();
        assert_eq!(right.len(), 4);
        assert_eq!(&right[1..], &[vec![0x41, 0x00], vec![0x42, 0, 0, 0, 0], vec![0x35, 0x00]]);
    }
}
