/*
 *  display/graphics.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  embedded-graphics integration
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

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use super::driver::UnicornHatMini;

// Drawing goes through set_pixel, so rotation and clipping apply and
// nothing is sent until show().
impl<SPI, CS> DrawTarget for UnicornHatMini<SPI, CS>
where
    SPI: SpiDevice,
    CS: OutputPin,
{
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.r(), color.g(), color.b());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.set_all(color.r(), color.g(), color.b());
        Ok(())
    }
}

impl<SPI, CS> OriginDimensions for UnicornHatMini<SPI, CS>
where
    SPI: SpiDevice,
    CS: OutputPin,
{
    fn size(&self) -> Size {
        let (width, height) = self.shape();
        Size::new(width as u32, height as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::{MockBus, MockPin, MockSpi};
    use crate::display::{Panel, PanelId};
    use embedded_graphics::pixelcolor::Rgb666;
    use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

    fn display() -> UnicornHatMini<MockSpi, MockPin> {
        let bus = MockBus::new();
        let left = Panel::new(PanelId::Left, bus.spi(PanelId::Left), bus.pin(PanelId::Left));
        let right = Panel::new(PanelId::Right, bus.spi(PanelId::Right), bus.pin(PanelId::Right));
        UnicornHatMini::new(left, right, &mut bus.delay()).unwrap()
    }

    #[test]
    fn test_size_follows_rotation() {
        let mut d = display();
        assert_eq!(d.size(), Size::new(17, 7));
        d.set_rotation(270).unwrap();
        assert_eq!(d.size(), Size::new(7, 17));
    }

    #[test]
    fn test_draw_clips_to_grid() {
        let mut d = display();
        Rectangle::new(Point::new(-5, -5), Size::new(40, 40))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut d)
            .unwrap();

        assert!(d.frame_buffer().as_slice().iter().all(|p| *p == Rgb666::new(63, 63, 63)));
    }

    #[test]
    fn test_draw_uses_rotation() {
        let mut d = display();
        d.set_rotation(90).unwrap();
        Line::new(Point::new(0, 0), Point::new(6, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 1))
            .draw(&mut d)
            .unwrap();

        // top row after a quarter turn is storage column 16
        for x in 0..7 {
            assert_eq!(d.pixel(16 * 7 + x), Some(Rgb666::new(63, 0, 0)));
        }
        let lit = d.frame_buffer().as_slice().iter().filter(|p| **p != Rgb666::BLACK).count();
        assert_eq!(lit, 7);
    }

    #[test]
    fn test_clear_fills_everything() {
        let mut d = display();
        DrawTarget::clear(&mut d, Rgb888::new(8, 16, 32)).unwrap();
        assert!(d.frame_buffer().as_slice().iter().all(|p| *p == Rgb666::new(2, 4, 8)));
    }
}
