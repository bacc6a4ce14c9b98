//! Graphics Support for EPDs
//!
//! Makes [`PixelBuffer`] a draw target, so every `embedded-graphics` primitive
//! produces planes that follow the addressing law of [`crate::buffer`].

use crate::buffer::PixelBuffer;
use crate::color::Color;
use embedded_graphics_core::prelude::*;

/// For use with embedded_grahics
///
/// Pixels outside the plane are discarded.
impl DrawTarget for PixelBuffer {
    type Color = Color;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // as u32 only after the sign check
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let _ = self.set_pixel(point.x as u32, point.y as u32, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

/// For use with embedded_grahics
impl OriginDimensions for PixelBuffer {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
