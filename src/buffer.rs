//! Packed 1-bit pixel planes
//!
//! Every plane is stored row-major, most significant bit first:
//! pixel `(x, y)` lives in byte `y * line_bytes(width) + x / 8` under the mask
//! `0x80 >> (x % 8)`. Rows are padded to whole bytes, so a plane is always
//! [`buffer_len`] bytes long.
//!
//! A set bit is white, a cleared bit is black (see [`Color`]).
//!
//! Coordinates outside `[0, width) × [0, height)` are rejected with
//! [`BufferError::OutOfBounds`]. The `graphics` draw target instead discards
//! them, like every other `embedded-graphics` target.

use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;

/// Number of bytes in one row of a plane, rows are padded to whole bytes
pub const fn line_bytes(width: u32) -> usize {
    width.div_ceil(8) as usize
}

/// Number of bytes of one plane of `width × height` pixels
///
/// Saturates at `usize::MAX` for sizes that can't be addressed.
pub const fn buffer_len(width: u32, height: u32) -> usize {
    line_bytes(width).saturating_mul(height as usize)
}

/// Byte index and bit mask of pixel `(x, y)` in a plane of the given size
///
/// Returns `None` when the pixel lies outside the plane.
pub fn pixel_address(width: u32, height: u32, x: u32, y: u32) -> Option<(usize, u8)> {
    if x >= width || y >= height {
        return None;
    }
    let index = y as usize * line_bytes(width) + x as usize / 8;
    Some((index, 0x80 >> (x % 8)))
}

/// Errors of the pixel buffer
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The plane could not be allocated
    OutOfMemory,
    /// The pixel is outside of the plane
    OutOfBounds {
        /// X coordinate
        x: u32,
        /// Y coordinate
        y: u32,
    },
    /// The provided bytes don't match `buffer_len(width, height)`
    SizeMismatch {
        /// Required length in bytes
        expected: usize,
        /// Provided length in bytes
        actual: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Pixel buffer allocation failed"),
            Self::OutOfBounds { x, y } => write!(f, "Pixel ({x}, {y}) is out of bounds"),
            Self::SizeMismatch { expected, actual } => write!(
                f,
                "Buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
        }
    }
}

impl core::error::Error for BufferError {}

/// An owned single plane of `width × height` pixels
///
/// The constructors enforce the size invariant, so `as_bytes().len()` always
/// equals `buffer_len(width, height)`.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// A plane with every bit cleared
    ///
    /// As a black/white plane this is all black, as a chromatic plane it carries no color.
    pub fn zeroed(width: u32, height: u32) -> Result<Self, BufferError> {
        Self::with_byte(width, height, 0x00)
    }

    /// A plane filled with a solid color
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self, BufferError> {
        Self::with_byte(width, height, color.get_byte_value())
    }

    /// Wraps existing bytes, which must be exactly `buffer_len(width, height)` long
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = buffer_len(width, height);
        if data.len() != expected {
            return Err(BufferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn with_byte(width: u32, height: u32, value: u8) -> Result<Self, BufferError> {
        let len = line_bytes(width)
            .checked_mul(height as usize)
            .ok_or(BufferError::OutOfMemory)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BufferError::OutOfMemory)?;
        data.resize(len, value);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// get internal buffer to use it (to draw in epd)
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the packed bytes, the length can't be changed through it
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Gives the bytes back
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Set a specific pixel color
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<(), BufferError> {
        let (index, mask) =
            pixel_address(self.width, self.height, x, y).ok_or(BufferError::OutOfBounds { x, y })?;
        match color {
            Color::White => self.data[index] |= mask,
            Color::Black => self.data[index] &= !mask,
        }
        Ok(())
    }

    /// Read back a pixel
    pub fn pixel(&self, x: u32, y: u32) -> Result<Color, BufferError> {
        let (index, mask) =
            pixel_address(self.width, self.height, x, y).ok_or(BufferError::OutOfBounds { x, y })?;
        Ok(Color::from(u8::from(self.data[index] & mask != 0)))
    }

    /// Fill the whole plane with one color
    pub fn fill(&mut self, color: Color) {
        self.data.fill(color.get_byte_value());
    }

    /// Inverts every pixel
    ///
    /// Controllers without a hardware inversion rely on this.
    pub fn invert(&mut self) {
        for byte in self.data.iter_mut() {
            *byte = !*byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn sizes() {
        assert_eq!(line_bytes(296), 37);
        assert_eq!(line_bytes(50), 7);
        assert_eq!(line_bytes(8), 1);
        assert_eq!(buffer_len(296, 128), 4736);
        assert_eq!(buffer_len(128, 296), 4736);
        assert_eq!(buffer_len(50, 10), 70);
    }

    #[test]
    fn huge_planes_fail_to_allocate() {
        assert_eq!(line_bytes(u32::MAX), 0x2000_0000);
        assert_eq!(
            PixelBuffer::zeroed(u32::MAX, u32::MAX),
            Err(BufferError::OutOfMemory)
        );
        assert_eq!(
            PixelBuffer::filled(u32::MAX, u32::MAX, Color::White),
            Err(BufferError::OutOfMemory)
        );
    }

    #[test]
    fn address_law() {
        assert_eq!(pixel_address(296, 128, 0, 0), Some((0, 0x80)));
        assert_eq!(pixel_address(296, 128, 7, 0), Some((0, 0x01)));
        assert_eq!(pixel_address(296, 128, 8, 0), Some((1, 0x80)));
        assert_eq!(pixel_address(296, 128, 0, 1), Some((37, 0x80)));
        assert_eq!(pixel_address(296, 128, 295, 127), Some((4735, 0x01)));
        assert_eq!(pixel_address(296, 128, 296, 0), None);
        assert_eq!(pixel_address(296, 128, 0, 128), None);
    }

    #[test]
    fn set_then_read_touches_only_one_bit() {
        let (width, height) = (13, 5);
        for y in 0..height {
            for x in 0..width {
                let mut buffer = PixelBuffer::filled(width, height, Color::White).unwrap();
                buffer.set_pixel(x, y, Color::Black).unwrap();
                assert_eq!(buffer.pixel(x, y).unwrap(), Color::Black);

                let (index, mask) = pixel_address(width, height, x, y).unwrap();
                for (i, &byte) in buffer.as_bytes().iter().enumerate() {
                    if i == index {
                        assert_eq!(byte, !mask);
                    } else {
                        assert_eq!(byte, 0xff);
                    }
                }

                buffer.set_pixel(x, y, Color::White).unwrap();
                assert!(buffer.as_bytes().iter().all(|&b| b == 0xff));
            }
        }
    }

    #[test]
    fn round_trip_on_zeroed_plane() {
        let mut buffer = PixelBuffer::zeroed(296, 128).unwrap();
        for (x, y) in [(0, 0), (295, 127), (150, 64), (7, 8), (8, 7)] {
            buffer.set_pixel(x, y, Color::White).unwrap();
            assert_eq!(buffer.pixel(x, y).unwrap(), Color::White);
        }
        let set_bits: u32 = buffer.as_bytes().iter().map(|b| b.count_ones()).sum();
        assert_eq!(set_bits, 5);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut buffer = PixelBuffer::zeroed(16, 2).unwrap();
        assert_eq!(
            buffer.set_pixel(16, 0, Color::White),
            Err(BufferError::OutOfBounds { x: 16, y: 0 })
        );
        assert_eq!(
            buffer.pixel(0, 2),
            Err(BufferError::OutOfBounds { x: 0, y: 2 })
        );
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn filled_planes() {
        let white = PixelBuffer::filled(296, 128, Color::White).unwrap();
        assert_eq!(white.as_bytes().len(), 4736);
        assert!(white.as_bytes().iter().all(|&b| b == 0xff));

        let black = PixelBuffer::filled(296, 128, Color::Black).unwrap();
        assert!(black.as_bytes().iter().all(|&b| b == 0x00));
    }

    #[test]
    fn from_bytes_checks_length() {
        assert_eq!(
            PixelBuffer::from_bytes(16, 2, vec![0; 3]),
            Err(BufferError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            PixelBuffer::from_bytes(16, 2, vec![0; 5]),
            Err(BufferError::SizeMismatch {
                expected: 4,
                actual: 5
            })
        );
        let buffer = PixelBuffer::from_bytes(16, 2, vec![0xAA; 4]).unwrap();
        assert_eq!(buffer.pixel(0, 0).unwrap(), Color::White);
        assert_eq!(buffer.pixel(1, 0).unwrap(), Color::Black);
        assert_eq!(buffer.into_bytes(), vec![0xAA; 4]);
    }

    #[test]
    fn fill_and_invert() {
        let mut buffer = PixelBuffer::zeroed(10, 3).unwrap();
        buffer.fill(Color::White);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0xff));
        buffer.set_pixel(3, 1, Color::Black).unwrap();
        buffer.invert();
        assert_eq!(buffer.pixel(3, 1).unwrap(), Color::White);
        assert_eq!(buffer.pixel(4, 1).unwrap(), Color::Black);
    }
}
