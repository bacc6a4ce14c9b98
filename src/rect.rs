//! Rectangle operations for partial windows on the controller RAM

use crate::buffer::{buffer_len, line_bytes};

/// A rectangle in pixels
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Rect {
    /// Origin X
    pub x: u32,
    /// Origin Y
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Construct a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// Test whether the rectangle is empty.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Test whether the rectangle is non-empty and lies inside a `width × height` area
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty()
            && self.x.checked_add(self.w).is_some_and(|end| end <= width)
            && self.y.checked_add(self.h).is_some_and(|end| end <= height)
    }

    /// Bytes of one row of a plane covering this rectangle
    pub fn line_bytes(&self) -> usize {
        line_bytes(self.w)
    }

    /// Bytes of a plane covering this rectangle
    pub fn buffer_len(&self) -> usize {
        buffer_len(self.w, self.h)
    }

    /// Inclusive pixel corners of the RAM window holding this rectangle
    ///
    /// The start x is rounded down to its byte column and the window spans
    /// exactly `line_bytes()` columns, so a row of the plane fills a row of
    /// the window. Must not be called on an empty rectangle.
    pub fn ram_window(&self) -> (u32, u32, u32, u32) {
        let start_x = self.x & !0x07;
        let end_x = start_x + self.line_bytes() as u32 * 8 - 1;
        (start_x, self.y, end_x, self.y + self.h - 1)
    }
}

#[test]
fn test_fits_within() {
    assert!(Rect::new(0, 0, 296, 128).fits_within(296, 128));
    assert!(Rect::new(50, 50, 50, 10).fits_within(296, 128));
    assert!(!Rect::new(250, 50, 50, 10).fits_within(296, 128));
    assert!(!Rect::new(0, 120, 8, 9).fits_within(296, 128));
    assert!(!Rect::new(0, 0, 0, 10).fits_within(296, 128));
    assert!(!Rect::new(u32::MAX, 0, 2, 1).fits_within(296, 128));
}

#[test]
fn test_ram_window() {
    let r = Rect::new(50, 50, 50, 10);
    assert_eq!(r.line_bytes(), 7);
    assert_eq!(r.buffer_len(), 70);
    let (start_x, start_y, end_x, end_y) = r.ram_window();
    assert_eq!((start_x >> 3, end_x >> 3), (6, 12));
    assert_eq!((start_y, end_y), (50, 59));

    // unaligned start still spans line_bytes() columns
    let r = Rect::new(4, 0, 8, 1);
    let (start_x, _, end_x, end_y) = r.ram_window();
    assert_eq!((start_x >> 3, end_x >> 3), (0, 0));
    assert_eq!(end_y, 0);

    let r = Rect::new(0, 0, 296, 128);
    let (start_x, _, end_x, end_y) = r.ram_window();
    assert_eq!((start_x >> 3, end_x >> 3), (0, 36));
    assert_eq!(end_y, 127);
}
