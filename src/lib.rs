//! A protocol driver for SSD1619 and IL3820 class E-Ink controllers via SPI
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1.0
//!
//! Every controller driver implements the same [`EpdDevice`](traits::EpdDevice)
//! contract: initialize, clear, full and partial refresh, sleep and wakeup,
//! rotation and metadata queries. Frames are packed 1-bit planes as described
//! in [`buffer`].
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - Chip select is handled by the [`SpiDevice`](embedded_hal::spi::SpiDevice),
//!   e.g. `embedded_hal_bus::spi::ExclusiveDevice`
//!
//! ### Other....
//!
//! - Buffersize: Wherever a buffer is used it always needs to be of the size: `ceil(width / 8) * height`,
//!   where width and height being either the full e-ink size or the partial update window size
//!
//! # Examples
//!
//! ```ignore
//! use epd_driver::{prelude::*, ssd1619::Ssd1619};
//!
//! let panel = Panel::new(296, 128, ColorMode::Monochrome)?;
//! let mut epd = Ssd1619::new(spi, PinConfig::new(busy, dc, rst), delay, panel, Config::default())?;
//! epd.initialize()?;
//!
//! let mut frame = PixelBuffer::filled(296, 128, Color::White)?;
//! // draw something into the buffer
//!
//! epd.display_full(frame.as_bytes(), UpdateMode::Full)?;
//!
//! // wait and look at the image
//!
//! epd.clear(Color::White)?;
//!
//! epd.sleep()?;
//! ```
//!
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod buffer;
pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod info;
pub mod rect;
pub mod traits;

#[cfg(feature = "graphics")]
pub mod graphics;

/// Interface for the physical connection between display and the controlling device
mod interface;
pub use interface::{NoPin, PinConfig};

#[cfg(feature = "ssd1619")]
pub mod ssd1619;

#[cfg(feature = "il3820")]
pub mod il3820;

#[cfg(test)]
pub(crate) mod mock;

/// Includes everything important besides the chip specific drivers
pub mod prelude {
    pub use crate::buffer::{buffer_len, PixelBuffer};
    pub use crate::color::Color;
    pub use crate::config::{BusyTimeout, Config, Panel, UnsupportedPolicy};
    pub use crate::error::{ErrorCategory, ErrorKind};
    pub use crate::info::{Capabilities, Capability, ChipType, ColorMode, DisplayInfo, DisplayRotation};
    pub use crate::interface::{NoPin, PinConfig};
    pub use crate::rect::Rect;
    pub use crate::traits::{DeviceState, EpdDevice, Error, ErrorType, UpdateMode};

    pub use crate::SPI_MODE;
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode -
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};
