//! The device contract shared by all drivers

use alloc::boxed::Box;
use core::fmt::Debug;

use crate::color::Color;
use crate::error::ErrorCategory;
use crate::info::DisplayInfo;

/// Errors returned by an [`EpdDevice`]
pub trait Error: Debug {
    /// Coarse classification of the error
    fn category(&self) -> ErrorCategory;
}

impl Error for core::convert::Infallible {
    fn category(&self) -> ErrorCategory {
        match *self {}
    }
}

/// Error type of a device
pub trait ErrorType {
    /// Error returned by every fallible operation
    type Error: Error;
}

/// All commands need to have this trait which gives the address of the command
/// which needs to be send via SPI with activated CommandsPin (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// Waveform used by a refresh
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum UpdateMode {
    /// The "normal" full waveform, flashes but leaves no ghosting
    #[default]
    Full,
    /// Only the changed pixels are driven
    Partial,
    /// A shortened full-frame waveform.
    /// This might lead to some ghosting
    Fast,
}

/// Lifecycle of a device
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Created or reset, the controller has no configuration
    Uninitialized,
    /// Initialized and ready for paint operations
    Active,
    /// In deep sleep, needs a [`EpdDevice::wakeup`]
    Asleep,
}

/// All the functions to interact with the EPDs
///
/// Every driver implements the same semantics, so a harness can work with
/// `&mut dyn EpdDevice<Error = E>` or a boxed device from [`crate::device::create`].
///
/// Paint operations ([`clear`](EpdDevice::clear), [`display_full`](EpdDevice::display_full),
/// [`display_region`](EpdDevice::display_region)) need the device in
/// [`DeviceState::Active`] and fail with a `NotActive` error otherwise.
///
/// # Example
///
///```rust, no_run
///# use embedded_hal_mock::eh1::{delay::NoopDelay, digital, spi};
///# fn main() -> Result<(), Box<dyn std::error::Error>> {
///use epd_driver::{prelude::*, ssd1619::Ssd1619};
///#
///# let spi = spi::Mock::<u8>::new(&[]);
///# let busy = digital::Mock::new(&[]);
///# let dc = digital::Mock::new(&[]);
///# let rst = digital::Mock::new(&[]);
///
///let panel = Panel::new(296, 128, ColorMode::Monochrome)?;
///let mut epd = Ssd1619::new(
///    spi,
///    PinConfig::new(busy, dc, rst),
///    NoopDelay::new(),
///    panel,
///    Config::default(),
///)?;
///epd.initialize()?;
///
///let mut frame = PixelBuffer::filled(296, 128, Color::White)?;
///frame.set_pixel(10, 10, Color::Black)?;
///epd.display_full(frame.as_bytes(), UpdateMode::Full)?;
///
///// Set the EPD to sleep
///epd.sleep()?;
///# Ok(())
///# }
///```
pub trait EpdDevice: ErrorType {
    /// Powers the controller, resets it and runs the init sequence
    ///
    /// Every call re-runs the whole sequence and leaves the device
    /// [`DeviceState::Active`].
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Hardware reset pulse
    ///
    /// The controller loses its configuration, so the device becomes
    /// [`DeviceState::Uninitialized`].
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Paints the whole display in one color with a full refresh
    fn clear(&mut self, color: Color) -> Result<(), Self::Error>;

    /// Writes a full frame and refreshes it with the given waveform
    ///
    /// `buffer` is a plane of the reported `width × height` (see [`crate::buffer`]).
    fn display_full(&mut self, buffer: &[u8], mode: UpdateMode) -> Result<(), Self::Error>;

    /// Writes and refreshes the window `[x, x + width) × [y, y + height)`
    ///
    /// The controller RAM is addressed in whole bytes, so the window starts at
    /// the byte column `x & !7`. An `x` that isn't a multiple of 8 places the
    /// image up to 7 pixels left of `x`.
    ///
    /// `buffer` holds `height` rows of `ceil(width / 8)` bytes. Needs the
    /// `PartialRefresh` capability, otherwise the configured
    /// [`UnsupportedPolicy`](crate::config::UnsupportedPolicy) decides.
    #[allow(clippy::too_many_arguments)]
    fn display_region(
        &mut self,
        buffer: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Self::Error>;

    /// Let the device enter deep-sleep mode to save power.
    ///
    /// The deep sleep mode returns to standby with a hardware reset.
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Wakes the device up from sleep, a reset followed by [`initialize`](EpdDevice::initialize)
    fn wakeup(&mut self) -> Result<(), Self::Error>;

    /// Sets the rotation to `quarter_turns` (taken modulo 4) quarter turns clockwise
    ///
    /// Absolute, relative to the native geometry.
    fn set_rotation(&mut self, quarter_turns: u8);

    /// Inverts the output
    ///
    /// Controllers without a hardware inversion accept this as a no-op, invert
    /// the buffer with [`PixelBuffer::invert`](crate::buffer::PixelBuffer::invert) instead.
    fn invert(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Snapshot of the device metadata
    fn query_info(&self) -> DisplayInfo;

    /// Current lifecycle state
    fn state(&self) -> DeviceState;

    /// Checks if device is still busy
    fn is_busy(&mut self) -> Result<bool, Self::Error>;

    /// Wait until the display has stopped processing data
    fn wait_until_idle(&mut self) -> Result<(), Self::Error>;

    /// Asserts the power enable line (if any) and resets the controller
    fn power_on(&mut self) -> Result<(), Self::Error>;

    /// Puts the controller to sleep and releases the power enable line (if any)
    fn power_off(&mut self) -> Result<(), Self::Error>;

    /// Forces deep sleep (unless the device already sleeps) and drops the device
    /// together with its bus and pins
    ///
    /// This is the way to shut down a boxed device from [`crate::device::create`].
    /// The drivers also offer an inherent `deinitialize(self)` handing the bus,
    /// pins and delay back.
    fn deinitialize(self: Box<Self>) -> Result<(), Self::Error>;
}
