//! A driver for SSD1619 based panels via SPI
//!
//! The SSD1619 drives up to 400 source by 300 gate lines with black/white and
//! optional red RAM. Waveforms come from the controller's OTP, selected by the
//! display update control byte, so the driver only programs RAM windows and
//! triggers refreshes.
//!
//! # Example for a 2.9" panel
//!
//!```rust, no_run
//!# use embedded_hal_mock::eh1::{delay::NoopDelay, digital, spi};
//!# fn main() -> Result<(), Box<dyn std::error::Error>> {
//!use embedded_graphics::{prelude::*, primitives::{Line, PrimitiveStyle}};
//!use epd_driver::{prelude::*, ssd1619::Ssd1619};
//!#
//!# let spi = spi::Mock::<u8>::new(&[]);
//!# let busy = digital::Mock::new(&[]);
//!# let dc = digital::Mock::new(&[]);
//!# let rst = digital::Mock::new(&[]);
//!
//!// Setup EPD
//!let panel = Panel::new(296, 128, ColorMode::Monochrome)?;
//!let mut epd = Ssd1619::new(
//!    spi,
//!    PinConfig::new(busy, dc, rst),
//!    NoopDelay::new(),
//!    panel,
//!    Config::default(),
//!)?;
//!epd.initialize()?;
//!
//!// Use embedded graphics for drawing a line
//!let mut frame = PixelBuffer::filled(296, 128, Color::White)?;
//!let _ = Line::new(Point::new(0, 120), Point::new(0, 295))
//!    .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
//!    .draw(&mut frame);
//!
//!// Display updated frame
//!epd.display_full(frame.as_bytes(), UpdateMode::Full)?;
//!
//!// Set the EPD to sleep
//!epd.sleep()?;
//!# Ok(())
//!# }
//!```

use alloc::boxed::Box;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::buffer::{buffer_len, PixelBuffer};
use crate::color::Color;
use crate::config::{Config, Panel, UnsupportedPolicy};
use crate::error::ErrorKind;
use crate::info::{Capabilities, Capability, ChipType, DisplayInfo, DisplayRotation};
use crate::interface::{DisplayInterface, PinConfig};
use crate::rect::Rect;
use crate::traits::{DeviceState, EpdDevice, ErrorType, UpdateMode};

pub(crate) mod command;
use self::command::Command;

/// Maximum number of source lines
pub const MAX_WIDTH: u32 = 400;
/// Maximum number of gate lines
pub const MAX_HEIGHT: u32 = 300;
const IS_BUSY_LOW: bool = false;

/// Capabilities of a freshly created driver
pub fn default_capabilities() -> Capabilities {
    Capabilities::empty()
        .with(Capability::PartialRefresh)
        .with(Capability::PowerControl)
}

/// Ssd1619 driver
pub struct Ssd1619<SPI, BUSY, DC, RST, PWR, DELAY> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, PWR, DELAY>,
    info: DisplayInfo,
    /// Native geometry, `info` carries the rotated one
    panel: Panel,
    state: DeviceState,
    unsupported: UnsupportedPolicy,
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> Ssd1619<SPI, BUSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new driver, nothing is sent until [`EpdDevice::initialize`]
    ///
    /// Fails with `InvalidArgument` for panels beyond 400 × 300.
    pub fn new(
        spi: SPI,
        pins: PinConfig<BUSY, DC, RST, PWR>,
        delay: DELAY,
        panel: Panel,
        config: Config,
    ) -> Result<Self, ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if panel.width() > MAX_WIDTH || panel.height() > MAX_HEIGHT {
            warn!(
                "SSD1619 panel {}x{} exceeds {}x{}",
                panel.width(),
                panel.height(),
                MAX_WIDTH,
                MAX_HEIGHT
            );
            return Err(ErrorKind::InvalidArgument);
        }

        let info = DisplayInfo::new(
            ChipType::Ssd1619,
            panel.width(),
            panel.height(),
            panel.color_mode(),
            default_capabilities(),
        );

        Ok(Ssd1619 {
            interface: DisplayInterface::new(spi, pins, delay, &config),
            info,
            panel,
            state: DeviceState::Uninitialized,
            unsupported: config.unsupported_setting(),
        })
    }

    /// Replaces the reported capabilities, e.g. for glass without partial waveforms
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.info.capabilities = capabilities;
        self
    }

    /// Puts the controller to sleep (unless it already is) and hands back bus, pins and delay
    ///
    /// If the sleep command fails the handles are dropped with the driver.
    pub fn deinitialize(
        mut self,
    ) -> Result<(SPI, PinConfig<BUSY, DC, RST, PWR>, DELAY), ErrorKind<SPI, BUSY, DC, RST, PWR>>
    {
        if self.state != DeviceState::Asleep {
            self.sleep()?;
        }
        debug!("SSD1619 released");
        Ok(self.interface.release())
    }

    fn ensure_active(&self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if self.state != DeviceState::Active {
            return Err(ErrorKind::NotActive);
        }
        Ok(())
    }

    fn init_sequence(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        self.interface.cmd(Command::SwReset)?;
        self.interface.delay_ms(10);
        self.interface.wait_until_idle(IS_BUSY_LOW)?;

        // 3 Databytes:
        // A[7:0]
        // 0.. A[8]
        // 0.. B[2:0]
        // A = number of gate lines - 1, B = 0x00 (GD, SM and TB = 0)
        let gates = self.panel.height() - 1;
        self.interface.cmd_with_data(
            Command::DriverOutputControl,
            &[gates as u8, (gates >> 8) as u8, 0x00],
        )?;

        // x increment, y increment, address counter is updated in x direction
        self.interface
            .cmd_with_data(Command::DataEntryModeSetting, &[0x03])?;

        self.use_full_frame(self.panel.width(), self.panel.height())?;

        self.interface
            .cmd_with_data(Command::BorderWaveformControl, &[0x05])?;

        // internal temperature sensor
        self.interface
            .cmd_with_data(Command::TemperatureSensorSelection, &[0x80])?;

        // enable clock signal and analog
        self.interface
            .cmd_with_data(Command::DisplayUpdateControl2, &[0xC0])?;
        self.interface.cmd(Command::MasterActivation)?;
        self.interface.wait_until_idle(IS_BUSY_LOW)
    }

    fn use_full_frame(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // choose full frame/ram
        self.set_ram_area(0, 0, width - 1, height - 1)?;

        // start from the beginning
        self.set_ram_counter(0, 0)
    }

    fn set_ram_area(
        &mut self,
        start_x: u32,
        start_y: u32,
        end_x: u32,
        end_y: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // x is positioned in bytes, so the last 3 bits which show the position inside a byte in the ram
        // aren't relevant
        self.interface.cmd_with_data(
            Command::SetRamXAddressStartEndPosition,
            &[(start_x >> 3) as u8, (end_x >> 3) as u8],
        )?;

        // 2 Databytes: A[7:0] & 0..A[8] for each - start and end
        self.interface.cmd_with_data(
            Command::SetRamYAddressStartEndPosition,
            &[
                start_y as u8,
                (start_y >> 8) as u8,
                end_y as u8,
                (end_y >> 8) as u8,
            ],
        )
    }

    fn set_ram_counter(&mut self, x: u32, y: u32) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        self.interface
            .cmd_with_data(Command::SetRamXAddressCounter, &[(x >> 3) as u8])?;

        // 2 Databytes: A[7:0] & 0..A[8]
        self.interface.cmd_with_data(
            Command::SetRamYAddressCounter,
            &[y as u8, (y >> 8) as u8],
        )
    }

    /// Starts the refresh and blocks until the panel is done
    fn trigger(&mut self, mode: UpdateMode) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        let control = match mode {
            UpdateMode::Full => 0xC7,
            UpdateMode::Partial => 0x04,
            UpdateMode::Fast => 0x0C,
        };
        trace!("SSD1619 refresh {:?}", mode);
        self.interface
            .cmd_with_data(Command::DisplayUpdateControl2, &[control])?;
        self.interface.cmd(Command::MasterActivation)?;
        self.interface.wait_until_idle(IS_BUSY_LOW)
    }
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> ErrorType for Ssd1619<SPI, BUSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    type Error = ErrorKind<SPI, BUSY, DC, RST, PWR>;
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> EpdDevice for Ssd1619<SPI, BUSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    fn initialize(&mut self) -> Result<(), Self::Error> {
        info!(
            "initializing SSD1619 {}x{}",
            self.panel.width(),
            self.panel.height()
        );
        self.state = DeviceState::Uninitialized;
        self.interface.power_on()?;
        self.interface.reset(10, 10)?;
        self.init_sequence()?;
        self.state = DeviceState::Active;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        debug!("SSD1619 hardware reset");
        self.state = DeviceState::Uninitialized;
        self.interface.reset(10, 10)
    }

    fn clear(&mut self, color: Color) -> Result<(), Self::Error> {
        self.ensure_active()?;
        debug!("SSD1619 clear {:?}", color);
        let frame = PixelBuffer::filled(self.info.width, self.info.height, color)?;
        self.display_full(frame.as_bytes(), UpdateMode::Full)
    }

    fn display_full(&mut self, buffer: &[u8], mode: UpdateMode) -> Result<(), Self::Error> {
        self.ensure_active()?;
        let (width, height) = (self.info.width, self.info.height);
        let expected = buffer_len(width, height);
        if buffer.len() != expected {
            return Err(ErrorKind::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }

        self.use_full_frame(width, height)?;
        self.interface.cmd_with_data(Command::WriteRam, buffer)?;

        if self.info.color_mode.has_secondary_plane() {
            // no chromatic content yet, the red plane is cleared
            let red = PixelBuffer::zeroed(width, height)?;
            self.interface
                .cmd_with_data(Command::WriteRam2, red.as_bytes())?;
        }

        self.trigger(mode)
    }

    fn display_region(
        &mut self,
        buffer: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), Self::Error> {
        if !self.info.capabilities.contains(Capability::PartialRefresh) {
            return match self.unsupported {
                UnsupportedPolicy::Ignore => {
                    debug!("SSD1619 partial refresh unsupported, ignored");
                    Ok(())
                }
                UnsupportedPolicy::Error => Err(ErrorKind::UnsupportedOperation),
            };
        }
        self.ensure_active()?;

        let region = Rect::new(x, y, width, height);
        if !region.fits_within(self.info.width, self.info.height) {
            return Err(ErrorKind::RegionOutOfBounds);
        }
        let expected = region.buffer_len();
        if buffer.len() != expected {
            return Err(ErrorKind::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }

        let (start_x, start_y, end_x, end_y) = region.ram_window();
        self.set_ram_area(start_x, start_y, end_x, end_y)?;
        self.set_ram_counter(start_x, start_y)?;
        self.interface.cmd_with_data(Command::WriteRam, buffer)?;

        self.trigger(UpdateMode::Partial)
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        debug!("SSD1619 entering deep sleep");
        // 0x00 for Normal mode (Power on Reset), 0x01 for Deep Sleep Mode
        self.interface
            .cmd_with_data(Command::DeepSleepMode, &[0x01])?;
        self.interface.delay_ms(100);
        self.state = DeviceState::Asleep;
        Ok(())
    }

    fn wakeup(&mut self) -> Result<(), Self::Error> {
        self.reset()?;
        self.initialize()
    }

    fn set_rotation(&mut self, quarter_turns: u8) {
        let rotation = DisplayRotation::from_quarter_turns(quarter_turns);
        self.info
            .rotate(self.panel.width(), self.panel.height(), rotation);
    }

    fn invert(&mut self, _enabled: bool) -> Result<(), Self::Error> {
        // no hardware inversion, see PixelBuffer::invert
        Ok(())
    }

    fn query_info(&self) -> DisplayInfo {
        self.info
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        self.interface.is_busy(IS_BUSY_LOW)
    }

    fn wait_until_idle(&mut self) -> Result<(), Self::Error> {
        self.interface.wait_until_idle(IS_BUSY_LOW)
    }

    fn power_on(&mut self) -> Result<(), Self::Error> {
        self.interface.power_on()?;
        EpdDevice::reset(self)
    }

    fn power_off(&mut self) -> Result<(), Self::Error> {
        self.sleep()?;
        self.interface.power_off()
    }

    fn deinitialize(mut self: Box<Self>) -> Result<(), Self::Error> {
        if self.state != DeviceState::Asleep {
            self.sleep()?;
        }
        debug!("SSD1619 shut down");
        Ok(())
    }
}
