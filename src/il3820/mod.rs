//! A driver for IL3820 based panels via SPI, like the 2.9" and 1.54" black/white modules
//!
//! The IL3820 has no waveforms of its own: the host loads a 30 byte lookup
//! table before refreshing. A full and a partial table are kept per driver,
//! [`UpdateMode::Full`] uses the first, [`UpdateMode::Partial`] and
//! [`UpdateMode::Fast`] the second.

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
use crate::info::{Capabilities, Capability, ChipType, ColorMode, DisplayInfo, DisplayRotation};
use crate::interface::{DisplayInterface, PinConfig};
use crate::rect::Rect;
use crate::traits::{DeviceState, EpdDevice, ErrorType, UpdateMode};

pub(crate) mod command;
use self::command::Command;

/// Maximum number of source lines
pub const MAX_WIDTH: u32 = 160;
/// Maximum number of gate lines
pub const MAX_HEIGHT: u32 = 296;
/// Length of a waveform lookup table
pub const LUT_LEN: usize = 30;
const IS_BUSY_LOW: bool = false;

/// Waveform of a full refresh
pub const LUT_FULL_UPDATE: [u8; LUT_LEN] = [
    0x02, 0x02, 0x01, 0x11, 0x12, 0x12, 0x22, 0x22, 0x66, 0x69, 0x69, 0x59, 0x58, 0x99, 0x99,
    0x88, 0x00, 0x00, 0x00, 0x00, 0xF8, 0xB4, 0x13, 0x51, 0x35, 0x51, 0x51, 0x19, 0x01, 0x00,
];

/// Waveform of a partial refresh
pub const LUT_PARTIAL_UPDATE: [u8; LUT_LEN] = [
    0x10, 0x18, 0x18, 0x08, 0x18, 0x18, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x13, 0x14, 0x44, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Capabilities of a freshly created driver
pub fn default_capabilities() -> Capabilities {
    Capabilities::empty()
        .with(Capability::PartialRefresh)
        .with(Capability::FastRefresh)
        .with(Capability::PowerControl)
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lut {
    Full,
    Partial,
}

impl From<UpdateMode> for Lut {
    fn from(mode: UpdateMode) -> Self {
        match mode {
            UpdateMode::Full => Lut::Full,
            UpdateMode::Partial | UpdateMode::Fast => Lut::Partial,
        }
    }
}

/// Il3820 driver
pub struct Il3820<SPI, BUSY, DC, RST, PWR, DELAY> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, PWR, DELAY>,
    info: DisplayInfo,
    /// Native geometry, `info` carries the rotated one
    panel: Panel,
    state: DeviceState,
    unsupported: UnsupportedPolicy,
    lut_full: [u8; LUT_LEN],
    lut_partial: [u8; LUT_LEN],
    /// Table currently in the controller, `None` after a reset or an override
    loaded: Option<Lut>,
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> Il3820<SPI, BUSY, DC, RST, PWR, DELAY>
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
    /// Fails with `InvalidArgument` for panels beyond 160 × 296 or with colors.
    pub fn new(
        spi: SPI,
        pins: PinConfig<BUSY, DC, RST, PWR>,
        delay: DELAY,
        panel: Panel,
        config: Config,
    ) -> Result<Self, ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if panel.width() > MAX_WIDTH || panel.height() > MAX_HEIGHT {
            warn!(
                "IL3820 panel {}x{} exceeds {}x{}",
                panel.width(),
                panel.height(),
                MAX_WIDTH,
                MAX_HEIGHT
            );
            return Err(ErrorKind::InvalidArgument);
        }
        if panel.color_mode() != ColorMode::Monochrome {
            warn!("IL3820 is black/white only, got {:?}", panel.color_mode());
            return Err(ErrorKind::InvalidArgument);
        }

        let info = DisplayInfo::new(
            ChipType::Il3820,
            panel.width(),
            panel.height(),
            ColorMode::Monochrome,
            default_capabilities(),
        );

        Ok(Il3820 {
            interface: DisplayInterface::new(spi, pins, delay, &config),
            info,
            panel,
            state: DeviceState::Uninitialized,
            unsupported: config.unsupported_setting(),
            lut_full: LUT_FULL_UPDATE,
            lut_partial: LUT_PARTIAL_UPDATE,
            loaded: None,
        })
    }

    /// Replaces the waveform used for `mode`
    ///
    /// Partial and fast refreshes share a table. The new table is sent with the
    /// next refresh using it.
    pub fn set_lut_table(&mut self, mode: UpdateMode, table: [u8; LUT_LEN]) {
        let lut = Lut::from(mode);
        match lut {
            Lut::Full => self.lut_full = table,
            Lut::Partial => self.lut_partial = table,
        }
        if self.loaded == Some(lut) {
            self.loaded = None;
        }
    }

    /// Puts the controller to sleep (unless it already is) and hands back bus, pins and delay
    pub fn deinitialize(
        mut self,
    ) -> Result<(SPI, PinConfig<BUSY, DC, RST, PWR>, DELAY), ErrorKind<SPI, BUSY, DC, RST, PWR>>
    {
        if self.state != DeviceState::Asleep {
            self.sleep()?;
        }
        debug!("IL3820 released");
        Ok(self.interface.release())
    }

    fn ensure_active(&self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if self.state != DeviceState::Active {
            return Err(ErrorKind::NotActive);
        }
        Ok(())
    }

    fn init_sequence(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        self.interface.wait_until_idle(IS_BUSY_LOW)?;

        // 3 Databytes:
        // A[7:0]
        // 0.. A[8]
        // 0.. B[2:0]
        // A = number of gate lines - 1, B = 0x00 (GD, SM and TB=0)
        let gates = self.panel.height() - 1;
        self.interface.cmd_with_data(
            Command::DriverOutputControl,
            &[gates as u8, (gates >> 8) as u8, 0x00],
        )?;

        // 3 Databytes: (and default values from datasheet and arduino)
        // 1 .. A[6:0]  = 0xCF | 0xD7
        // 1 .. B[6:0]  = 0xCE | 0xD6
        // 1 .. C[6:0]  = 0x8D | 0x9D
        self.interface
            .cmd_with_data(Command::BoosterSoftStartControl, &[0xD7, 0xD6, 0x9D])?;

        // One Databyte with value 0xA8 for 7V VCOM
        self.interface
            .cmd_with_data(Command::WriteVcomRegister, &[0xA8])?;

        // One Databyte with default value 0x1A for 4 dummy lines per gate
        self.interface
            .cmd_with_data(Command::SetDummyLinePeriod, &[0x1A])?;

        // One Databyte with default value 0x08 for 2us per line
        self.interface
            .cmd_with_data(Command::SetGateLineWidth, &[0x08])?;

        //  -> address: x increment, y increment, address counter is updated in x direction
        self.interface
            .cmd_with_data(Command::DataEntryModeSetting, &[0x03])?;

        self.loaded = None;
        self.load_lut(Lut::Full)
    }

    /// Sends a lookup table unless it is already loaded
    fn load_lut(&mut self, lut: Lut) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if self.loaded == Some(lut) {
            return Ok(());
        }
        trace!("IL3820 loading {:?} lut", lut);
        let table = match lut {
            Lut::Full => self.lut_full,
            Lut::Partial => self.lut_partial,
        };
        self.interface
            .cmd_with_data(Command::WriteLutRegister, &table)?;
        self.loaded = Some(lut);
        Ok(())
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

    fn trigger(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // enable clock signal, enable cp, display pattern -> 0xC4 (tested with the arduino version)
        self.interface
            .cmd_with_data(Command::DisplayUpdateControl2, &[0xC4])?;

        self.interface.cmd(Command::MasterActivation)?;
        // MASTER Activation should not be interupted to avoid currption of panel images
        // therefore a terminate command is send
        self.interface.cmd(Command::Nop)?;
        self.interface.wait_until_idle(IS_BUSY_LOW)
    }
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> ErrorType for Il3820<SPI, BUSY, DC, RST, PWR, DELAY>
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

impl<SPI, BUSY, DC, RST, PWR, DELAY> EpdDevice for Il3820<SPI, BUSY, DC, RST, PWR, DELAY>
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
            "initializing IL3820 {}x{}",
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
        debug!("IL3820 hardware reset");
        self.state = DeviceState::Uninitialized;
        self.loaded = None;
        self.interface.reset(10, 10)
    }

    fn clear(&mut self, color: Color) -> Result<(), Self::Error> {
        self.ensure_active()?;
        debug!("IL3820 clear {:?}", color);
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

        self.load_lut(Lut::from(mode))?;
        self.use_full_frame(width, height)?;
        self.interface.cmd_with_data(Command::WriteRam, buffer)?;
        self.trigger()
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
                    debug!("IL3820 partial refresh unsupported, ignored");
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

        self.load_lut(Lut::Partial)?;
        let (start_x, start_y, end_x, end_y) = region.ram_window();
        self.set_ram_area(start_x, start_y, end_x, end_y)?;
        self.set_ram_counter(start_x, start_y)?;
        self.interface.cmd_with_data(Command::WriteRam, buffer)?;
        self.trigger()
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        debug!("IL3820 entering deep sleep");
        // 0x00 for Normal mode (Power on Reset), 0x01 for Deep Sleep Mode
        self.interface
            .cmd_with_data(Command::DeepSleepMode, &[0x01])?;
        self.interface.delay_ms(100);
        self.state = DeviceState::Asleep;
        Ok(())
    }

    fn wakeup(&mut self) -> Result<(), Self::Error> {
        EpdDevice::reset(self)?;
        self.initialize()
    }

    fn set_rotation(&mut self, quarter_turns: u8) {
        let rotation = DisplayRotation::from_quarter_turns(quarter_turns);
        self.info
            .rotate(self.panel.width(), self.panel.height(), rotation);
    }

    fn invert(&mut self, _enabled: bool) -> Result<(), Self::Error> {
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
        debug!("IL3820 shut down");
        Ok(())
    }
}
