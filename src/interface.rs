use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{self, InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::config::{BusyTimeout, Config};
use crate::{error::ErrorKind, traits::Command};

/// Placeholder for an absent power enable line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPin;

impl digital::ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Control lines of a display besides the SPI bus
///
/// Chip select belongs to the [`SpiDevice`].
#[derive(Debug)]
pub struct PinConfig<BUSY, DC, RST, PWR = NoPin> {
    /// Busy input of the controller
    pub busy: BUSY,
    /// Data/Command Control Pin (High for data, Low for command)
    pub dc: DC,
    /// Pin for Resetting
    pub rst: RST,
    /// Optional power enable, driven high while the panel is powered
    pub power: Option<PWR>,
}

impl<BUSY, DC, RST> PinConfig<BUSY, DC, RST, NoPin> {
    /// Pins of a display without a power enable line
    pub fn new(busy: BUSY, dc: DC, rst: RST) -> Self {
        PinConfig {
            busy,
            dc,
            rst,
            power: None,
        }
    }

    /// Adds a power enable line
    pub fn with_power_enable<PWR>(self, power: PWR) -> PinConfig<BUSY, DC, RST, PWR> {
        PinConfig {
            busy: self.busy,
            dc: self.dc,
            rst: self.rst,
            power: Some(power),
        }
    }
}

/// The Connection Interface of all supported controllers
///
/// Owns the SPI device, the control pins and the delay provider.
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST, PWR, DELAY> {
    spi: SPI,
    /// Busy line, its active level is given per call
    busy: BUSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Resetting
    rst: RST,
    power: Option<PWR>,
    delay: DELAY,
    /// number of us the idle loop should sleep on
    poll_interval_us: u32,
    busy_timeout: BusyTimeout,
    max_transfer: Option<usize>,
}

impl<SPI, BUSY, DC, RST, PWR, DELAY> DisplayInterface<SPI, BUSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new `DisplayInterface` struct
    pub fn new(spi: SPI, pins: PinConfig<BUSY, DC, RST, PWR>, delay: DELAY, config: &Config) -> Self {
        DisplayInterface {
            spi,
            busy: pins.busy,
            dc: pins.dc,
            rst: pins.rst,
            power: pins.power,
            delay,
            poll_interval_us: config.poll_interval_setting(),
            busy_timeout: config.busy_timeout_setting(),
            max_transfer: config.max_transfer_setting(),
        }
    }

    /// Hands back the bus, the pins and the delay
    pub fn release(self) -> (SPI, PinConfig<BUSY, DC, RST, PWR>, DELAY) {
        let pins = PinConfig {
            busy: self.busy,
            dc: self.dc,
            rst: self.rst,
            power: self.power,
        };
        (self.spi, pins, self.delay)
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of [data()](DisplayInterface::data())
    pub(crate) fn cmd<T: Command>(
        &mut self,
        command: T,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // low for commands
        self.dc.set_low().map_err(ErrorKind::DcError)?;

        // Transfer the command over spi
        self.write(&[command.address()])
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // high for data
        self.dc.set_high().map_err(ErrorKind::DcError)?;

        self.write(data)
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command>(
        &mut self,
        command: T,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        self.cmd(command)?;
        self.data(data)
    }

    // spi write helper/abstraction function
    fn write(&mut self, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        match self.max_transfer {
            Some(max) => {
                for data_chunk in data.chunks(max) {
                    self.spi.write(data_chunk).map_err(ErrorKind::SpiError)?;
                }
                Ok(())
            }
            None => self.spi.write(data).map_err(ErrorKind::SpiError),
        }
    }

    /// Checks if device is still busy
    ///
    /// is_busy_low
    ///
    ///  - TRUE for controllers pulling busy low while working
    ///  - FALSE for the SSD1619 and IL3820
    pub(crate) fn is_busy(
        &mut self,
        is_busy_low: bool,
    ) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        if is_busy_low {
            self.busy.is_low().map_err(ErrorKind::BusyError)
        } else {
            self.busy.is_high().map_err(ErrorKind::BusyError)
        }
    }

    /// Waits until device isn't busy anymore
    ///
    /// Polls every `poll_interval_us` and gives up with [`ErrorKind::Timeout`]
    /// once the accumulated wait reaches a bounded timeout.
    pub(crate) fn wait_until_idle(
        &mut self,
        is_busy_low: bool,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        let mut waited_us: u64 = 0;
        while self.is_busy(is_busy_low)? {
            if let BusyTimeout::Bounded(timeout_ms) = self.busy_timeout {
                if waited_us >= u64::from(timeout_ms) * 1000 {
                    warn!("busy line still asserted after {} ms", timeout_ms);
                    return Err(ErrorKind::Timeout);
                }
            }
            if self.poll_interval_us > 0 {
                self.delay.delay_us(self.poll_interval_us);
            }
            // a zero interval still has to make progress towards the bound
            waited_us += u64::from(self.poll_interval_us.max(1));
        }
        Ok(())
    }

    pub(crate) fn delay_ms(&mut self, duration: u32) {
        self.delay.delay_ms(duration);
    }

    /// Resets the device.
    ///
    /// Often used to awake the module from deep sleep.
    ///
    /// Reset is held low for `duration` ms, then released and given `settle`
    /// ms plus a fixed 100 ms before the controller is addressed.
    pub(crate) fn reset(
        &mut self,
        duration: u32,
        settle: u32,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        self.rst.set_low().map_err(ErrorKind::RstError)?;
        self.delay.delay_ms(duration);
        self.rst.set_high().map_err(ErrorKind::RstError)?;
        self.delay.delay_ms(settle);
        self.delay.delay_ms(100);
        Ok(())
    }

    /// Drives the power enable line high, no-op without one
    pub(crate) fn power_on(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        match self.power.as_mut() {
            Some(power) => power.set_high().map_err(ErrorKind::PowerError),
            None => Ok(()),
        }
    }

    /// Drives the power enable line low, no-op without one
    pub(crate) fn power_off(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST, PWR>> {
        match self.power.as_mut() {
            Some(power) => power.set_low().map_err(ErrorKind::PowerError),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::mock::{Expectations, Harness};

    #[derive(Clone, Copy)]
    struct Raw(u8);

    impl Command for Raw {
        fn address(self) -> u8 {
            self.0
        }
    }

    #[test]
    fn dc_framing() {
        let mut harness = Harness::new(Expectations::new().cmd_data(0x44, &[0x00, 0x24]).cmd(0x20));
        let mut interface = harness.interface(&Config::default().max_transfer(None));
        interface.cmd_with_data(Raw(0x44), &[0x00, 0x24]).unwrap();
        interface.cmd(Raw(0x20)).unwrap();
        harness.done(interface);
    }

    #[test]
    fn data_is_split_into_chunks() {
        let data = [0xAAu8; 10];
        let expectations = Expectations::new().max_transfer(Some(4)).cmd_data(0x24, &data);
        let mut harness = Harness::new(expectations);
        let mut interface = harness.interface(&Config::default().max_transfer(Some(4)));
        interface.cmd_with_data(Raw(0x24), &data).unwrap();
        harness.done(interface);
    }

    #[test]
    fn idle_after_polls() {
        let mut harness = Harness::new(Expectations::new().busy_polls(3).idle());
        let mut interface = harness.interface(&Config::default().busy_timeout(BusyTimeout::Unbounded));
        interface.wait_until_idle(false).unwrap();
        harness.done(interface);
    }

    #[test]
    fn bounded_wait_times_out() {
        let mut harness = Harness::new(Expectations::new().busy_polls(2));
        let config = Config::default()
            .poll_interval_us(1_000)
            .busy_timeout(BusyTimeout::Bounded(1));
        let mut interface = harness.interface(&config);
        let err = interface.wait_until_idle(false).unwrap_err();
        assert!(matches!(err, ErrorKind::Timeout));
        assert_eq!(err.category(), ErrorCategory::Timeout);
        harness.done(interface);
    }

    #[test]
    fn zero_interval_counts_one_us_per_poll() {
        // 1 ms bound: 1000 polls pass, the next one gives up
        let mut harness = Harness::new(Expectations::new().busy_polls(1001));
        let config = Config::default()
            .poll_interval_us(0)
            .busy_timeout(BusyTimeout::Bounded(1));
        let mut interface = harness.interface(&config);
        let err = interface.wait_until_idle(false).unwrap_err();
        assert!(matches!(err, ErrorKind::Timeout));
        harness.done(interface);
    }

    #[test]
    fn busy_read_fault_surfaces_unchanged() {
        let mut harness = Harness::new(Expectations::new().failing_poll());
        let mut interface = harness.interface(&Config::default());
        let err = interface.wait_until_idle(false).unwrap_err();
        assert!(matches!(err, ErrorKind::BusyError(_)));
        assert_eq!(err.category(), ErrorCategory::BusFault);
        harness.done(interface);
    }

    #[test]
    fn reset_pulse() {
        let mut harness = Harness::new(Expectations::new().reset());
        let mut interface = harness.interface(&Config::default());
        interface.reset(10, 10).unwrap();
        harness.done(interface);
    }

    #[test]
    fn power_enable_is_optional() {
        let mut harness = Harness::new(Expectations::new());
        let mut interface = harness.interface(&Config::default());
        interface.power_on().unwrap();
        interface.power_off().unwrap();
        harness.done(interface);
    }

    #[test]
    fn chip_select_framing_with_exclusive_device() {
        use embedded_hal_bus::spi::ExclusiveDevice;
        use embedded_hal_mock::eh1::delay::NoopDelay;
        use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
        use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
        use alloc::vec;

        let mut bus = SpiMock::new(&[
            SpiTransaction::write_vec(vec![0x20]),
            SpiTransaction::flush(),
        ]);
        let mut cs = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut dc = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut busy = PinMock::new(&[]);
        let mut rst = PinMock::new(&[]);

        let device = ExclusiveDevice::new_no_delay(bus.clone(), cs.clone()).unwrap();
        let pins = PinConfig::new(busy.clone(), dc.clone(), rst.clone());
        let mut interface = DisplayInterface::new(device, pins, NoopDelay::new(), &Config::default());
        interface.cmd(Raw(0x20)).unwrap();
        drop(interface);

        bus.done();
        cs.done();
        dc.done();
        busy.done();
        rst.done();
    }
}
