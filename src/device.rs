//! Choosing the controller at runtime
//!
//! Boards that are assembled with different glass can pick the driver from a
//! configuration value and keep working with a boxed [`EpdDevice`].

use alloc::boxed::Box;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::config::{Config, Panel};
use crate::error::ErrorKind;
use crate::info::ChipType;
use crate::interface::PinConfig;
use crate::traits::EpdDevice;

#[cfg(feature = "il3820")]
use crate::il3820::Il3820;
#[cfg(feature = "ssd1619")]
use crate::ssd1619::Ssd1619;

/// A driver behind the uniform device contract
pub type BoxedDevice<'a, SPI, BUSY, DC, RST, PWR> =
    Box<dyn EpdDevice<Error = ErrorKind<SPI, BUSY, DC, RST, PWR>> + 'a>;

/// Creates the driver for `chip`
///
/// Fails with `UnsupportedOperation` when the driver for `chip` was not
/// compiled in, and with the driver's own errors otherwise.
pub fn create<'a, SPI, BUSY, DC, RST, PWR, DELAY>(
    chip: ChipType,
    spi: SPI,
    pins: PinConfig<BUSY, DC, RST, PWR>,
    delay: DELAY,
    panel: Panel,
    config: Config,
) -> Result<BoxedDevice<'a, SPI, BUSY, DC, RST, PWR>, ErrorKind<SPI, BUSY, DC, RST, PWR>>
where
    SPI: SpiDevice + 'a,
    BUSY: InputPin + 'a,
    DC: OutputPin + 'a,
    RST: OutputPin + 'a,
    PWR: OutputPin + 'a,
    DELAY: DelayNs + 'a,
{
    debug!("creating {} driver", chip.name());
    match chip {
        #[cfg(feature = "ssd1619")]
        ChipType::Ssd1619 => Ok(Box::new(Ssd1619::new(spi, pins, delay, panel, config)?)),
        #[cfg(feature = "il3820")]
        ChipType::Il3820 => Ok(Box::new(Il3820::new(spi, pins, delay, panel, config)?)),
        #[allow(unreachable_patterns)]
        _ => {
            warn!("{} support is not compiled in", chip.name());
            let _ = (spi, pins, delay, panel, config);
            Err(ErrorKind::UnsupportedOperation)
        }
    }
}

#[cfg(all(test, feature = "ssd1619", feature = "il3820"))]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::ErrorCategory;
    use crate::info::ColorMode;
    use crate::mock::{Expectations, Harness};
    use crate::traits::DeviceState;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;
    use embedded_hal_mock::eh1::spi::Mock as SpiMock;

    #[test]
    fn creates_requested_chip() {
        let mut harness = Harness::new(Expectations::new());
        let panel = Panel::new(128, 296, ColorMode::Monochrome).unwrap();

        for chip in [ChipType::Ssd1619, ChipType::Il3820] {
            let (spi, pins, delay) = harness.parts();
            let device = create(chip, spi, pins, delay, panel, Config::default()).unwrap();
            let info = device.query_info();
            assert_eq!(info.chip, chip);
            assert_eq!(info.chip_name, chip.name());
            assert_eq!((info.width, info.height), (128, 296));
            assert_eq!(device.state(), DeviceState::Uninitialized);
        }
        harness.done(());
    }

    #[test]
    fn driver_errors_pass_through() {
        let mut harness = Harness::new(Expectations::new());
        let (spi, pins, delay) = harness.parts();
        let panel = Panel::new(296, 128, ColorMode::ThreeColor).unwrap();
        let result = create(ChipType::Il3820, spi, pins, delay, panel, Config::default());
        assert!(matches!(result, Err(ErrorKind::InvalidArgument)));
        harness.done(());
    }

    fn init_16x4() -> Expectations {
        Expectations::new()
            .reset()
            .cmd(0x12)
            .idle()
            .cmd_data(0x01, &[0x03, 0x00, 0x00])
            .cmd_data(0x11, &[0x03])
            .cmd_data(0x44, &[0x00, 0x01])
            .cmd_data(0x45, &[0x00, 0x00, 0x03, 0x00])
            .cmd_data(0x4E, &[0x00])
            .cmd_data(0x4F, &[0x00, 0x00])
            .cmd_data(0x3C, &[0x05])
            .cmd_data(0x1A, &[0x80])
            .cmd_data(0x22, &[0xC0])
            .cmd(0x20)
            .idle()
    }

    type TestDevice = BoxedDevice<'static, SpiMock<u8>, PinMock, PinMock, PinMock, PinMock>;

    fn boxed_16x4(harness: &Harness) -> TestDevice {
        let (spi, pins, delay) = harness.parts();
        let panel = Panel::new(16, 4, ColorMode::Monochrome).unwrap();
        let config = Config::default().max_transfer(None);
        create(ChipType::Ssd1619, spi, pins, delay, panel, config).unwrap()
    }

    #[test]
    fn boxed_device_runs_the_contract() {
        let expectations = init_16x4()
            .cmd_data(0x44, &[0x00, 0x01])
            .cmd_data(0x45, &[0x00, 0x00, 0x03, 0x00])
            .cmd_data(0x4E, &[0x00])
            .cmd_data(0x4F, &[0x00, 0x00])
            .cmd_data(0x24, &[0x00; 8])
            .cmd_data(0x22, &[0xC7])
            .cmd(0x20)
            .idle()
            .cmd_data(0x10, &[0x01]);
        let mut harness = Harness::new(expectations);

        let mut device = boxed_16x4(&harness);
        device.initialize().unwrap();
        device.clear(Color::Black).unwrap();
        device.sleep().unwrap();
        assert_eq!(device.state(), DeviceState::Asleep);
        harness.done(device);
    }

    #[test]
    fn boxed_device_sleeps_on_deinitialize() {
        let mut harness = Harness::new(init_16x4().cmd_data(0x10, &[0x01]));

        let mut device = boxed_16x4(&harness);
        device.initialize().unwrap();
        device.deinitialize().unwrap();
        harness.done(());
    }

    #[test]
    fn boxed_il3820_sleeps_on_deinitialize() {
        let mut harness = Harness::new(Expectations::new().cmd_data(0x10, &[0x01]));
        let (spi, pins, delay) = harness.parts();
        let panel = Panel::new(128, 296, ColorMode::Monochrome).unwrap();

        let device = create(ChipType::Il3820, spi, pins, delay, panel, Config::default()).unwrap();
        device.deinitialize().unwrap();
        harness.done(());
    }

    #[test]
    fn boxed_device_deinitialize_skips_sleep_when_asleep() {
        // a single deep sleep command
        let mut harness = Harness::new(init_16x4().cmd_data(0x10, &[0x01]));

        let mut device = boxed_16x4(&harness);
        device.initialize().unwrap();
        device.sleep().unwrap();
        device.deinitialize().unwrap();
        harness.done(());
    }

    #[test]
    fn boxed_device_deinitialize_reports_bus_faults() {
        let mut harness = Harness::new(init_16x4().failing_cmd());

        let mut device = boxed_16x4(&harness);
        device.initialize().unwrap();
        let err = device.deinitialize().unwrap_err();
        assert!(matches!(err, ErrorKind::DcError(_)));
        assert_eq!(err.category(), ErrorCategory::BusFault);
        harness.done(());
    }
}
