//! Expectation builder shared by the driver tests

use alloc::vec::Vec;

use std::io::ErrorKind as IoErrorKind;

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use embedded_hal_mock::eh1::MockError;

use crate::config::Config;
use crate::interface::{DisplayInterface, PinConfig};

pub(crate) type MockPins = PinConfig<PinMock, PinMock, PinMock, PinMock>;
pub(crate) type MockInterface = DisplayInterface<SpiMock<u8>, PinMock, PinMock, PinMock, PinMock, NoopDelay>;

/// Ordered bus and pin traffic a test expects
#[derive(Default)]
pub(crate) struct Expectations {
    spi: Vec<SpiTransaction<u8>>,
    dc: Vec<PinTransaction>,
    busy: Vec<PinTransaction>,
    rst: Vec<PinTransaction>,
    power: Option<Vec<PinTransaction>>,
    max_transfer: Option<usize>,
}

impl Expectations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Must match the `max_transfer` of the driver config
    pub(crate) fn max_transfer(mut self, max_transfer: Option<usize>) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Registers a power enable line
    pub(crate) fn with_power_pin(mut self) -> Self {
        self.power.get_or_insert_with(Vec::new);
        self
    }

    pub(crate) fn cmd(mut self, command: u8) -> Self {
        self.dc.push(PinTransaction::set(State::Low));
        self.write(&[command]);
        self
    }

    pub(crate) fn data(mut self, data: &[u8]) -> Self {
        self.dc.push(PinTransaction::set(State::High));
        match self.max_transfer {
            Some(max) => {
                for chunk in data.chunks(max) {
                    self.write(chunk);
                }
            }
            None => self.write(data),
        }
        self
    }

    pub(crate) fn cmd_data(self, command: u8, data: &[u8]) -> Self {
        self.cmd(command).data(data)
    }

    /// One poll seeing an idle (low) busy line
    pub(crate) fn idle(mut self) -> Self {
        self.busy.push(PinTransaction::get(State::Low));
        self
    }

    /// `polls` polls seeing a busy (high) line
    pub(crate) fn busy_polls(mut self, polls: usize) -> Self {
        for _ in 0..polls {
            self.busy.push(PinTransaction::get(State::High));
        }
        self
    }

    pub(crate) fn reset(mut self) -> Self {
        self.rst.push(PinTransaction::set(State::Low));
        self.rst.push(PinTransaction::set(State::High));
        self
    }

    /// A command whose DC line fails, nothing reaches the bus
    pub(crate) fn failing_cmd(mut self) -> Self {
        self.dc
            .push(PinTransaction::set(State::Low).with_error(io_error()));
        self
    }

    /// A busy poll failing to read the line
    pub(crate) fn failing_poll(mut self) -> Self {
        self.busy
            .push(PinTransaction::get(State::High).with_error(io_error()));
        self
    }

    /// A reset pulse failing on its falling edge
    pub(crate) fn failing_reset(mut self) -> Self {
        self.rst
            .push(PinTransaction::set(State::Low).with_error(io_error()));
        self
    }

    pub(crate) fn power(mut self, state: State) -> Self {
        self.power
            .get_or_insert_with(Vec::new)
            .push(PinTransaction::set(state));
        self
    }

    /// Appends another expectation sequence
    pub(crate) fn then(mut self, other: Expectations) -> Self {
        self.spi.extend(other.spi);
        self.dc.extend(other.dc);
        self.busy.extend(other.busy);
        self.rst.extend(other.rst);
        if let Some(power) = other.power {
            self.power.get_or_insert_with(Vec::new).extend(power);
        }
        self
    }

    fn write(&mut self, data: &[u8]) {
        self.spi.push(SpiTransaction::transaction_start());
        self.spi.push(SpiTransaction::write_vec(data.to_vec()));
        self.spi.push(SpiTransaction::transaction_end());
    }
}

fn io_error() -> MockError {
    MockError::Io(IoErrorKind::NotConnected)
}

/// Mocks built from [`Expectations`], keeps a handle on each to check them at the end
pub(crate) struct Harness {
    spi: SpiMock<u8>,
    dc: PinMock,
    busy: PinMock,
    rst: PinMock,
    power: Option<PinMock>,
}

impl Harness {
    pub(crate) fn new(expectations: Expectations) -> Self {
        Harness {
            spi: SpiMock::new(&expectations.spi),
            dc: PinMock::new(&expectations.dc),
            busy: PinMock::new(&expectations.busy),
            rst: PinMock::new(&expectations.rst),
            power: expectations.power.map(|power| PinMock::new(&power)),
        }
    }

    /// Handles to move into a driver
    pub(crate) fn parts(&self) -> (SpiMock<u8>, MockPins, NoopDelay) {
        let pins = PinConfig {
            busy: self.busy.clone(),
            dc: self.dc.clone(),
            rst: self.rst.clone(),
            power: self.power.clone(),
        };
        (self.spi.clone(), pins, NoopDelay::new())
    }

    pub(crate) fn interface(&self, config: &Config) -> MockInterface {
        let (spi, pins, delay) = self.parts();
        DisplayInterface::new(spi, pins, delay, config)
    }

    /// Drops the device and checks that every expectation was consumed
    pub(crate) fn done<T>(&mut self, device: T) {
        drop(device);
        self.spi.done();
        self.dc.done();
        self.busy.done();
        self.rst.done();
        if let Some(power) = self.power.as_mut() {
            power.done();
        }
    }
}
