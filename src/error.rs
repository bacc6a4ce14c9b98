//! Errors of the drivers

use core::fmt::{Debug, Display, Formatter};

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::buffer::BufferError;
use crate::traits::Error;

/// Coarse classification of an [`ErrorKind`]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A parameter or buffer was rejected before anything was sent
    InvalidArgument,
    /// A scratch plane couldn't be allocated
    OutOfMemory,
    /// The bus or one of the GPIOs failed
    BusFault,
    /// The controller stayed busy for longer than the configured bound
    Timeout,
    /// The device lacks the capability for the operation
    UnsupportedOperation,
    /// The device isn't initialized or is asleep
    InvalidState,
}

/// Epd error type
pub enum ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// Encountered an SPI error
    SpiError(SPI::Error),

    /// Encountered an error on Busy GPIO
    BusyError(BUSY::Error),

    /// Encountered an error on DC GPIO
    DcError(DC::Error),

    /// Encountered an error on RST GPIO
    RstError(RST::Error),

    /// Encountered an error on the power enable GPIO
    PowerError(PWR::Error),

    /// A parameter was rejected, e.g. a panel too large for the chip
    InvalidArgument,

    /// The buffer doesn't have the length the target area requires
    BufferSize {
        /// Required length in bytes
        expected: usize,
        /// Provided length in bytes
        actual: usize,
    },

    /// The region is empty or doesn't fit on the display
    RegionOutOfBounds,

    /// A scratch plane couldn't be allocated
    OutOfMemory,

    /// The busy line didn't clear in time
    Timeout,

    /// The device lacks the capability required by the operation
    UnsupportedOperation,

    /// The device has to be initialized (or woken up) first
    NotActive,
}

impl<SPI, BUSY, DC, RST, PWR> ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// Classifies the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SpiError(_)
            | Self::BusyError(_)
            | Self::DcError(_)
            | Self::RstError(_)
            | Self::PowerError(_) => ErrorCategory::BusFault,
            Self::InvalidArgument | Self::BufferSize { .. } | Self::RegionOutOfBounds => {
                ErrorCategory::InvalidArgument
            }
            Self::OutOfMemory => ErrorCategory::OutOfMemory,
            Self::Timeout => ErrorCategory::Timeout,
            Self::UnsupportedOperation => ErrorCategory::UnsupportedOperation,
            Self::NotActive => ErrorCategory::InvalidState,
        }
    }
}

impl<SPI, BUSY, DC, RST, PWR> From<BufferError> for ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::OutOfMemory => Self::OutOfMemory,
            BufferError::OutOfBounds { .. } => Self::RegionOutOfBounds,
            BufferError::SizeMismatch { expected, actual } => Self::BufferSize { expected, actual },
        }
    }
}

impl<SPI, BUSY, DC, RST, PWR> Display for ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => write!(f, "SPI error: {err:?}"),
            Self::BusyError(err) => write!(f, "Busy pin error: {err:?}"),
            Self::DcError(err) => write!(f, "DC pin error: {err:?}"),
            Self::RstError(err) => write!(f, "Reset pin error: {err:?}"),
            Self::PowerError(err) => write!(f, "Power enable pin error: {err:?}"),
            Self::InvalidArgument => write!(f, "Invalid argument"),
            Self::BufferSize { expected, actual } => write!(
                f,
                "Buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::RegionOutOfBounds => write!(f, "Region is empty or outside of the display"),
            Self::OutOfMemory => write!(f, "Scratch buffer allocation failed"),
            Self::Timeout => write!(f, "Timed out waiting for the busy line"),
            Self::UnsupportedOperation => write!(f, "Operation not supported by this display"),
            Self::NotActive => write!(f, "Display is not initialized or asleep"),
        }
    }
}

impl<SPI, BUSY, DC, RST, PWR> Debug for ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => f.debug_tuple("SpiError").field(err).finish(),
            Self::BusyError(err) => f.debug_tuple("BusyError").field(err).finish(),
            Self::DcError(err) => f.debug_tuple("DcError").field(err).finish(),
            Self::RstError(err) => f.debug_tuple("RstError").field(err).finish(),
            Self::PowerError(err) => f.debug_tuple("PowerError").field(err).finish(),
            Self::InvalidArgument => write!(f, "InvalidArgument"),
            Self::BufferSize { expected, actual } => f
                .debug_struct("BufferSize")
                .field("expected", expected)
                .field("actual", actual)
                .finish(),
            Self::RegionOutOfBounds => write!(f, "RegionOutOfBounds"),
            Self::OutOfMemory => write!(f, "OutOfMemory"),
            Self::Timeout => write!(f, "Timeout"),
            Self::UnsupportedOperation => write!(f, "UnsupportedOperation"),
            Self::NotActive => write!(f, "NotActive"),
        }
    }
}

impl<SPI, BUSY, DC, RST, PWR> core::error::Error for ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
}

impl<SPI, BUSY, DC, RST, PWR> Error for ErrorKind<SPI, BUSY, DC, RST, PWR>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
{
    fn category(&self) -> ErrorCategory {
        ErrorKind::category(self)
    }
}
