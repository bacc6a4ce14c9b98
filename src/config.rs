//! Panel geometry and runtime driver configuration

use core::fmt;

use crate::info::ColorMode;

/// Default delay between two polls of the busy line
pub const DEFAULT_POLL_INTERVAL_US: u32 = 10_000;
/// Default upper bound for a single busy wait
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 20_000;
/// Linux spidev refuses transfers larger than this
pub const LINUX_MAX_TRANSFER: usize = 4096;

/// Errors while describing a panel
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is zero
    InvalidDimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid panel dimensions: {width}x{height}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Native geometry and color mode of the glass wired to the controller
///
/// `width` runs along the controller's source lines (the RAM X axis, addressed
/// in 8 pixel columns), `height` along its gate lines.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    width: u32,
    height: u32,
    color_mode: ColorMode,
}

impl Panel {
    /// Describes a panel, both dimensions must be non-zero
    ///
    /// Chip specific limits are checked when the driver is created.
    pub fn new(width: u32, height: u32, color_mode: ColorMode) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        Ok(Panel {
            width,
            height,
            color_mode,
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

    /// Colors of the panel
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }
}

/// Upper bound of a busy wait
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyTimeout {
    /// Give up with a timeout error after the given number of milliseconds
    ///
    /// The bound is measured in delay time: the poll intervals handed to the
    /// delay provider are summed up, a zero interval counts as 1 µs per poll.
    /// Time spent on the bus or reading the pin isn't counted.
    Bounded(u32),
    /// Wait as long as the controller stays busy
    Unbounded,
}

impl Default for BusyTimeout {
    fn default() -> Self {
        BusyTimeout::Bounded(DEFAULT_BUSY_TIMEOUT_MS)
    }
}

/// What a capability gated operation does on a device lacking the capability
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Fail with an unsupported operation error
    #[default]
    Error,
    /// Succeed without touching the bus
    Ignore,
}

/// Runtime configuration of a driver
///
/// ```
/// use epd_driver::config::{BusyTimeout, Config, UnsupportedPolicy};
///
/// let config = Config::default()
///     .poll_interval_us(1_000)
///     .busy_timeout(BusyTimeout::Bounded(5_000))
///     .unsupported(UnsupportedPolicy::Ignore);
/// assert_eq!(config.busy_timeout_setting(), BusyTimeout::Bounded(5_000));
/// ```
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    poll_interval_us: u32,
    busy_timeout: BusyTimeout,
    unsupported: UnsupportedPolicy,
    max_transfer: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            busy_timeout: BusyTimeout::default(),
            unsupported: UnsupportedPolicy::default(),
            // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
            max_transfer: if cfg!(target_os = "linux") {
                Some(LINUX_MAX_TRANSFER)
            } else {
                None
            },
        }
    }
}

impl Config {
    /// Delay between two polls of the busy line, 0 polls without sleeping
    #[must_use]
    pub fn poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }

    /// Upper bound of every busy wait
    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: BusyTimeout) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Behaviour of capability gated operations
    #[must_use]
    pub fn unsupported(mut self, unsupported: UnsupportedPolicy) -> Self {
        self.unsupported = unsupported;
        self
    }

    /// Split data transfers into chunks of at most `max_transfer` bytes, `None` never splits
    #[must_use]
    pub fn max_transfer(mut self, max_transfer: Option<usize>) -> Self {
        self.max_transfer = max_transfer.filter(|&len| len > 0);
        self
    }

    /// Configured poll interval
    pub fn poll_interval_setting(&self) -> u32 {
        self.poll_interval_us
    }

    /// Configured busy timeout
    pub fn busy_timeout_setting(&self) -> BusyTimeout {
        self.busy_timeout
    }

    /// Configured policy for capability gated operations
    pub fn unsupported_setting(&self) -> UnsupportedPolicy {
        self.unsupported
    }

    /// Configured maximum transfer size
    pub fn max_transfer_setting(&self) -> Option<usize> {
        self.max_transfer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_rejects_zero_dimensions() {
        assert_eq!(
            Panel::new(0, 128, ColorMode::Monochrome),
            Err(ConfigError::InvalidDimensions {
                width: 0,
                height: 128
            })
        );
        assert!(Panel::new(296, 0, ColorMode::Monochrome).is_err());
        let panel = Panel::new(296, 128, ColorMode::ThreeColor).unwrap();
        assert_eq!(panel.width(), 296);
        assert_eq!(panel.height(), 128);
        assert_eq!(panel.color_mode(), ColorMode::ThreeColor);
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval_setting(), DEFAULT_POLL_INTERVAL_US);
        assert_eq!(
            config.busy_timeout_setting(),
            BusyTimeout::Bounded(DEFAULT_BUSY_TIMEOUT_MS)
        );
        assert_eq!(config.unsupported_setting(), UnsupportedPolicy::Error);
    }

    #[test]
    fn zero_transfer_size_means_unlimited() {
        let config = Config::default().max_transfer(Some(0));
        assert_eq!(config.max_transfer_setting(), None);
        let config = Config::default().max_transfer(Some(64));
        assert_eq!(config.max_transfer_setting(), Some(64));
    }
}
