//! SPI Commands for the SSD1619 controller

use crate::traits;

/// SSD1619 commands
///
/// Should rarely (never?) be needed directly.
///
/// For more infos about the addresses and what they are doing look into the SSD1619A datasheet
#[derive(Copy, Clone)]
pub(crate) enum Command {
    /// Driver Output control
    ///     3 Databytes:
    ///     A[7:0]
    ///     0.. A[8]
    ///     0.. B[2:0]
    ///     A = number of gate lines - 1, B = scanning order (GD, SM, TB)
    DriverOutputControl = 0x01,
    /// Deep Sleep Mode Control
    ///     1 Databyte:
    ///     A[0] = 0: Normal Mode (POR)
    ///     A[0] = 1: Enter Deep Sleep Mode 1
    DeepSleepMode = 0x10,
    /// Address increment direction, 0x03 is X then Y incrementing
    DataEntryModeSetting = 0x11,
    SwReset = 0x12,
    /// 0x80 selects the internal sensor
    TemperatureSensorSelection = 0x1A,
    /// Runs the sequence selected with `DisplayUpdateControl2`, busy stays high meanwhile
    MasterActivation = 0x20,
    DisplayUpdateControl2 = 0x22,
    /// Black/white RAM
    WriteRam = 0x24,
    /// Red RAM
    WriteRam2 = 0x26,
    BorderWaveformControl = 0x3C,
    /// 2 Databytes, start and end in byte columns
    SetRamXAddressStartEndPosition = 0x44,
    /// 4 Databytes: A[7:0], 0..A[8] for start and end
    SetRamYAddressStartEndPosition = 0x45,
    SetRamXAddressCounter = 0x4E,
    SetRamYAddressCounter = 0x4F,
}

impl traits::Command for Command {
    /// Returns the address of the command
    fn address(self) -> u8 {
        self as u8
    }
}
