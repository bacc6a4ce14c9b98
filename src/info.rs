//! Metadata describing a display: chip, geometry, color mode and capabilities

use bit_field::BitField;

/// Driver protocol version reported in [`DisplayInfo::version`]
pub const PROTOCOL_VERSION: u32 = 0x0100;

/// Supported controller chips
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipType {
    /// Solomon Systech SSD1619
    Ssd1619,
    /// Good Display IL3820
    Il3820,
}

impl ChipType {
    /// Human readable chip name
    pub fn name(self) -> &'static str {
        match self {
            ChipType::Ssd1619 => "SSD1619",
            ChipType::Il3820 => "IL3820",
        }
    }
}

/// Number of colors of the panel
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Black and white
    #[default]
    Monochrome,
    /// Black, white and red (or yellow)
    ThreeColor,
    /// Black, white, red and yellow
    FourColor,
}

impl ColorMode {
    /// Whether a second (chromatic) plane has to be written besides the black/white one
    pub fn has_secondary_plane(self) -> bool {
        !matches!(self, ColorMode::Monochrome)
    }
}

/// Optional features of a display
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Refreshing a sub-region of the panel
    PartialRefresh = 0,
    /// A fast full-frame waveform
    FastRefresh = 1,
    /// A power enable line or a power-off sequence
    PowerControl = 2,
    /// Temperature compensated waveforms
    TemperatureCompensation = 3,
    /// Rotation handled by the controller
    Rotation = 4,
}

/// Set of [`Capability`] flags
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities at all
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    /// Raw flag bits, bit n is the capability with discriminant n
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns the set with `capability` added
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.set_bit(capability as usize, true);
        self
    }

    /// Returns the set with `capability` removed
    #[must_use]
    pub fn without(mut self, capability: Capability) -> Self {
        self.0.set_bit(capability as usize, false);
        self
    }

    /// Checks for a capability
    pub fn contains(self, capability: Capability) -> bool {
        self.0.get_bit(capability as usize)
    }
}

/// Display rotation, only 90° increments supported
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl DisplayRotation {
    /// Rotation by `quarter_turns` quarter turns clockwise, taken modulo 4
    pub fn from_quarter_turns(quarter_turns: u8) -> Self {
        match quarter_turns % 4 {
            0 => DisplayRotation::Rotate0,
            1 => DisplayRotation::Rotate90,
            2 => DisplayRotation::Rotate180,
            _ => DisplayRotation::Rotate270,
        }
    }

    /// Number of quarter turns, 0 to 3
    pub fn quarter_turns(self) -> u8 {
        self as u8
    }

    /// Whether width and height are exchanged
    pub fn is_transposed(self) -> bool {
        matches!(self, DisplayRotation::Rotate90 | DisplayRotation::Rotate270)
    }
}

/// Snapshot of a device's metadata
///
/// `width` and `height` are the dimensions seen by the caller, so they are
/// exchanged under a 90° or 270° rotation.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Controller chip
    pub chip: ChipType,
    /// Controller chip name
    pub chip_name: &'static str,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Colors of the panel
    pub color_mode: ColorMode,
    /// Optional features
    pub capabilities: Capabilities,
    /// Current rotation
    pub rotation: DisplayRotation,
    /// Driver protocol version
    pub version: u32,
}

impl DisplayInfo {
    pub(crate) fn new(
        chip: ChipType,
        width: u32,
        height: u32,
        color_mode: ColorMode,
        capabilities: Capabilities,
    ) -> Self {
        DisplayInfo {
            chip,
            chip_name: chip.name(),
            width,
            height,
            color_mode,
            capabilities,
            rotation: DisplayRotation::Rotate0,
            version: PROTOCOL_VERSION,
        }
    }

    /// Applies a rotation to the native `width × height` geometry
    pub(crate) fn rotate(&mut self, native_width: u32, native_height: u32, rotation: DisplayRotation) {
        self.rotation = rotation;
        if rotation.is_transposed() {
            self.width = native_height;
            self.height = native_width;
        } else {
            self.width = native_width;
            self.height = native_height;
        }
    }
}
