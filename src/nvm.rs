//! Display NVM capability trait and content formats

use crate::error::{DriverError, DriverResult};

/// Layout of the waveform/calibration content stored in the display NVM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NvmFormat {
    /// Packed blob, split into VCOM and waveform by an external unpacker
    S040,
    /// Controller-internal layout, waveform loading from NVM is not supported
    S1D13541,
    /// The blob is a waveform library, VCOM comes from the parsed header
    Epson,
    /// Opaque blob, stored verbatim
    Plain,
}

impl core::fmt::Display for NvmFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::S040 => "S040",
            Self::S1D13541 => "S1D13541",
            Self::Epson => "EPSON",
            Self::Plain => "PLAIN",
        };
        f.write_str(name)
    }
}

/// Parsed NVM header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NvmHeader {
    /// Whether the NVM can still be programmed
    pub is_programmable: bool,
    /// VCOM calibrated for this panel, in millivolts
    pub vcom_mv: i32,
}

/// Trait for display NVM drivers
pub trait Nvm {
    /// Format of the stored content
    fn format(&self) -> NvmFormat;

    /// Read the raw waveform/calibration blob
    fn read_wfdata(&mut self) -> DriverResult<Vec<u8>>;

    /// Parse the NVM header
    ///
    /// Only meaningful for formats that carry one; the default reports
    /// [`DriverError::Unsupported`].
    fn read_header(&mut self) -> DriverResult<NvmHeader> {
        Err(DriverError::Unsupported)
    }
}
