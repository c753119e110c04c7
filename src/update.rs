//! Update modes, areas and temperature modes

use crate::error::Error;

/// Raw mode values at or above this offset request a no-wait update
pub const NO_WAIT_OFFSET: u8 = 4;

/// Base refresh type of an update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateMode {
    /// Full panel update
    #[default]
    Full = 0,
    /// Partial update (only changed pixels are driven)
    Partial = 1,
    /// Full update restricted to an area
    FullArea = 2,
    /// Partial update restricted to an area
    PartialArea = 3,
}

impl TryFrom<u8> for UpdateMode {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Full),
            1 => Ok(Self::Partial),
            2 => Ok(Self::FullArea),
            3 => Ok(Self::PartialArea),
            _ => Err(Error::InvalidUpdateMode(raw)),
        }
    }
}

/// Update mode plus the no-wait flag
///
/// The raw encoding multiplexes the flag into the mode value: `raw = mode + 4`
/// requests `mode` without waiting for completion.
///
/// ```
/// use pl_epdc::{UpdateMode, UpdateRequest};
///
/// let request = UpdateRequest::try_from(5).unwrap();
/// assert_eq!(request.mode, UpdateMode::Partial);
/// assert!(request.no_wait);
/// assert_eq!(request.raw(), 5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Base mode passed to the controller
    pub mode: UpdateMode,
    /// Skip waiting for completion and leave the HV rails energized
    pub no_wait: bool,
}

impl UpdateRequest {
    /// Request an update that waits for completion
    pub const fn new(mode: UpdateMode) -> Self {
        Self {
            mode,
            no_wait: false,
        }
    }

    /// Turn this request into its no-wait variant
    pub const fn no_wait(mut self) -> Self {
        self.no_wait = true;
        self
    }

    /// Encode back into the raw mode value
    pub const fn raw(self) -> u8 {
        if self.no_wait {
            self.mode as u8 + NO_WAIT_OFFSET
        } else {
            self.mode as u8
        }
    }
}

impl From<UpdateMode> for UpdateRequest {
    fn from(mode: UpdateMode) -> Self {
        Self::new(mode)
    }
}

impl TryFrom<u8> for UpdateRequest {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        if raw >= NO_WAIT_OFFSET {
            let mode = UpdateMode::try_from(raw - NO_WAIT_OFFSET)
                .map_err(|_| Error::InvalidUpdateMode(raw))?;
            Ok(Self::new(mode).no_wait())
        } else {
            UpdateMode::try_from(raw).map(Self::new)
        }
    }
}

/// Rectangular update area in panel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Area {
    /// Left edge in pixels
    pub left: i32,
    /// Top edge in pixels
    pub top: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Area {
    /// Create a new area
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::primitives::Rectangle> for Area {
    fn from(rect: embedded_graphics_core::primitives::Rectangle) -> Self {
        Self {
            left: rect.top_left.x,
            top: rect.top_left.y,
            width: rect.size.width,
            height: rect.size.height,
        }
    }
}

/// How the controller obtains the panel temperature
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TempMode {
    /// Temperature is set by the application, never sampled
    Manual,
    /// Sampled from an external sensor
    External,
    /// Sampled from the controller's internal sensor
    #[default]
    Internal,
}
