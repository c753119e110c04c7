//! Controller register settings
//!
//! A [`RegSetting`] addresses one controller register (or command) and carries
//! the data words written to it or read back from it.
//!
//! Register writes are masked: only the bits set in the bitmask are replaced,
//! the rest keep their current value. [`masked_value`] implements that rule
//! for controller drivers.
//!
//! ## Example
//!
//! ```
//! use pl_epdc::register::{masked_value, RegSetting};
//!
//! let setting = RegSetting::new(0x0306, 0x00F0);
//! assert_eq!(setting.value(), Some(0x00F0));
//!
//! // Only the low nibble is replaced
//! assert_eq!(masked_value(0x1234, 0xFFFF, 0x000F), 0x123F);
//! ```

/// Address plus data words for a register access or command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegSetting {
    /// Register address or command code
    pub addr: u16,
    /// Data words, the first one is the register value
    pub data: Vec<u16>,
}

impl RegSetting {
    /// Create a setting holding a single value
    pub fn new(addr: u16, value: u16) -> Self {
        Self {
            addr,
            data: vec![value],
        }
    }

    /// Create a setting with an arbitrary argument list (commands)
    pub fn with_data(addr: u16, data: &[u16]) -> Self {
        Self {
            addr,
            data: data.to_vec(),
        }
    }

    /// Create an empty setting to be filled in by a register read
    pub fn read(addr: u16, count: usize) -> Self {
        Self {
            addr,
            data: vec![0; count],
        }
    }

    /// First data word, if any
    pub fn value(&self) -> Option<u16> {
        self.data.first().copied()
    }
}

/// Apply a masked write: bits set in `mask` come from `new`, the rest from `old`
pub const fn masked_value(old: u16, new: u16, mask: u32) -> u16 {
    let mask = mask as u16;
    (old & !mask) | (new & mask)
}
