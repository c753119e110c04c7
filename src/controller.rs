//! Controller capability trait
//!
//! The orchestrator talks to the EPD controller ASIC only through the
//! [`Controller`] trait. Concrete drivers (register maps, bus access, waveform
//! parsing) live outside this crate.
//!
//! ## Implementing
//!
//! Required methods cover the update cycle and register access. Optional
//! capabilities come as a `has_*` query plus the operation:
//!
//! - [`Controller::has_temperature_update`] / [`Controller::update_temp`]
//! - [`Controller::has_clear_update`] / [`Controller::clear_update`]
//!
//! The orchestrator checks the query before invoking the operation.

use std::path::Path;

use crate::error::{DriverError, DriverResult};
use crate::register::RegSetting;
use crate::update::{Area, TempMode, UpdateMode};

/// Trait for EPD controller drivers
pub trait Controller {
    /// Controller-specific initialization
    ///
    /// `load_nvm_content` tells the driver whether waveform and VCOM will be
    /// sourced from the display NVM. The default does nothing.
    fn init(&mut self, load_nvm_content: bool) -> DriverResult {
        let _ = load_nvm_content;
        Ok(())
    }

    /// How the controller obtains the panel temperature
    fn temperature_mode(&self) -> TempMode;

    /// Path of the default waveform library
    fn waveform_path(&self) -> &Path;

    /// Whether [`Controller::update_temp`] is implemented
    fn has_temperature_update(&self) -> bool {
        true
    }

    /// Sample the panel temperature and select the matching waveform table
    fn update_temp(&mut self) -> DriverResult {
        Ok(())
    }

    /// Configure the next update
    ///
    /// `area` of `None` updates the full panel.
    fn configure_update(
        &mut self,
        wf_id: u8,
        mode: UpdateMode,
        area: Option<&Area>,
    ) -> DriverResult;

    /// Start the configured update
    fn trigger_update(&mut self) -> DriverResult;

    /// Block until the controller reports the update finished
    fn wait_update_end(&mut self) -> DriverResult;

    /// Whether [`Controller::clear_update`] is implemented
    fn has_clear_update(&self) -> bool {
        false
    }

    /// Run the dedicated clear update
    fn clear_update(&mut self) -> DriverResult {
        Err(DriverError::Unsupported)
    }

    /// Fill an area (or the full panel) of the image buffer with `value`
    fn fill(&mut self, area: Option<&Area>, value: u8) -> DriverResult;

    /// Load a waveform library file into the controller
    fn load_wflib(&mut self, path: &Path) -> DriverResult;

    /// Read `setting.data.len()` words starting at `setting.addr` into `setting.data`
    fn read_register(&mut self, setting: &mut RegSetting) -> DriverResult;

    /// Write `setting`, replacing only the bits set in `bitmask`
    fn write_register(&mut self, setting: &RegSetting, bitmask: u32) -> DriverResult;

    /// Send a command with arguments
    fn send_cmd(&mut self, setting: &RegSetting) -> DriverResult;
}
