//! EPD Controller Orchestration
//!
//! Vendor-neutral core for electrophoretic display controllers. The
//! orchestrator owns a controller driver, the HV subsystem and an optional
//! display NVM, and runs the fixed protocols over them.
//!
//! ## Features
//!
//! - Initialization with waveform and VCOM loading from file or display NVM
//! - Update sequencing with correct HV/VCOM rail ordering
//! - Best-effort sequences with per-step failure reports
//! - `embedded-hal` v1.0 GPIO rail drivers
//! - `embedded-graphics` rectangles as update areas (with `graphics` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pl_epdc::{Area, Builder, Controller, DriverResult, Hv, RegSetting, TempMode, UpdateMode};
//!
//! # struct MyController;
//! # impl Controller for MyController {
//! #     fn temperature_mode(&self) -> TempMode { TempMode::Internal }
//! #     fn waveform_path(&self) -> &Path { Path::new("/boot/waveform.bin") }
//! #     fn configure_update(&mut self, _: u8, _: UpdateMode, _: Option<&Area>) -> DriverResult { Ok(()) }
//! #     fn trigger_update(&mut self) -> DriverResult { Ok(()) }
//! #     fn wait_update_end(&mut self) -> DriverResult { Ok(()) }
//! #     fn fill(&mut self, _: Option<&Area>, _: u8) -> DriverResult { Ok(()) }
//! #     fn load_wflib(&mut self, _: &Path) -> DriverResult { Ok(()) }
//! #     fn read_register(&mut self, _: &mut RegSetting) -> DriverResult { Ok(()) }
//! #     fn write_register(&mut self, _: &RegSetting, _: u32) -> DriverResult { Ok(()) }
//! #     fn send_cmd(&mut self, _: &RegSetting) -> DriverResult { Ok(()) }
//! # }
//! let mut epdc = match Builder::new()
//!     .controller(MyController)
//!     .hv(Hv::new())
//!     .default_vcom(4500)
//!     .build()
//! {
//!     Ok(epdc) => epdc,
//!     Err(_) => return,
//! };
//!
//! if epdc.init(false).is_err() {
//!     return;
//! }
//! let _ = epdc.clear_init();
//! let _ = epdc.update(2, UpdateMode::Partial, Some(&Area::new(0, 0, 400, 300)));
//! ```

/// Orchestrator configuration and builder
pub mod config;
/// Controller driver capabilities
pub mod controller;
/// The orchestrator
pub mod epdc;
/// Error types
pub mod error;
/// GPIO-backed HV parts
pub mod gpio;
/// HV subsystem and rail sequencing
pub mod hv;
/// Display NVM capabilities
pub mod nvm;
/// Register and command settings
pub mod register;
/// Per-step outcomes of best-effort sequences
pub mod sequence;
/// Staging of NVM artifacts on the filesystem
pub mod staging;
/// Update modes, areas and temperature modes
pub mod update;

#[cfg(test)]
mod mock;

pub use config::{Builder, Config, NvmPaths};
pub use controller::Controller;
pub use epdc::{CLEAR_FILL_VALUE, Epdc};
pub use error::{BuilderError, DriverError, DriverResult, Error, InitStep};
pub use gpio::{BypassSwitch, DEFAULT_SETTLE_MS, GpioRail, GpioVcomSwitch};
pub use hv::{Hv, HvDriver, VcomConfig, VcomDriver, VcomSwitch};
pub use nvm::{Nvm, NvmFormat, NvmHeader};
pub use register::{RegSetting, masked_value};
pub use sequence::{SequenceReport, Step, StepOutcome};
pub use staging::{DEFAULT_UNPACK_SCRIPT, ScriptUnpacker, StagedFile, Unpacker};
pub use update::{Area, NO_WAIT_OFFSET, TempMode, UpdateMode, UpdateRequest};
