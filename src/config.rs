//! Orchestrator configuration and builder

pub use crate::error::BuilderError;
pub use crate::staging::NvmPaths;

use crate::controller::Controller;
use crate::epdc::Epdc;
use crate::hv::Hv;
use crate::nvm::Nvm;
use crate::staging::{ScriptUnpacker, Unpacker};

/// Settings of the initialization protocol
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// VCOM applied when waveform and VCOM are not loaded from NVM, in millivolts
    pub default_vcom: i32,
    /// Files used while loading NVM content
    pub nvm_paths: NvmPaths,
    /// Keep `S040`/`EPSON` artifacts on disk after initialization
    pub retain_staged_files: bool,
}

/// Builder for constructing an [`Epdc`]
///
/// Controller, HV subsystem and default VCOM are required.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use pl_epdc::{Area, Builder, Controller, DriverResult, Hv, NvmPaths, RegSetting, TempMode, UpdateMode};
///
/// # struct MyController;
/// # impl Controller for MyController {
/// #     fn temperature_mode(&self) -> TempMode { TempMode::Internal }
/// #     fn waveform_path(&self) -> &Path { Path::new("/boot/waveform.bin") }
/// #     fn configure_update(&mut self, _: u8, _: UpdateMode, _: Option<&Area>) -> DriverResult { Ok(()) }
/// #     fn trigger_update(&mut self) -> DriverResult { Ok(()) }
/// #     fn wait_update_end(&mut self) -> DriverResult { Ok(()) }
/// #     fn fill(&mut self, _: Option<&Area>, _: u8) -> DriverResult { Ok(()) }
/// #     fn load_wflib(&mut self, _: &Path) -> DriverResult { Ok(()) }
/// #     fn read_register(&mut self, _: &mut RegSetting) -> DriverResult { Ok(()) }
/// #     fn write_register(&mut self, _: &RegSetting, _: u32) -> DriverResult { Ok(()) }
/// #     fn send_cmd(&mut self, _: &RegSetting) -> DriverResult { Ok(()) }
/// # }
/// let epdc = match Builder::new()
///     .controller(MyController)
///     .hv(Hv::new())
///     .default_vcom(4500)
///     .nvm_paths(NvmPaths::in_dir("/run/epdc0"))
///     .build()
/// {
///     Ok(epdc) => epdc,
///     Err(_) => return,
/// };
/// let _ = epdc;
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    /// Controller driver (required)
    controller: Option<Box<dyn Controller>>,
    /// HV subsystem (required)
    hv: Option<Hv>,
    /// Display NVM
    nvm: Option<Box<dyn Nvm>>,
    /// Default VCOM in millivolts (required)
    default_vcom: Option<i32>,
    /// Files used while loading NVM content
    nvm_paths: NvmPaths,
    /// Unpacker for `S040` dumps
    unpacker: Option<Box<dyn Unpacker>>,
    /// Keep `S040`/`EPSON` artifacts on disk
    retain_staged_files: bool,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the controller driver (required)
    pub fn controller(mut self, controller: impl Controller + 'static) -> Self {
        self.controller = Some(Box::new(controller));
        self
    }

    /// Set the HV subsystem (required)
    pub fn hv(mut self, hv: Hv) -> Self {
        self.hv = Some(hv);
        self
    }

    /// Attach the display NVM
    pub fn nvm(mut self, nvm: impl Nvm + 'static) -> Self {
        self.nvm = Some(Box::new(nvm));
        self
    }

    /// Set the default VCOM in millivolts (required)
    pub fn default_vcom(mut self, millivolts: i32) -> Self {
        self.default_vcom = Some(millivolts);
        self
    }

    /// Set the files used while loading NVM content
    pub fn nvm_paths(mut self, paths: NvmPaths) -> Self {
        self.nvm_paths = paths;
        self
    }

    /// Set the unpacker used for `S040` dumps
    ///
    /// Defaults to [`ScriptUnpacker::default`].
    pub fn unpacker(mut self, unpacker: impl Unpacker + 'static) -> Self {
        self.unpacker = Some(Box::new(unpacker));
        self
    }

    /// Keep `S040`/`EPSON` artifacts on disk after initialization
    pub fn retain_staged_files(mut self, retain: bool) -> Self {
        self.retain_staged_files = retain;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingController`, `MissingHv` or
    /// `MissingDefaultVcom` if a required part was not set
    pub fn build(self) -> Result<Epdc, BuilderError> {
        let controller = self.controller.ok_or(BuilderError::MissingController)?;
        let hv = self.hv.ok_or(BuilderError::MissingHv)?;
        let default_vcom = self.default_vcom.ok_or(BuilderError::MissingDefaultVcom)?;
        let unpacker = self
            .unpacker
            .unwrap_or_else(|| Box::new(ScriptUnpacker::default()));

        let config = Config {
            default_vcom,
            nvm_paths: self.nvm_paths,
            retain_staged_files: self.retain_staged_files,
        };
        Ok(Epdc::new(controller, hv, self.nvm, unpacker, config))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{CallLog, MockController};

    #[test]
    fn test_missing_controller() {
        let result = Builder::new().hv(Hv::new()).default_vcom(1500).build();
        assert!(matches!(result, Err(BuilderError::MissingController)));
    }

    #[test]
    fn test_missing_hv() {
        let log = CallLog::default();
        let result = Builder::new()
            .controller(MockController::new(&log))
            .default_vcom(1500)
            .build();
        assert!(matches!(result, Err(BuilderError::MissingHv)));
    }

    #[test]
    fn test_missing_default_vcom() {
        let log = CallLog::default();
        let result = Builder::new()
            .controller(MockController::new(&log))
            .hv(Hv::new())
            .build();
        assert!(matches!(result, Err(BuilderError::MissingDefaultVcom)));
    }

    #[test]
    fn test_build_uses_legacy_paths_by_default() {
        let log = CallLog::default();
        let epdc = Builder::new()
            .controller(MockController::new(&log))
            .hv(Hv::new())
            .default_vcom(1500)
            .build()
            .unwrap();
        assert_eq!(epdc.config().default_vcom, 1500);
        assert_eq!(epdc.config().nvm_paths, NvmPaths::default());
        assert!(!epdc.config().retain_staged_files);
    }
}
