//! The EPDC orchestrator
//!
//! [`Epdc`] owns the controller, the HV subsystem and the optional display
//! NVM, and runs the fixed protocols over them:
//!
//! - [`Epdc::init`] - controller, temperature, HV, then waveform and VCOM
//! - [`Epdc::update`] - temperature, configure, HV on, trigger, wait, HV off
//! - [`Epdc::clear_init`] - initial full-panel clear
//! - [`Epdc::set_vcom`] and register access
//!
//! `init` is fail-fast. `update` and `clear_init` are best-effort: every step
//! runs and the failures are collected in a
//! [`SequenceReport`](crate::sequence::SequenceReport).

use std::path::Path;

use crate::config::Config;
use crate::controller::Controller;
use crate::error::{DriverError, Error, InitStep};
use crate::hv::{Hv, VcomConfig};
use crate::nvm::{Nvm, NvmFormat};
use crate::register::RegSetting;
use crate::sequence::{SequenceReport, Step};
use crate::staging::{StagedFile, Unpacker, read_vcom_file};
use crate::update::{Area, TempMode, UpdateRequest};

/// Value the panel is filled with before the clear update
pub const CLEAR_FILL_VALUE: u8 = 0xFF;

type EpdcResult<T = ()> = core::result::Result<T, Error>;

/// EPD controller orchestrator
pub struct Epdc {
    /// Controller driver
    controller: Box<dyn Controller>,
    /// HV subsystem
    hv: Hv,
    /// Display NVM
    nvm: Option<Box<dyn Nvm>>,
    /// Unpacker for `S040` dumps
    unpacker: Box<dyn Unpacker>,
    /// Protocol settings
    config: Config,
}

impl Epdc {
    /// Create an orchestrator; see [`Builder`](crate::config::Builder)
    pub(crate) fn new(
        controller: Box<dyn Controller>,
        hv: Hv,
        nvm: Option<Box<dyn Nvm>>,
        unpacker: Box<dyn Unpacker>,
        config: Config,
    ) -> Self {
        Self {
            controller,
            hv,
            nvm,
            unpacker,
            config,
        }
    }

    /// Access the protocol settings
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the controller
    ///
    /// After a no-wait update the caller finishes the cycle itself:
    /// `controller_mut().wait_update_end()` followed by `hv_mut().switch_off()`.
    pub fn controller_mut(&mut self) -> &mut dyn Controller {
        self.controller.as_mut()
    }

    /// Direct access to the HV subsystem
    pub fn hv_mut(&mut self) -> &mut Hv {
        &mut self.hv
    }

    /// Initialize every subsystem and load waveform and VCOM
    ///
    /// With `load_nvm_content` the waveform and VCOM come from the display NVM,
    /// otherwise from the controller's default waveform path and the configured
    /// default VCOM.
    pub fn init(&mut self, load_nvm_content: bool) -> EpdcResult {
        log::debug!("init (load_nvm_content={})", load_nvm_content);

        self.controller
            .init(load_nvm_content)
            .map_err(|source| init_failed(InitStep::ControllerInit, source))?;

        if self.controller.has_temperature_update() {
            if let Err(e) = self.controller.update_temp() {
                log::warn!("initial temperature update failed: {}", e);
            }
        }

        self.hv
            .init()
            .map_err(|source| init_failed(InitStep::HvInit, source))?;

        if load_nvm_content {
            return self.load_nvm_content();
        }

        let path = self.controller.waveform_path().to_path_buf();
        self.load_waveform(&path)?;

        log::info!("Setting vcom: {}", self.config.default_vcom);
        self.apply_vcom(self.config.default_vcom)
    }

    /// Program the VCOM level in millivolts
    pub fn set_vcom(&mut self, millivolts: i32) -> EpdcResult {
        self.vcom_config()?.set_vcom(millivolts).map_err(|source| {
            log::error!("vcom apply failed: {}", source);
            Error::Vcom { source }
        })
    }

    /// `set_vcom` as a step of `init`
    fn apply_vcom(&mut self, millivolts: i32) -> EpdcResult {
        self.vcom_config()?
            .set_vcom(millivolts)
            .map_err(|source| init_failed(InitStep::ApplyVcom, source))
    }

    fn vcom_config(&mut self) -> EpdcResult<&mut (dyn VcomConfig + 'static)> {
        self.hv.vcom_config_mut().ok_or_else(|| {
            log::error!("Abort: There's no vcom configuration HW defined in the EPDC.");
            Error::MissingVcomConfig
        })
    }

    /// Read controller registers into `setting.data`
    pub fn read_register(&mut self, setting: &mut RegSetting) -> EpdcResult {
        self.controller
            .read_register(setting)
            .map_err(|source| Error::Register {
                addr: setting.addr,
                source,
            })
    }

    /// Write controller registers, replacing only the bits set in `bitmask`
    pub fn write_register(&mut self, setting: &RegSetting, bitmask: u32) -> EpdcResult {
        self.controller
            .write_register(setting, bitmask)
            .map_err(|source| Error::Register {
                addr: setting.addr,
                source,
            })
    }

    /// Send a command to the controller
    pub fn send_cmd(&mut self, setting: &RegSetting) -> EpdcResult {
        self.controller
            .send_cmd(setting)
            .map_err(|source| Error::Register {
                addr: setting.addr,
                source,
            })
    }

    /// Run one complete display update
    ///
    /// A no-wait request returns right after triggering, with the HV rails
    /// still energized.
    pub fn update(
        &mut self,
        wf_id: u8,
        request: impl Into<UpdateRequest>,
        area: Option<&Area>,
    ) -> EpdcResult {
        self.update_sequence(wf_id, request.into(), area)
            .into_result()
    }

    fn update_sequence(
        &mut self,
        wf_id: u8,
        request: UpdateRequest,
        area: Option<&Area>,
    ) -> SequenceReport {
        log::debug!(
            "update wf={} mode={:?} no_wait={}",
            wf_id,
            request.mode,
            request.no_wait
        );
        let mut report = SequenceReport::new();

        self.sample_temperature(&mut report);
        report.record(
            Step::ConfigureUpdate,
            self.controller.configure_update(wf_id, request.mode, area),
        );
        report.extend(self.hv.switch_on());
        report.record(Step::TriggerUpdate, self.controller.trigger_update());

        if !request.no_wait {
            report.record(Step::WaitUpdateEnd, self.controller.wait_update_end());
            report.extend(self.hv.switch_off());
        }

        report
    }

    /// Run the initial clear update
    ///
    /// Succeeds without touching the panel if the controller has no clear
    /// update.
    pub fn clear_init(&mut self) -> EpdcResult {
        self.clear_sequence().into_result()
    }

    fn clear_sequence(&mut self) -> SequenceReport {
        let mut report = SequenceReport::new();

        if !self.controller.has_clear_update() {
            log::warn!("Warning - clear update not supported...");
            return report;
        }

        self.sample_temperature(&mut report);

        // HV must stay off if the image buffer could not be prepared.
        let fill = self.controller.fill(None, CLEAR_FILL_VALUE);
        let filled = fill.is_ok();
        report.record(Step::Fill, fill);
        if !filled {
            return report;
        }

        report.extend(self.hv.switch_on());
        report.record(Step::ClearUpdate, self.controller.clear_update());
        report.record(Step::WaitUpdateEnd, self.controller.wait_update_end());
        report.extend(self.hv.switch_off());

        report
    }

    fn sample_temperature(&mut self, report: &mut SequenceReport) {
        if self.controller.temperature_mode() != TempMode::Manual
            && self.controller.has_temperature_update()
        {
            report.record(Step::UpdateTemp, self.controller.update_temp());
        }
    }

    fn load_waveform(&mut self, path: &Path) -> EpdcResult {
        log::info!("Loading wflib: {}", path.display());
        self.controller
            .load_wflib(path)
            .map_err(|source| init_failed(InitStep::LoadWaveform, source))
    }

    fn resample_temperature(&mut self) -> EpdcResult {
        if !self.controller.has_temperature_update() {
            return Ok(());
        }
        self.controller
            .update_temp()
            .map_err(|source| init_failed(InitStep::UpdateTemp, source))
    }

    fn load_nvm_content(&mut self) -> EpdcResult {
        let Some(nvm) = self.nvm.as_deref_mut() else {
            log::error!("Abort: There's no nvm defined in the EPDC.");
            return Err(Error::MissingNvm);
        };
        if !self.hv.has_vcom_config() {
            log::error!("Abort: There's no vcom configuration HW defined in the EPDC.");
            return Err(Error::MissingVcomConfig);
        }

        let format = nvm.format();
        log::info!("Loading display NVM content ({})", format);
        if format == NvmFormat::S1D13541 {
            log::error!("NVM_FORMAT_S1D13541 does not support Wf loading from NVM");
            return Err(Error::UnsupportedNvmFormat(format));
        }

        let blob = nvm
            .read_wfdata()
            .map_err(|source| init_failed(InitStep::ReadNvm, source))?;
        if blob.is_empty() {
            log::error!("Display NVM returned no content");
            return Err(Error::EmptyNvmContent);
        }

        match format {
            NvmFormat::S040 => self.load_s040(&blob),
            NvmFormat::Epson => self.load_epson(&blob),
            NvmFormat::Plain => {
                let path = StagedFile::create(&self.config.nvm_paths.plain_dump, &blob)?.persist();
                log::info!("Stored {} bytes of NVM content to {}", blob.len(), path.display());
                Ok(())
            }
            NvmFormat::S1D13541 => Err(Error::UnsupportedNvmFormat(format)),
        }
    }

    fn load_s040(&mut self, blob: &[u8]) -> EpdcResult {
        let paths = self.config.nvm_paths.clone();

        let dump = StagedFile::create(&paths.s040_dump, blob)?;
        // Outputs of the unpacker, removed together with the dump.
        let vcom_file = StagedFile::adopt(&paths.s040_vcom);
        let waveform_file = StagedFile::adopt(&paths.s040_waveform);

        self.unpacker.unpack(&paths)?;

        let vcom = read_vcom_file(vcom_file.path())?;
        log::info!("Setting vcom from display NVM: {}", vcom);
        self.apply_vcom(vcom)?;

        self.resample_temperature()?;
        self.load_waveform(waveform_file.path())?;

        self.release(dump, vcom_file, waveform_file);
        Ok(())
    }

    fn load_epson(&mut self, blob: &[u8]) -> EpdcResult {
        let waveform_file = StagedFile::create(&self.config.nvm_paths.epson_waveform, blob)?;

        let Some(nvm) = self.nvm.as_deref_mut() else {
            return Err(Error::MissingNvm);
        };
        let header = nvm
            .read_header()
            .map_err(|source| init_failed(InitStep::ReadHeader, source))?;
        log::debug!("NVM is programmable: {}", header.is_programmable);

        log::info!("Setting vcom from display NVM: {}", header.vcom_mv);
        self.apply_vcom(header.vcom_mv)?;

        self.resample_temperature()?;
        self.load_waveform(waveform_file.path())?;

        if self.config.retain_staged_files {
            waveform_file.persist();
        }
        Ok(())
    }

    fn release(&self, dump: StagedFile, vcom_file: StagedFile, waveform_file: StagedFile) {
        if self.config.retain_staged_files {
            dump.persist();
            vcom_file.persist();
            waveform_file.persist();
        }
    }
}

fn init_failed(step: InitStep, source: DriverError) -> Error {
    log::error!("{} failed: {}", step.name(), source);
    Error::Init { step, source }
}

impl core::fmt::Debug for Epdc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Epdc")
            .field("hv", &self.hv)
            .field("nvm", &self.nvm.as_ref().map(|nvm| nvm.format()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
