//! Recording mocks shared by the unit tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::controller::Controller;
use crate::error::{DriverError, DriverResult, Error};
use crate::hv::{HvDriver, VcomConfig, VcomDriver, VcomSwitch};
use crate::nvm::{Nvm, NvmFormat, NvmHeader};
use crate::register::{RegSetting, masked_value};
use crate::staging::{NvmPaths, Unpacker};
use crate::update::{Area, TempMode, UpdateMode};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Call {
    ControllerInit(bool),
    UpdateTemp,
    ConfigureUpdate(u8, UpdateMode, Option<Area>),
    TriggerUpdate,
    WaitUpdateEnd,
    ClearUpdate,
    Fill(Option<Area>, u8),
    LoadWflib(PathBuf),
    ReadRegister(u16),
    WriteRegister(u16, u32),
    SendCmd(u16),
    HvDriverInit,
    HvDriverOn,
    HvDriverOff,
    VcomDriverInit,
    VcomDriverOn,
    VcomDriverOff,
    VcomSwitchInit,
    VcomSwitchClose,
    VcomSwitchOpen,
    VcomConfigInit,
    SetVcom(i32),
    ReadWfdata,
    ReadHeader,
    Unpack(PathBuf),
}

impl Call {
    /// Variant without payload, used to match failure injections
    fn kind(&self) -> Self {
        match self {
            Self::ControllerInit(_) => Self::ControllerInit(false),
            Self::ConfigureUpdate(..) => Self::ConfigureUpdate(0, UpdateMode::Full, None),
            Self::Fill(..) => Self::Fill(None, 0),
            Self::LoadWflib(_) => Self::LoadWflib(PathBuf::new()),
            Self::ReadRegister(_) => Self::ReadRegister(0),
            Self::WriteRegister(..) => Self::WriteRegister(0, 0),
            Self::SendCmd(_) => Self::SendCmd(0),
            Self::SetVcom(_) => Self::SetVcom(0),
            Self::Unpack(_) => Self::Unpack(PathBuf::new()),
            other => other.clone(),
        }
    }
}

#[derive(Default)]
struct LogState {
    calls: Vec<Call>,
    failing: HashSet<Call>,
}

/// Ordered record of every driver call across all mocks
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<LogState>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Make every call of this kind report `DriverError::Status(-1)`
    pub fn fail(&self, call: Call) {
        self.0.borrow_mut().failing.insert(call.kind());
    }

    fn record(&self, call: Call) -> DriverResult {
        let mut state = self.0.borrow_mut();
        let failing = state.failing.contains(&call.kind());
        state.calls.push(call);
        if failing {
            Err(DriverError::Status(-1))
        } else {
            Ok(())
        }
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.borrow().calls.iter().filter(|c| *c == call).count()
    }
}

pub struct MockController {
    log: CallLog,
    pub temp_mode: TempMode,
    pub waveform_path: PathBuf,
    pub temperature_update: bool,
    pub clear_update: bool,
    pub registers: HashMap<u16, u16>,
    /// Contents of every waveform file at the time it was loaded
    pub loaded: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl MockController {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            temp_mode: TempMode::Internal,
            waveform_path: PathBuf::from("/boot/uboot/waveform.bin"),
            temperature_update: true,
            clear_update: false,
            registers: HashMap::new(),
            loaded: Rc::default(),
        }
    }
}

impl Controller for MockController {
    fn init(&mut self, load_nvm_content: bool) -> DriverResult {
        self.log.record(Call::ControllerInit(load_nvm_content))
    }

    fn temperature_mode(&self) -> TempMode {
        self.temp_mode
    }

    fn waveform_path(&self) -> &Path {
        &self.waveform_path
    }

    fn has_temperature_update(&self) -> bool {
        self.temperature_update
    }

    fn update_temp(&mut self) -> DriverResult {
        self.log.record(Call::UpdateTemp)
    }

    fn configure_update(
        &mut self,
        wf_id: u8,
        mode: UpdateMode,
        area: Option<&Area>,
    ) -> DriverResult {
        self.log
            .record(Call::ConfigureUpdate(wf_id, mode, area.copied()))
    }

    fn trigger_update(&mut self) -> DriverResult {
        self.log.record(Call::TriggerUpdate)
    }

    fn wait_update_end(&mut self) -> DriverResult {
        self.log.record(Call::WaitUpdateEnd)
    }

    fn has_clear_update(&self) -> bool {
        self.clear_update
    }

    fn clear_update(&mut self) -> DriverResult {
        self.log.record(Call::ClearUpdate)
    }

    fn fill(&mut self, area: Option<&Area>, value: u8) -> DriverResult {
        self.log.record(Call::Fill(area.copied(), value))
    }

    fn load_wflib(&mut self, path: &Path) -> DriverResult {
        self.log.record(Call::LoadWflib(path.to_path_buf()))?;
        if let Ok(contents) = std::fs::read(path) {
            self.loaded.borrow_mut().push(contents);
        }
        Ok(())
    }

    fn read_register(&mut self, setting: &mut RegSetting) -> DriverResult {
        self.log.record(Call::ReadRegister(setting.addr))?;
        for (offset, word) in (0u16..).zip(setting.data.iter_mut()) {
            let addr = setting.addr.wrapping_add(offset * 2);
            *word = self.registers.get(&addr).copied().unwrap_or_default();
        }
        Ok(())
    }

    fn write_register(&mut self, setting: &RegSetting, bitmask: u32) -> DriverResult {
        self.log
            .record(Call::WriteRegister(setting.addr, bitmask))?;
        for (offset, word) in (0u16..).zip(setting.data.iter()) {
            let addr = setting.addr.wrapping_add(offset * 2);
            let old = self.registers.get(&addr).copied().unwrap_or_default();
            self.registers.insert(addr, masked_value(old, *word, bitmask));
        }
        Ok(())
    }

    fn send_cmd(&mut self, setting: &RegSetting) -> DriverResult {
        self.log.record(Call::SendCmd(setting.addr))
    }
}

pub struct MockHvDriver(CallLog);

impl MockHvDriver {
    pub fn new(log: &CallLog) -> Self {
        Self(log.clone())
    }
}

impl HvDriver for MockHvDriver {
    fn init(&mut self) -> DriverResult {
        self.0.record(Call::HvDriverInit)
    }
    fn switch_on(&mut self) -> DriverResult {
        self.0.record(Call::HvDriverOn)
    }
    fn switch_off(&mut self) -> DriverResult {
        self.0.record(Call::HvDriverOff)
    }
}

pub struct MockVcomDriver(CallLog);

impl MockVcomDriver {
    pub fn new(log: &CallLog) -> Self {
        Self(log.clone())
    }
}

impl VcomDriver for MockVcomDriver {
    fn init(&mut self) -> DriverResult {
        self.0.record(Call::VcomDriverInit)
    }
    fn switch_on(&mut self) -> DriverResult {
        self.0.record(Call::VcomDriverOn)
    }
    fn switch_off(&mut self) -> DriverResult {
        self.0.record(Call::VcomDriverOff)
    }
}

pub struct MockVcomSwitch {
    log: CallLog,
    bypass: bool,
}

impl MockVcomSwitch {
    pub fn new(log: &CallLog, bypass: bool) -> Self {
        Self {
            log: log.clone(),
            bypass,
        }
    }
}

impl VcomSwitch for MockVcomSwitch {
    fn init(&mut self) -> DriverResult {
        self.log.record(Call::VcomSwitchInit)
    }
    fn close(&mut self) -> DriverResult {
        self.log.record(Call::VcomSwitchClose)
    }
    fn open(&mut self) -> DriverResult {
        self.log.record(Call::VcomSwitchOpen)
    }
    fn is_bypass(&self) -> bool {
        self.bypass
    }
}

pub struct MockVcomConfig(CallLog);

impl MockVcomConfig {
    pub fn new(log: &CallLog) -> Self {
        Self(log.clone())
    }
}

impl VcomConfig for MockVcomConfig {
    fn init(&mut self) -> DriverResult {
        self.0.record(Call::VcomConfigInit)
    }
    fn set_vcom(&mut self, millivolts: i32) -> DriverResult {
        self.0.record(Call::SetVcom(millivolts))
    }
}

pub struct MockNvm {
    log: CallLog,
    format: NvmFormat,
    blob: Vec<u8>,
    header: NvmHeader,
}

impl MockNvm {
    pub fn new(log: &CallLog, format: NvmFormat, blob: &[u8]) -> Self {
        Self {
            log: log.clone(),
            format,
            blob: blob.to_vec(),
            header: NvmHeader::default(),
        }
    }

    pub fn with_header(mut self, header: NvmHeader) -> Self {
        self.header = header;
        self
    }
}

impl Nvm for MockNvm {
    fn format(&self) -> NvmFormat {
        self.format
    }

    fn read_wfdata(&mut self) -> DriverResult<Vec<u8>> {
        self.log.record(Call::ReadWfdata)?;
        Ok(self.blob.clone())
    }

    fn read_header(&mut self) -> DriverResult<NvmHeader> {
        self.log.record(Call::ReadHeader)?;
        Ok(self.header)
    }
}

/// Stands in for the external S040 unpacker: writes the VCOM and waveform files
pub struct MockUnpacker {
    log: CallLog,
    vcom_contents: String,
    /// Contents of the dump at the time it was unpacked
    pub seen_dump: Rc<RefCell<Option<Vec<u8>>>>,
}

impl MockUnpacker {
    pub fn new(log: &CallLog, vcom: &str) -> Self {
        Self {
            log: log.clone(),
            vcom_contents: vcom.to_owned(),
            seen_dump: Rc::default(),
        }
    }
}

impl Unpacker for MockUnpacker {
    fn unpack(&mut self, paths: &NvmPaths) -> Result<(), Error> {
        let dump = &paths.s040_dump;
        if self.log.record(Call::Unpack(dump.clone())).is_err() {
            return Err(Error::UnpackFailed { status: Some(1) });
        }
        let io = |source: std::io::Error| Error::Io {
            path: dump.clone(),
            source,
        };
        let contents = std::fs::read(dump).map_err(io)?;
        *self.seen_dump.borrow_mut() = Some(contents);
        std::fs::write(&paths.s040_vcom, &self.vcom_contents).map_err(io)?;
        std::fs::write(&paths.s040_waveform, b"unpacked-waveform").map_err(io)?;
        Ok(())
    }
}
