//! High-voltage subsystem and rail sequencing
//!
//! [`Hv`] groups the parts that energize the panel:
//!
//! - an HV driver producing the source/gate rails ([`HvDriver`])
//! - a VCOM driver producing the common voltage ([`VcomDriver`])
//! - a switch connecting VCOM to the panel ([`VcomSwitch`])
//! - the VCOM level configuration ([`VcomConfig`])
//!
//! Every part is optional. An absent part is skipped by the sequences.
//!
//! ## Rail ordering
//!
//! VCOM must not reach the panel before both rails are stable and must be
//! disconnected before either rail collapses:
//!
//! ```text
//! on:  HV driver on  -> VCOM driver on  -> VCOM switch close
//! off: VCOM switch open -> VCOM driver off -> HV driver off
//! ```
//!
//! A switch marked as bypass has no actuator and is never closed or opened.

use crate::error::DriverResult;
use crate::sequence::{SequenceReport, Step};

/// Driver for the HV source/gate rails
pub trait HvDriver {
    /// One-time initialization
    fn init(&mut self) -> DriverResult {
        Ok(())
    }
    /// Energize the rails
    fn switch_on(&mut self) -> DriverResult;
    /// De-energize the rails
    fn switch_off(&mut self) -> DriverResult;
}

/// Driver for the VCOM rail
pub trait VcomDriver {
    /// One-time initialization
    fn init(&mut self) -> DriverResult {
        Ok(())
    }
    /// Energize VCOM
    fn switch_on(&mut self) -> DriverResult;
    /// De-energize VCOM
    fn switch_off(&mut self) -> DriverResult;
}

/// Switch between the VCOM rail and the panel
pub trait VcomSwitch {
    /// One-time initialization
    fn init(&mut self) -> DriverResult {
        Ok(())
    }
    /// Connect VCOM to the panel
    fn close(&mut self) -> DriverResult;
    /// Disconnect VCOM from the panel
    fn open(&mut self) -> DriverResult;
    /// True if VCOM is hard-wired to the panel and there is nothing to actuate
    fn is_bypass(&self) -> bool {
        false
    }
}

/// VCOM level configuration (DAC, PMIC register, ...)
pub trait VcomConfig {
    /// One-time initialization
    fn init(&mut self) -> DriverResult {
        Ok(())
    }
    /// Program the VCOM level in millivolts
    fn set_vcom(&mut self, millivolts: i32) -> DriverResult;
}

/// The HV subsystem
#[derive(Default)]
pub struct Hv {
    hv_driver: Option<Box<dyn HvDriver>>,
    vcom_driver: Option<Box<dyn VcomDriver>>,
    vcom_switch: Option<Box<dyn VcomSwitch>>,
    vcom_config: Option<Box<dyn VcomConfig>>,
}

impl Hv {
    /// Create an HV subsystem with no parts
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the HV driver
    #[must_use]
    pub fn with_hv_driver(mut self, driver: impl HvDriver + 'static) -> Self {
        self.hv_driver = Some(Box::new(driver));
        self
    }

    /// Attach the VCOM driver
    #[must_use]
    pub fn with_vcom_driver(mut self, driver: impl VcomDriver + 'static) -> Self {
        self.vcom_driver = Some(Box::new(driver));
        self
    }

    /// Attach the VCOM switch
    #[must_use]
    pub fn with_vcom_switch(mut self, switch: impl VcomSwitch + 'static) -> Self {
        self.vcom_switch = Some(Box::new(switch));
        self
    }

    /// Attach the VCOM configuration
    #[must_use]
    pub fn with_vcom_config(mut self, config: impl VcomConfig + 'static) -> Self {
        self.vcom_config = Some(Box::new(config));
        self
    }

    /// True if a VCOM configuration is attached
    pub fn has_vcom_config(&self) -> bool {
        self.vcom_config.is_some()
    }

    /// Mutable access to the VCOM configuration
    pub fn vcom_config_mut(&mut self) -> Option<&mut (dyn VcomConfig + 'static)> {
        self.vcom_config.as_deref_mut()
    }

    /// Initialize every attached part, stopping at the first failure
    pub fn init(&mut self) -> DriverResult {
        if let Some(config) = self.vcom_config.as_deref_mut() {
            config.init()?;
        }
        if let Some(driver) = self.hv_driver.as_deref_mut() {
            driver.init()?;
        }
        if let Some(driver) = self.vcom_driver.as_deref_mut() {
            driver.init()?;
        }
        if let Some(switch) = self.vcom_switch.as_deref_mut() {
            switch.init()?;
        }
        Ok(())
    }

    /// Switch the rails on: HV driver, VCOM driver, then VCOM switch
    pub fn switch_on(&mut self) -> SequenceReport {
        let mut report = SequenceReport::new();

        if let Some(driver) = self.hv_driver.as_deref_mut() {
            report.record(Step::HvDriverOn, driver.switch_on());
        }
        if let Some(driver) = self.vcom_driver.as_deref_mut() {
            report.record(Step::VcomDriverOn, driver.switch_on());
        }
        if let Some(switch) = self.vcom_switch.as_deref_mut() {
            if !switch.is_bypass() {
                report.record(Step::VcomSwitchClose, switch.close());
            }
        }

        report
    }

    /// Switch the rails off in exact reverse order of [`Hv::switch_on`]
    pub fn switch_off(&mut self) -> SequenceReport {
        let mut report = SequenceReport::new();

        if let Some(switch) = self.vcom_switch.as_deref_mut() {
            if !switch.is_bypass() {
                report.record(Step::VcomSwitchOpen, switch.open());
            }
        }
        if let Some(driver) = self.vcom_driver.as_deref_mut() {
            report.record(Step::VcomDriverOff, driver.switch_off());
        }
        if let Some(driver) = self.hv_driver.as_deref_mut() {
            report.record(Step::HvDriverOff, driver.switch_off());
        }

        report
    }
}

impl core::fmt::Debug for Hv {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hv")
            .field("hv_driver", &self.hv_driver.is_some())
            .field("vcom_driver", &self.vcom_driver.is_some())
            .field("vcom_switch", &self.vcom_switch.is_some())
            .field("vcom_config", &self.vcom_config.is_some())
            .finish()
    }
}
