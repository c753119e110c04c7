//! Per-step outcomes of best-effort sequences
//!
//! The update, clear and HV rail sequences never stop at the first failing
//! step. Every invoked step is recorded in a [`SequenceReport`] together with
//! its result, and the report collapses to a single pass/fail only at the
//! public API boundary.

use crate::error::{DriverError, DriverResult, Error};

/// A single step of an update, clear or HV rail sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Temperature resample
    UpdateTemp,
    /// Controller update configuration
    ConfigureUpdate,
    /// HV driver switched on
    HvDriverOn,
    /// VCOM driver switched on
    VcomDriverOn,
    /// VCOM switch closed
    VcomSwitchClose,
    /// Update triggered
    TriggerUpdate,
    /// Waiting for update completion
    WaitUpdateEnd,
    /// VCOM switch opened
    VcomSwitchOpen,
    /// VCOM driver switched off
    VcomDriverOff,
    /// HV driver switched off
    HvDriverOff,
    /// Panel fill
    Fill,
    /// Clear update
    ClearUpdate,
}

impl Step {
    /// Short human readable name of the step
    pub const fn name(self) -> &'static str {
        match self {
            Self::UpdateTemp => "update_temp",
            Self::ConfigureUpdate => "configure_update",
            Self::HvDriverOn => "hv_driver_on",
            Self::VcomDriverOn => "vcom_driver_on",
            Self::VcomSwitchClose => "vcom_switch_close",
            Self::TriggerUpdate => "trigger_update",
            Self::WaitUpdateEnd => "wait_update_end",
            Self::VcomSwitchOpen => "vcom_switch_open",
            Self::VcomDriverOff => "vcom_driver_off",
            Self::HvDriverOff => "hv_driver_off",
            Self::Fill => "fill",
            Self::ClearUpdate => "clear_update",
        }
    }
}

/// Outcome of one invoked step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step
    pub step: Step,
    /// Its driver result
    pub result: DriverResult,
}

/// Ordered record of every step a sequence invoked
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceReport {
    outcomes: Vec<StepOutcome>,
}

impl SequenceReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a step
    pub fn record(&mut self, step: Step, result: DriverResult) {
        if let Err(e) = result {
            log::debug!("step {} failed: {}", step.name(), e);
        }
        self.outcomes.push(StepOutcome { step, result });
    }

    /// Append all outcomes of another report
    pub fn extend(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    /// True if no recorded step failed
    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// All recorded outcomes in invocation order
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Invoked steps in order
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.outcomes.iter().map(|outcome| outcome.step)
    }

    /// Steps that failed, with their driver error
    pub fn failures(&self) -> impl Iterator<Item = (Step, DriverError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.err().map(|e| (outcome.step, e)))
    }

    /// Collapse into a single pass/fail
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Sequence(self))
        }
    }
}

impl core::fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut failures = self.failures().peekable();
        if failures.peek().is_none() {
            return write!(f, "sequence completed");
        }
        write!(f, "sequence failed:")?;
        for (step, err) in failures {
            write!(f, " {} ({err})", step.name())?;
        }
        Ok(())
    }
}
