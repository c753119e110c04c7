//! GPIO-backed HV parts
//!
//! Many boards switch the HV and VCOM rails with plain enable lines. This
//! module drives them through `embedded-hal` 1.0 traits:
//!
//! - [`GpioRail`] - an enable pin plus settle time, usable as [`HvDriver`] or
//!   [`VcomDriver`]
//! - [`GpioVcomSwitch`] - a pin actuating the VCOM switch
//! - [`BypassSwitch`] - VCOM hard-wired to the panel
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use pl_epdc::{GpioRail, GpioVcomSwitch, Hv};
//! # use core::convert::Infallible;
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! let mut vcom_rail = GpioRail::new(MockPin, MockDelay);
//! vcom_rail.set_settle_ms(5);
//!
//! let hv = Hv::new()
//!     .with_hv_driver(GpioRail::new(MockPin, MockDelay))
//!     .with_vcom_driver(vcom_rail)
//!     .with_vcom_switch(GpioVcomSwitch::new(MockPin));
//! # let _ = hv;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{DriverError, DriverResult};
use crate::hv::{HvDriver, VcomDriver, VcomSwitch};

/// Default settle time after a rail transition in milliseconds
pub const DEFAULT_SETTLE_MS: u32 = 10;

/// Drive `pin` to the level meaning `active` under the given polarity
fn drive<P: OutputPin>(pin: &mut P, active: bool, active_high: bool) -> DriverResult {
    let result = if active == active_high {
        pin.set_high()
    } else {
        pin.set_low()
    };
    result.map_err(|_| DriverError::Bus)
}

/// A rail switched by a single enable pin
///
/// Waits the settle time after each transition so the rail is stable before
/// the next step of the sequence runs.
pub struct GpioRail<P, D> {
    /// Enable pin
    pin: P,
    /// Delay used for settling
    delay: D,
    /// Settle time in milliseconds
    settle_ms: u32,
    /// Enable polarity (true = active high)
    active_high: bool,
}

impl<P, D> GpioRail<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create an active-high rail with the default settle time
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            settle_ms: DEFAULT_SETTLE_MS,
            active_high: true,
        }
    }

    /// Set the settle time in milliseconds (0 disables waiting)
    pub fn set_settle_ms(&mut self, settle_ms: u32) -> &mut Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Current settle time in milliseconds
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Set enable polarity
    pub fn set_active_high(&mut self, active_high: bool) -> &mut Self {
        self.active_high = active_high;
        self
    }

    /// Enable polarity (true = active high)
    pub fn active_high(&self) -> bool {
        self.active_high
    }

    /// Give back the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn set(&mut self, on: bool) -> DriverResult {
        drive(&mut self.pin, on, self.active_high)?;
        if self.settle_ms > 0 {
            self.delay.delay_ms(self.settle_ms);
        }
        Ok(())
    }
}

impl<P, D> HvDriver for GpioRail<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn init(&mut self) -> DriverResult {
        self.set(false)
    }

    fn switch_on(&mut self) -> DriverResult {
        self.set(true)
    }

    fn switch_off(&mut self) -> DriverResult {
        self.set(false)
    }
}

impl<P, D> VcomDriver for GpioRail<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn init(&mut self) -> DriverResult {
        self.set(false)
    }

    fn switch_on(&mut self) -> DriverResult {
        self.set(true)
    }

    fn switch_off(&mut self) -> DriverResult {
        self.set(false)
    }
}

/// VCOM switch actuated by one pin; the active level closes it
pub struct GpioVcomSwitch<P> {
    pin: P,
    active_high: bool,
}

impl<P: OutputPin> GpioVcomSwitch<P> {
    /// Create an active-high switch
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }

    /// Set switch polarity
    pub fn set_active_high(&mut self, active_high: bool) -> &mut Self {
        self.active_high = active_high;
        self
    }

    /// Give back the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> VcomSwitch for GpioVcomSwitch<P> {
    fn init(&mut self) -> DriverResult {
        drive(&mut self.pin, false, self.active_high)
    }

    fn close(&mut self) -> DriverResult {
        drive(&mut self.pin, true, self.active_high)
    }

    fn open(&mut self) -> DriverResult {
        drive(&mut self.pin, false, self.active_high)
    }
}

/// VCOM permanently connected to the panel
#[derive(Clone, Copy, Debug, Default)]
pub struct BypassSwitch;

impl VcomSwitch for BypassSwitch {
    fn close(&mut self) -> DriverResult {
        Ok(())
    }

    fn open(&mut self) -> DriverResult {
        Ok(())
    }

    fn is_bypass(&self) -> bool {
        true
    }
}
