//! embedded-hal adapters for the bridge output traits
//!
//! The core state machine speaks [`SwitchOutput`]/[`PwmOutput`]; these
//! wrappers map that contract onto any `embedded-hal` 1.0 digital pin or
//! PWM channel. Polarity inversion for active-low gate drivers lives
//! here, so the core never has to reason about it.
//!
//! Bridge gate drives must be wired to channels whose writes cannot fail;
//! errors reported by the underlying peripheral are discarded rather than
//! allowed to stall the state machine mid-commutation.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use ramrod_core::traits::{PwmOutput, SwitchOutput};

/// A digital pin as a binary actuator output
pub struct GpioSwitch<P> {
    pin: P,
    inverted: bool,
}

impl<P: OutputPin> GpioSwitch<P> {
    /// Wrap an active-high pin
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Wrap an active-low pin
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }

    /// Hand the pin back
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> SwitchOutput for GpioSwitch<P> {
    fn set_active(&mut self) {
        let _ = if self.inverted {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
    }

    fn set_inactive(&mut self) {
        let _ = if self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

/// A PWM channel as a duty-cycle capable actuator output
///
/// 0% and 100% pin the channel fully off/on with no modulation; anything
/// in between is scaled onto the channel's own duty resolution.
pub struct PwmDrive<P> {
    pwm: P,
}

impl<P: SetDutyCycle> PwmDrive<P> {
    /// Wrap a PWM channel
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Hand the channel back
    pub fn free(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> SwitchOutput for PwmDrive<P> {
    fn set_active(&mut self) {
        let _ = self.pwm.set_duty_cycle_fully_on();
    }

    fn set_inactive(&mut self) {
        let _ = self.pwm.set_duty_cycle_fully_off();
    }
}

impl<P: SetDutyCycle> PwmOutput for PwmDrive<P> {
    fn set_duty_percent(&mut self, percent: u8) {
        let _ = self.pwm.set_duty_cycle_percent(percent.min(100));
    }
}
