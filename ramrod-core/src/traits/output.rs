//! Actuator output abstractions
//!
//! Provides traits for the two half-bridge gate drives: a plain on/off
//! switch (the high-side brake FET driver) and a duty-cycle capable
//! output (the low-side run FET). Implementations handle the actual
//! register or pin manipulation for the specific chip, including any
//! polarity inversion.

/// Binary actuator output
///
/// "Active" is the logical drive level; an active-low gate driver is the
/// implementation's concern, not the caller's.
pub trait SwitchOutput {
    /// Drive the output to its active level
    fn set_active(&mut self);

    /// Drive the output to its inactive level
    fn set_inactive(&mut self);

    /// Set the output to a specific logical state
    fn set_state(&mut self, active: bool) {
        if active {
            self.set_active();
        } else {
            self.set_inactive();
        }
    }
}

/// Duty-cycle capable actuator output
///
/// `set_active`/`set_inactive` pin the output fully on or off with no
/// modulation; `set_duty_percent` engages PWM in between. The mapping
/// from percent to the hardware's compare-register resolution belongs
/// to the implementation.
pub trait PwmOutput: SwitchOutput {
    /// Modulate the output at the given duty cycle
    ///
    /// Values above 100 are treated as 100.
    fn set_duty_percent(&mut self, percent: u8);
}
