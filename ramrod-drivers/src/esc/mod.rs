//! Brushless ESC throttle driver
//!
//! Hobby ESCs expect a servo-style pulse train: 1000 µs is zero
//! throttle, 2000 µs full, repeated every 20 ms. This driver maps pulse
//! widths (and a 0-100% throttle convenience scale) onto whatever duty
//! resolution the underlying PWM channel reports, so the same code runs
//! on any `embedded_hal::pwm::SetDutyCycle` peripheral.

use embedded_hal::pwm::SetDutyCycle;

/// Pulse-train shape for one ESC
#[derive(Debug, Clone, Copy)]
pub struct EscConfig {
    /// Zero-throttle pulse width (µs)
    pub min_pulse_us: u16,
    /// Full-throttle pulse width (µs)
    pub max_pulse_us: u16,
    /// Frame period (µs)
    pub period_us: u16,
}

impl Default for EscConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 1_000,
            max_pulse_us: 2_000,
            period_us: 20_000,
        }
    }
}

/// ESC throttle output over a PWM channel
///
/// The channel must be configured so one full duty cycle spans
/// `period_us`; the driver only scales pulse widths onto it.
pub struct Esc<P> {
    pwm: P,
    config: EscConfig,
    pulse_us: u16,
}

impl<P: SetDutyCycle> Esc<P> {
    /// Wrap a PWM channel; no pulse is emitted until [`arm`](Self::arm)
    pub fn new(pwm: P, config: EscConfig) -> Self {
        let pulse_us = config.min_pulse_us;
        Self {
            pwm,
            config,
            pulse_us,
        }
    }

    /// Park the output at zero throttle
    ///
    /// ESCs refuse to start until they have seen a sustained minimum
    /// pulse; call this once at startup and hold it through the ESC's
    /// arming beep.
    pub fn arm(&mut self) -> Result<(), P::Error> {
        self.set_pulse_us(self.config.min_pulse_us)
    }

    /// Command a raw pulse width, clamped to the configured range
    pub fn set_pulse_us(&mut self, us: u16) -> Result<(), P::Error> {
        let us = us.clamp(self.config.min_pulse_us, self.config.max_pulse_us);
        self.pulse_us = us;

        let max_duty = u32::from(self.pwm.max_duty_cycle());
        let duty = u32::from(us) * max_duty / u32::from(self.config.period_us);
        self.pwm.set_duty_cycle(duty as u16)
    }

    /// Command a throttle as a percentage of the pulse range
    pub fn set_throttle_percent(&mut self, percent: u8) -> Result<(), P::Error> {
        let percent = u32::from(percent.min(100));
        let span = u32::from(self.config.max_pulse_us - self.config.min_pulse_us);
        let us = u32::from(self.config.min_pulse_us) + span * percent / 100;
        self.set_pulse_us(us as u16)
    }

    /// Last commanded pulse width (µs)
    pub fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    /// Borrow the underlying channel for readback
    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
