//! Hardware bindings for the driver seams
//!
//! Maps RP2040 peripherals onto the abstractions the core and drivers
//! speak: PWM slices become [`PwmOutput`]/[`SetDutyCycle`] channels, and
//! the ADC becomes an [`AdcReader`].

use core::convert::Infallible;

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use ramrod_core::traits::{PwmOutput, SwitchOutput};
use ramrod_drivers::battery::AdcReader;

/// Which compare register of a PWM slice the bound pin uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelHalf {
    A,
    B,
}

/// One PWM slice output driven through its compare register
///
/// Keeps a shadow of the slice config so each write only has to touch
/// the relevant compare value.
pub struct SlicePwm {
    pwm: Pwm<'static>,
    config: PwmConfig,
    half: ChannelHalf,
}

impl SlicePwm {
    pub fn new(pwm: Pwm<'static>, config: PwmConfig, half: ChannelHalf) -> Self {
        Self { pwm, config, half }
    }

    fn set_compare(&mut self, value: u16) {
        match self.half {
            ChannelHalf::A => self.config.compare_a = value,
            ChannelHalf::B => self.config.compare_b = value,
        }
        self.pwm.set_config(&self.config);
    }
}

impl SwitchOutput for SlicePwm {
    fn set_active(&mut self) {
        // Compare above top holds the output high with no switching.
        let full = self.config.top.saturating_add(1);
        self.set_compare(full);
    }

    fn set_inactive(&mut self) {
        self.set_compare(0);
    }
}

impl PwmOutput for SlicePwm {
    fn set_duty_percent(&mut self, percent: u8) {
        let compare = u32::from(percent.min(100)) * u32::from(self.config.top) / 100;
        self.set_compare(compare as u16);
    }
}

impl ErrorType for SlicePwm {
    type Error = Infallible;
}

impl SetDutyCycle for SlicePwm {
    fn max_duty_cycle(&self) -> u16 {
        self.config.top
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.set_compare(duty);
        Ok(())
    }
}

/// Blocking ADC read of the battery sense channel
pub struct BatterySense {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl BatterySense {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for BatterySense {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}
