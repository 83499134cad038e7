//! Hardware configuration types
//!
//! These types describe how a board's pins map onto the bridge and its
//! peripherals. The firmware validates a [`BoardConfig`] before binding
//! any real pins; an invalid or colliding assignment is refused up front
//! rather than discovered as a misbehaving power stage.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{ConfigError, MAX_LABEL_LEN};

/// Highest usable GPIO number (0-29 for RP2040)
pub const MAX_PIN: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    fn check_range(&self) -> Result<(), ConfigError> {
        if self.pin > MAX_PIN {
            return Err(ConfigError::InvalidPin(self.pin));
        }
        Ok(())
    }
}

/// Pin assignment for one half-bridge
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeHwConfig {
    /// Bridge name (e.g., "pusher")
    pub name: String<MAX_LABEL_LEN>,
    /// Gate drive for the low-side run FET (PWM capable)
    pub run_pin: PinConfig,
    /// Gate drive for the high-side brake FET driver
    pub brake_pin: PinConfig,
}

impl BridgeHwConfig {
    /// Create a named bridge pin assignment
    ///
    /// Names longer than [`MAX_LABEL_LEN`] are replaced with an empty label.
    pub fn new(name: &str, run_pin: PinConfig, brake_pin: PinConfig) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            run_pin,
            brake_pin,
        }
    }

    /// Check both gate-drive pins for validity
    ///
    /// A shared pin would make the dead-time guarantee meaningless, so a
    /// collision is a configuration error, not a wiring quirk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run_pin.check_range()?;
        self.brake_pin.check_range()?;

        if self.run_pin.pin == self.brake_pin.pin {
            return Err(ConfigError::PinConflict(self.run_pin.pin));
        }

        Ok(())
    }
}

/// Full pin map for one board
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// The pusher bridge
    pub bridge: BridgeHwConfig,
    /// Battery sense input (ADC capable), if fitted
    pub battery_pin: Option<PinConfig>,
    /// Flywheel ESC signal output, if fitted
    pub esc_pin: Option<PinConfig>,
    /// Trigger input, if fitted
    pub trigger_pin: Option<PinConfig>,
    /// Pusher cycle switch input, if fitted
    pub cycle_pin: Option<PinConfig>,
}

impl BoardConfig {
    /// Validate the whole pin map, including cross-assignments
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bridge.validate()?;

        let optional = [
            self.battery_pin,
            self.esc_pin,
            self.trigger_pin,
            self.cycle_pin,
        ];
        for pin in optional.iter().flatten() {
            pin.check_range()?;
        }

        let pins = [
            Some(self.bridge.run_pin.pin),
            Some(self.bridge.brake_pin.pin),
            self.battery_pin.map(|p| p.pin),
            self.esc_pin.map(|p| p.pin),
            self.trigger_pin.map(|p| p.pin),
            self.cycle_pin.map(|p| p.pin),
        ];
        for i in 0..pins.len() {
            for j in (i + 1)..pins.len() {
                if let (Some(a), Some(b)) = (pins[i], pins[j]) {
                    if a == b {
                        return Err(ConfigError::PinConflict(a));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bridge_pins() {
        let config = BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(15));
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.name.as_str(), "pusher");
    }

    #[test]
    fn test_pin_out_of_range() {
        let config = BridgeHwConfig::new("pusher", PinConfig::new(30), PinConfig::new(15));
        assert_eq!(config.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_shared_gate_pin_rejected() {
        let config = BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(5));
        assert_eq!(config.validate(), Err(ConfigError::PinConflict(5)));
    }

    #[test]
    fn test_board_cross_conflicts() {
        let board = BoardConfig {
            bridge: BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(15)),
            battery_pin: Some(PinConfig::new(26)),
            esc_pin: Some(PinConfig::new(5)),
            ..BoardConfig::default()
        };
        assert_eq!(board.validate(), Err(ConfigError::PinConflict(5)));

        let board = BoardConfig {
            bridge: BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(15)),
            battery_pin: Some(PinConfig::new(26)),
            esc_pin: Some(PinConfig::new(9)),
            trigger_pin: Some(PinConfig::with_pullup(14)),
            cycle_pin: Some(PinConfig::with_pullup(16)),
        };
        assert_eq!(board.validate(), Ok(()));

        // Two optional inputs sharing a pin is still a conflict.
        let board = BoardConfig {
            bridge: BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(15)),
            trigger_pin: Some(PinConfig::with_pullup(14)),
            cycle_pin: Some(PinConfig::with_pullup(14)),
            ..BoardConfig::default()
        };
        assert_eq!(board.validate(), Err(ConfigError::PinConflict(14)));
    }

    #[test]
    fn test_overlong_name_becomes_empty() {
        let config = BridgeHwConfig::new(
            "a-name-well-beyond-sixteen-chars",
            PinConfig::new(5),
            PinConfig::new(15),
        );
        assert!(config.name.is_empty());
    }
}
