//! Battery pack monitor
//!
//! Samples the pack voltage behind a resistor divider, averages a short
//! window of readings to ride out sags, and classifies the result:
//! cell count (2S/3S/4S), remaining charge percent, and a flat-pack
//! flag. Readings down near zero are treated as a bench supply or USB
//! debug rail rather than a flat pack.
//!
//! All accumulator state lives in instance fields, so several monitors
//! can coexist and tests can drive the sampling window deterministically.

use embedded_hal::delay::DelayNs;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read one raw ADC conversion
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Pack voltage thresholds in mV, (min, max) per cell count
const PACK_2S_MV: (u32, u32) = (6_500, 8_400);
const PACK_3S_MV: (u32, u32) = (9_500, 13_000);
const PACK_4S_MV: (u32, u32) = (13_100, 16_800);

/// Readings at or below this are a debug rail, not a flat pack
const DEBUG_RAIL_MV: u32 = 1_600;

/// Sample spacing for the blocking cell-count detect
const DETECT_SAMPLE_DELAY_MS: u32 = 10;

/// Battery monitor configuration
#[derive(Debug, Clone)]
pub struct BatteryConfig {
    /// ADC reference voltage in mV
    pub vref_mv: u32,
    /// ADC full-scale divisor (1024 for a 10-bit converter)
    pub adc_full_scale: u32,
    /// Divider resistor from pack to sense node, in ohms
    pub divider_high_ohms: u32,
    /// Divider resistor from sense node to ground, in ohms
    pub divider_low_ohms: u32,
    /// Constant correction for resistor tolerance and trace resistance
    pub cal_offset_mv: i32,
    /// Minimum spacing between accepted samples (ms)
    pub check_interval_ms: u32,
    /// Samples averaged per voltage calculation
    pub sample_count: u8,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            vref_mv: 5_000,
            adc_full_scale: 1024,
            divider_high_ohms: 47_000,
            divider_low_ohms: 10_000,
            cal_offset_mv: 0,
            check_interval_ms: 500,
            sample_count: 6,
        }
    }
}

/// Moving-average pack voltage monitor
pub struct BatteryMonitor<ADC> {
    adc: ADC,
    config: BatteryConfig,
    last_check_ms: u32,
    collected: u8,
    accum: u32,
    voltage_mv: Option<u32>,
    percent: u8,
    flat: bool,
    cells: u8,
    min_mv: u32,
    max_mv: u32,
}

impl<ADC: AdcReader> BatteryMonitor<ADC> {
    /// Create a monitor, assuming a 3S pack until told otherwise
    pub fn new(adc: ADC, config: BatteryConfig) -> Self {
        let mut monitor = Self {
            adc,
            config,
            last_check_ms: 0,
            collected: 0,
            accum: 0,
            voltage_mv: None,
            percent: 100,
            flat: false,
            cells: 3,
            min_mv: PACK_3S_MV.0,
            max_mv: PACK_3S_MV.1,
        };
        monitor.set_cells(3);
        monitor
    }

    /// Select the pack cell count manually
    ///
    /// Anything other than 3 or 4 is treated as a 2S pack.
    pub fn set_cells(&mut self, cells: u8) {
        let (cells, (min_mv, max_mv)) = match cells {
            4 => (4, PACK_4S_MV),
            3 => (3, PACK_3S_MV),
            _ => (2, PACK_2S_MV),
        };
        self.cells = cells;
        self.min_mv = min_mv;
        self.max_mv = max_mv;
    }

    /// Auto-detect the cell count from the resting pack voltage
    ///
    /// Blocking: samples are spaced real milliseconds apart. Startup code
    /// only; never call this while drive is active.
    pub fn detect_cells<D: DelayNs>(&mut self, delay: &mut D) {
        let mut collected: u32 = 0;
        let mut accum: u32 = 0;

        for _ in 0..self.config.sample_count {
            if let Ok(raw) = self.adc.read() {
                collected += 1;
                accum += u32::from(raw);
            }
            delay.delay_ms(DETECT_SAMPLE_DELAY_MS);
        }

        if collected == 0 {
            // Dead ADC; keep whatever was selected manually.
            return;
        }

        let pack_mv = self.pack_mv(accum / collected);
        self.voltage_mv = Some(pack_mv);

        let cells = if pack_mv < PACK_4S_MV.0 {
            if pack_mv < PACK_3S_MV.0 {
                2
            } else {
                3
            }
        } else {
            4
        };
        self.set_cells(cells);
        self.classify(pack_mv);
    }

    /// Advance the monitor; call at regular intervals
    ///
    /// Rate-limits itself to `check_interval_ms`, accumulates one raw
    /// sample per accepted call, and refreshes voltage, percent, and the
    /// flat flag once the averaging window is full. Non-blocking.
    pub fn poll(&mut self, now_ms: u32) {
        if now_ms.wrapping_sub(self.last_check_ms) < self.config.check_interval_ms {
            return;
        }
        self.last_check_ms = now_ms;

        let Ok(raw) = self.adc.read() else {
            // Dropped conversion; the window just takes longer to fill.
            return;
        };

        self.collected += 1;
        self.accum += u32::from(raw);

        if self.collected < self.config.sample_count {
            return;
        }

        let pack_mv = self.pack_mv(self.accum / u32::from(self.collected));
        self.collected = 0;
        self.accum = 0;

        self.voltage_mv = Some(pack_mv);
        self.classify(pack_mv);
    }

    /// Measured pack voltage in mV; `None` until the first full window
    pub fn voltage_mv(&self) -> Option<u32> {
        self.voltage_mv
    }

    /// Remaining charge estimate, 1-100
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Whether the pack is below its minimum under load
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Selected or detected cell count
    pub fn cells(&self) -> u8 {
        self.cells
    }

    /// Convert an averaged raw reading to pack mV through the divider
    fn pack_mv(&self, avg_raw: u32) -> u32 {
        let sense_mv = avg_raw * self.config.vref_mv / self.config.adc_full_scale;
        let ratio_num = self.config.divider_high_ohms + self.config.divider_low_ohms;
        let pack_mv = sense_mv * ratio_num / self.config.divider_low_ohms;
        pack_mv.saturating_add_signed(self.config.cal_offset_mv)
    }

    fn classify(&mut self, pack_mv: u32) {
        self.flat = pack_mv < self.min_mv && pack_mv > DEBUG_RAIL_MV;

        self.percent = if pack_mv <= self.min_mv {
            1
        } else {
            let span = self.max_mv - self.min_mv;
            let above = pack_mv - self.min_mv;
            let percent = 1 + above * 99 / span;
            percent.min(100) as u8
        };
    }
}
