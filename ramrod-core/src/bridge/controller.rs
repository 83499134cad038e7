//! Bridge controller state machine
//!
//! The controller owns the two gate outputs of one half-bridge and is
//! driven exclusively by a caller-invoked periodic [`process`] step. All
//! transitions are computed inside that step from elapsed time and
//! externally-set request flags; nothing here blocks or runs in the
//! background.
//!
//! Dead-time is enforced twice over: the timer-based transition window,
//! and the per-state guards that refuse to touch one FET until the
//! opposite one has been observed commanded off. Together they can add up
//! to two polling intervals of latency beyond the configured dead-time.
//! That margin is deliberate; do not collapse the guards.
//!
//! Timestamps are `u32` milliseconds from any monotonic source. Elapsed
//! times use wrapping subtraction, so the ~49.7 day wrap is handled.
//!
//! [`process`]: BridgeController::process

use crate::config::{BridgeTimings, ConfigError};
use crate::traits::{PwmOutput, SwitchOutput};

use super::BridgeState;

/// Controller for one half-bridge power stage
///
/// A program may instantiate several, one per physical bridge; instances
/// share nothing. `R` is the duty-cycle capable run output, `B` the
/// on/off brake output.
pub struct BridgeController<R, B> {
    run: R,
    brake: B,
    timings: BridgeTimings,
    state: BridgeState,
    /// Caller's standing request; observed on the next `process`
    requested_run: bool,
    /// Previous tick's request, for edge detection. Boots `true` so the
    /// first `process` always observes an edge and runs a fresh
    /// off-transition instead of trusting unknown prior hardware state.
    last_requested_run: bool,
    transition_started_ms: u32,
    transition_duration_ms: u32,
    speed_percent: u8,
    /// Last commanded level of the run output
    run_claimed: bool,
    /// Last commanded level of the brake output
    brake_claimed: bool,
    /// Last heartbeat or run-request stamp, for jam timing
    last_cycle_ms: u32,
    jam_latched: bool,
    anti_jam: bool,
}

impl<R, B> BridgeController<R, B>
where
    R: PwmOutput,
    B: SwitchOutput,
{
    /// Bind the two gate outputs
    ///
    /// Call [`init`](Self::init) before the first [`process`](Self::process).
    pub fn new(run: R, brake: B, timings: BridgeTimings) -> Self {
        Self {
            run,
            brake,
            timings,
            state: BridgeState::Transitioning,
            requested_run: false,
            last_requested_run: true,
            transition_started_ms: 0,
            transition_duration_ms: timings.off_transition_ms,
            speed_percent: 0,
            run_claimed: false,
            brake_claimed: false,
            last_cycle_ms: 0,
            jam_latched: false,
            anti_jam: true,
        }
    }

    /// Validate the timings and drive both outputs to their inactive level
    ///
    /// On `Err` the instance must not be processed; nothing has been
    /// energised.
    pub fn init(&mut self) -> Result<(), ConfigError> {
        self.timings.validate()?;
        self.force_outputs_inactive();
        Ok(())
    }

    /// Request drive; observed on the next `process`
    ///
    /// Also stamps the jam timer, so the timeout runs from the moment
    /// drive was requested rather than from the first real heartbeat.
    pub fn request_run(&mut self, now_ms: u32) {
        self.requested_run = true;
        self.last_cycle_ms = now_ms;
    }

    /// Request stop; observed on the next `process`
    ///
    /// Always safe to call. The brake engages only after the off dead-time
    /// has elapsed; there is deliberately no path that bypasses it.
    pub fn request_stop(&mut self) {
        self.requested_run = false;
    }

    /// Record one completed mechanism cycle, resetting the jam timeout
    pub fn heartbeat(&mut self, now_ms: u32) {
        self.last_cycle_ms = now_ms;
    }

    /// Set the drive duty-cycle target, 0-100
    ///
    /// Values above 100 are clamped. Consumed only while running.
    pub fn set_speed(&mut self, percent: u8) {
        self.speed_percent = percent.min(100);
    }

    /// Get the drive duty-cycle target
    pub fn speed(&self) -> u8 {
        self.speed_percent
    }

    /// Check whether a jam has been latched
    pub fn is_jammed(&self) -> bool {
        self.jam_latched
    }

    /// Clear a latched jam
    ///
    /// Does not touch the run request; drive resumes on a later `process`
    /// only if a run is still requested and any dead-time has elapsed.
    pub fn reset_jam(&mut self) {
        self.jam_latched = false;
    }

    /// Turn jam detection on (the default state)
    pub fn enable_anti_jam(&mut self) {
        self.anti_jam = true;
    }

    /// Turn jam detection off, e.g. for flywheel loads with no cycle
    /// switch. Clears any latched jam, since the detection it came from no
    /// longer applies.
    pub fn disable_anti_jam(&mut self) {
        self.anti_jam = false;
        self.jam_latched = false;
    }

    /// Get the current bridge state
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Borrow the underlying outputs for readback
    pub fn outputs(&self) -> (&R, &B) {
        (&self.run, &self.brake)
    }

    /// Force both outputs inactive and hand them back
    pub fn release(mut self) -> (R, B) {
        self.force_outputs_inactive();
        (self.run, self.brake)
    }

    /// Advance the state machine and write the outputs
    ///
    /// Invoke once per polling cycle with the current monotonic time. The
    /// polling interval must be shorter than the configured dead-times and
    /// much shorter than `max_cycle_ms`. Non-blocking, O(1).
    pub fn process(&mut self, now_ms: u32) {
        // A request changed direction. Restart the dead-time window from
        // scratch, even if an earlier opposite-direction transition had
        // not finished.
        if self.requested_run != self.last_requested_run {
            self.state = BridgeState::Transitioning;
            self.transition_duration_ms = if self.requested_run {
                self.timings.on_transition_ms
            } else {
                self.timings.off_transition_ms
            };
            self.transition_started_ms = now_ms;
            self.last_requested_run = self.requested_run;
            self.force_outputs_inactive();
            return;
        }

        match self.state {
            BridgeState::Transitioning => {
                self.force_outputs_inactive();
                if now_ms.wrapping_sub(self.transition_started_ms) <= self.transition_duration_ms {
                    return;
                }

                // Dead-time has elapsed. Outputs are written by the state
                // branches on subsequent ticks, costing one extra polling
                // cycle of latency.
                self.state = if self.requested_run {
                    BridgeState::Running
                } else {
                    BridgeState::Stopped
                };
            }
            BridgeState::Running => {
                // Must observe the brake commanded off before driving.
                if self.brake_claimed {
                    return;
                }

                if self.jam_latched {
                    self.force_outputs_inactive();
                    return;
                }

                if self.anti_jam
                    && now_ms.wrapping_sub(self.last_cycle_ms) > self.timings.max_cycle_ms
                {
                    self.force_outputs_inactive();
                    self.jam_latched = true;
                    return;
                }

                self.brake.set_inactive();
                self.brake_claimed = false;

                match self.speed_percent {
                    // Full on without modulation, avoiding switching losses
                    100 => self.run.set_active(),
                    0 => self.run.set_inactive(),
                    percent => self.run.set_duty_percent(percent),
                }
                self.run_claimed = true;
            }
            BridgeState::Stopped => {
                // Mirror of the running guard: the run FET must be
                // commanded off before the brake engages.
                if self.run_claimed {
                    return;
                }

                self.run.set_inactive();
                self.brake.set_active();
                self.brake_claimed = true;
            }
        }
    }

    fn force_outputs_inactive(&mut self) {
        self.run.set_inactive();
        self.run_claimed = false;
        self.brake.set_inactive();
        self.brake_claimed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// What the run output was last commanded to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Level {
        #[default]
        Inactive,
        Active,
        Duty(u8),
    }

    #[derive(Default)]
    struct FakePwm {
        level: Level,
    }

    impl SwitchOutput for FakePwm {
        fn set_active(&mut self) {
            self.level = Level::Active;
        }

        fn set_inactive(&mut self) {
            self.level = Level::Inactive;
        }
    }

    impl PwmOutput for FakePwm {
        fn set_duty_percent(&mut self, percent: u8) {
            self.level = Level::Duty(percent);
        }
    }

    #[derive(Default)]
    struct FakeSwitch {
        active: bool,
    }

    impl SwitchOutput for FakeSwitch {
        fn set_active(&mut self) {
            self.active = true;
        }

        fn set_inactive(&mut self) {
            self.active = false;
        }
    }

    type TestController = BridgeController<FakePwm, FakeSwitch>;

    fn controller() -> TestController {
        let mut c = BridgeController::new(
            FakePwm::default(),
            FakeSwitch::default(),
            BridgeTimings::default(),
        );
        c.init().unwrap();
        c
    }

    fn run_level(c: &TestController) -> Level {
        c.outputs().0.level
    }

    fn brake_active(c: &TestController) -> bool {
        c.outputs().1.active
    }

    fn driving(c: &TestController) -> bool {
        run_level(c) != Level::Inactive
    }

    /// Walk a freshly initialised controller into `Stopped` with the brake
    /// engaged, ending at the returned timestamp.
    fn settle_stopped(c: &mut TestController) -> u32 {
        let mut now = 0;
        // Boot edge, off dead-time, state change, brake write.
        for _ in 0..6 {
            c.process(now);
            now += 1;
        }
        assert_eq!(c.state(), BridgeState::Stopped);
        assert!(brake_active(c));
        now
    }

    /// From `Stopped`, request a run at `now` and walk into `Running` with
    /// the drive output live. Returns the first timestamp after that.
    fn spin_up(c: &mut TestController, mut now: u32) -> u32 {
        c.request_run(now);
        let on = c.timings.on_transition_ms;
        // Edge tick, dead-time, one tick to change state, one to drive.
        for _ in 0..(on + 3) {
            c.process(now);
            now += 1;
        }
        assert_eq!(c.state(), BridgeState::Running);
        now
    }

    #[test]
    fn test_boots_into_transition() {
        let c = controller();
        assert_eq!(c.state(), BridgeState::Transitioning);
        assert_eq!(run_level(&c), Level::Inactive);
        assert!(!brake_active(&c));
    }

    #[test]
    fn test_init_rejects_bad_timings() {
        let mut c = BridgeController::new(
            FakePwm::default(),
            FakeSwitch::default(),
            BridgeTimings::new(0, 2, 500),
        );
        assert_eq!(c.init(), Err(ConfigError::ZeroDeadTime));
    }

    #[test]
    fn test_boot_settles_to_stopped() {
        let mut c = controller();

        // First process observes the boot edge and starts an off-transition.
        c.process(0);
        assert_eq!(c.state(), BridgeState::Transitioning);
        assert!(!brake_active(&c));

        // off_transition_ms = 2: still dark through the window.
        c.process(1);
        c.process(2);
        assert_eq!(c.state(), BridgeState::Transitioning);

        // Past the window: state changes, outputs written one tick later.
        c.process(3);
        assert_eq!(c.state(), BridgeState::Stopped);
        assert!(!brake_active(&c));

        c.process(4);
        assert!(brake_active(&c));
        assert_eq!(run_level(&c), Level::Inactive);
    }

    #[test]
    fn test_run_request_waits_full_dead_time() {
        let mut c = controller();
        let t0 = settle_stopped(&mut c);
        c.set_speed(80);

        c.request_run(t0);
        c.process(t0); // edge tick, transition starts at t0
        assert_eq!(c.state(), BridgeState::Transitioning);

        let on = c.timings.on_transition_ms;

        // Dark at T-1 and still dark at exactly T.
        c.process(t0 + on - 1);
        assert!(!driving(&c));
        assert!(!brake_active(&c));
        c.process(t0 + on);
        assert!(!driving(&c));
        assert_eq!(c.state(), BridgeState::Transitioning);

        // One past the window: running, drive appears on the next tick.
        c.process(t0 + on + 1);
        assert_eq!(c.state(), BridgeState::Running);
        assert!(!driving(&c));

        c.process(t0 + on + 2);
        assert_eq!(run_level(&c), Level::Duty(80));
        assert!(!brake_active(&c));
    }

    #[test]
    fn test_reversal_restarts_dead_time() {
        let mut c = controller();
        let t0 = settle_stopped(&mut c);

        // Request run, then reverse halfway through the on-transition.
        c.request_run(t0);
        c.process(t0);
        let half = t0 + c.timings.on_transition_ms / 2;
        c.process(half);
        assert_eq!(c.state(), BridgeState::Transitioning);

        c.request_stop();
        c.process(half); // edge: window restarts here

        let off = c.timings.off_transition_ms;

        // The full off dead-time is still required from the reversal.
        c.process(half + off);
        assert_eq!(c.state(), BridgeState::Transitioning);
        assert!(!brake_active(&c));

        c.process(half + off + 1);
        assert_eq!(c.state(), BridgeState::Stopped);
        c.process(half + off + 2);
        assert!(brake_active(&c));
    }

    #[test]
    fn test_jam_latches_and_halts_drive() {
        let mut c = controller();
        c.set_speed(100);
        let t0 = settle_stopped(&mut c);
        spin_up(&mut c, t0);
        assert_eq!(run_level(&c), Level::Active);

        // No heartbeat for longer than max_cycle_ms.
        let late = t0 + c.timings.max_cycle_ms + 1;
        c.process(late);
        assert!(c.is_jammed());
        assert_eq!(run_level(&c), Level::Inactive);
        assert!(!brake_active(&c));

        // Latch persists and keeps the bridge dark.
        c.process(late + 50);
        c.process(late + 100);
        assert!(c.is_jammed());
        assert!(!driving(&c));
    }

    #[test]
    fn test_heartbeat_defers_jam() {
        let mut c = controller();
        c.set_speed(60);
        let t0 = settle_stopped(&mut c);
        spin_up(&mut c, t0);

        let cycle = c.timings.max_cycle_ms;
        let mut now = t0;
        // Heartbeat at half the timeout, repeatedly: never jams.
        for _ in 0..8 {
            now += cycle / 2;
            c.heartbeat(now);
            c.process(now);
            assert!(!c.is_jammed());
            assert_eq!(run_level(&c), Level::Duty(60));
        }
    }

    #[test]
    fn test_jam_timer_armed_from_run_request() {
        let mut c = controller();
        c.set_speed(50);
        let t0 = settle_stopped(&mut c);

        // Request drive but never heartbeat: the timeout counts from the
        // request stamp, not from the first mechanism cycle.
        let now = spin_up(&mut c, t0);
        assert!(!c.is_jammed());

        c.process(now.max(t0 + c.timings.max_cycle_ms + 1));
        assert!(c.is_jammed());
    }

    #[test]
    fn test_reset_jam_resumes_at_previous_speed() {
        let mut c = controller();
        c.set_speed(40);
        let t0 = settle_stopped(&mut c);
        spin_up(&mut c, t0);

        let late = t0 + c.timings.max_cycle_ms + 1;
        c.process(late);
        assert!(c.is_jammed());

        c.reset_jam();
        assert!(!c.is_jammed());

        // Re-request the run the way a caller clearing a jam would; this
        // re-arms the timeout without producing a request edge, so no new
        // dead-time window opens and the very next process drives again.
        c.request_run(late + 1);
        c.process(late + 1);
        assert_eq!(run_level(&c), Level::Duty(40));
        assert_eq!(c.state(), BridgeState::Running);
    }

    #[test]
    fn test_disable_anti_jam_clears_and_prevents() {
        let mut c = controller();
        c.set_speed(70);
        let t0 = settle_stopped(&mut c);
        spin_up(&mut c, t0);

        let late = t0 + c.timings.max_cycle_ms + 1;
        c.process(late);
        assert!(c.is_jammed());

        c.disable_anti_jam();
        assert!(!c.is_jammed());

        // Far past any timeout: no latch, drive restored.
        c.process(late + 10_000);
        assert!(!c.is_jammed());
        assert_eq!(run_level(&c), Level::Duty(70));
    }

    #[test]
    fn test_speed_mapping() {
        let mut c = controller();
        let t0 = settle_stopped(&mut c);
        let mut now = spin_up(&mut c, t0);

        for (speed, expected) in [
            (0, Level::Inactive),
            (1, Level::Duty(1)),
            (50, Level::Duty(50)),
            (99, Level::Duty(99)),
            (100, Level::Active),
        ] {
            c.set_speed(speed);
            c.heartbeat(now);
            c.process(now);
            assert_eq!(run_level(&c), expected);
            now += 1;
        }
    }

    #[test]
    fn test_set_speed_clamps_above_100() {
        let mut c = controller();
        c.set_speed(255);
        assert_eq!(c.speed(), 100);
    }

    #[test]
    fn test_release_forces_outputs_inactive() {
        let mut c = controller();
        let t0 = settle_stopped(&mut c);
        c.set_speed(100);
        spin_up(&mut c, t0);
        assert_eq!(run_level(&c), Level::Active);

        let (run, brake) = c.release();
        assert_eq!(run.level, Level::Inactive);
        assert!(!brake.active);
    }

    #[test]
    fn test_clock_wrap_during_transition() {
        let mut c = controller();
        settle_stopped(&mut c);
        let t0 = u32::MAX - 1;

        c.request_run(t0);
        c.process(t0); // transition starts just before the wrap
        c.process(t0.wrapping_add(2)); // now == 0
        assert_eq!(c.state(), BridgeState::Transitioning);

        // Elapsed crosses the window across the wrap boundary.
        c.process(t0.wrapping_add(c.timings.on_transition_ms + 1));
        assert_eq!(c.state(), BridgeState::Running);
    }

    proptest! {
        /// The two FETs are never commanded on together, whatever the
        /// request sequence and tick timing.
        #[test]
        fn prop_outputs_never_both_active(ops in proptest::array::uniform32(any::<(u8, u8)>())) {
            let mut c = controller();
            let mut now = 0u32;

            for (op, arg) in ops {
                match op % 6 {
                    0 => c.request_run(now),
                    1 => c.request_stop(),
                    2 => c.heartbeat(now),
                    3 => c.set_speed(arg),
                    4 => c.reset_jam(),
                    _ => {
                        if arg % 4 == 0 {
                            c.disable_anti_jam();
                        } else {
                            c.enable_anti_jam();
                        }
                    }
                }

                now = now.wrapping_add(u32::from(arg));
                c.process(now);

                let conducting = driving(&c);
                assert!(!(conducting && brake_active(&c)));
                if c.state() == BridgeState::Transitioning {
                    assert!(!conducting);
                    assert!(!brake_active(&c));
                }
            }
        }
    }
}
