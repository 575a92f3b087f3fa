use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use ultrasonic_data::Measurement;

use crate::clock::{MicrosTimer, MillisClock};
use crate::config::EchoConfig;
use crate::error::EchoError;

/// Where the engine is inside a ranging cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoState {
    Idle,
    Triggering,
    WaitEchoRise,
    Timing,
    WaitEchoFall,
    Resolved,
}

/// Echo edge that did not arrive in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoPhase {
    Rise,
    Fall,
}

/// Result of one ranging cycle before it is collapsed into a [`Measurement`].
///
/// Keeps "timed out" and "echo outside the plausible range" apart, which
/// the measurement alone cannot since both become the zero sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoOutcome {
    Echo { elapsed_us: u32, distance_cm: f64 },
    Implausible { elapsed_us: u32, distance_cm: f64 },
    Timeout(EchoPhase),
}

impl EchoOutcome {
    pub fn measurement(&self) -> Measurement {
        match *self {
            EchoOutcome::Echo { distance_cm, .. } => Measurement::new(distance_cm),
            EchoOutcome::Implausible { .. } | EchoOutcome::Timeout(_) => Measurement::invalid(),
        }
    }
}

/// Blocking echo-pulse timer.
///
/// Owns the trigger and echo pins and the microsecond counter, so two cycles
/// can never overlap. Every wait is a busy poll bounded by
/// [`EchoConfig::echo_timeout_ms`].
pub struct EchoEngine<T, E, D, C, M> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    timer: M,
    config: EchoConfig,
    state: EchoState,
}

impl<T, E, D, C, M> EchoEngine<T, E, D, C, M>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MillisClock,
    M: MicrosTimer,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C, timer: M) -> Self {
        Self::with_config(trigger, echo, delay, clock, timer, EchoConfig::default())
    }

    pub fn with_config(
        trigger: T,
        echo: E,
        delay: D,
        clock: C,
        timer: M,
        config: EchoConfig,
    ) -> Self {
        EchoEngine {
            trigger,
            echo,
            delay,
            clock,
            timer,
            config,
            state: EchoState::Idle,
        }
    }

    pub fn state(&self) -> EchoState {
        self.state
    }

    pub fn config(&self) -> &EchoConfig {
        &self.config
    }

    /// Runs one ranging cycle.
    ///
    /// Timeouts and implausible echoes give `Measurement::invalid()`.
    pub fn measure(&mut self) -> Result<Measurement, EchoError> {
        self.measure_detailed().map(|outcome| outcome.measurement())
    }

    /// Runs one ranging cycle and reports why it resolved the way it did.
    pub fn measure_detailed(&mut self) -> Result<EchoOutcome, EchoError> {
        self.state = EchoState::Idle;
        let outcome = self.run_cycle();
        self.state = EchoState::Resolved;

        #[cfg(feature = "defmt")]
        match &outcome {
            Ok(EchoOutcome::Timeout(phase)) => defmt::debug!("echo timeout waiting for {}", phase),
            Ok(EchoOutcome::Implausible { distance_cm, .. }) => {
                defmt::debug!("implausible echo: {} cm", distance_cm)
            }
            Ok(EchoOutcome::Echo { .. }) => {}
            Err(e) => defmt::warn!("ranging cycle failed: {}", e),
        }

        outcome
    }

    /// Blocks for `ms` milliseconds on the engine's delay provider.
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Gives the hardware back.
    pub fn release(self) -> (T, E, D, C, M) {
        (self.trigger, self.echo, self.delay, self.clock, self.timer)
    }

    fn run_cycle(&mut self) -> Result<EchoOutcome, EchoError> {
        self.state = EchoState::Triggering;
        self.send_trigger_pulse()?;

        self.state = EchoState::WaitEchoRise;
        if !self.wait_for_echo(true)? {
            return Ok(EchoOutcome::Timeout(EchoPhase::Rise));
        }

        self.state = EchoState::Timing;
        self.timer.restart();

        self.state = EchoState::WaitEchoFall;
        let fell = self.wait_for_echo(false);
        let elapsed_us = self.timer.elapsed_us();
        self.timer.stop();
        if !fell? {
            return Ok(EchoOutcome::Timeout(EchoPhase::Fall));
        }

        let distance_cm = self.config.distance_cm(elapsed_us);
        if self.config.is_plausible(distance_cm) {
            Ok(EchoOutcome::Echo {
                elapsed_us,
                distance_cm,
            })
        } else {
            Ok(EchoOutcome::Implausible {
                elapsed_us,
                distance_cm,
            })
        }
    }

    // Busy-waits; nothing else may run on the core meanwhile.
    fn send_trigger_pulse(&mut self) -> Result<(), EchoError> {
        let fault = |e: T::Error| EchoError::Trigger(e.kind());
        self.trigger.set_low().map_err(fault)?;
        self.delay.delay_us(self.config.settle_us);
        self.trigger.set_high().map_err(fault)?;
        self.delay.delay_us(self.config.trigger_pulse_us);
        self.trigger.set_low().map_err(fault)?;
        Ok(())
    }

    /// Polls the echo line until it reads `high`. Returns `false` once the
    /// deadline has passed.
    fn wait_for_echo(&mut self, high: bool) -> Result<bool, EchoError> {
        let start = self.clock.now_ms();
        loop {
            let level = self.echo.is_high().map_err(|e| EchoError::Echo(e.kind()))?;
            if level == high {
                return Ok(true);
            }
            if self.clock.now_ms().wrapping_sub(start) > self.config.echo_timeout_ms {
                return Ok(false);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Simulated time line shared by every fake peripheral.
    #[derive(Debug, Default)]
    pub(crate) struct Sim {
        pub now_us: u64,
        pub tick_offset: u32,
        pub rise_at: u64,
        pub fall_at: u64,
        pub trigger_log: Vec<(u64, bool)>,
        pub timer_start: Option<u64>,
        pub timer_running: bool,
    }

    #[derive(Clone)]
    pub(crate) struct Bench(pub Rc<RefCell<Sim>>);

    impl Bench {
        pub fn echo_between(rise_at: u64, fall_at: u64) -> Bench {
            Bench(Rc::new(RefCell::new(Sim {
                rise_at,
                fall_at,
                ..Sim::default()
            })))
        }

        pub fn silent() -> Bench {
            Bench::echo_between(u64::MAX, u64::MAX)
        }
    }

    pub(crate) struct Trigger(Bench);
    pub(crate) struct Echo(Bench);
    pub(crate) struct Delay(Bench);
    pub(crate) struct Clock(Bench);
    pub(crate) struct Timer(Bench);

    impl ErrorType for Trigger {
        type Error = Infallible;
    }

    impl OutputPin for Trigger {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let mut sim = self.0 .0.borrow_mut();
            let now = sim.now_us;
            sim.trigger_log.push((now, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let mut sim = self.0 .0.borrow_mut();
            let now = sim.now_us;
            sim.trigger_log.push((now, true));
            Ok(())
        }
    }

    impl ErrorType for Echo {
        type Error = Infallible;
    }

    impl InputPin for Echo {
        // Each poll costs one microsecond.
        fn is_high(&mut self) -> Result<bool, Infallible> {
            let mut sim = self.0 .0.borrow_mut();
            sim.now_us += 1;
            Ok(sim.rise_at <= sim.now_us && sim.now_us < sim.fall_at)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|high| !high)
        }
    }

    impl DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32) {
            self.0 .0.borrow_mut().now_us += u64::from(ns / 1000);
        }
    }

    impl MillisClock for Clock {
        fn now_ms(&mut self) -> u32 {
            let sim = self.0 .0.borrow();
            ((sim.now_us / 1000) as u32).wrapping_add(sim.tick_offset)
        }
    }

    impl MicrosTimer for Timer {
        fn restart(&mut self) {
            let mut sim = self.0 .0.borrow_mut();
            sim.timer_start = Some(sim.now_us);
            sim.timer_running = true;
        }

        fn stop(&mut self) {
            self.0 .0.borrow_mut().timer_running = false;
        }

        fn elapsed_us(&mut self) -> u32 {
            let sim = self.0 .0.borrow();
            sim.timer_start.map_or(0, |start| (sim.now_us - start) as u32)
        }
    }

    pub(crate) type SimEngine = EchoEngine<Trigger, Echo, Delay, Clock, Timer>;

    pub(crate) fn engine(bench: &Bench) -> SimEngine {
        EchoEngine::new(
            Trigger(bench.clone()),
            Echo(bench.clone()),
            Delay(bench.clone()),
            Clock(bench.clone()),
            Timer(bench.clone()),
        )
    }

    #[test]
    fn test_trigger_pulse_shape() {
        let bench = Bench::echo_between(500, 1500);
        let mut engine = engine(&bench);
        engine.measure().unwrap();
        assert_eq!(
            bench.0.borrow().trigger_log,
            vec![(0, false), (2, true), (12, false)]
        );
    }

    #[test]
    fn test_measure_echo() {
        let bench = Bench::echo_between(500, 1500);
        let mut engine = engine(&bench);
        assert_eq!(engine.state(), EchoState::Idle);

        let outcome = engine.measure_detailed().unwrap();
        match outcome {
            EchoOutcome::Echo {
                elapsed_us,
                distance_cm,
            } => {
                assert_eq!(elapsed_us, 1000);
                assert!((distance_cm - 17.).abs() < 1e-9);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(outcome.measurement().is_valid());
        assert_eq!(engine.state(), EchoState::Resolved);
        assert!(!bench.0.borrow().timer_running);
    }

    #[test]
    fn test_too_close_is_forced_to_zero() {
        let bench = Bench::echo_between(500, 550);
        let mut engine = engine(&bench);
        let outcome = engine.measure_detailed().unwrap();
        assert!(matches!(outcome, EchoOutcome::Implausible { elapsed_us: 50, .. }));
        assert_eq!(outcome.measurement(), Measurement::invalid());
    }

    #[test]
    fn test_too_far_is_forced_to_zero() {
        let bench = Bench::echo_between(500, 25_500);
        let mut engine = engine(&bench);
        assert_eq!(engine.measure().unwrap(), Measurement::invalid());
    }

    #[test]
    fn test_plausibility_lower_edge() {
        // 118 us -> 2.006 cm, 117 us -> 1.989 cm
        let bench = Bench::echo_between(500, 618);
        assert!(engine(&bench).measure().unwrap().is_valid());
        let bench = Bench::echo_between(500, 617);
        assert!(!engine(&bench).measure().unwrap().is_valid());
    }

    #[test]
    fn test_rise_timeout() {
        let bench = Bench::silent();
        let mut engine = engine(&bench);
        let outcome = engine.measure_detailed().unwrap();
        assert_eq!(outcome, EchoOutcome::Timeout(EchoPhase::Rise));
        assert_eq!(outcome.measurement(), Measurement::invalid());

        let sim = bench.0.borrow();
        assert!(sim.timer_start.is_none());
        // 30 ms deadline, first tick past it ends the wait
        assert!(sim.now_us >= 31_000 && sim.now_us < 32_000);
    }

    #[test]
    fn test_fall_timeout_stops_timer() {
        let bench = Bench::echo_between(500, u64::MAX);
        let mut engine = engine(&bench);
        assert_eq!(
            engine.measure_detailed().unwrap(),
            EchoOutcome::Timeout(EchoPhase::Fall)
        );
        assert!(!bench.0.borrow().timer_running);
    }

    #[test]
    fn test_next_cycle_after_timeout() {
        let bench = Bench::silent();
        let mut engine = engine(&bench);
        assert_eq!(engine.measure().unwrap(), Measurement::invalid());

        {
            let mut sim = bench.0.borrow_mut();
            let now = sim.now_us;
            sim.rise_at = now + 100;
            sim.fall_at = now + 1100;
        }
        let m = engine.measure().unwrap();
        assert!(m.is_valid());
        assert!((m.distance_cm - 17.).abs() < 1e-9);
    }

    #[test]
    fn test_tick_wraparound() {
        let bench = Bench::echo_between(500, 1500);
        bench.0.borrow_mut().tick_offset = u32::MAX;
        let m = engine(&bench).measure().unwrap();
        assert!((m.distance_cm - 17.).abs() < 1e-9);

        let bench = Bench::silent();
        bench.0.borrow_mut().tick_offset = u32::MAX - 10;
        let mut engine = engine(&bench);
        assert_eq!(
            engine.measure_detailed().unwrap(),
            EchoOutcome::Timeout(EchoPhase::Rise)
        );
        assert!(bench.0.borrow().now_us < 32_000);
    }

    #[derive(Debug)]
    struct Glitch;

    impl embedded_hal::digital::Error for Glitch {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct FlakyEcho {
        bench: Bench,
        faults: usize,
    }

    impl ErrorType for FlakyEcho {
        type Error = Glitch;
    }

    impl InputPin for FlakyEcho {
        fn is_high(&mut self) -> Result<bool, Glitch> {
            if self.faults > 0 {
                self.faults -= 1;
                return Err(Glitch);
            }
            Echo(self.bench.clone()).is_high().map_err(|e| match e {})
        }

        fn is_low(&mut self) -> Result<bool, Glitch> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn test_pin_fault_then_recovery() {
        let bench = Bench::echo_between(500, 1500);
        let mut engine = EchoEngine::new(
            Trigger(bench.clone()),
            FlakyEcho {
                bench: bench.clone(),
                faults: 1,
            },
            Delay(bench.clone()),
            Clock(bench.clone()),
            Timer(bench.clone()),
        );
        assert_eq!(engine.measure(), Err(EchoError::Echo(ErrorKind::Other)));
        assert_eq!(engine.state(), EchoState::Resolved);

        {
            let mut sim = bench.0.borrow_mut();
            let now = sim.now_us;
            sim.rise_at = now + 100;
            sim.fall_at = now + 1100;
        }
        assert!(engine.measure().unwrap().is_valid());
    }
}
