/// Monotonic millisecond tick, e.g. SysTick.
///
/// The counter is allowed to wrap; the engine only ever looks at wrapping
/// differences between two readings.
pub trait MillisClock {
    fn now_ms(&mut self) -> u32;
}

/// Free-running microsecond counter, e.g. a timer clocked at 1 MHz.
pub trait MicrosTimer {
    /// Resets the count to zero and starts counting.
    fn restart(&mut self);
    fn stop(&mut self);
    /// Microseconds since the last `restart`.
    fn elapsed_us(&mut self) -> u32;
}

impl<T: MillisClock + ?Sized> MillisClock for &mut T {
    fn now_ms(&mut self) -> u32 {
        T::now_ms(self)
    }
}

impl<T: MicrosTimer + ?Sized> MicrosTimer for &mut T {
    fn restart(&mut self) {
        T::restart(self)
    }

    fn stop(&mut self) {
        T::stop(self)
    }

    fn elapsed_us(&mut self) -> u32 {
        T::elapsed_us(self)
    }
}
