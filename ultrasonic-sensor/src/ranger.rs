use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use ultrasonic_data::{encode_with, LineFormat, Measurement};

use crate::clock::{MicrosTimer, MillisClock};
use crate::engine::EchoEngine;
use crate::error::EchoError;

const DEFAULT_INTERVAL_MS: u32 = 100;

/// Periodic measure, encode and transmit loop.
pub struct Ranger<T, E, D, C, M> {
    engine: EchoEngine<T, E, D, C, M>,
    format: LineFormat,
    interval_ms: u32,
}

impl<T, E, D, C, M> Ranger<T, E, D, C, M>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MillisClock,
    M: MicrosTimer,
{
    pub fn new(engine: EchoEngine<T, E, D, C, M>) -> Self {
        Ranger {
            engine,
            format: LineFormat::Prefixed,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }

    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_interval_ms(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn engine(&self) -> &EchoEngine<T, E, D, C, M> {
        &self.engine
    }

    /// Measures once, hands the encoded line to `transmit`, then waits out
    /// the interval.
    ///
    /// A pin fault returns early without transmitting or waiting.
    pub fn step<F>(&mut self, mut transmit: F) -> Result<Measurement, EchoError>
    where
        F: FnMut(&[u8]),
    {
        let measurement = self.engine.measure()?;
        let line = encode_with(&measurement, self.format);
        transmit(&line);
        self.engine.pause_ms(self.interval_ms);
        Ok(measurement)
    }

    pub fn release(self) -> EchoEngine<T, E, D, C, M> {
        self.engine
    }
}
