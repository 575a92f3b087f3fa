//! Echo-pulse ranging for HC-SR04 style ultrasonic sensors.
//!
//! [`EchoEngine`] drives the trigger line, times the echo pulse against
//! millisecond deadlines and converts the pulse width to a distance.
//! [`Ranger`] wraps it into the periodic measure/encode/transmit loop that
//! feeds the host over a serial link.

#![cfg_attr(not(test), no_std)]

mod clock;
mod config;
mod engine;
mod error;
mod ranger;

pub use crate::clock::{MicrosTimer, MillisClock};
pub use crate::config::EchoConfig;
pub use crate::engine::{EchoEngine, EchoOutcome, EchoPhase, EchoState};
pub use crate::error::EchoError;
pub use crate::ranger::Ranger;
pub use ultrasonic_data::{LineFormat, Measurement};
