use std::io;
use thiserror::Error;

/// Faults of the serial link. `FrameTooLarge` ends the session; the caller
/// decides whether to reconnect.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("No line terminator within {limit} bytes")]
    FrameTooLarge { limit: usize },
    #[error("Serial port error: {0}")]
    SerialError(#[from] serialport::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Reasons a line produced no measurement. These never leave the parser;
/// the line is dropped and the stream continues.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LineError {
    #[error("Malformed line {0:?}")]
    MalformedFrame(String),
    #[error("Distance {0} cm outside the accepted range")]
    OutOfPlausibleRange(f64),
}
