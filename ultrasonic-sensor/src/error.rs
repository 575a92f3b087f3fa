use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Hardware faults during a ranging cycle.
///
/// Echo timeouts and implausible readings are not errors; they resolve to
/// the invalid measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoError {
    #[error("trigger pin fault: {0:?}")]
    Trigger(ErrorKind),
    #[error("echo pin fault: {0:?}")]
    Echo(ErrorKind),
}
