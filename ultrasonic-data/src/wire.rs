//! Line-oriented ASCII wire format shared by the sensor and the host.
//!
//! One measurement per line, `\n` terminated. The sensor emits `D:<value>\r\n`
//! with two decimals; the host also accepts `Distance=<value>` and bare
//! numbers.

use core::fmt::Write;

use crate::Measurement;

pub const LINE_TERMINATOR: u8 = b'\n';
pub const CARRIAGE_RETURN: u8 = b'\r';
pub const DISTANCE_LABEL: &str = "D";
/// Longest line the encoder produces, terminator included.
pub const MAX_LINE_LEN: usize = 32;

pub type EncodedLine = heapless::Vec<u8, MAX_LINE_LEN>;

/// Producer-side line layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineFormat {
    /// `D:<value>\r\n`
    #[default]
    Prefixed,
    /// `<value>\r\n`
    Bare,
}

/// Encodes a measurement in the canonical `D:<value>\r\n` form.
pub fn encode(measurement: &Measurement) -> EncodedLine {
    encode_with(measurement, LineFormat::Prefixed)
}

/// Encodes a measurement with two decimal places.
///
/// Invalid measurements are sent as `0.00`. So are values that are not
/// finite or too wide to fit in [`MAX_LINE_LEN`] bytes.
pub fn encode_with(measurement: &Measurement, format: LineFormat) -> EncodedLine {
    let value = transmitted_value(measurement);
    let mut line = heapless::String::<MAX_LINE_LEN>::new();
    if write_line(&mut line, value, format).is_err() {
        line.clear();
        // The zero line is at most 9 bytes.
        let _ = write_line(&mut line, 0., format);
    }
    line.into_bytes()
}

fn transmitted_value(measurement: &Measurement) -> f64 {
    let d = measurement.distance_cm;
    // `0.` also folds -0.0, which would otherwise print as "-0.00".
    if !measurement.valid || !d.is_finite() || d == 0. {
        return 0.;
    }
    d
}

fn write_line<W: Write>(out: &mut W, value: f64, format: LineFormat) -> core::fmt::Result {
    if format == LineFormat::Prefixed {
        write!(out, "{}:", DISTANCE_LABEL)?;
    }
    write!(out, "{:.2}\r\n", value)
}
