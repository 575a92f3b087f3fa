//! Line grammar of the host side.
//!
//! Accepted, in priority order: empty (ignored), `<label>:<number>`,
//! `<label>=<number>`, `<number>`. Accepted values lie in `0..=500` cm.

use crate::constants::{HOST_MAX_DISTANCE_CM, HOST_MIN_DISTANCE_CM};
use crate::error::LineError;
use crate::frame::RawFrame;
use tracing::{debug, trace};
use ultrasonic_data::Measurement;

/// Which grammar a line matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineForm {
    /// `D:17.00`
    Prefixed,
    /// `Distance=17`
    Assignment,
    /// `17.0`
    Bare,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParsedLine {
    pub form: LineForm,
    pub value: f64,
}

/// Parses one terminator-stripped line.
///
/// `Ok(None)` for blank lines. The range filter is applied, so every `Ok(Some)`
/// holds a value in `0..=500`.
pub fn parse_line(line: &str) -> Result<Option<ParsedLine>, LineError> {
    let text = line.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (form, number) = if text.contains(':') {
        (LineForm::Prefixed, split_value(text, ':')?)
    } else if text.contains('=') {
        (LineForm::Assignment, split_value(text, '=')?)
    } else {
        (LineForm::Bare, text)
    };

    let value = parse_number(text, number)?;
    if !in_host_range(value) {
        return Err(LineError::OutOfPlausibleRange(value));
    }
    Ok(Some(ParsedLine { form, value }))
}

/// Best-effort parse of a frame: malformed and out-of-range lines give
/// `None` and are only logged.
pub fn parse_frame(frame: &RawFrame) -> Option<Measurement> {
    let text = frame.text();
    trace!("RAW: {:?}", text);
    match parse_line(&text) {
        Ok(parsed) => parsed.map(|p| Measurement::new(p.value)),
        Err(e) => {
            debug!("Dropping line: {e}");
            None
        }
    }
}

fn split_value<'a>(text: &'a str, separator: char) -> Result<&'a str, LineError> {
    let mut parts = text.split(separator);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_label), Some(value), None) => Ok(value),
        _ => Err(LineError::MalformedFrame(text.to_string())),
    }
}

fn parse_number(text: &str, number: &str) -> Result<f64, LineError> {
    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LineError::MalformedFrame(text.to_string())),
    }
}

fn in_host_range(value: f64) -> bool {
    (HOST_MIN_DISTANCE_CM..=HOST_MAX_DISTANCE_CM).contains(&value)
}
