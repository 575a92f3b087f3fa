use crate::error::LinkError;
use crate::frame::FrameReassembler;
use crate::line::parse_frame;
use chrono::{DateTime, Local};
use ultrasonic_data::Measurement;

/// An accepted measurement stamped with the time it was parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub received_at: DateTime<Local>,
    pub measurement: Measurement,
}

impl Reading {
    pub fn now(measurement: Measurement) -> Reading {
        Reading {
            received_at: Local::now(),
            measurement,
        }
    }
}

/// Host-side processing of a byte stream: reassembles lines and parses them.
///
/// Measurements are handed out in the order their lines completed.
#[derive(Default)]
pub struct LinkDecoder {
    reassembler: FrameReassembler,
}

impl LinkDecoder {
    pub fn new() -> LinkDecoder {
        LinkDecoder::default()
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> LinkDecoder {
        LinkDecoder {
            reassembler: FrameReassembler::with_max_frame_len(max_frame_len),
        }
    }

    /// Processes one delivery, calling `on_measurement` for every accepted
    /// line.
    ///
    /// Lines completed before an oversized one are still delivered. After
    /// `FrameTooLarge` the buffered bytes are gone and the link should be
    /// reset.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_measurement: F) -> Result<(), LinkError>
    where
        F: FnMut(Measurement),
    {
        for frame in self.reassembler.push(bytes) {
            if let Some(measurement) = parse_frame(&frame?) {
                on_measurement(measurement);
            }
        }
        Ok(())
    }

    /// Discards any partial line.
    pub fn reset(&mut self) {
        self.reassembler.reset();
    }

    pub fn pending_len(&self) -> usize {
        self.reassembler.pending_len()
    }
}
