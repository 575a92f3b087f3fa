use crate::constants::DEFAULT_MAX_FRAME_LEN;
use crate::error::LinkError;
use std::borrow::Cow;
use std::collections::VecDeque;
use ultrasonic_data::wire::{CARRIAGE_RETURN, LINE_TERMINATOR};

/// One line of the wire protocol, terminator excluded.
///
/// A trailing carriage return is kept; [`RawFrame::text`] strips it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Lossy UTF-8 view without the trailing `\r`.
    pub fn text(&self) -> Cow<'_, str> {
        let bytes = match self.0.split_last() {
            Some((&CARRIAGE_RETURN, rest)) => rest,
            _ => &self.0,
        };
        String::from_utf8_lossy(bytes)
    }
}

impl From<&[u8]> for RawFrame {
    fn from(bytes: &[u8]) -> Self {
        RawFrame(bytes.to_vec())
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Splits a byte stream delivered in arbitrary chunks into lines.
pub struct FrameReassembler {
    buffer: VecDeque<u8>,
    max_frame_len: usize,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        FrameReassembler::new()
    }
}

impl FrameReassembler {
    pub fn new() -> FrameReassembler {
        FrameReassembler::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// `max_frame_len` bounds the line bytes before `\n`, a trailing `\r`
    /// included; once more bytes than that are pending without a terminator
    /// the accumulator is discarded.
    pub fn with_max_frame_len(max_frame_len: usize) -> FrameReassembler {
        FrameReassembler {
            buffer: VecDeque::new(),
            max_frame_len,
        }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Appends a delivery and returns the frames it completed.
    ///
    /// Frames are cut lazily: whatever the iterator does not consume stays
    /// buffered and is returned by the next call to [`push`](Self::push) or
    /// [`frames`](Self::frames).
    pub fn push(&mut self, bytes: &[u8]) -> Frames<'_> {
        self.buffer.extend(bytes);
        self.frames()
    }

    /// Resumes cutting frames from what is already buffered.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { reassembler: self }
    }

    /// Bytes received but not yet returned as a frame.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any partial line, e.g. when the link closes.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn next_frame(&mut self) -> Option<Result<RawFrame, LinkError>> {
        let search_len = self.buffer.len().min(self.max_frame_len + 1);
        let terminator = self
            .buffer
            .iter()
            .take(search_len)
            .position(|&b| b == LINE_TERMINATOR);

        match terminator {
            Some(index) => {
                let frame = self.buffer.drain(..index).collect::<Vec<_>>();
                self.buffer.pop_front(); // terminator
                Some(Ok(RawFrame(frame)))
            }
            None if self.buffer.len() > self.max_frame_len => {
                self.buffer.clear();
                Some(Err(LinkError::FrameTooLarge {
                    limit: self.max_frame_len,
                }))
            }
            None => None,
        }
    }
}

/// Frames completed by one delivery.
pub struct Frames<'a> {
    reassembler: &'a mut FrameReassembler,
}

impl Iterator for Frames<'_> {
    type Item = Result<RawFrame, LinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reassembler.next_frame()
    }
}
