//! Host side of the ultrasonic ranging link.
//!
//! Bytes from the serial port are split into lines by [`FrameReassembler`],
//! parsed by [`parse_frame`] and delivered as timestamped [`Reading`]s.
//! [`SeriesBuffer`] keeps a sliding window of them for display.

mod config;
mod constants;
mod decoder;
mod driver_threads;
mod error;
mod frame;
mod line;
mod serial;
mod series;
mod time;

pub use crate::config::LinkConfig;
pub use crate::decoder::{LinkDecoder, Reading};
pub use crate::driver_threads::{join, DriverThreads};
pub use crate::error::{LineError, LinkError};
pub use crate::frame::{FrameReassembler, Frames, RawFrame};
pub use crate::line::{parse_frame, parse_line, LineForm, ParsedLine};
pub use crate::series::{DisplayRange, SeriesBuffer, SeriesStats, SharedSeries};
pub use ultrasonic_data::{Measurement, SeriesPoint};

use crate::driver_threads::{parse_lines, read_device_signal};
use crossbeam_channel::{bounded, Receiver};
use serialport::SerialPort;
use tracing::info;

/// Function to open the serial link and start streaming readings.
/// # Arguments
///
/// * `config` - Port name, baud rate and framing limits.
///
/// Readings arrive on the returned receiver in the order their lines were
/// parsed. The receiver disconnects when the link fails; dropping
/// [`DriverThreads`] closes the link.
pub fn run_driver(config: &LinkConfig) -> Result<(DriverThreads, Receiver<Reading>), LinkError> {
    let port = serial::open(config)?;
    info!(
        "Opened \"{}\" at {} baud",
        config.port_name, config.baud_rate
    );
    Ok(spawn_driver(port, config))
}

/// Same as [`run_driver`] for a port that is already open.
pub fn spawn_driver(
    mut port: Box<dyn SerialPort>,
    config: &LinkConfig,
) -> (DriverThreads, Receiver<Reading>) {
    let (reader_terminator_tx, reader_terminator_rx) = bounded(1);
    let (parser_terminator_tx, parser_terminator_rx) = bounded(1);
    let (data_tx, data_rx) = bounded::<Vec<u8>>(config.channel_depth);
    let (reading_tx, reading_rx) = bounded::<Reading>(config.channel_depth);

    let reader_thread = Some(std::thread::spawn(move || {
        read_device_signal(&mut port, data_tx, reader_terminator_rx);
    }));

    let decoder = LinkDecoder::with_max_frame_len(config.max_frame_len);
    let parser_thread = Some(std::thread::spawn(move || {
        parse_lines(decoder, data_rx, parser_terminator_rx, reading_tx);
    }));

    let driver_threads = DriverThreads {
        reader_terminator_tx,
        parser_terminator_tx,
        reader_thread,
        parser_thread,
    };

    (driver_threads, reading_rx)
}
