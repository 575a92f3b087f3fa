use crate::constants::{PARSER_IDLE_SLEEP_MS, READER_IDLE_SLEEP_MS};
use crate::decoder::{LinkDecoder, Reading};
use crate::error::LinkError;
use crate::serial::{get_n_read, read};
use crate::time::sleep_ms;
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use serialport::SerialPort;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

/// Struct that contains driver threads.
pub struct DriverThreads {
    pub(crate) reader_terminator_tx: Sender<bool>,
    pub(crate) parser_terminator_tx: Sender<bool>,
    pub(crate) reader_thread: Option<JoinHandle<()>>,
    pub(crate) parser_thread: Option<JoinHandle<()>>,
}

/// Bytes currently waiting on the port; empty when there are none.
fn poll_port(port: &mut Box<dyn SerialPort>) -> Result<Vec<u8>, LinkError> {
    let n_read = get_n_read(port)?;
    if n_read == 0 {
        return Ok(Vec::new());
    }
    read(port, n_read)
}

pub(crate) fn read_device_signal(
    port: &mut Box<dyn SerialPort>,
    data_tx: Sender<Vec<u8>>,
    reader_terminator_rx: Receiver<bool>,
) {
    loop {
        if do_terminate(&reader_terminator_rx) {
            return;
        }

        let chunk = match poll_port(port) {
            Ok(chunk) => chunk,
            Err(e) => {
                error!("Serial port unavailable: {e}");
                return;
            }
        };
        if chunk.is_empty() {
            sleep_ms(READER_IDLE_SLEEP_MS);
            continue;
        }

        if data_tx.send(chunk).is_err() {
            debug!("Parser stopped, closing reader");
            return;
        }
    }
}

/// Blocks until `reading` is accepted. Returns false if the consumer is gone
/// or the parser was asked to stop meanwhile.
fn deliver(
    reading_tx: &Sender<Reading>,
    parser_terminator_rx: &Receiver<bool>,
    mut reading: Reading,
    idle: Duration,
) -> bool {
    loop {
        match reading_tx.send_timeout(reading, idle) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(pending)) => {
                if do_terminate(parser_terminator_rx) {
                    return false;
                }
                reading = pending;
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                info!("Reading receiver dropped, closing parser");
                return false;
            }
        }
    }
}

pub(crate) fn parse_lines(
    mut decoder: LinkDecoder,
    data_rx: Receiver<Vec<u8>>,
    parser_terminator_rx: Receiver<bool>,
    reading_tx: Sender<Reading>,
) {
    let idle = Duration::from_millis(PARSER_IDLE_SLEEP_MS);
    while !do_terminate(&parser_terminator_rx) {
        let data = match data_rx.recv_timeout(idle) {
            Ok(data) => data,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Reader stopped, closing parser");
                break;
            }
        };

        let mut stopped = false;
        let fed = decoder.feed(&data, |measurement| {
            if !stopped {
                let reading = Reading::now(measurement);
                stopped = !deliver(&reading_tx, &parser_terminator_rx, reading, idle);
            }
        });

        if let Err(e) = fed {
            error!("Closing link: {e}");
            break;
        }
        if stopped {
            break;
        }
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

/// Function to join driver threads.
/// This function is automatically called when `driver_threads` is dropped.
pub fn join(driver_threads: &mut DriverThreads) {
    // Either thread may already have stopped on its own.
    let _ = driver_threads.reader_terminator_tx.try_send(true);
    let _ = driver_threads.parser_terminator_tx.try_send(true);

    if let Some(thread) = driver_threads.reader_thread.take() {
        if thread.join().is_err() {
            error!("Reader thread panicked");
        }
    }
    if let Some(thread) = driver_threads.parser_thread.take() {
        if thread.join().is_err() {
            error!("Parser thread panicked");
        }
    }
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        join(self);
    }
}
