use crate::config::LinkConfig;
use crate::error::LinkError;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read};

pub(crate) fn open(config: &LinkConfig) -> Result<Box<dyn SerialPort>, LinkError> {
    let port = serialport::new(&config.port_name, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout)
        .open()?;
    Ok(port)
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize, LinkError> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

/// Reads at most `max_size` bytes; a read timeout gives an empty chunk.
pub(crate) fn read(
    port: &mut Box<dyn SerialPort>,
    max_size: usize,
) -> Result<Vec<u8>, LinkError> {
    let mut chunk: Vec<u8> = vec![0; max_size];
    match port.read(chunk.as_mut_slice()) {
        Ok(n) => chunk.truncate(n),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => chunk.clear(),
        Err(e) => return Err(LinkError::IoError(e)),
    }
    Ok(chunk)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::time::sleep_ms;
    use serialport::TTYPort;
    use std::io::Write;

    #[test]
    fn test_read_available_bytes() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut slave_ptr = Box::new(slave) as Box<dyn SerialPort>;

        master.write_all(b"D:17.00\n").unwrap();
        sleep_ms(10);

        let n_read = get_n_read(&mut slave_ptr).unwrap();
        assert_eq!(n_read, 8);
        let chunk = read(&mut slave_ptr, n_read).unwrap();
        assert_eq!(chunk, b"D:17.00\n");
        assert_eq!(get_n_read(&mut slave_ptr).unwrap(), 0);
    }
}
