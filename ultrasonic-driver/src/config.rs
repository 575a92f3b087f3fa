use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_CHANNEL_DEPTH, DEFAULT_MAX_FRAME_LEN, DEFAULT_READ_TIMEOUT_MS,
};
use std::time::Duration;

/// Serial link settings. The port is always opened 8N1 without flow control.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConfig {
    /// Serial port name such as `/dev/ttyUSB0` or `COM3`.
    pub port_name: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Longest line accepted before the session is closed.
    pub max_frame_len: usize,
    /// Readings buffered for a slow consumer before new ones are dropped.
    pub channel_depth: usize,
}

impl LinkConfig {
    pub fn new(port_name: impl Into<String>) -> LinkConfig {
        LinkConfig {
            port_name: port_name.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            channel_depth: DEFAULT_CHANNEL_DEPTH,
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> LinkConfig {
        self.baud_rate = baud_rate;
        self
    }

    pub fn read_timeout(mut self, read_timeout: Duration) -> LinkConfig {
        self.read_timeout = read_timeout;
        self
    }

    pub fn max_frame_len(mut self, max_frame_len: usize) -> LinkConfig {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn channel_depth(mut self, channel_depth: usize) -> LinkConfig {
        self.channel_depth = channel_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::new("/dev/ttyUSB0");
        assert_eq!(config.port_name, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.max_frame_len, 256);

        let config = config.baud_rate(115_200).max_frame_len(64);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.max_frame_len, 64);
    }
}
