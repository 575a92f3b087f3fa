pub(crate) const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const DEFAULT_READ_TIMEOUT_MS: u64 = 10;
/// Bytes tolerated without a line terminator before the link is declared
/// faulty. A canonical line is under 16 bytes.
pub(crate) const DEFAULT_MAX_FRAME_LEN: usize = 256;
pub(crate) const DEFAULT_CHANNEL_DEPTH: usize = 200;
pub(crate) const PARSER_IDLE_SLEEP_MS: u64 = 10;
pub(crate) const READER_IDLE_SLEEP_MS: u64 = 1;
// Host-side range filter, deliberately wider than the sensor's 2..400 cm.
pub(crate) const HOST_MIN_DISTANCE_CM: f64 = 0.;
pub(crate) const HOST_MAX_DISTANCE_CM: f64 = 500.;
pub(crate) const DEFAULT_DISPLAY_MIN_CM: f64 = 0.;
pub(crate) const DEFAULT_DISPLAY_MAX_CM: f64 = 400.;
