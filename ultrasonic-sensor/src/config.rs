/// Timing and plausibility parameters of one ranging cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoConfig {
    /// Low time before the trigger pulse.
    pub settle_us: u32,
    /// Width of the trigger pulse.
    pub trigger_pulse_us: u32,
    /// Deadline for each of the two echo edges.
    pub echo_timeout_ms: u32,
    /// One-way distance per microsecond of echo, 340 m/s halved.
    pub cm_per_us: f64,
    pub min_distance_cm: f64,
    pub max_distance_cm: f64,
}

impl Default for EchoConfig {
    fn default() -> Self {
        EchoConfig {
            settle_us: 2,
            trigger_pulse_us: 10,
            echo_timeout_ms: 30,
            cm_per_us: 0.017,
            min_distance_cm: 2.,
            max_distance_cm: 400.,
        }
    }
}

impl EchoConfig {
    pub fn distance_cm(&self, elapsed_us: u32) -> f64 {
        (elapsed_us as f64) * self.cm_per_us
    }

    pub fn is_plausible(&self, distance_cm: f64) -> bool {
        distance_cm >= self.min_distance_cm && distance_cm <= self.max_distance_cm
    }
}
