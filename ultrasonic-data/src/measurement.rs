#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One distance reading, produced per ranging cycle or per parsed line.
///
/// `valid == false` is a regular value, not an error: the sensor reports
/// timeouts and implausible echoes this way, always with a zero distance.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// One-way distance to the obstacle in centimetres.
    pub distance_cm: f64,
    /// Whether the reading passed the producer's checks.
    pub valid: bool,
}

impl Measurement {
    pub const fn new(distance_cm: f64) -> Measurement {
        Measurement {
            distance_cm,
            valid: true,
        }
    }

    /// The zero/invalid sentinel used for timeouts and implausible echoes.
    pub const fn invalid() -> Measurement {
        Measurement {
            distance_cm: 0.,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Measurement::invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_is_zero() {
        let m = Measurement::invalid();
        assert_eq!(m.distance_cm, 0.);
        assert!(!m.is_valid());
        assert_eq!(Measurement::default(), m);
    }

    #[test]
    fn test_new_is_valid() {
        let m = Measurement::new(17.);
        assert!(m.is_valid());
        assert_eq!(m.distance_cm, 17.);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let m = Measurement::new(42.5);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"distance_cm":42.5,"valid":true}"#);
        let back: Measurement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
