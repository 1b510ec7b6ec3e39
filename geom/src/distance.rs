use std::ops::{Add, AddAssign, Mul};

/// A distance in meters. A newtype instead of a bare `f64` so cost-function code (spec.md §4.D)
/// can't accidentally add a distance to an unrelated scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub fn meters(x: f64) -> Distance {
        Distance(x)
    }

    pub fn inner_meters(self) -> f64 {
        self.0
    }
}

impl Add for Distance {
    type Output = Distance;
    fn add(self, other: Distance) -> Distance {
        Distance(self.0 + other.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, other: Distance) {
        self.0 += other.0;
    }
}

impl Mul<f64> for Distance {
    type Output = Distance;
    fn mul(self, scale: f64) -> Distance {
        Distance(self.0 * scale)
    }
}
