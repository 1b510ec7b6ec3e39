use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A point in web-mercator meters (see `LonLat::to_pt`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        Pt2D { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, other: Pt2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// A hashable key for use in `HashMap`/`HashSet`, rounding to sub-millimeter precision, to
    /// dedupe geometrically-identical points reached via different OSM node IDs.
    pub fn to_hashable(self) -> HashablePt2D {
        HashablePt2D {
            x_bits: (self.x * 1000.0).round() as i64,
            y_bits: (self.y * 1000.0).round() as i64,
        }
    }

    pub fn angle_to(self, other: Pt2D) -> Angle {
        Angle((other.y - self.y).atan2(other.x - self.x))
    }
}

impl PartialEq for Pt2D {
    fn eq(&self, other: &Pt2D) -> bool {
        self.to_hashable() == other.to_hashable()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashablePt2D {
    x_bits: i64,
    y_bits: i64,
}

impl HashablePt2D {
    pub fn to_pt2d(self) -> Pt2D {
        Pt2D::new(self.x_bits as f64 / 1000.0, self.y_bits as f64 / 1000.0)
    }
}

/// An angle in radians, normalized to `(-pi, pi]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// The absolute difference between two angles, in degrees, in `[0, 180]`. Used by the
    /// full-turn detector (spec.md §4.D) to compare a hop's incoming and outgoing bearings.
    pub fn abs_diff_degrees(self, other: Angle) -> f64 {
        let mut diff = (self.degrees() - other.degrees()).abs() % 360.0;
        if diff > 180.0 {
            diff = 360.0 - diff;
        }
        diff
    }

    /// The angle you'd be facing after continuing straight through a node: `other` rotated by
    /// 180 degrees, for comparison against the next edge's leading direction.
    pub fn opposite(self) -> Angle {
        Angle(self.0 + std::f64::consts::PI)
    }
}

impl Hash for HashablePt2D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x_bits.hash(state);
        self.y_bits.hash(state);
    }
}
