use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// Earth's radius in meters (WGS84 semi-major axis), used by the web Mercator projection.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A WGS84 longitude/latitude pair, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(longitude: f64, latitude: f64) -> LonLat {
        LonLat {
            longitude,
            latitude,
        }
    }

    /// Projects into web-mercator meters relative to `bounds`' origin (spec.md §3's "web
    /// mercator meters" — euclidean distance on this plane is real-world meters only at the
    /// equator, which is why callers scale by `1 / cos(lat)` for anything latitude-sensitive).
    pub fn to_pt(self, bounds: &GPSBounds) -> Pt2D {
        let (x, y) = mercator_project(self.longitude, self.latitude);
        Pt2D::new(x - bounds.min_x, bounds.max_y - y)
    }
}

fn mercator_project(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * ((std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan()).ln();
    (x, y)
}

fn mercator_unproject(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// The bounding box of every point seen so far, in GPS coordinates, plus the projected
/// web-mercator extent derived from it. Every `Pt2D` in a single pipeline run is relative to one
/// `GPSBounds` instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GPSBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,

    min_x: f64,
    max_y: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            max_lon: f64::MIN,
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_x: 0.0,
            max_y: 0.0,
        }
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
        self.recompute_projection();
    }

    pub fn from_points(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    fn recompute_projection(&mut self) {
        let (min_x, _) = mercator_project(self.min_lon, self.min_lat);
        let (_, max_y) = mercator_project(self.min_lon, self.max_lat);
        self.min_x = min_x;
        self.max_y = max_y;
    }

    /// Average latitude of the bounds, used to scale euclidean distances back to real meters
    /// away from the equator (`1 / cos(lat)` per spec.md's glossary entry for "web mercator
    /// meters").
    pub fn center_lat_rad(&self) -> f64 {
        ((self.min_lat + self.max_lat) / 2.0).to_radians()
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    pub fn convert(&self, pts: &[LonLat]) -> Vec<Pt2D> {
        pts.iter().map(|pt| pt.to_pt(self)).collect()
    }

    pub fn to_gps(&self, pt: Pt2D) -> LonLat {
        let (lon, lat) = mercator_unproject(pt.x() + self.min_x, self.max_y - pt.y());
        LonLat::new(lon, lat)
    }
}

impl Default for GPSBounds {
    fn default() -> GPSBounds {
        GPSBounds::new()
    }
}
