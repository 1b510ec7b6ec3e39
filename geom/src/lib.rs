//! Geometry primitives shared by the OSM reader, transit-graph builder, and router. Treated as
//! an external collaborator by spec.md §1 ("assumed as a dependency"); implemented here as a thin
//! workspace crate, a path dependency rather than a published one.

mod distance;
mod find_closest;
mod lonlat;
mod polyline;
mod pt2d;

pub use crate::distance::Distance;
pub use crate::find_closest::FindClosest;
pub use crate::lonlat::{GPSBounds, LonLat};
pub use crate::polyline::PolyLine;
pub use crate::pt2d::{Angle, HashablePt2D, Pt2D};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mercator_round_trips() {
        let bounds = GPSBounds::from_points(&[LonLat::new(-122.4, 47.6), LonLat::new(-122.3, 47.7)]);
        let gps = LonLat::new(-122.35, 47.65);
        let pt = gps.to_pt(&bounds);
        let back = bounds.to_gps(pt);
        assert!((back.longitude - gps.longitude).abs() < 1e-6);
        assert!((back.latitude - gps.latitude).abs() < 1e-6);
    }

    #[test]
    fn polyline_simplify_keeps_endpoints() {
        let pl = PolyLine::must_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(1.0, 0.01),
            Pt2D::new(2.0, 0.0),
            Pt2D::new(10.0, 0.0),
        ]);
        let simplified = pl.simplify(0.5);
        assert_eq!(simplified.first_pt().x(), 0.0);
        assert_eq!(simplified.last_pt().x(), 10.0);
        assert!(simplified.points().len() <= pl.points().len());
    }

    #[test]
    fn find_closest_returns_nearest_first() {
        let mut idx = FindClosest::new(50.0);
        idx.add(1, Pt2D::new(0.0, 0.0));
        idx.add(2, Pt2D::new(5.0, 0.0));
        idx.add(3, Pt2D::new(100.0, 0.0));
        let hits = idx.all_within(Pt2D::new(1.0, 0.0), 20.0);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 2);
    }
}
