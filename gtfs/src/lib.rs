//! GTFS CSV I/O — deliberately out of scope for the core per spec.md §1 ("GTFS parsing and
//! writing ... treated as external collaborators"), but still needed end-to-end: plain
//! `csv` + `serde` row structs, one per file.

mod model;
mod reader;
mod writer;

pub use crate::model::{Route, ShapePoint, Stop, StopTime, Trip, LOCATION_TYPE_STATION_ENTRANCE};
pub use crate::reader::{read_feed, GtfsFeed};
pub use crate::writer::{rewrite_trip_shapes, write_shapes};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use geom::{GPSBounds, LonLat, Pt2D};

    use super::*;

    #[test]
    fn write_shapes_accumulates_distance() {
        let dir = std::env::temp_dir().join(format!("gtfs_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let bounds = GPSBounds::from_points(&[LonLat::new(-122.4, 47.6), LonLat::new(-122.3, 47.7)]);
        let mut shapes = HashMap::new();
        shapes.insert(
            "shp1".to_string(),
            geom::PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(100.0, 0.0)]),
        );
        write_shapes(&dir, &shapes, &bounds, 1.0).unwrap();

        let written = std::fs::read_to_string(dir.join("shapes.txt")).unwrap();
        assert!(written.contains("shp1"));
        assert!(written.contains("100"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
