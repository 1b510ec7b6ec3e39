use serde::{Deserialize, Serialize};

/// GTFS `location_type` values relevant to stop resolution (spec.md §6): entrances resolve to
/// their parent station before a trip's stop sequence is built.
pub const LOCATION_TYPE_STATION_ENTRANCE: u8 = 2;

#[derive(Clone, Debug, Deserialize)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    #[serde(default)]
    pub shape_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub stop_name: String,
    #[serde(default)]
    pub parent_station: String,
    #[serde(default)]
    pub platform_code: String,
    #[serde(default)]
    pub location_type: u8,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// One row of `shapes.txt`, ready to write (spec.md §4.C step 5: cumulative distance travelled,
/// already converted to the feed's distance unit).
#[derive(Clone, Debug, Serialize)]
pub struct ShapePoint {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
    pub shape_dist_traveled: f64,
}
