//! The error taxonomy of spec.md §7, as one `thiserror` enum shared by every core crate. The
//! policy column of that table is encoded in doc comments, not in the type: `StopSnapFailed` and
//! `NoPath` are always caught and logged by the component that raises them (see `transit_graph`
//! station snapping and `shape_router` routing) and never actually reach a caller as an `Err`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to parse OSM input: {0}")]
    OsmParse(String),

    #[error("bounding box contains no OSM nodes")]
    BoundingBoxEmpty,

    /// Recovered locally (transit_graph's snap pass falls back to a singleton group); kept in
    /// the enum because it is still a meaningful value to log and to use in tests.
    #[error("stop {0} could not be snapped to the graph")]
    StopSnapFailed(String),

    /// Recovered locally (the optim graph treats the hop as `inf` cost); see `shape_router`.
    #[error("no path between candidate groups for hop {0}")]
    NoPath(usize),

    #[error("invalid routing option: {0}")]
    InvalidRoutingOption(String),

    #[error("failed to write shape output: {0}")]
    ShapeWriteError(String),
}
