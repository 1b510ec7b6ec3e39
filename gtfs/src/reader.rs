use std::path::Path;

use anyhow::{Context, Result};
use fs_err::File;

use crate::model::{Route, Stop, StopTime, Trip};

/// The feed's four required files (spec.md §6), already parsed; location-type-2 (station
/// entrance) resolution happens downstream in `transit_shapes`, not here, since it needs the
/// parent/child relationship across stops rather than anything CSV-specific.
pub struct GtfsFeed {
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stops: Vec<Stop>,
    pub stop_times: Vec<StopTime>,
}

pub fn read_feed(dir: &Path) -> Result<GtfsFeed> {
    Ok(GtfsFeed {
        routes: read_csv(&dir.join("routes.txt"))?,
        trips: read_csv(&dir.join("trips.txt"))?,
        stops: read_csv(&dir.join("stops.txt"))?,
        stop_times: read_csv(&dir.join("stop_times.txt"))?,
    })
}

fn read_csv<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    let mut out = Vec::new();
    for rec in csv::Reader::from_reader(file).deserialize() {
        out.push(rec.with_context(|| format!("parsing a row of {path:?}"))?);
    }
    Ok(out)
}
