use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use fs_err::File;
use geom::{GPSBounds, PolyLine};

use crate::model::ShapePoint;

/// Writes `shapes.txt` for a batch of trip shapes (spec.md §4.C step 5). `dist_unit_per_meter`
/// converts web-mercator meters to the feed's configured distance unit; `1.0` (meters) matches
/// `shapes.txt`'s usual convention and is the only unit SPEC_FULL.md commits to supporting.
pub fn write_shapes(
    dir: &Path,
    shapes: &HashMap<String, PolyLine>,
    gps_bounds: &GPSBounds,
    dist_unit_per_meter: f64,
) -> Result<()> {
    let path = dir.join("shapes.txt");
    let file = File::create(&path).with_context(|| format!("creating {path:?}"))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut shape_ids: Vec<&String> = shapes.keys().collect();
    shape_ids.sort();
    for shape_id in shape_ids {
        let polyline = &shapes[shape_id];
        let mut cumulative_m = 0.0;
        let pts = polyline.points();
        for (seq, pt) in pts.iter().enumerate() {
            if seq > 0 {
                cumulative_m += pts[seq - 1].dist_to(*pt);
            }
            let gps = gps_bounds.to_gps(*pt);
            writer.serialize(ShapePoint {
                shape_id: shape_id.clone(),
                shape_pt_lat: gps.latitude,
                shape_pt_lon: gps.longitude,
                shape_pt_sequence: seq as u32,
                shape_dist_traveled: cumulative_m * dist_unit_per_meter,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Rewrites `trips.txt`'s `shape_id` column in place for every trip named in `trip_shape_ids`,
/// preserving every other column and row untouched.
pub fn rewrite_trip_shapes(dir: &Path, trip_shape_ids: &HashMap<String, String>) -> Result<()> {
    let path = dir.join("trips.txt");
    let mut reader =
        csv::Reader::from_path(&path).with_context(|| format!("reading {path:?}"))?;
    let headers = reader.headers()?.clone();
    let trip_id_col = headers
        .iter()
        .position(|h| h == "trip_id")
        .context("trips.txt missing trip_id column")?;
    let shape_id_col = headers.iter().position(|h| h == "shape_id");

    let mut rows = Vec::new();
    for rec in reader.records() {
        let mut rec = rec?;
        let trip_id = rec.get(trip_id_col).unwrap_or("").to_string();
        if let Some(shape_id) = trip_shape_ids.get(&trip_id) {
            if let Some(col) = shape_id_col {
                rec = replace_field(&rec, col, shape_id);
            }
        }
        rows.push(rec);
    }

    let mut headers_out = headers.clone();
    if shape_id_col.is_none() {
        headers_out.push_field("shape_id");
    }
    let file = File::create(&path).with_context(|| format!("rewriting {path:?}"))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&headers_out)?;
    for rec in rows {
        if shape_id_col.is_none() {
            let trip_id = rec.get(trip_id_col).unwrap_or("").to_string();
            let shape_id = trip_shape_ids.get(&trip_id).cloned().unwrap_or_default();
            let mut extended = rec.clone();
            extended.push_field(&shape_id);
            writer.write_record(&extended)?;
        } else {
            writer.write_record(&rec)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn replace_field(rec: &csv::StringRecord, col: usize, value: &str) -> csv::StringRecord {
    let mut out = csv::StringRecord::new();
    for (i, field) in rec.iter().enumerate() {
        if i == col {
            out.push_field(value);
        } else {
            out.push_field(field);
        }
    }
    out
}
