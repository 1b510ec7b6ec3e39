//! CLI driver for the pipeline spec.md §1 describes: OSM + bounding box -> filtered element
//! stream (A) -> transit graph + stop map (B) -> per-trip routing (C, D) -> GTFS shapes out.
//! Thin by design (spec.md §1 treats the CLI/config parser as an external collaborator); the
//! orchestration below is the only thing this crate adds over `mot_config`/`osm_reader`/
//! `transit_graph`/`gtfs`/`shape_router`.

mod cli;

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use geom::{GPSBounds, LonLat};
use gtfs::GtfsFeed;
use mot_config::MotConfig;
use transit_graph::{GraphContext, StopInput, StopMap};

use crate::cli::Options;

fn main() -> Result<()> {
    env_logger::init();
    let opts = Options::parse();
    let mut timer = abstutil::Timer::new("transit_shapes");

    let feed = gtfs::read_feed(&opts.gtfs).with_context(|| format!("reading GTFS feed from {:?}", opts.gtfs))?;
    timer.note(format!(
        "loaded {} routes, {} trips, {} stops, {} stop_times",
        feed.routes.len(),
        feed.trips.len(),
        feed.stops.len(),
        feed.stop_times.len()
    ));

    let mots = load_mots(&opts)?;
    if mots.is_empty() {
        anyhow::bail!("no MOT configs selected (check --mot-config and --mot)");
    }

    let gps_bounds = feed_bounds(&feed, opts.bbox_padding_m);

    let mut shapes: HashMap<String, geom::PolyLine> = HashMap::new();
    let mut trip_shape_ids: HashMap<String, String> = HashMap::new();

    for mot in &mots {
        timer.start(format!("mot {}", mot.name));
        process_mot(&opts, &feed, &gps_bounds, mot, &mut shapes, &mut trip_shape_ids, &mut timer)?;
        timer.stop(format!("mot {}", mot.name));
    }

    if opts.drop_shapes {
        timer.note(format!("--drop-shapes set; not writing {} shapes", shapes.len()));
    } else {
        gtfs::write_shapes(&opts.gtfs, &shapes, &gps_bounds, 1.0).context("writing shapes.txt")?;
        gtfs::rewrite_trip_shapes(&opts.gtfs, &trip_shape_ids).context("rewriting trips.txt")?;
        timer.note(format!("wrote {} shapes for {} trips", shapes.len(), trip_shape_ids.len()));
    }

    timer.done();
    Ok(())
}

fn load_mots(opts: &Options) -> Result<Vec<MotConfig>> {
    let all = mot_config::load(&opts.mot_config).with_context(|| format!("loading MOT config {:?}", opts.mot_config))?;
    let selected = if opts.mots.is_empty() {
        all
    } else {
        all.into_iter().filter(|m| opts.mots.contains(&m.name)).collect()
    };
    Ok(selected
        .into_iter()
        .map(|mut m| {
            if let Some(method) = opts.matching_method {
                m.routing_options.solver = method.into();
            }
            if opts.no_cache {
                m.routing_options.use_caching = false;
            }
            m
        })
        .collect())
}

/// spec.md §6's "bounding box padding" flag, applied to the feed's own stop extent rather than
/// the OSM file's `<bounds>` element — we only need the slice of the planet that covers this
/// feed's stops, and `osm_reader::read` trusts a supplied non-empty `GPSBounds` over the file's
/// own bounds (see that function's doc comment).
fn feed_bounds(feed: &GtfsFeed, padding_m: f64) -> GPSBounds {
    let pts: Vec<LonLat> = feed.stops.iter().map(|s| LonLat::new(s.stop_lon, s.stop_lat)).collect();
    let mut bounds = GPSBounds::from_points(&pts);
    if padding_m <= 0.0 {
        return bounds;
    }
    let center_lat_rad = bounds.center_lat_rad();
    let lat_pad = padding_m / 111_320.0;
    let lon_pad = padding_m / (111_320.0 * center_lat_rad.cos().max(1e-6));
    bounds.update(LonLat::new(bounds.min_lon - lon_pad, bounds.min_lat - lat_pad));
    bounds.update(LonLat::new(bounds.max_lon + lon_pad, bounds.max_lat + lat_pad));
    bounds
}

fn process_mot(
    opts: &Options,
    feed: &GtfsFeed,
    gps_bounds: &GPSBounds,
    mot: &MotConfig,
    shapes: &mut HashMap<String, geom::PolyLine>,
    trip_shape_ids: &mut HashMap<String, String>,
    timer: &mut abstutil::Timer,
) -> Result<()> {
    let doc = osm_reader::read(opts.osm.to_str().context("non-UTF8 --osm path")?, gps_bounds, timer)?;
    let extract = osm_reader::extract(&doc, mot, timer);

    let stops = stop_inputs(feed, gps_bounds);
    let (ctx, stop_map) = transit_graph::build(extract, &stops, gps_bounds.center_lat_rad(), mot, timer);

    let trip_shapes = build_shapes_parallel(&ctx, feed, &stop_map, gps_bounds, mot, opts.workers);
    for shape in trip_shapes {
        let Some(polyline) = shape.polyline else {
            continue;
        };
        let shape_id = if shape.shape_id.is_empty() {
            format!("generated-{}", shape.trip_id)
        } else {
            shape.shape_id
        };
        trip_shape_ids.insert(shape.trip_id, shape_id.clone());
        shapes.insert(shape_id, polyline);
    }
    Ok(())
}

/// spec.md §4.B.1's snap input: every non-entrance stop, since entrance resolution (§4.C step 1)
/// collapses `location_type=STATION_ENTRANCE` stops onto their parent before any lookup into the
/// stop->group map this produces.
fn stop_inputs(feed: &GtfsFeed, gps_bounds: &GPSBounds) -> Vec<StopInput> {
    feed.stops
        .iter()
        .filter(|s| s.location_type != gtfs::LOCATION_TYPE_STATION_ENTRANCE)
        .map(|s| StopInput {
            stop_id: s.stop_id.clone(),
            pt: LonLat::new(s.stop_lon, s.stop_lat).to_pt(gps_bounds),
            name: s.stop_name.clone(),
            platform_code: Some(s.platform_code.clone()).filter(|p| !p.is_empty()),
        })
        .collect()
}

/// spec.md §5's parallel section: the trip list is split across `workers` OS threads, each
/// holding its own `RouterCache` (never shared); the graph, stop map, station groups, restrictor,
/// and line table are read-only for the whole section.
fn build_shapes_parallel(
    ctx: &GraphContext,
    feed: &GtfsFeed,
    stop_map: &StopMap,
    gps_bounds: &GPSBounds,
    mot: &MotConfig,
    workers: usize,
) -> Vec<shape_router::TripShape> {
    let workers = workers.max(1);
    let chunk_size = feed.trips.len().div_ceil(workers).max(1);
    let chunks: Vec<&[gtfs::Trip]> = feed.trips.chunks(chunk_size).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                scope.spawn(move || {
                    let mut cache = shape_router::RouterCache::new();
                    shape_router::build_trip_shapes(ctx, feed, chunk, stop_map, gps_bounds, mot, &mut cache)
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap_or_default()).collect()
    })
}
