use std::collections::HashMap;

use geom::{GPSBounds, LonLat, PolyLine};
use gtfs::{GtfsFeed, Route, Stop, StopTime, Trip, LOCATION_TYPE_STATION_ENTRANCE};
use mot_config::{MotConfig, Solver};
use transit_graph::{EdgeIdx, GraphContext, GroupId, StopMap, StopRef};

use crate::cache::RouterCache;
use crate::candidates::{edge_candidates, node_candidates, CandidateGroup, CandidateRoute};
use crate::greedy::{solve_greedy, solve_greedy2};
use crate::optim_graph::solve_global;
use crate::routing_attrs::RoutingAttributes;

/// One trip's output: either a materialized shape, or `None` when the trip degenerates per
/// spec.md §8's boundary behaviors (single stop, unreachable route) — logged, not an error.
pub struct TripShape {
    pub trip_id: String,
    pub shape_id: String,
    pub polyline: Option<PolyLine>,
}

/// Per-MOT, per-trip loop (spec.md §4.C) over `trips` — a slice of `feed.trips`, since spec.md
/// §5's parallel section splits the trip list across worker threads while `feed`'s routes/stops/
/// stop_times stay shared and read-only. `stop_map` is component B's stop -> station-group
/// mapping; `cache` is this worker thread's own `RouterCache` (spec.md §5 — never shared across
/// threads).
pub fn build_trip_shapes(
    ctx: &GraphContext,
    feed: &GtfsFeed,
    trips: &[Trip],
    stop_map: &StopMap,
    gps_bounds: &GPSBounds,
    mot: &MotConfig,
    cache: &mut RouterCache,
) -> Vec<TripShape> {
    let stops_by_id: HashMap<&str, &Stop> = feed.stops.iter().map(|s| (s.stop_id.as_str(), s)).collect();
    let routes_by_id: HashMap<&str, &Route> = feed.routes.iter().map(|r| (r.route_id.as_str(), r)).collect();

    let mut stop_times_by_trip: HashMap<&str, Vec<&StopTime>> = HashMap::new();
    for st in &feed.stop_times {
        stop_times_by_trip.entry(st.trip_id.as_str()).or_default().push(st);
    }
    for times in stop_times_by_trip.values_mut() {
        times.sort_by_key(|st| st.stop_sequence);
    }

    let mut out = Vec::new();
    for trip in trips {
        let Some(route) = routes_by_id.get(trip.route_id.as_str()) else {
            continue;
        };
        if !mot.gtfs_route_types.contains(&route.route_type) {
            continue;
        }
        let Some(times) = stop_times_by_trip.get(trip.trip_id.as_str()) else {
            continue;
        };

        // spec.md §4.C step 1: resolve station-entrance stops to their parent.
        let resolved_stop_ids: Vec<String> = times.iter().filter_map(|st| resolve_stop(&stops_by_id, &st.stop_id)).collect();

        if resolved_stop_ids.len() < 2 {
            log::warn!("trip {} has fewer than two stops; emitting an empty shape", trip.trip_id);
            out.push(stub(trip));
            continue;
        }
        if resolved_stop_ids.iter().all(|id| id == &resolved_stop_ids[0]) {
            // spec.md §8 boundary behavior: two identical consecutive stops (the whole trip
            // collapses to one stop) yields a degenerate one-point shape, not an error.
            out.push(TripShape {
                trip_id: trip.trip_id.clone(),
                shape_id: trip.shape_id.clone(),
                polyline: Some(PolyLine::dummy()),
            });
            continue;
        }

        let head_name = stop_name(&stops_by_id, &resolved_stop_ids[0]);
        let tail_name = stop_name(&stops_by_id, resolved_stop_ids.last().unwrap());
        let attrs = RoutingAttributes::from_trip(&route.route_short_name, &route.route_long_name, &head_name, &tail_name);

        let route_candidates: CandidateRoute = resolved_stop_ids
            .iter()
            .filter_map(|stop_id| {
                let stop = stops_by_id.get(stop_id.as_str())?;
                let group = stop_map.get(stop_id)?;
                Some(stop_candidate_group(ctx, *group, stop, gps_bounds, mot))
            })
            .collect();

        if route_candidates.len() != resolved_stop_ids.len() || route_candidates.iter().any(|g: &CandidateGroup| g.is_empty()) {
            log::warn!("trip {} has an unsnapped stop; emitting an empty shape", trip.trip_id);
            out.push(stub(trip));
            continue;
        }

        let edges = match mot.routing_options.solver {
            Solver::Global => solve_global(ctx, &route_candidates, &attrs, &mot.routing_options, cache),
            Solver::Greedy => solve_greedy(ctx, &route_candidates, &attrs, &mot.routing_options),
            Solver::Greedy2 => solve_greedy2(ctx, &route_candidates, &attrs, &mot.routing_options),
        };

        if edges.is_empty() {
            // spec.md §7 `NoPath` recovery: the whole trip is unreachable; a stub shape is still
            // written so the GTFS stop_times constraint is satisfied.
            log::warn!("trip {} found no route through the graph; emitting an empty shape", trip.trip_id);
            out.push(stub(trip));
            continue;
        }

        out.push(TripShape {
            trip_id: trip.trip_id.clone(),
            shape_id: trip.shape_id.clone(),
            polyline: Some(materialize(ctx, &edges)),
        });
    }
    out
}

fn stub(trip: &gtfs::Trip) -> TripShape {
    TripShape {
        trip_id: trip.trip_id.clone(),
        shape_id: trip.shape_id.clone(),
        polyline: None,
    }
}

fn resolve_stop(stops_by_id: &HashMap<&str, &Stop>, stop_id: &str) -> Option<String> {
    let stop = stops_by_id.get(stop_id)?;
    if stop.location_type == LOCATION_TYPE_STATION_ENTRANCE && !stop.parent_station.is_empty() {
        return Some(stop.parent_station.clone());
    }
    Some(stop_id.to_string())
}

fn stop_name(stops_by_id: &HashMap<&str, &Stop>, stop_id: &str) -> String {
    stops_by_id.get(stop_id).map(|s| s.stop_name.clone()).unwrap_or_default()
}

/// spec.md §4.C step 3: distance penalty plus platform-mismatch and non-OSM penalties, computed
/// per `(stop, station-group node)` pair via `candidates::node_candidates`.
fn stop_candidate_group(ctx: &GraphContext, group: GroupId, stop: &Stop, gps_bounds: &GPSBounds, mot: &MotConfig) -> CandidateGroup {
    let stop_ref = StopRef {
        stop_id: stop.stop_id.clone(),
        pt: LonLat::new(stop.stop_lon, stop.stop_lat).to_pt(gps_bounds),
        platform_code: Some(stop.platform_code.clone()).filter(|p| !p.is_empty()),
    };
    let nodes = node_candidates(ctx, group, &stop_ref, mot);
    edge_candidates(ctx, &nodes)
}

/// spec.md §4.C step 5: the returned per-hop edge list is concatenated into one polyline.
/// `PolyLine::extend` assumes a shared vertex between consecutive edges, which always holds here
/// since the router only ever relaxes an edge from its predecessor's `to` node.
fn materialize(ctx: &GraphContext, edges: &[EdgeIdx]) -> PolyLine {
    let mut pts = ctx.graph.edge(edges[0]).geom.clone();
    for &e in &edges[1..] {
        pts.extend(&ctx.graph.edge(e).geom);
    }
    pts
}

#[cfg(test)]
mod tests {
    use geom::{GPSBounds, Pt2D};
    use gtfs::{Route, Stop, StopTime, Trip};
    use transit_graph::{Edge, NodeKind, TransitGraph};

    use super::*;

    fn bare_mot() -> MotConfig {
        MotConfig {
            name: "bus".into(),
            gtfs_route_types: vec![3],
            node_filter: mot_config::TagFilter::default(),
            way_filter: mot_config::TagFilter::default(),
            relation_filter: mot_config::TagFilter::default(),
            level_table: mot_config::LevelTable {
                table: Default::default(),
                default_level: 2,
            },
            one_way_filter: mot_config::TagFilter::default(),
            station_filter: mot_config::TagFilter::default(),
            station_blocker_filter: mot_config::TagFilter::default(),
            station_group_rule: mot_config::DeepAttrRule {
                tag_key: "name".into(),
                max_dist: 50.0,
            },
            station_name_rule: mot_config::DeepAttrRule {
                tag_key: "name".into(),
                max_dist: 0.0,
            },
            platform_rule: mot_config::DeepAttrRule {
                tag_key: "platform".into(),
                max_dist: 0.0,
            },
            id_rule: mot_config::DeepAttrRule {
                tag_key: "ref".into(),
                max_dist: 0.0,
            },
            transit_line_rule: mot_config::DeepAttrRule {
                tag_key: "route_ref".into(),
                max_dist: 0.0,
            },
            edge_platform_rule: mot_config::DeepAttrRule {
                tag_key: "railway:track_ref".into(),
                max_dist: 0.0,
            },
            positive_restriction_filter: mot_config::TagFilter::default(),
            negative_restriction_filter: mot_config::TagFilter::default(),
            no_restriction_filter: mot_config::TagFilter::default(),
            station_normalizer: mot_config::NormalizerRules::default(),
            line_normalizer: mot_config::NormalizerRules::default(),
            track_normalizer: mot_config::NormalizerRules::default(),
            id_normalizer: mot_config::NormalizerRules::default(),
            routing_options: mot_config::RoutingOptions::default(),
        }
    }

    fn one_node_ctx() -> (GraphContext, StopMap) {
        let mut graph = TransitGraph::new();
        let a = graph.add_node(
            Pt2D::new(0.0, 0.0),
            NodeKind::Station(transit_graph::StationInfo {
                name: "A".into(),
                alt_names: Vec::new(),
                platform: None,
                from_osm: true,
                group: None,
            }),
        );
        let self_loop = graph.add_edge(Edge {
            from: a,
            to: a,
            geom: geom::PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(0.01, 0.0)]),
            length_m: 0.01,
            max_speed_kmh: None,
            level: 2,
            one_way: 0,
            restricted: false,
            reversed: false,
            lines: Vec::new(),
            track: None,
            deleted: false,
        });
        let mut groups = transit_graph::StationGroupTable::new();
        let group = groups.new_group();
        groups.get_mut(group).nodes.push(a);
        let _ = self_loop;
        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups,
            components: Vec::new(),
        };
        let mut stop_map = StopMap::new();
        stop_map.insert("stop-a".to_string(), group);
        (ctx, stop_map)
    }

    fn bare_route_and_trip() -> (Route, Trip) {
        (
            Route {
                route_id: "r1".into(),
                route_short_name: "1".into(),
                route_long_name: String::new(),
                route_type: 3,
            },
            Trip {
                trip_id: "t1".into(),
                route_id: "r1".into(),
                shape_id: "s1".into(),
            },
        )
    }

    /// spec.md §8 boundary behavior: a trip with only one stop_times row has no hop to route, so
    /// it emits a stub shape (`polyline: None`) rather than erroring.
    #[test]
    fn single_stop_trip_emits_a_stub() {
        let (ctx, stop_map) = one_node_ctx();
        let (route, trip) = bare_route_and_trip();
        let stop = Stop {
            stop_id: "stop-a".into(),
            stop_lat: 0.0,
            stop_lon: 0.0,
            stop_name: "A".into(),
            parent_station: String::new(),
            platform_code: String::new(),
            location_type: 0,
        };
        let feed = GtfsFeed {
            routes: vec![route],
            trips: vec![trip],
            stops: vec![stop],
            stop_times: vec![StopTime {
                trip_id: "t1".into(),
                stop_id: "stop-a".into(),
                stop_sequence: 1,
            }],
        };
        let gps_bounds = GPSBounds::from_points(&[geom::LonLat::new(-1.0, -1.0), geom::LonLat::new(1.0, 1.0)]);
        let mot = bare_mot();
        let mut cache = RouterCache::new();
        let shapes = build_trip_shapes(&ctx, &feed, &feed.trips, &stop_map, &gps_bounds, &mot, &mut cache);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].polyline.is_none());
    }

    /// spec.md §8 boundary behavior: a trip whose every stop resolves to the same stop collapses
    /// to a degenerate one-point shape instead of being treated as unreachable.
    #[test]
    fn identical_consecutive_stops_collapse_to_a_dummy_polyline() {
        let (ctx, stop_map) = one_node_ctx();
        let (route, trip) = bare_route_and_trip();
        let stop = Stop {
            stop_id: "stop-a".into(),
            stop_lat: 0.0,
            stop_lon: 0.0,
            stop_name: "A".into(),
            parent_station: String::new(),
            platform_code: String::new(),
            location_type: 0,
        };
        let feed = GtfsFeed {
            routes: vec![route],
            trips: vec![trip],
            stops: vec![stop],
            stop_times: vec![
                StopTime {
                    trip_id: "t1".into(),
                    stop_id: "stop-a".into(),
                    stop_sequence: 1,
                },
                StopTime {
                    trip_id: "t1".into(),
                    stop_id: "stop-a".into(),
                    stop_sequence: 2,
                },
            ],
        };
        let gps_bounds = GPSBounds::from_points(&[geom::LonLat::new(-1.0, -1.0), geom::LonLat::new(1.0, 1.0)]);
        let mot = bare_mot();
        let mut cache = RouterCache::new();
        let shapes = build_trip_shapes(&ctx, &feed, &feed.trips, &stop_map, &gps_bounds, &mot, &mut cache);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].polyline.is_some());
    }
}
