use std::collections::HashMap;

use abstutil::Timer;
use geom::PolyLine;
use mot_config::{CompiledNormalizer, MotConfig};
use osm_reader::{ExtractedWay, NodeID, OsmExtract, WayID};

use crate::collapse::{collapse_corridors, delete_orphan_edges, delete_orphan_nodes};
use crate::component::label_components;
use crate::context::GraphContext;
use crate::gaps::fix_gaps;
use crate::graph::{Edge, NodeIdx, NodeKind, TransitGraph};
use crate::lines::{LineTable, TransitEdgeLine};
use crate::reverse::{add_self_edges_for_isolated_stations, write_reverse_partners};
use crate::restrictor::Restrictor;
use crate::simplify::{simplify_geometries, write_geometries};
use crate::snap::{snap_stations, StopInput, StopMap};
use crate::station::{GroupId, StationGroupTable, StationInfo};

/// Runs the fixed-order 12-step pipeline of spec.md §4.B over one MOT's filtered OSM extract,
/// producing a routable `GraphContext` plus the stop→node mapping `F`. Each step is logged at
/// `debug` with before/after node+edge counts (SPEC_FULL.md §4.B's ambient addition).
pub fn build(
    extract: OsmExtract,
    stops: &[StopInput],
    center_lat_rad: f64,
    mot: &MotConfig,
    timer: &mut Timer,
) -> (GraphContext, StopMap) {
    let mut graph = TransitGraph::new();
    let mut lines = LineTable::new();
    let mut restrictor = Restrictor::new();

    // Compiled once per build (spec.md §6): a bad regex is caught at `mot_config::load` time, so
    // a compile failure here only happens for a `MotConfig` built directly (e.g. tests), in which
    // case normalization degrades to a no-op rather than aborting the build.
    let station_normalizer = mot.station_normalizer.compile().unwrap_or_default();
    let track_normalizer = mot.track_normalizer.compile().unwrap_or_default();
    let line_normalizer = mot.line_normalizer.compile().unwrap_or_default();

    timer.start("materialize nodes and edges");
    let mut node_ids: HashMap<NodeID, NodeIdx> = HashMap::new();
    let mut way_edges: HashMap<WayID, Vec<(NodeID, NodeID, crate::graph::EdgeIdx)>> = HashMap::new();
    for way in &extract.ways {
        materialize_way(
            &extract,
            way,
            mot,
            &station_normalizer,
            &track_normalizer,
            &line_normalizer,
            &mut graph,
            &mut lines,
            &mut node_ids,
            &mut way_edges,
        );
    }
    timer.stop("materialize nodes and edges");
    log_counts(timer, "after materialize", &graph);

    timer.start("apply restrictions");
    apply_restrictions(&extract, &node_ids, &way_edges, &mut restrictor);
    timer.stop("apply restrictions");

    let mut ctx = GraphContext {
        graph,
        lines,
        restrictor,
        groups: StationGroupTable::new(),
        components: Vec::new(),
    };

    // Step 1 (supplemental, spec.md §4.A pass 3): cluster OSM-native station nodes sharing
    // `station_group_rule`'s tag key into `StationGroup`s before any GTFS stop ever gets
    // snapped, the same way pfaedle's `osm_builder::get_station_info` does it.
    timer.start("group osm stations");
    group_osm_stations(&extract, &node_ids, mot, &mut ctx.graph, &mut ctx.groups);
    timer.stop("group osm stations");

    // Step 2.
    timer.start("fix gaps");
    fix_gaps(&mut ctx.graph, center_lat_rad);
    timer.stop("fix gaps");
    log_counts(timer, "after fix gaps", &ctx.graph);

    // Step 3.
    timer.start("write geometries");
    write_geometries(&mut ctx.graph);
    timer.stop("write geometries");

    // Step 4 + §4.B.1.
    timer.start("snap stations");
    let stop_map = snap_stations(&mut ctx, stops, mot, &station_normalizer, &track_normalizer);
    timer.stop("snap stations");
    log_counts(timer, "after snap stations", &ctx.graph);

    // Step 5.
    timer.start("delete orphan nodes");
    delete_orphan_nodes(&mut ctx.graph);
    timer.stop("delete orphan nodes");

    // Step 6.
    timer.start("delete orphan edges");
    delete_orphan_edges(&mut ctx.graph, mot.routing_options.full_turn_angle);
    timer.stop("delete orphan edges");

    // Step 7.
    timer.start("collapse corridors");
    collapse_corridors(&mut ctx.graph, &mut ctx.restrictor);
    timer.stop("collapse corridors");
    log_counts(timer, "after collapse", &ctx.graph);

    // Step 8.
    timer.start("repeat orphan removal");
    delete_orphan_nodes(&mut ctx.graph);
    delete_orphan_edges(&mut ctx.graph, mot.routing_options.full_turn_angle);
    timer.stop("repeat orphan removal");

    // Step 9.
    timer.start("label components");
    ctx.components = label_components(&mut ctx.graph);
    timer.stop("label components");

    // Step 10.
    timer.start("simplify geometries");
    simplify_geometries(&mut ctx.graph, 0.5);
    timer.stop("simplify geometries");

    // Step 11.
    timer.start("write reverse partners");
    write_reverse_partners(&mut ctx.graph, &mut ctx.restrictor);
    timer.stop("write reverse partners");

    // Step 12.
    timer.start("self-edges for isolated stations");
    add_self_edges_for_isolated_stations(&mut ctx.graph);
    timer.stop("self-edges for isolated stations");
    log_counts(timer, "final", &ctx.graph);

    (ctx, stop_map)
}

fn log_counts(timer: &mut Timer, label: &str, graph: &TransitGraph) {
    timer.note(format!(
        "{label}: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    ));
}

fn materialize_way(
    extract: &OsmExtract,
    way: &ExtractedWay,
    mot: &MotConfig,
    station_normalizer: &CompiledNormalizer,
    track_normalizer: &CompiledNormalizer,
    line_normalizer: &CompiledNormalizer,
    graph: &mut TransitGraph,
    lines: &mut LineTable,
    node_ids: &mut HashMap<NodeID, NodeIdx>,
    way_edges: &mut HashMap<WayID, Vec<(NodeID, NodeID, crate::graph::EdgeIdx)>>,
) {
    let line_ids: Vec<_> = way
        .transit_lines
        .iter()
        .map(|l| {
            lines.intern(TransitEdgeLine {
                from: line_normalizer.normalize(&l.from),
                to: line_normalizer.normalize(&l.to),
                short_name: line_normalizer.normalize(&l.short_name),
            })
        })
        .collect();

    for (n_ids, n_pts) in way.nodes.windows(2).zip(way.pts.windows(2)) {
        let from_id = n_ids[0];
        let to_id = n_ids[1];
        let from_idx = *node_ids.entry(from_id).or_insert_with(|| {
            graph.add_node(n_pts[0], node_kind_for(extract, mot, station_normalizer, track_normalizer, from_id))
        });
        let to_idx = *node_ids.entry(to_id).or_insert_with(|| {
            graph.add_node(n_pts[1], node_kind_for(extract, mot, station_normalizer, track_normalizer, to_id))
        });

        let geom = PolyLine::must_new(vec![n_pts[0], n_pts[1]]);
        let length = geom.length();
        let edge = Edge {
            from: from_idx,
            to: to_idx,
            geom,
            length_m: length,
            max_speed_kmh: way.max_speed_kmh,
            level: way.level,
            one_way: way.one_way,
            restricted: false,
            reversed: false,
            lines: line_ids.clone(),
            track: way.track.clone(),
            deleted: false,
        };
        let idx = graph.add_edge(edge);
        way_edges.entry(way.id).or_default().push((from_id, to_id, idx));
    }
}

/// spec.md §4.A/§4.B: a station node's display name and platform come from whichever OSM tag
/// keys the MOT config names (`station_name_rule.tag_key`, `platform_rule.tag_key`), not a
/// hardcoded `name`/`platform` — a rail MOT might key platform off `railway:ref`, for instance.
/// Both are run through the MOT's station/track normalizer, the same as the GTFS-side values
/// they'll later be compared against in `snap_stations`.
fn node_kind_for(
    extract: &OsmExtract,
    mot: &MotConfig,
    station_normalizer: &CompiledNormalizer,
    track_normalizer: &CompiledNormalizer,
    id: NodeID,
) -> NodeKind {
    match extract.nodes.get(&id) {
        Some(n) if n.is_blocker => NodeKind::Blocker,
        Some(n) if n.is_station => NodeKind::Station(StationInfo {
            name: n
                .tags
                .get(&mot.station_name_rule.tag_key)
                .map(|v| station_normalizer.normalize(v))
                .unwrap_or_default(),
            alt_names: Vec::new(),
            platform: n.tags.get(&mot.platform_rule.tag_key).map(|v| track_normalizer.normalize(v)),
            from_osm: true,
            group: None,
        }),
        _ => NodeKind::Plain,
    }
}

/// Clusters OSM-native station nodes into `StationGroup`s using `mot.station_group_rule`
/// (spec.md §4.A pass 3): nodes sharing the rule's tag key/value join the same group when one
/// already has a member within `max_dist` of the new node, otherwise they start a new group for
/// that value. A blank `tag_key` disables this pass (no rule configured for the MOT).
fn group_osm_stations(
    extract: &OsmExtract,
    node_ids: &HashMap<NodeID, NodeIdx>,
    mot: &MotConfig,
    graph: &mut TransitGraph,
    groups: &mut StationGroupTable,
) {
    let rule = &mot.station_group_rule;
    if rule.tag_key.is_empty() {
        return;
    }

    let mut groups_by_value: HashMap<String, Vec<GroupId>> = HashMap::new();
    for (osm_id, &node_idx) in node_ids {
        if !graph.node(node_idx).is_station() {
            continue;
        }
        let Some(value) = extract.nodes.get(osm_id).and_then(|n| n.tags.get(&rule.tag_key)) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let pt = graph.node(node_idx).pt;
        let candidates = groups_by_value.entry(value.clone()).or_default();
        let matching_group = candidates.iter().copied().find(|&group_id| {
            groups
                .get(group_id)
                .nodes
                .iter()
                .any(|&member| graph.node(member).pt.dist_to(pt) <= rule.max_dist)
        });

        let group_id = matching_group.unwrap_or_else(|| {
            let id = groups.new_group();
            candidates.push(id);
            id
        });
        groups.get_mut(group_id).nodes.push(node_idx);
        if let Some(info) = graph.node_mut(node_idx).station_info_mut() {
            info.group = Some(group_id);
        }
    }
}

/// Resolves each `RestrictionRule` (expressed in terms of ways) against the edges actually
/// materialized from those ways: the restriction's `from_way` must have an edge ending at `via`,
/// and `to_way` an edge starting at `via`.
fn apply_restrictions(
    extract: &OsmExtract,
    node_ids: &HashMap<NodeID, NodeIdx>,
    way_edges: &HashMap<WayID, Vec<(NodeID, NodeID, crate::graph::EdgeIdx)>>,
    restrictor: &mut Restrictor,
) {
    for rule in &extract.restrictions {
        let Some(via_idx) = node_ids.get(&rule.via) else {
            continue;
        };
        let Some(from_edges) = way_edges.get(&rule.from_way) else {
            continue;
        };
        let Some(to_edges) = way_edges.get(&rule.to_way) else {
            continue;
        };
        for (_, to_node, from_edge) in from_edges {
            if *to_node != rule.via {
                continue;
            }
            for (from_node, _, to_edge) in to_edges {
                if *from_node != rule.via {
                    continue;
                }
                if rule.positive {
                    restrictor.add_positive(*via_idx, *from_edge, *to_edge);
                } else {
                    restrictor.add_negative(*via_idx, *from_edge, *to_edge);
                }
            }
        }
    }
}
