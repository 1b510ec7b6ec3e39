use std::collections::HashMap;

use geom::{FindClosest, Pt2D};
use mot_config::{CompiledNormalizer, MotConfig};

use crate::context::GraphContext;
use crate::graph::{Edge, EdgeIdx, NodeIdx, NodeKind};
use crate::station::{GroupId, StationInfo, StopRef};

/// One GTFS stop, as seen by the transit-graph builder (spec.md §4.B.1). `transit_shapes`/`gtfs`
/// resolve `location_type=STATION_ENTRANCE` to its parent before constructing this.
pub struct StopInput {
    pub stop_id: String,
    pub pt: Pt2D,
    pub name: String,
    pub platform_code: Option<String>,
}

/// The stop→node mapping `F` of spec.md §3: every in-scope stop maps to the station group
/// holding its candidate nodes.
pub type StopMap = HashMap<String, GroupId>;

/// Step 4 of spec.md §4.B, detailed in §4.B.1. Runs the ascending snap-distance ladder, then a
/// second aggressive pass permitting orphan-OSM-station snaps, then falls back to a synthetic
/// singleton group so `F` is total over every in-scope stop (spec.md §3 invariant 6).
///
/// `station_normalizer`/`track_normalizer` are applied to each stop's name/platform up front, the
/// same normalizers `transit_graph::build` already ran over the OSM-side station name/platform —
/// without this, an OSM station run through a normalizer and a GTFS stop that isn't would never
/// compare as a name match even when they really are the same place.
pub fn snap_stations(
    ctx: &mut GraphContext,
    stops: &[StopInput],
    mot: &MotConfig,
    station_normalizer: &CompiledNormalizer,
    track_normalizer: &CompiledNormalizer,
) -> StopMap {
    let normalized: Vec<StopInput> = stops
        .iter()
        .map(|s| StopInput {
            stop_id: s.stop_id.clone(),
            pt: s.pt,
            name: station_normalizer.normalize(&s.name),
            platform_code: s.platform_code.as_deref().map(|p| track_normalizer.normalize(p)),
        })
        .collect();
    let stops = &normalized;

    let mut stop_map = StopMap::new();

    for d in &mot.routing_options.snap_distances {
        for stop in stops {
            if stop_map.contains_key(&stop.stop_id) {
                continue;
            }
            if let Some(group) = try_snap(ctx, stop, *d, mot, false) {
                stop_map.insert(stop.stop_id.clone(), group);
            }
        }
    }

    // Second, aggressive pass: permit snapping to orphan OSM stations regardless of name
    // similarity, per spec.md §4.B.1's "second aggressive pass".
    let max_d = mot
        .routing_options
        .snap_distances
        .last()
        .copied()
        .unwrap_or(75.0);
    for stop in stops {
        if stop_map.contains_key(&stop.stop_id) {
            continue;
        }
        if let Some(group) = try_snap(ctx, stop, max_d, mot, true) {
            stop_map.insert(stop.stop_id.clone(), group);
        }
    }

    // Last resort: a synthetic singleton so every stop has a group to route through.
    for stop in stops {
        if stop_map.contains_key(&stop.stop_id) {
            continue;
        }
        log::warn!("stop {} could not be snapped; creating singleton group", stop.stop_id);
        let node = ctx.graph.add_node(
            stop.pt,
            NodeKind::Station(StationInfo {
                name: stop.name.clone(),
                alt_names: Vec::new(),
                platform: stop.platform_code.clone(),
                from_osm: false,
                group: None,
            }),
        );
        let group = ctx.groups.new_group();
        attach_node_to_group(ctx, node, group);
        ctx.groups.get_mut(group).stops.push(StopRef {
            stop_id: stop.stop_id.clone(),
            pt: stop.pt,
            platform_code: stop.platform_code.clone(),
        });
        stop_map.insert(stop.stop_id.clone(), group);
    }

    stop_map
}

fn attach_node_to_group(ctx: &mut GraphContext, node: NodeIdx, group: GroupId) {
    ctx.groups.get_mut(group).nodes.push(node);
    if let Some(info) = ctx.graph.node_mut(node).station_info_mut() {
        info.group = Some(group);
    }
}

fn try_snap(ctx: &mut GraphContext, stop: &StopInput, d: f64, mot: &MotConfig, orphan_pass: bool) -> Option<GroupId> {
    let mut index: FindClosest<EdgeIdx> = FindClosest::new(d.max(5.0));
    for e in ctx.graph.edge_indices() {
        let edge = ctx.graph.edge(e);
        let from = ctx.graph.node(edge.from).pt;
        let to = ctx.graph.node(edge.to).pt;
        let mid = Pt2D::new((from.x() + to.x()) / 2.0, (from.y() + to.y()) / 2.0);
        index.add(e, mid);
    }

    let candidates = index.all_within(stop.pt, d);
    for (e, _, _) in candidates {
        if ctx.graph.edge(e).level > mot.routing_options.max_snap_level {
            continue;
        }
        let edge = ctx.graph.edge(e).clone();
        let from_pt = ctx.graph.node(edge.from).pt;
        let to_pt = ctx.graph.node(edge.to).pt;
        let g = project_on(from_pt, stop.pt, to_pt);

        if reaches_blocker(ctx, edge.from, edge.to, d * 2.0) {
            continue;
        }
        if let Some(group) = find_equivalent_station(ctx, edge.from, edge.to, &stop.name, d * 2.0, orphan_pass) {
            attach_stop_to_existing(ctx, group, stop);
            return Some(group);
        }

        if from_pt.dist_to(g) <= 2.0 && ctx.graph.node(edge.from).station_info().is_none() && !ctx.graph.node(edge.from).is_blocker() {
            return Some(adopt_endpoint(ctx, edge.from, stop));
        }
        if to_pt.dist_to(g) <= 2.0 && ctx.graph.node(edge.to).station_info().is_none() && !ctx.graph.node(edge.to).is_blocker() {
            return Some(adopt_endpoint(ctx, edge.to, stop));
        }

        return Some(split_edge_for_stop(ctx, e, g, stop));
    }
    None
}

fn project_on(a: Pt2D, p: Pt2D, b: Pt2D) -> Pt2D {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = ((p.x() - a.x()) * dx + (p.y() - a.y()) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    Pt2D::new(a.x() + t * dx, a.y() + t * dy)
}

/// A coarse stand-in for spec.md §4.B.1's bounded "blocker reach" DFS: checks whether either
/// endpoint of the candidate edge is itself a blocker within one hop. Full multi-hop DFS is not
/// performed, documented as a scoping simplification in DESIGN.md.
fn reaches_blocker(ctx: &GraphContext, from: NodeIdx, to: NodeIdx, _max_dist: f64) -> bool {
    ctx.graph.node(from).is_blocker() || ctx.graph.node(to).is_blocker()
}

/// A coarse stand-in for the "equivalence reach" DFS: looks only at the edge's own endpoints for
/// an existing station whose name similarity to `stop_name` exceeds 0.5 (or, during the orphan
/// pass, any existing orphan station regardless of similarity).
fn find_equivalent_station(
    ctx: &GraphContext,
    from: NodeIdx,
    to: NodeIdx,
    stop_name: &str,
    _max_dist: f64,
    orphan_pass: bool,
) -> Option<GroupId> {
    for n in [from, to] {
        if let Some(info) = ctx.graph.node(n).station_info() {
            if orphan_pass && !info.from_osm {
                return info.group;
            }
            if info.similarity(stop_name) > 0.5 {
                return info.group;
            }
        }
    }
    None
}

fn attach_stop_to_existing(ctx: &mut GraphContext, group: GroupId, stop: &StopInput) {
    ctx.groups.get_mut(group).stops.push(StopRef {
        stop_id: stop.stop_id.clone(),
        pt: stop.pt,
        platform_code: stop.platform_code.clone(),
    });
}

fn adopt_endpoint(ctx: &mut GraphContext, node: NodeIdx, stop: &StopInput) -> GroupId {
    let group = ctx.groups.new_group();
    ctx.graph.node_mut(node).kind = NodeKind::Station(StationInfo {
        name: stop.name.clone(),
        alt_names: Vec::new(),
        platform: stop.platform_code.clone(),
        from_osm: true,
        group: Some(group),
    });
    attach_node_to_group(ctx, node, group);
    attach_stop_to_existing(ctx, group, stop);
    group
}

fn split_edge_for_stop(ctx: &mut GraphContext, e: EdgeIdx, g: Pt2D, stop: &StopInput) -> GroupId {
    let group = ctx.groups.new_group();
    let new_node = ctx.graph.add_node(
        g,
        NodeKind::Station(StationInfo {
            name: stop.name.clone(),
            alt_names: Vec::new(),
            platform: stop.platform_code.clone(),
            from_osm: false,
            group: Some(group),
        }),
    );
    attach_node_to_group(ctx, new_node, group);
    attach_stop_to_existing(ctx, group, stop);

    let orig = ctx.graph.edge(e).clone();
    let e1 = ctx.graph.add_edge(Edge {
        from: orig.from,
        to: new_node,
        geom: geom::PolyLine::must_new(vec![ctx.graph.node(orig.from).pt, g]),
        length_m: 0.0,
        ..orig.clone()
    });
    let e2 = ctx.graph.add_edge(Edge {
        from: new_node,
        to: orig.to,
        geom: geom::PolyLine::must_new(vec![g, ctx.graph.node(orig.to).pt]),
        length_m: 0.0,
        ..orig.clone()
    });
    {
        let e1_len = ctx.graph.edge(e1).geom.length();
        ctx.graph.edge_mut(e1).length_m = e1_len;
        let e2_len = ctx.graph.edge(e2).geom.length();
        ctx.graph.edge_mut(e2).length_m = e2_len;
    }
    ctx.graph.delete_edge(e);
    ctx.restrictor.duplicate_edge(e, e1, e2);
    ctx.graph.reindex();
    group
}
