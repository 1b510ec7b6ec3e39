use geom::FindClosest;

use crate::graph::{NodeIdx, TransitGraph};

/// Step 2 of spec.md §4.B: for each degree-1 node, look for another nearby degree-1 node and
/// either merge them (both non-station) or bridge them with a new edge (one is a station, so it
/// must keep its own identity).
pub fn fix_gaps(graph: &mut TransitGraph, center_lat_rad: f64) {
    let search_radius_m = 1.0 / center_lat_rad.cos().max(0.01);

    let degree_one: Vec<NodeIdx> = graph
        .node_indices()
        .filter(|n| graph.undirected_degree(*n) == 1)
        .collect();

    let mut index = FindClosest::new(search_radius_m.max(5.0));
    for n in &degree_one {
        index.add(*n, graph.node(*n).pt);
    }

    let mut merged = std::collections::HashSet::new();
    for n in &degree_one {
        if merged.contains(n) {
            continue;
        }
        let pt = graph.node(*n).pt;
        let hit = index
            .all_within(pt, search_radius_m)
            .into_iter()
            .find(|(other, _, _)| other != n && !merged.contains(other));
        let Some((other, _, _)) = hit else {
            continue;
        };

        let n_is_station = graph.node(*n).is_station();
        let other_is_station = graph.node(other).is_station();

        if !n_is_station && !other_is_station {
            reroute_to(graph, other, *n);
            graph.delete_node(other);
            merged.insert(*n);
            merged.insert(other);
        } else {
            bridge(graph, *n, other);
            merged.insert(*n);
            merged.insert(other);
        }
    }
    graph.reindex();
}

/// Rewrites every edge endpoint referencing `from` to instead reference `into`, then relies on
/// the caller to delete `from`.
fn reroute_to(graph: &mut TransitGraph, from: NodeIdx, into: NodeIdx) {
    for e in graph.edge_indices().collect::<Vec<_>>() {
        let edge = graph.edge_mut(e);
        if edge.from == from {
            edge.from = into;
        }
        if edge.to == from {
            edge.to = into;
        }
    }
}

fn bridge(graph: &mut TransitGraph, a: NodeIdx, b: NodeIdx) {
    let pa = graph.node(a).pt;
    let pb = graph.node(b).pt;
    let geom = geom::PolyLine::must_new(vec![pa, pb]);
    let length = pa.dist_to(pb);
    graph.add_edge(crate::graph::Edge {
        from: a,
        to: b,
        geom,
        length_m: length,
        max_speed_kmh: None,
        level: 7,
        one_way: 0,
        restricted: false,
        reversed: false,
        lines: Vec::new(),
        track: None,
        deleted: false,
    });
}
