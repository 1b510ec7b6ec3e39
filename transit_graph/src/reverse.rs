use geom::PolyLine;

use crate::graph::{Edge, TransitGraph};
use crate::restrictor::Restrictor;

/// Step 11 of spec.md §4.B: for every edge `e=(u,v)` with no existing `(v,u)`, create a reversed
/// copy and mirror its restrictions (spec.md §3 invariant 1: every `oneWay∈{0,2}` edge has a
/// `reversed=true` partner with flipped one-way flags).
pub fn write_reverse_partners(graph: &mut TransitGraph, restrictor: &mut Restrictor) {
    let originals: Vec<_> = graph
        .edge_indices()
        .map(|e| (e, graph.edge(e).clone()))
        .collect();

    for (orig_idx, orig) in originals {
        if orig.one_way == 1 {
            continue;
        }
        let already_has_partner = graph
            .out_edges(orig.to)
            .any(|e| graph.edge(e).to == orig.from && graph.edge(e).reversed);
        if already_has_partner {
            continue;
        }
        let mut rev_pts: Vec<_> = orig.geom.points().clone();
        rev_pts.reverse();
        let reversed = Edge {
            from: orig.to,
            to: orig.from,
            geom: PolyLine::must_new(rev_pts),
            length_m: orig.length_m,
            max_speed_kmh: orig.max_speed_kmh,
            level: orig.level,
            one_way: if orig.one_way == 0 { 0 } else { 1 },
            restricted: orig.restricted,
            reversed: true,
            lines: orig.lines.clone(),
            track: orig.track.clone(),
            deleted: false,
        };
        let new_idx = graph.add_edge(reversed);
        restrictor.duplicate_edge(orig_idx, orig_idx, new_idx);
    }
}

/// Step 12 of spec.md §4.B: station nodes with no edges at all get a zero-length self-edge so the
/// router can originate a hop there.
pub fn add_self_edges_for_isolated_stations(graph: &mut TransitGraph) {
    for n in graph.node_indices().collect::<Vec<_>>() {
        if graph.node(n).is_station() && graph.undirected_degree(n) == 0 {
            let pt = graph.node(n).pt;
            graph.add_edge(Edge {
                from: n,
                to: n,
                geom: PolyLine::must_new(vec![pt, pt]),
                length_m: 0.0,
                max_speed_kmh: None,
                level: 0,
                one_way: 0,
                restricted: false,
                reversed: false,
                lines: Vec::new(),
                track: None,
                deleted: false,
            });
        }
    }
}
