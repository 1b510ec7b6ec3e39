use geom::PolyLine;

use crate::graph::TransitGraph;

/// Step 3 of spec.md §4.B: every edge gets a two-point polyline `[fromGeom, toGeom]` (unless one
/// was already populated, e.g. from the original way geometry) and its length set to the
/// web-mercator meter distance.
pub fn write_geometries(graph: &mut TransitGraph) {
    for e in graph.edge_indices().collect::<Vec<_>>() {
        let (from, to) = {
            let edge = graph.edge(e);
            (edge.from, edge.to)
        };
        let from_pt = graph.node(from).pt;
        let to_pt = graph.node(to).pt;
        let edge = graph.edge_mut(e);
        if edge.geom.points().len() < 2 {
            edge.geom = PolyLine::must_new(vec![from_pt, to_pt]);
        }
        edge.length_m = edge.geom.length();
    }
}

/// Step 10 of spec.md §4.B: Douglas-Peucker simplification per edge, tolerance in meters.
pub fn simplify_geometries(graph: &mut TransitGraph, tolerance: f64) {
    for e in graph.edge_indices().collect::<Vec<_>>() {
        let simplified = graph.edge(e).geom.simplify(tolerance);
        graph.edge_mut(e).geom = simplified;
    }
}
