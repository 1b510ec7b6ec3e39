use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use geom::Pt2D;
use mot_config::RoutingOptions;
use transit_graph::{EdgeIdx, GraphContext};

use crate::cost::{edge_entry_cost, EdgeCost};
use crate::routing_attrs::RoutingAttributes;

pub struct SearchResult {
    pub cost: EdgeCost,
    pub edges: Vec<EdgeIdx>,
}

#[derive(Clone, Copy)]
struct Frontier {
    scalar: f64,
    edge: EdgeIdx,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.scalar == other.scalar
    }
}
impl Eq for Frontier {}
impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Frontier {
    // `BinaryHeap` is a max-heap; reverse the comparison to get a min-heap on `scalar`.
    fn cmp(&self, other: &Self) -> Ordering {
        other.scalar.partial_cmp(&self.scalar).unwrap_or(Ordering::Equal)
    }
}

/// Pen-free hop search from a single source edge to a single target edge (spec.md §4.D). Used
/// by the router cache, which keys its entries `routingAttrs -> fromEdge -> toEdge` without any
/// per-stop penalty baked in, since the same edge pair is reused across different stops' pens.
pub fn search_hop(
    ctx: &GraphContext,
    source: EdgeIdx,
    target: EdgeIdx,
    attrs: &RoutingAttributes,
    opts: &RoutingOptions,
    max_d: f64,
) -> Option<SearchResult> {
    search_core(ctx, &[source], &[target], attrs, opts, max_d)
}

/// Pen-free hop search from any of several source edges to any of several target edges. Used by
/// the greedy/greedy2 solvers (group-to-group and chained-endpoint-to-group respectively) and by
/// the hop-band pilot run.
pub fn search_hop_multi(
    ctx: &GraphContext,
    sources: &[EdgeIdx],
    targets: &[EdgeIdx],
    attrs: &RoutingAttributes,
    opts: &RoutingOptions,
    max_d: f64,
) -> Option<SearchResult> {
    search_core(ctx, sources, targets, attrs, opts, max_d)
}

fn search_core(
    ctx: &GraphContext,
    sources: &[EdgeIdx],
    targets: &[EdgeIdx],
    attrs: &RoutingAttributes,
    opts: &RoutingOptions,
    max_d: f64,
) -> Option<SearchResult> {
    if sources.is_empty() || targets.is_empty() {
        return None;
    }
    let target_set: std::collections::HashSet<EdgeIdx> = targets.iter().copied().collect();
    let target_pts: Vec<Pt2D> = targets.iter().map(|&e| ctx.graph.edge(e).geom.last_pt()).collect();

    let mut best_scalar: HashMap<EdgeIdx, f64> = HashMap::new();
    let mut best_cost: HashMap<EdgeIdx, EdgeCost> = HashMap::new();
    let mut predecessor: HashMap<EdgeIdx, EdgeIdx> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for &e in sources {
        let scalar = 0.0;
        if scalar < *best_scalar.get(&e).unwrap_or(&f64::INFINITY) {
            best_scalar.insert(e, scalar);
            best_cost.insert(e, EdgeCost::zero());
            heap.push(Frontier {
                scalar: scalar + heuristic(ctx, e, &target_pts, opts),
                edge: e,
            });
        }
    }

    while let Some(Frontier { edge, .. }) = heap.pop() {
        let g = match best_scalar.get(&edge) {
            Some(v) => *v,
            None => continue,
        };
        if target_set.contains(&edge) {
            let mut edges = vec![edge];
            let mut cur = edge;
            while let Some(&prev) = predecessor.get(&cur) {
                edges.push(prev);
                cur = prev;
            }
            edges.reverse();
            return Some(SearchResult {
                cost: best_cost[&edge],
                edges,
            });
        }
        if g > max_d {
            continue;
        }
        let node = ctx.graph.edge(edge).to;
        for next in ctx.graph.out_edges(node) {
            if !ctx.graph.edge(next).traversable_forward() {
                continue;
            }
            let is_final = target_set.contains(&next);
            let step = edge_entry_cost(ctx, Some(node), Some(edge), next, is_final, attrs, opts);
            if step.is_inf() {
                continue;
            }
            let combined = best_cost[&edge] + step;
            let next_scalar = combined.scalar(opts);
            if next_scalar > max_d {
                continue;
            }
            if next_scalar < *best_scalar.get(&next).unwrap_or(&f64::INFINITY) {
                best_scalar.insert(next, next_scalar);
                best_cost.insert(next, combined);
                predecessor.insert(next, edge);
                heap.push(Frontier {
                    scalar: next_scalar + heuristic(ctx, next, &target_pts, opts),
                    edge: next,
                });
            }
        }
    }

    None
}

/// A* admissible lower bound (spec.md §4.D): the web-mercator distance from `edge`'s end to the
/// nearest target point, scaled by `levelPunish[component.minEdgeLvl]` — the cheapest possible
/// per-meter rate reachable from here, so the true remaining cost can never be lower.
fn heuristic(ctx: &GraphContext, edge: EdgeIdx, target_pts: &[Pt2D], opts: &RoutingOptions) -> f64 {
    let node = ctx.graph.edge(edge).to;
    let pt = ctx.graph.node(node).pt;
    let dist = target_pts.iter().map(|&t| pt.dist_to(t)).fold(f64::INFINITY, f64::min);
    if !dist.is_finite() {
        return 0.0;
    }
    let min_lvl = ctx
        .graph
        .node(node)
        .component
        .map(|c| ctx.components[c.0 as usize].min_edge_lvl)
        .unwrap_or(0) as usize;
    dist * opts.level_punish[min_lvl.min(7)]
}

#[cfg(test)]
mod tests {
    use transit_graph::{Edge, NodeIdx, NodeKind, TransitGraph};

    use super::*;

    fn line(a: Pt2D, b: Pt2D) -> geom::PolyLine {
        geom::PolyLine::must_new(vec![a, b])
    }

    /// S1 from spec.md §8, exercised at the router level: three collinear nodes, two edges, no
    /// restrictions — the cheapest (and only) path visits both edges in order.
    #[test]
    fn straight_line_two_edges() {
        let mut graph = TransitGraph::new();
        let a = graph.add_node(Pt2D::new(0.0, 0.0), NodeKind::Plain);
        let b = graph.add_node(Pt2D::new(10.0, 0.0), NodeKind::Plain);
        let c = graph.add_node(Pt2D::new(20.0, 0.0), NodeKind::Plain);
        let e_ab = graph.add_edge(Edge {
            from: a,
            to: b,
            geom: line(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)),
            length_m: 10.0,
            max_speed_kmh: None,
            level: 2,
            one_way: 0,
            restricted: false,
            reversed: false,
            lines: Vec::new(),
            track: None,
            deleted: false,
        });
        let e_bc = graph.add_edge(Edge {
            from: b,
            to: c,
            geom: line(Pt2D::new(10.0, 0.0), Pt2D::new(20.0, 0.0)),
            length_m: 10.0,
            max_speed_kmh: None,
            level: 2,
            one_way: 0,
            restricted: false,
            reversed: false,
            lines: Vec::new(),
            track: None,
            deleted: false,
        });
        let _ = NodeIdx(0);
        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: vec![transit_graph::Component { min_edge_lvl: 2 }],
        };
        let attrs = RoutingAttributes::default();
        let opts = mot_config::RoutingOptions::default();
        let result = search_hop(&ctx, e_ab, e_bc, &attrs, &opts, f64::INFINITY).unwrap();
        assert_eq!(result.edges, vec![e_ab, e_bc]);
    }

    /// S3 from spec.md §8: a `oneWay=2` edge (spec.md §3 invariant 1 — the direction opposite an
    /// OSM `oneway=-1` way) is a hard traversal block, not a soft penalty; `traversable_forward`
    /// keeps it out of relaxation entirely, so it is simply never reached.
    #[test]
    fn one_way_wrong_direction_edge_is_unreachable() {
        let mut graph = TransitGraph::new();
        let x = graph.add_node(Pt2D::new(0.0, 0.0), NodeKind::Plain);
        let a = graph.add_node(Pt2D::new(10.0, 0.0), NodeKind::Plain);
        let b = graph.add_node(Pt2D::new(20.0, 0.0), NodeKind::Plain);
        let mk = |from, to, x0: f64, x1: f64, one_way| Edge {
            from,
            to,
            geom: line(Pt2D::new(x0, 0.0), Pt2D::new(x1, 0.0)),
            length_m: (x1 - x0).abs(),
            max_speed_kmh: None,
            level: 2,
            one_way,
            restricted: false,
            reversed: false,
            lines: Vec::new(),
            track: None,
            deleted: false,
        };
        let e_xa = graph.add_edge(mk(x, a, 0.0, 10.0, 0));
        let e_ab = graph.add_edge(mk(a, b, 10.0, 20.0, 2));
        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: vec![transit_graph::Component { min_edge_lvl: 2 }],
        };
        let attrs = RoutingAttributes::default();
        let opts = mot_config::RoutingOptions::default();
        assert!(search_hop(&ctx, e_xa, e_ab, &attrs, &opts, f64::INFINITY).is_none());
    }
}
