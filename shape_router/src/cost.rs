use mot_config::RoutingOptions;
use transit_graph::{EdgeIdx, GraphContext, NodeIdx};

use crate::routing_attrs::{score_line, LineMatch, RoutingAttributes};

/// A scalar accumulator combining per-level distance, one-way-distance, one-way-edge count,
/// full-turn count, pass-through-station count, line-mismatch distance, and no-lines distance
/// (spec.md §3, "Edge cost"). Costs combine by addition (`+`) and compare by `scalar()`.
///
/// `inf()` is represented as an ordinary value with an infinite `reach_pen` rather than a
/// separate enum variant, so the `cost.inf()` sentinel from spec.md §4.D still composes with `+`
/// the way the hop-band pilot and cache expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCost {
    pub level_dist: [f64; 8],
    pub one_way_dist: f64,
    pub one_way_edges: f64,
    pub line_mismatch_dist: f64,
    pub no_lines_dist: f64,
    pub full_turns: f64,
    pub pass_thru_stations: f64,
    pub reach_pen: f64,
}

impl Default for EdgeCost {
    fn default() -> EdgeCost {
        EdgeCost::zero()
    }
}

impl EdgeCost {
    pub fn zero() -> EdgeCost {
        EdgeCost {
            level_dist: [0.0; 8],
            one_way_dist: 0.0,
            one_way_edges: 0.0,
            line_mismatch_dist: 0.0,
            no_lines_dist: 0.0,
            full_turns: 0.0,
            pass_thru_stations: 0.0,
            reach_pen: 0.0,
        }
    }

    pub fn inf() -> EdgeCost {
        let mut c = EdgeCost::zero();
        c.reach_pen = f64::INFINITY;
        c
    }

    pub fn is_inf(&self) -> bool {
        self.reach_pen.is_infinite()
    }

    pub fn scalar(&self, opts: &RoutingOptions) -> f64 {
        if self.is_inf() {
            return f64::INFINITY;
        }
        let mut s = 0.0;
        for i in 0..8 {
            s += self.level_dist[i] * opts.level_punish[i];
        }
        s += opts.one_way_punish_fac * self.one_way_dist;
        s += opts.one_way_edge_punish * self.one_way_edges;
        s += opts.line_unmatched_punish_fact * self.line_mismatch_dist;
        s += opts.no_lines_punish_fact * self.no_lines_dist;
        s += opts.full_turn_punish_fac * self.full_turns;
        s += opts.pass_thru_stations_punish * self.pass_thru_stations;
        s + self.reach_pen
    }
}

impl std::ops::Add for EdgeCost {
    type Output = EdgeCost;

    fn add(self, other: EdgeCost) -> EdgeCost {
        if self.is_inf() || other.is_inf() {
            return EdgeCost::inf();
        }
        let mut level_dist = [0.0; 8];
        for i in 0..8 {
            level_dist[i] = self.level_dist[i] + other.level_dist[i];
        }
        EdgeCost {
            level_dist,
            one_way_dist: self.one_way_dist + other.one_way_dist,
            one_way_edges: self.one_way_edges + other.one_way_edges,
            line_mismatch_dist: self.line_mismatch_dist + other.line_mismatch_dist,
            no_lines_dist: self.no_lines_dist + other.no_lines_dist,
            full_turns: self.full_turns + other.full_turns,
            pass_thru_stations: self.pass_thru_stations + other.pass_thru_stations,
            reach_pen: self.reach_pen + other.reach_pen,
        }
    }
}

/// Cost of entering `to_edge` directly from `from_edge` via node `via` (spec.md §4.D). `via`/
/// `from_edge` are `None` for the first edge of a search, where there is no predecessor to form
/// a turn angle from and no restriction to check. `is_final_edge` marks whether `to_edge` is the
/// hop's own destination edge, as opposed to a station merely passed through en route.
pub fn edge_entry_cost(
    ctx: &GraphContext,
    via: Option<NodeIdx>,
    from_edge: Option<EdgeIdx>,
    to_edge: EdgeIdx,
    is_final_edge: bool,
    attrs: &RoutingAttributes,
    opts: &RoutingOptions,
) -> EdgeCost {
    let edge = ctx.graph.edge(to_edge);
    let mut cost = EdgeCost::zero();

    let level = (edge.level as usize).min(7);
    cost.level_dist[level] += edge.length_m;

    // `oneWay=2` marks the auto-generated reverse partner of a forward-only edge (spec.md §3
    // invariant 1); traversing it means going against the one-way street.
    if edge.one_way == 2 {
        cost.one_way_dist += edge.length_m;
        cost.one_way_edges += 1.0;
    }

    match score_line(ctx, &edge.lines, attrs) {
        LineMatch::Matched => {}
        LineMatch::Mismatched => cost.line_mismatch_dist += edge.length_m,
        LineMatch::NoLines => cost.no_lines_dist += edge.length_m,
    }

    if !is_final_edge && ctx.graph.node(edge.to).is_station() {
        cost.pass_thru_stations += 1.0;
    }

    if let (Some(via), Some(from_edge)) = (via, from_edge) {
        if !ctx.restrictor.may(via, from_edge, to_edge) {
            // spec.md §4.D: a forbidden turn converts to the same cost bucket as a restricted
            // one-way traversal instead of being pruned from the candidate set outright.
            cost.one_way_dist += edge.length_m;
            cost.one_way_edges += 1.0;
        }
        if is_full_turn(ctx, from_edge, to_edge, opts.full_turn_angle) {
            cost.full_turns += 1.0;
        }
    }

    cost
}

/// Full-turn detection (spec.md §4.D, §9 open question): compares the incoming edge's trailing
/// bearing, rotated 180 degrees ("the direction you'd be facing had you continued straight"),
/// against the outgoing edge's leading bearing. A small angle between them means the vehicle is
/// nearly doubling back on itself — unusual, so heavily penalized.
///
/// Only applies at nodes of degree > 2 per spec.md §4.D; degree-2 nodes (including the
/// self-edges added for isolated stations in spec.md §4.B step 12, where `from_edge.to ==
/// to_edge.from` with an edge that loops back on itself) are explicitly left unfiltered here,
/// preserving the source's own ambiguous behavior rather than "fixing" it silently (spec.md §9).
fn is_full_turn(ctx: &GraphContext, from_edge: EdgeIdx, to_edge: EdgeIdx, full_turn_angle_deg: f64) -> bool {
    let via = ctx.graph.edge(from_edge).to;
    if ctx.graph.undirected_degree(via) <= 2 {
        return false;
    }
    let incoming = ctx.graph.edge(from_edge);
    let outgoing = ctx.graph.edge(to_edge);
    let incoming_pts = incoming.geom.points();
    if incoming_pts.len() < 2 || outgoing.geom.points().len() < 2 {
        return false;
    }
    let trailing = incoming_pts[incoming_pts.len() - 2].angle_to(incoming_pts[incoming_pts.len() - 1]);
    let leading = outgoing.geom.points()[0].angle_to(outgoing.geom.points()[1]);
    trailing.opposite().abs_diff_degrees(leading) < full_turn_angle_deg
}

/// Recomputes the cost of an already-known edge path from scratch (used by the router cache's
/// nested-caching of suffixes, spec.md §4.D, where a new cache entry is derived from a subpath
/// of a path already found rather than from a fresh search).
pub fn path_cost(ctx: &GraphContext, opts: &RoutingOptions, attrs: &RoutingAttributes, edges: &[EdgeIdx]) -> EdgeCost {
    let mut acc = EdgeCost::zero();
    let mut via = None;
    let mut prev_edge = None;
    let last = edges.last().copied();
    for &e in edges {
        let step = edge_entry_cost(ctx, via, prev_edge, e, Some(e) == last, attrs, opts);
        acc = acc + step;
        via = Some(ctx.graph.edge(e).to);
        prev_edge = Some(e);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonicity_increasing_level_punish_never_decreases_cost() {
        let mut cost = EdgeCost::zero();
        cost.level_dist[3] = 100.0;
        let mut low = mot_config::RoutingOptions::default();
        let mut high = low.clone();
        high.level_punish[3] += 5.0;
        assert!(cost.scalar(&high) >= cost.scalar(&low));
        low.level_punish[3] = high.level_punish[3];
        assert_eq!(cost.scalar(&low), cost.scalar(&high));
    }

    #[test]
    fn inf_absorbs_in_addition() {
        let a = EdgeCost::inf();
        let mut b = EdgeCost::zero();
        b.level_dist[0] = 10.0;
        assert!((a + b).is_inf());
        assert!((b + a).is_inf());
    }

    /// S2 from spec.md §8: a forbidden turn converts to the one-way cost bucket instead of being
    /// pruned outright, so a restricted edge still shows up in the returned cost, just penalized.
    #[test]
    fn forbidden_turn_converts_to_one_way_cost() {
        use transit_graph::{Edge, GraphContext, NodeKind, Restrictor, TransitGraph};

        let mut graph = TransitGraph::new();
        let a = graph.add_node(geom::Pt2D::new(0.0, 0.0), NodeKind::Plain);
        let via = graph.add_node(geom::Pt2D::new(10.0, 0.0), NodeKind::Plain);
        let b = graph.add_node(geom::Pt2D::new(20.0, 0.0), NodeKind::Plain);
        let mk = |from, to, x0: f64, x1: f64| Edge {
            from,
            to,
            geom: geom::PolyLine::must_new(vec![geom::Pt2D::new(x0, 0.0), geom::Pt2D::new(x1, 0.0)]),
            length_m: (x1 - x0).abs(),
            max_speed_kmh: None,
            level: 2,
            one_way: 0,
            restricted: false,
            reversed: false,
            lines: Vec::new(),
            track: None,
            deleted: false,
        };
        let e_in = graph.add_edge(mk(a, via, 0.0, 10.0));
        let e_out = graph.add_edge(mk(via, b, 10.0, 20.0));

        let mut restrictor = Restrictor::new();
        restrictor.add_negative(via, e_in, e_out);

        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor,
            groups: transit_graph::StationGroupTable::new(),
            components: Vec::new(),
        };
        let attrs = RoutingAttributes::default();
        let opts = mot_config::RoutingOptions::default();

        let forbidden = edge_entry_cost(&ctx, Some(via), Some(e_in), e_out, true, &attrs, &opts);
        assert!(forbidden.one_way_edges > 0.0);

        let allowed = edge_entry_cost(&ctx, None, None, e_out, true, &attrs, &opts);
        assert_eq!(allowed.one_way_edges, 0.0);
        assert!(forbidden.scalar(&opts) > allowed.scalar(&opts));
    }
}
