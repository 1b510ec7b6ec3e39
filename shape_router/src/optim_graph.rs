use std::collections::HashSet;

use mot_config::RoutingOptions;
use transit_graph::{EdgeIdx, GraphContext};

use crate::cache::RouterCache;
use crate::candidates::{CandidateGroup, CandidateRoute};
use crate::dijkstra::search_hop_multi;
use crate::routing_attrs::RoutingAttributes;

/// `global` solver (spec.md §4.D, "Optim graph"): solves a trip's whole candidate route at once
/// via a small layered source/sink graph — one layer per stop, one node per candidate edge, edge
/// weights `source -> candNode_0 = pen`, `candNode_i -> candNode_{i+1} = hopCost + destination
/// pen`, `candNode_last -> sink = 0`. Implemented as a forward DP over layers rather than
/// materializing the graph explicitly, since the layering is strictly sequential — the DP and
/// the optim graph it models have the same optimal substructure.
pub fn solve_global(
    ctx: &GraphContext,
    route: &CandidateRoute,
    attrs: &RoutingAttributes,
    opts: &RoutingOptions,
    cache: &mut RouterCache,
) -> Vec<EdgeIdx> {
    if route.len() < 2 {
        return Vec::new();
    }

    let known_edges: HashSet<EdgeIdx> = route.iter().flatten().map(|c| c.edge).collect();

    let mut best: Vec<f64> = route[0].iter().map(|c| c.penalty).collect();
    let mut paths: Vec<Vec<EdgeIdx>> = route[0].iter().map(|c| vec![c.edge]).collect();

    for i in 1..route.len() {
        let prev_group = &route[i - 1];
        let cur_group = &route[i];
        let max_d = hop_band(ctx, prev_group, cur_group, attrs, opts);

        let mut next_best = vec![f64::INFINITY; cur_group.len()];
        let mut next_paths = vec![Vec::new(); cur_group.len()];

        for (j, cand) in cur_group.iter().enumerate() {
            let mut winner: Option<(f64, Vec<EdgeIdx>)> = None;
            for (k, prev_cand) in prev_group.iter().enumerate() {
                if !best[k].is_finite() {
                    continue;
                }
                let (hop_cost, hop_edges) =
                    cache.hop(ctx, prev_cand.edge, cand.edge, attrs, opts, max_d, &known_edges, opts.use_caching);
                if hop_cost.is_inf() || hop_edges.is_empty() {
                    continue;
                }
                let total = best[k] + hop_cost.scalar(opts) + cand.penalty;
                if winner.as_ref().map(|(c, _)| total < *c).unwrap_or(true) {
                    let mut stitched = paths[k].clone();
                    stitched.extend(hop_edges.into_iter().skip(1));
                    winner = Some((total, stitched));
                }
            }
            if let Some((cost, path)) = winner {
                next_best[j] = cost;
                next_paths[j] = path;
            }
        }

        best = next_best;
        paths = next_paths;
    }

    best.iter()
        .enumerate()
        .filter(|(_, c)| c.is_finite())
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .map(|(j, _)| paths[j].clone())
        .unwrap_or_default()
}

/// Bounded pilot run between two full candidate groups to derive the hop-band cutoff (spec.md
/// §4.D): `maxD = max(ret.value, pilotEnd * levelPunish[2]) * 3 + fullTurnPunishFac +
/// platformUnmatchedPen`. The factor `3` is `hopBandFactor` (spec.md §9's second open question,
/// left as a tunable rather than a hard-coded constant the source never derives).
fn hop_band(ctx: &GraphContext, from_group: &CandidateGroup, to_group: &CandidateGroup, attrs: &RoutingAttributes, opts: &RoutingOptions) -> f64 {
    let sources: Vec<EdgeIdx> = from_group.iter().map(|c| c.edge).collect();
    let targets: Vec<EdgeIdx> = to_group.iter().map(|c| c.edge).collect();

    let pilot = search_hop_multi(ctx, &sources, &targets, attrs, opts, f64::INFINITY);
    let (ret_value, pilot_end) = match &pilot {
        Some(result) => {
            let start = ctx.graph.edge(*result.edges.first().unwrap()).geom.first_pt();
            let end = ctx.graph.edge(*result.edges.last().unwrap()).geom.last_pt();
            (result.cost.scalar(opts), start.dist_to(end))
        }
        None => (0.0, 0.0),
    };

    ret_value.max(pilot_end * opts.level_punish[2]) * opts.hop_band_factor + opts.full_turn_punish_fac + opts.platform_unmatched_pen
}

#[cfg(test)]
mod tests {
    use geom::Pt2D;
    use transit_graph::{Edge, NodeKind, TransitGraph};

    use super::*;
    use crate::candidates::EdgeCandidate;

    /// S1 from spec.md §8 at the solver level: a two-stop route over a two-edge straight line
    /// resolves to both edges in order.
    #[test]
    fn global_solver_picks_straight_line() {
        let mut graph = TransitGraph::new();
        let a = graph.add_node(Pt2D::new(0.0, 0.0), NodeKind::Plain);
        let b = graph.add_node(Pt2D::new(10.0, 0.0), NodeKind::Plain);
        let c = graph.add_node(Pt2D::new(20.0, 0.0), NodeKind::Plain);
        let mk = |from, to, x0: f64, x1: f64| Edge {
            from,
            to,
            geom: geom::PolyLine::must_new(vec![Pt2D::new(x0, 0.0), Pt2D::new(x1, 0.0)]),
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
        let e_ab = graph.add_edge(mk(a, b, 0.0, 10.0));
        let e_bc = graph.add_edge(mk(b, c, 10.0, 20.0));
        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: Vec::new(),
        };
        let route = vec![
            vec![EdgeCandidate { edge: e_ab, penalty: 0.0 }],
            vec![EdgeCandidate { edge: e_bc, penalty: 0.0 }],
        ];
        let attrs = RoutingAttributes::default();
        let opts = mot_config::RoutingOptions::default();
        let mut cache = RouterCache::new();
        let path = solve_global(&ctx, &route, &attrs, &opts, &mut cache);
        assert_eq!(path, vec![e_ab, e_bc]);
    }
}
