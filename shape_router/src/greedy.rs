use mot_config::RoutingOptions;
use transit_graph::{EdgeIdx, GraphContext};

use crate::candidates::CandidateRoute;
use crate::dijkstra::search_hop_multi;
use crate::routing_attrs::RoutingAttributes;

/// `greedy` solver (spec.md §4.D): each consecutive pair of candidate groups is solved by an
/// independent node-to-node-set search, and the chosen hops are concatenated without regard to
/// whether consecutive hops actually share an endpoint edge. Cheaper than `global` and lossy, as
/// spec.md notes explicitly.
pub fn solve_greedy(ctx: &GraphContext, route: &CandidateRoute, attrs: &RoutingAttributes, opts: &RoutingOptions) -> Vec<EdgeIdx> {
    let mut out = Vec::new();
    for pair in route.windows(2) {
        let sources: Vec<EdgeIdx> = pair[0].iter().map(|c| c.edge).collect();
        let targets: Vec<EdgeIdx> = pair[1].iter().map(|c| c.edge).collect();
        match search_hop_multi(ctx, &sources, &targets, attrs, opts, f64::INFINITY) {
            Some(result) if !result.edges.is_empty() => {
                let mut edges = result.edges;
                if !out.is_empty() {
                    edges.remove(0);
                }
                out.extend(edges);
            }
            _ => log::warn!("greedy solver found no path for one hop; the shape will have a gap there"),
        }
    }
    out
}

/// `greedy2` solver (spec.md §4.D): chains hop `i`'s source to hop `i-1`'s chosen endpoint edge,
/// rather than re-searching from the whole previous candidate group. SPEC_FULL.md's chaining
/// boundary condition: when a hop is unreachable, the next hop's source set falls back to the
/// *previous hop's full candidate group* instead of leaving the chain permanently stuck.
pub fn solve_greedy2(ctx: &GraphContext, route: &CandidateRoute, attrs: &RoutingAttributes, opts: &RoutingOptions) -> Vec<EdgeIdx> {
    if route.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut sources: Vec<EdgeIdx> = route[0].iter().map(|c| c.edge).collect();

    for (i, group) in route.iter().enumerate().skip(1) {
        let targets: Vec<EdgeIdx> = group.iter().map(|c| c.edge).collect();
        match search_hop_multi(ctx, &sources, &targets, attrs, opts, f64::INFINITY) {
            Some(result) if !result.edges.is_empty() => {
                let mut edges = result.edges;
                let endpoint = *edges.last().unwrap();
                if !out.is_empty() {
                    edges.remove(0);
                }
                out.extend(edges);
                sources = vec![endpoint];
            }
            _ => {
                log::warn!("greedy2 hop {i} unreachable; falling back to the previous hop's full candidate group");
                sources = route[i - 1].iter().map(|c| c.edge).collect();
            }
        }
    }
    out
}
