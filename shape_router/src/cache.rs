use std::collections::{HashMap, HashSet};

use mot_config::RoutingOptions;
use transit_graph::{EdgeIdx, GraphContext};

use crate::cost::{path_cost, EdgeCost};
use crate::dijkstra::{search_hop, SearchResult};
use crate::routing_attrs::RoutingAttributes;

/// Per-thread sub-path cache, keyed `routingAttrs -> fromEdge -> toEdge -> (cost, edgeList)`
/// (spec.md §4.D). Lives for one worker's entire shape-building phase and is never shared across
/// threads (spec.md §5) — each `std::thread::scope` worker owns one on its stack.
#[derive(Default)]
pub struct RouterCache {
    table: HashMap<RoutingAttributes, HashMap<EdgeIdx, HashMap<EdgeIdx, (EdgeCost, Vec<EdgeIdx>)>>>,
}

impl RouterCache {
    pub fn new() -> RouterCache {
        RouterCache::default()
    }

    /// Looks up a pen-free hop cost between two candidate edges, computing and nested-caching it
    /// on a miss. `known_edges` is every candidate edge appearing anywhere in the trip's
    /// candidate route — nested-caching only pays off for suffixes ending at an edge that will
    /// actually be queried again as a `fromEdge` later in this trip (or a future one).
    #[allow(clippy::too_many_arguments)]
    pub fn hop(
        &mut self,
        ctx: &GraphContext,
        from: EdgeIdx,
        to: EdgeIdx,
        attrs: &RoutingAttributes,
        opts: &RoutingOptions,
        max_d: f64,
        known_edges: &HashSet<EdgeIdx>,
        use_caching: bool,
    ) -> (EdgeCost, Vec<EdgeIdx>) {
        if use_caching {
            if let Some(hit) = self
                .table
                .get(attrs)
                .and_then(|by_from| by_from.get(&from))
                .and_then(|by_to| by_to.get(&to))
            {
                return hit.clone();
            }
        }

        let result = match search_hop(ctx, from, to, attrs, opts, max_d) {
            Some(SearchResult { cost, edges }) => (cost, edges),
            None => (EdgeCost::inf(), Vec::new()),
        };

        if use_caching {
            self.store(attrs, from, to, result.clone());
            if result.1.len() > 1 {
                self.nested_cache(ctx, attrs, opts, &result.1, to, known_edges);
            }
        }
        result
    }

    fn store(&mut self, attrs: &RoutingAttributes, from: EdgeIdx, to: EdgeIdx, value: (EdgeCost, Vec<EdgeIdx>)) {
        self.table
            .entry(attrs.clone())
            .or_default()
            .entry(from)
            .or_default()
            .insert(to, value);
    }

    /// spec.md §4.D: "every successful path is nested-cached: walking the returned edge list
    /// from tail to head, for each intermediate edge that belongs to some from set, the suffix
    /// from that edge to the tail is stored." A suffix of a shortest path is itself a shortest
    /// path (true for non-negative edge costs), so these suffix entries are correct without a
    /// fresh search.
    fn nested_cache(
        &mut self,
        ctx: &GraphContext,
        attrs: &RoutingAttributes,
        opts: &RoutingOptions,
        path: &[EdgeIdx],
        target: EdgeIdx,
        known_edges: &HashSet<EdgeIdx>,
    ) {
        for start in (1..path.len()).rev() {
            let edge = path[start];
            if edge == target || !known_edges.contains(&edge) {
                continue;
            }
            let suffix = &path[start..];
            if self
                .table
                .get(attrs)
                .and_then(|by_from| by_from.get(&edge))
                .and_then(|by_to| by_to.get(&target))
                .is_some()
            {
                continue;
            }
            let cost = path_cost(ctx, opts, attrs, suffix);
            self.store(attrs, edge, target, (cost, suffix.to_vec()));
        }
    }
}

#[cfg(test)]
mod tests {
    use geom::Pt2D;
    use transit_graph::{Edge, GraphContext, NodeKind, TransitGraph};

    use super::*;

    fn chain_ctx() -> (GraphContext, EdgeIdx, EdgeIdx, EdgeIdx) {
        let mut graph = TransitGraph::new();
        let a = graph.add_node(Pt2D::new(0.0, 0.0), NodeKind::Plain);
        let b = graph.add_node(Pt2D::new(10.0, 0.0), NodeKind::Plain);
        let c = graph.add_node(Pt2D::new(20.0, 0.0), NodeKind::Plain);
        let d = graph.add_node(Pt2D::new(30.0, 0.0), NodeKind::Plain);
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
        let e_cd = graph.add_edge(mk(c, d, 20.0, 30.0));
        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: Vec::new(),
        };
        (ctx, e_ab, e_bc, e_cd)
    }

    /// S5 from spec.md §8: a second lookup of the same `(attrs, fromEdge, toEdge)` is served from
    /// the cache rather than re-running Dijkstra (observed here as bit-identical output on a hit).
    #[test]
    fn second_lookup_is_a_cache_hit() {
        let (ctx, e_ab, e_bc, e_cd) = chain_ctx();
        let attrs = RoutingAttributes::default();
        let opts = mot_config::RoutingOptions::default();
        let known: HashSet<EdgeIdx> = [e_ab, e_bc, e_cd].into_iter().collect();
        let mut cache = RouterCache::new();

        let first = cache.hop(&ctx, e_ab, e_cd, &attrs, &opts, f64::INFINITY, &known, true);
        assert_eq!(first.1, vec![e_ab, e_bc, e_cd]);

        // The nested cache should already hold the suffix from e_bc, so this is a pure hit.
        let suffix_hit = cache.hop(&ctx, e_bc, e_cd, &attrs, &opts, f64::INFINITY, &known, true);
        assert_eq!(suffix_hit.1, vec![e_bc, e_cd]);

        let second = cache.hop(&ctx, e_ab, e_cd, &attrs, &opts, f64::INFINITY, &known, true);
        assert_eq!(second.0.scalar(&opts), first.0.scalar(&opts));
        assert_eq!(second.1, first.1);
    }
}
