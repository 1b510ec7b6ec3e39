//! Component C (spec.md §4.D): routes each trip's stop sequence over the graph `transit_graph`
//! builds and materializes the result as a polyline. Pure routing logic; GTFS I/O and CLI
//! orchestration live in `gtfs` and the `transit_shapes` binary respectively.

mod cache;
mod candidates;
mod cost;
mod dijkstra;
mod greedy;
mod optim_graph;
mod routing_attrs;
mod shape_builder;

pub use crate::cache::RouterCache;
pub use crate::candidates::{edge_candidates, node_candidates, CandidateGroup, CandidateRoute, EdgeCandidate, NodeCandidate};
pub use crate::cost::{edge_entry_cost, path_cost, EdgeCost};
pub use crate::dijkstra::{search_hop, search_hop_multi, SearchResult};
pub use crate::greedy::{solve_greedy, solve_greedy2};
pub use crate::optim_graph::solve_global;
pub use crate::routing_attrs::{score_line, LineMatch, RoutingAttributes};
pub use crate::shape_builder::{build_trip_shapes, TripShape};
