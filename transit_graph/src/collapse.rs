use crate::graph::{Edge, EdgeIdx, NodeIdx, TransitGraph};
use crate::restrictor::Restrictor;

/// Step 5 of spec.md §4.B: delete nodes with degree 0 and no station group.
pub fn delete_orphan_nodes(graph: &mut TransitGraph) {
    for n in graph.node_indices().collect::<Vec<_>>() {
        if graph.undirected_degree(n) == 0 && !graph.node(n).is_station() {
            graph.delete_node(n);
        }
    }
}

/// Step 6/8 of spec.md §4.B: three rounds of removing degree-1 non-station nodes, unless doing
/// so would turn a steep-angle dead-end at the adjacent intersection into a contract-eligible
/// degree-2 corridor (the "keep-full-turn" test).
pub fn delete_orphan_edges(graph: &mut TransitGraph, full_turn_angle_deg: f64) {
    for _round in 0..3 {
        let mut changed = false;
        for n in graph.node_indices().collect::<Vec<_>>() {
            if graph.node(n).is_station() || graph.undirected_degree(n) != 1 {
                continue;
            }
            if keeps_full_turn_at_neighbor(graph, n, full_turn_angle_deg) {
                continue;
            }
            for e in graph.out_edges(n).collect::<Vec<_>>() {
                graph.delete_edge(e);
            }
            for e in graph.edge_indices().collect::<Vec<_>>() {
                if graph.edge(e).to == n {
                    graph.delete_edge(e);
                }
            }
            graph.delete_node(n);
            changed = true;
        }
        graph.reindex();
        if !changed {
            break;
        }
    }
}

/// True if removing dead-end `n` would leave its neighboring intersection looking like a sharp
/// full turn rather than a smooth through-corridor — in which case we keep `n` around so the
/// router's full-turn penalty still has something to measure (spec.md §4.B step 6).
fn keeps_full_turn_at_neighbor(graph: &TransitGraph, n: NodeIdx, full_turn_angle_deg: f64) -> bool {
    let neighbor_edge = graph
        .out_edges(n)
        .next()
        .or_else(|| graph.edge_indices().find(|e| graph.edge(*e).to == n));
    let Some(e) = neighbor_edge else {
        return false;
    };
    let neighbor = if graph.edge(e).from == n {
        graph.edge(e).to
    } else {
        graph.edge(e).from
    };
    if graph.undirected_degree(neighbor) <= 2 {
        return false;
    }
    let dead_end_dir = graph.node(n).pt.angle_to(graph.node(neighbor).pt);
    graph
        .out_edges(neighbor)
        .chain(graph.edge_indices().filter(|oe| graph.edge(*oe).to == neighbor))
        .filter(|oe| *oe != e)
        .any(|oe| {
            let other_end = if graph.edge(oe).from == neighbor {
                graph.edge(oe).to
            } else {
                graph.edge(oe).from
            };
            let other_dir = graph.node(neighbor).pt.angle_to(graph.node(other_end).pt);
            dead_end_dir.abs_diff_degrees(other_dir) < full_turn_angle_deg
        })
}

/// Step 7 of spec.md §4.B: for every non-station node of total degree 2 whose one incoming and
/// one outgoing edge are "similar" (same one-way state, level, transit-line set, neither
/// restricted), splice them into a single edge and delete the node.
pub fn collapse_corridors(graph: &mut TransitGraph, restrictor: &mut Restrictor) {
    loop {
        let mut collapsed_any = false;
        for n in graph.node_indices().collect::<Vec<_>>() {
            if graph.node(n).is_station() {
                continue;
            }
            let incoming: Vec<EdgeIdx> = graph.edge_indices().filter(|e| graph.edge(*e).to == n).collect();
            let outgoing: Vec<EdgeIdx> = graph.out_edges(n).collect();
            if incoming.len() != 1 || outgoing.len() != 1 {
                continue;
            }
            let (a, b) = (incoming[0], outgoing[0]);
            if a == b || !edges_similar(graph, a, b) {
                continue;
            }
            let new_from = graph.edge(a).from;
            let new_to = graph.edge(b).to;
            if new_from == new_to {
                // Collapsing would produce a self-loop; leave the node in place.
                continue;
            }
            if edge_already_exists(graph, new_from, new_to) {
                continue;
            }

            let mut geom = graph.edge(a).geom.clone();
            geom.extend(&graph.edge(b).geom);
            let spliced = Edge {
                from: new_from,
                to: new_to,
                length_m: geom.length(),
                geom,
                max_speed_kmh: graph.edge(a).max_speed_kmh.or(graph.edge(b).max_speed_kmh),
                level: graph.edge(a).level,
                one_way: graph.edge(a).one_way,
                restricted: false,
                reversed: graph.edge(a).reversed,
                lines: graph.edge(a).lines.clone(),
                track: graph.edge(a).track.clone(),
                deleted: false,
            };
            let new_edge = graph.add_edge(spliced);
            restrictor.duplicate_edge(a, new_edge, new_edge);
            restrictor.duplicate_edge(b, new_edge, new_edge);
            graph.delete_edge(a);
            graph.delete_edge(b);
            graph.delete_node(n);
            collapsed_any = true;
        }
        graph.reindex();
        if !collapsed_any {
            break;
        }
    }
}

fn edges_similar(graph: &TransitGraph, a: EdgeIdx, b: EdgeIdx) -> bool {
    let ea = graph.edge(a);
    let eb = graph.edge(b);
    ea.one_way == eb.one_way
        && ea.level == eb.level
        && !ea.restricted
        && !eb.restricted
        && ea.lines == eb.lines
}

fn edge_already_exists(graph: &TransitGraph, from: NodeIdx, to: NodeIdx) -> bool {
    graph.out_edges(from).any(|e| graph.edge(e).to == to)
}
