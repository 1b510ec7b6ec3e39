use crate::graph::{NodeIdx, TransitGraph};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub u32);

#[derive(Clone, Debug)]
pub struct Component {
    pub min_edge_lvl: u8,
}

/// Assigns every node a component tag via DFS over the graph treated as undirected (spec.md
/// §4.B step 9). Each component records the minimum edge level seen among its member edges,
/// used by the router's heuristic and by the "impossible route" shortcut.
pub fn label_components(graph: &mut TransitGraph) -> Vec<Component> {
    let mut components = Vec::new();
    let mut visited = std::collections::HashSet::new();

    let all_nodes: Vec<NodeIdx> = graph.node_indices().collect();
    for start in all_nodes {
        if visited.contains(&start) {
            continue;
        }
        let id = ComponentId(components.len() as u32);
        let mut min_lvl = u8::MAX;
        let mut stack = vec![start];
        let mut members = Vec::new();
        visited.insert(start);
        while let Some(n) = stack.pop() {
            members.push(n);
            for e in graph.out_edges(n).collect::<Vec<_>>() {
                let edge = graph.edge(e);
                min_lvl = min_lvl.min(edge.level);
                let other = edge.to;
                if visited.insert(other) {
                    stack.push(other);
                }
            }
            // Treat the graph as undirected: also walk edges that terminate at `n`.
            for e in graph.edge_indices().collect::<Vec<_>>() {
                let edge = graph.edge(e);
                if edge.to == n && !edge.deleted {
                    min_lvl = min_lvl.min(edge.level);
                    if visited.insert(edge.from) {
                        stack.push(edge.from);
                    }
                }
            }
        }
        if min_lvl == u8::MAX {
            min_lvl = 0;
        }
        for n in members {
            graph.node_mut(n).component = Some(id);
        }
        components.push(Component { min_edge_lvl: min_lvl });
    }
    components
}
