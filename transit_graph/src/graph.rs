use geom::{Pt2D, PolyLine};

use crate::component::ComponentId;
use crate::lines::LineId;
use crate::station::StationInfo;

/// Arena index into `TransitGraph::nodes`. Stable for the lifetime of one graph; never reused
/// after deletion (deleted nodes are tombstoned, not compacted, so existing `NodeIdx` values
/// elsewhere in the graph — e.g. in the restrictor or station groups — stay valid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdx(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeIdx(pub u32);

/// Tagged union replacing the source's "station-info slot doubles as a blocker sentinel" memory
/// optimization (spec.md §9, Design Notes).
#[derive(Clone, Debug)]
pub enum NodeKind {
    Plain,
    Station(StationInfo),
    Blocker,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub pt: Pt2D,
    pub kind: NodeKind,
    pub component: Option<ComponentId>,
    /// Tombstone for deletion passes (orphan removal, corridor collapse). Checked by every
    /// traversal helper below; never physically removed, so indices elsewhere stay valid.
    pub deleted: bool,
}

impl Node {
    pub fn is_station(&self) -> bool {
        matches!(self.kind, NodeKind::Station(_))
    }

    pub fn is_blocker(&self) -> bool {
        matches!(self.kind, NodeKind::Blocker)
    }

    pub fn station_info(&self) -> Option<&StationInfo> {
        match &self.kind {
            NodeKind::Station(info) => Some(info),
            _ => None,
        }
    }

    pub fn station_info_mut(&mut self) -> Option<&mut StationInfo> {
        match &mut self.kind {
            NodeKind::Station(info) => Some(info),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub from: NodeIdx,
    pub to: NodeIdx,
    pub geom: PolyLine,
    pub length_m: f64,
    pub max_speed_kmh: Option<f64>,
    /// Routing class `0..7` (spec.md §3).
    pub level: u8,
    /// `0` = both directions, `1` = forward only, `2` = reverse only (secondary partner).
    pub one_way: u8,
    pub restricted: bool,
    /// Marks an auto-generated reverse-direction partner (spec.md §3, §4.B step 11).
    pub reversed: bool,
    pub lines: Vec<LineId>,
    pub track: Option<String>,
    pub deleted: bool,
}

impl Edge {
    pub fn traversable_forward(&self) -> bool {
        !self.deleted && self.one_way != 2
    }
}

/// Arena + index graph (spec.md §9, Design Notes: "prefer arena + indices" over a pointer graph).
/// Owns every node and edge; everything else (station groups, line table, restrictor) refers to
/// entries here by `NodeIdx`/`EdgeIdx`.
#[derive(Clone, Debug, Default)]
pub struct TransitGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Outgoing adjacency, rebuilt whenever edges are added/removed in bulk (`reindex`).
    out_edges: Vec<Vec<EdgeIdx>>,
}

impl TransitGraph {
    pub fn new() -> TransitGraph {
        TransitGraph::default()
    }

    pub fn add_node(&mut self, pt: Pt2D, kind: NodeKind) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            pt,
            kind,
            component: None,
            deleted: false,
        });
        self.out_edges.push(Vec::new());
        idx
    }

    pub fn add_edge(&mut self, edge: Edge) -> EdgeIdx {
        let idx = EdgeIdx(self.edges.len() as u32);
        self.out_edges[edge.from.0 as usize].push(idx);
        self.edges.push(edge);
        idx
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0 as usize]
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        &mut self.nodes[idx.0 as usize]
    }

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.0 as usize]
    }

    pub fn edge_mut(&mut self, idx: EdgeIdx) -> &mut Edge {
        &mut self.edges[idx.0 as usize]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|e| !e.deleted).count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.nodes.len())
            .map(|i| NodeIdx(i as u32))
            .filter(move |idx| !self.node(*idx).deleted)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        (0..self.edges.len())
            .map(|i| EdgeIdx(i as u32))
            .filter(move |idx| !self.edge(*idx).deleted)
    }

    /// Outgoing edges of `n`, skipping tombstoned ones.
    pub fn out_edges(&self, n: NodeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        self.out_edges[n.0 as usize]
            .iter()
            .copied()
            .filter(move |e| !self.edge(*e).deleted)
    }

    /// Total degree (in + out), counting both directions — used by the gap-fixing and orphan
    /// removal passes (spec.md §4.B steps 2, 6, 7), which reason about undirected degree.
    pub fn undirected_degree(&self, n: NodeIdx) -> usize {
        self.out_edges(n).count()
            + self
                .edge_indices()
                .filter(|e| self.edge(*e).to == n)
                .count()
    }

    pub fn delete_node(&mut self, n: NodeIdx) {
        self.nodes[n.0 as usize].deleted = true;
    }

    pub fn delete_edge(&mut self, e: EdgeIdx) {
        self.edges[e.0 as usize].deleted = true;
    }

    /// Rebuilds `out_edges` from scratch; call after any bulk edge mutation that doesn't go
    /// through `add_edge` (e.g. rewriting `edge.from` during gap-fixing).
    pub fn reindex(&mut self) {
        for bucket in &mut self.out_edges {
            bucket.clear();
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if !edge.deleted {
                self.out_edges[edge.from.0 as usize].push(EdgeIdx(i as u32));
            }
        }
    }
}
