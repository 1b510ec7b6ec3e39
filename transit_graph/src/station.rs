use geom::Pt2D;

use crate::graph::NodeIdx;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u32);

/// A GTFS stop, kept alongside the nodes it snapped to so `StationGroup` can serve both the
/// orphan-OSM-station prepass and the per-stop candidate-group lookup (spec.md §4.B.1, §4.C).
#[derive(Clone, Debug)]
pub struct StopRef {
    pub stop_id: String,
    pub pt: Pt2D,
    pub platform_code: Option<String>,
}

/// Name, alt-names, platform/track, provenance, and owning group for one station node (spec.md
/// §3). `from_osm` distinguishes nodes that existed in the source data from ones introduced
/// purely by snapping a GTFS stop — used by `shape_builder`'s `nonOsmPen` penalty.
#[derive(Clone, Debug)]
pub struct StationInfo {
    pub name: String,
    pub alt_names: Vec<String>,
    pub platform: Option<String>,
    pub from_osm: bool,
    pub group: Option<GroupId>,
}

impl StationInfo {
    /// A crude name-similarity score in `[0, 1]` used by the snap pass's "equivalence reach"
    /// search (spec.md §4.B.1): exact match (after normalization) on the primary name or any alt
    /// name scores 1.0; otherwise a partial token-overlap score.
    pub fn similarity(&self, candidate_name: &str) -> f64 {
        if self.name.eq_ignore_ascii_case(candidate_name)
            || self.alt_names.iter().any(|n| n.eq_ignore_ascii_case(candidate_name))
        {
            return 1.0;
        }
        let a: std::collections::HashSet<&str> = self.name.split_whitespace().collect();
        let b: std::collections::HashSet<&str> = candidate_name.split_whitespace().collect();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let overlap = a.intersection(&b).count() as f64;
        overlap / a.len().max(b.len()) as f64
    }
}

/// Set of nodes + GTFS stops that together represent one real-world station (spec.md §3). Groups
/// merge transitively during station snapping as stops coalesce onto shared or nearby nodes.
#[derive(Clone, Debug, Default)]
pub struct StationGroup {
    pub nodes: Vec<NodeIdx>,
    pub stops: Vec<StopRef>,
}

#[derive(Clone, Debug, Default)]
pub struct StationGroupTable {
    groups: Vec<StationGroup>,
}

impl StationGroupTable {
    pub fn new() -> StationGroupTable {
        StationGroupTable::default()
    }

    pub fn new_group(&mut self) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(StationGroup::default());
        id
    }

    pub fn get(&self, id: GroupId) -> &StationGroup {
        &self.groups[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: GroupId) -> &mut StationGroup {
        &mut self.groups[id.0 as usize]
    }

    /// Merges `b`'s members into `a` and empties `b`; any further lookups by `b` just see an
    /// empty group rather than an error, matching the "groups merge transitively" invariant.
    pub fn merge(&mut self, a: GroupId, b: GroupId) {
        if a == b {
            return;
        }
        let taken = std::mem::take(&mut self.groups[b.0 as usize]);
        self.groups[a.0 as usize].nodes.extend(taken.nodes);
        self.groups[a.0 as usize].stops.extend(taken.stops);
    }
}
