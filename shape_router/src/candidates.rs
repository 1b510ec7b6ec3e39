use mot_config::MotConfig;
use transit_graph::{EdgeIdx, GraphContext, GroupId, NodeIdx, StopRef};

/// `(node, penalty >= 0)` — spec.md §3. One candidate per node in a stop's station group.
#[derive(Clone, Copy, Debug)]
pub struct NodeCandidate {
    pub node: NodeIdx,
    pub penalty: f64,
}

/// `(edge, penalty >= 0)` — the router operates over edges, not nodes (spec.md §4.D), so every
/// node candidate expands to one edge candidate per its outgoing edge.
#[derive(Clone, Copy, Debug)]
pub struct EdgeCandidate {
    pub edge: EdgeIdx,
    pub penalty: f64,
}

pub type CandidateGroup = Vec<EdgeCandidate>;
pub type CandidateRoute = Vec<CandidateGroup>;

/// Step 3 of spec.md §4.C: `penalty = distance(stop, node) * distPenFactor + platform-mismatch
/// penalty + nonOsmPen unless node.fromOsm`.
pub fn node_candidates(ctx: &GraphContext, group: GroupId, stop: &StopRef, mot: &MotConfig) -> Vec<NodeCandidate> {
    let opts = &mot.routing_options;
    ctx.groups
        .get(group)
        .nodes
        .iter()
        .map(|&node| {
            let n = ctx.graph.node(node);
            let mut penalty = n.pt.dist_to(stop.pt) * opts.dist_pen_factor;
            if let Some(info) = n.station_info() {
                let platform_mismatch = match (&info.platform, &stop.platform_code) {
                    (Some(track), Some(code)) => track != code,
                    (None, Some(_)) => true,
                    _ => false,
                };
                if platform_mismatch {
                    penalty += opts.track_pen;
                }
                if !info.from_osm {
                    penalty += opts.non_osm_pen;
                }
            }
            NodeCandidate { node, penalty }
        })
        .collect()
}

/// Expands node candidates into edge candidates, one per outgoing edge (or the node's self-edge
/// if it has none, which the builder guarantees exists for isolated stations per spec.md §4.B
/// step 12).
pub fn edge_candidates(ctx: &GraphContext, nodes: &[NodeCandidate]) -> CandidateGroup {
    let mut out = Vec::new();
    for nc in nodes {
        for e in ctx.graph.out_edges(nc.node) {
            if !ctx.graph.edge(e).traversable_forward() {
                continue;
            }
            out.push(EdgeCandidate {
                edge: e,
                penalty: nc.penalty,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use geom::Pt2D;
    use transit_graph::{GraphContext, NodeKind, StationGroupTable, StationInfo, TransitGraph};

    use super::*;

    fn bare_mot() -> mot_config::MotConfig {
        mot_config::MotConfig {
            name: "bus".into(),
            gtfs_route_types: vec![3],
            node_filter: mot_config::TagFilter::default(),
            way_filter: mot_config::TagFilter::default(),
            relation_filter: mot_config::TagFilter::default(),
            level_table: mot_config::LevelTable {
                table: Default::default(),
                default_level: 2,
            },
            one_way_filter: mot_config::TagFilter::default(),
            station_filter: mot_config::TagFilter::default(),
            station_blocker_filter: mot_config::TagFilter::default(),
            station_group_rule: mot_config::DeepAttrRule {
                tag_key: "name".into(),
                max_dist: 50.0,
            },
            station_name_rule: mot_config::DeepAttrRule {
                tag_key: "name".into(),
                max_dist: 0.0,
            },
            platform_rule: mot_config::DeepAttrRule {
                tag_key: "platform".into(),
                max_dist: 0.0,
            },
            id_rule: mot_config::DeepAttrRule {
                tag_key: "ref".into(),
                max_dist: 0.0,
            },
            transit_line_rule: mot_config::DeepAttrRule {
                tag_key: "route_ref".into(),
                max_dist: 0.0,
            },
            edge_platform_rule: mot_config::DeepAttrRule {
                tag_key: "railway:track_ref".into(),
                max_dist: 0.0,
            },
            positive_restriction_filter: mot_config::TagFilter::default(),
            negative_restriction_filter: mot_config::TagFilter::default(),
            no_restriction_filter: mot_config::TagFilter::default(),
            station_normalizer: mot_config::NormalizerRules::default(),
            line_normalizer: mot_config::NormalizerRules::default(),
            track_normalizer: mot_config::NormalizerRules::default(),
            id_normalizer: mot_config::NormalizerRules::default(),
            routing_options: mot_config::RoutingOptions::default(),
        }
    }

    /// S4 from spec.md §8: of two equidistant station nodes in the same group, the one whose
    /// platform code matches the stop's is strictly cheaper than the mismatched one.
    #[test]
    fn matching_platform_is_cheaper_than_mismatched() {
        let mut graph = TransitGraph::new();
        let matching = graph.add_node(
            Pt2D::new(0.0, 0.0),
            NodeKind::Station(StationInfo {
                name: "Central".into(),
                alt_names: Vec::new(),
                platform: Some("2".into()),
                from_osm: true,
                group: None,
            }),
        );
        let mismatched = graph.add_node(
            Pt2D::new(0.0, 0.0),
            NodeKind::Station(StationInfo {
                name: "Central".into(),
                alt_names: Vec::new(),
                platform: Some("1".into()),
                from_osm: true,
                group: None,
            }),
        );

        let mut groups = StationGroupTable::new();
        let group = groups.new_group();
        groups.get_mut(group).nodes.push(matching);
        groups.get_mut(group).nodes.push(mismatched);

        let ctx = GraphContext {
            graph,
            lines: transit_graph::LineTable::new(),
            restrictor: transit_graph::Restrictor::new(),
            groups,
            components: Vec::new(),
        };
        let stop = StopRef {
            stop_id: "s1".into(),
            pt: Pt2D::new(0.0, 0.0),
            platform_code: Some("2".into()),
        };
        let mot = bare_mot();
        let candidates = node_candidates(&ctx, group, &stop, &mot);

        let matching_pen = candidates.iter().find(|c| c.node == matching).unwrap().penalty;
        let mismatched_pen = candidates.iter().find(|c| c.node == mismatched).unwrap().penalty;
        assert!(matching_pen < mismatched_pen);
    }
}
