//! Component B (spec.md §4.B): turns a filtered OSM extract into a routable directed graph with
//! station nodes, turn restrictions, and transit-line metadata, and snaps GTFS stops onto it.

mod build;
mod collapse;
mod component;
mod context;
mod gaps;
mod graph;
mod lines;
mod reverse;
mod restrictor;
mod simplify;
mod snap;
mod station;

pub use crate::build::build;
pub use crate::component::{Component, ComponentId};
pub use crate::context::GraphContext;
pub use crate::graph::{Edge, EdgeIdx, Node, NodeIdx, NodeKind, TransitGraph};
pub use crate::lines::{LineId, LineTable, TransitEdgeLine};
pub use crate::restrictor::Restrictor;
pub use crate::snap::{snap_stations, StopInput, StopMap};
pub use crate::station::{GroupId, StationGroup, StationGroupTable, StationInfo, StopRef};

#[cfg(test)]
mod tests {
    use geom::Pt2D;
    use mot_config::MotConfig;
    use osm_reader::{ExtractedWay, NodeID, OsmExtract, WayID};

    use super::*;

    fn bare_mot() -> MotConfig {
        MotConfig {
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

    /// S1 from spec.md §8: three collinear nodes joined by two ways; after build, the straight
    /// line should survive as a simple two-edge path (modulo corridor collapse, which does not
    /// apply here since both endpoints are stations).
    #[test]
    fn straight_line_builds_two_edges() {
        let extract = OsmExtract {
            nodes: Default::default(),
            ways: vec![
                ExtractedWay {
                    id: WayID(1),
                    nodes: vec![NodeID(1), NodeID(2)],
                    pts: vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)],
                    one_way: 0,
                    level: 2,
                    max_speed_kmh: None,
                    track: None,
                    transit_lines: Vec::new(),
                },
                ExtractedWay {
                    id: WayID(2),
                    nodes: vec![NodeID(2), NodeID(3)],
                    pts: vec![Pt2D::new(10.0, 0.0), Pt2D::new(20.0, 0.0)],
                    one_way: 0,
                    level: 2,
                    max_speed_kmh: None,
                    track: None,
                    transit_lines: Vec::new(),
                },
            ],
            restrictions: Vec::new(),
        };
        let stops = vec![
            StopInput {
                stop_id: "A".into(),
                pt: Pt2D::new(0.0, 0.0),
                name: "A".into(),
                platform_code: None,
            },
            StopInput {
                stop_id: "C".into(),
                pt: Pt2D::new(20.0, 0.0),
                name: "C".into(),
                platform_code: None,
            },
        ];
        let mut timer = abstutil::Timer::throwaway();
        let (ctx, stop_map) = build(extract, &stops, 0.0, &bare_mot(), &mut timer);
        assert_eq!(stop_map.len(), 2);
        assert!(ctx.graph.num_edges() >= 2);
    }

    #[test]
    fn restrictor_blocks_forbidden_turn() {
        let mut r = Restrictor::new();
        let via = NodeIdx(0);
        let from = EdgeIdx(0);
        let to = EdgeIdx(1);
        r.add_negative(via, from, to);
        assert!(!r.may(via, from, to));
    }
}
