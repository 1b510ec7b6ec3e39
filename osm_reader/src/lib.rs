//! Component A (spec.md §4.A): parses an OSM XML extract and, per MOT configuration, filters it
//! down to the nodes/ways/restrictions that MOT's transit graph needs.

mod document;
mod extract;

pub use crate::document::{read, Document, Member, Node, NodeID, Relation, RelationID, Way, WayID};
pub use crate::extract::{extract, ExtractedNode, ExtractedWay, OsmExtract, RestrictionRule, TransitLineRaw};

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use abstutil::Tags;
    use geom::{GPSBounds, Pt2D};

    use super::*;
    use crate::document::{Node as DocNode, Way as DocWay};

    fn mot_fixture() -> mot_config::MotConfig {
        let mut way_keep = BTreeMap::new();
        way_keep.insert("highway".to_string(), vec!["bus".to_string()]);
        let mut station_keep = BTreeMap::new();
        station_keep.insert("public_transport".to_string(), vec!["stop_position".to_string()]);

        mot_config::MotConfig {
            name: "bus".into(),
            gtfs_route_types: vec![3],
            node_filter: mot_config::TagFilter::default(),
            way_filter: mot_config::TagFilter {
                keep: way_keep,
                drop: BTreeMap::new(),
                multi_val_match: false,
            },
            relation_filter: mot_config::TagFilter::default(),
            level_table: mot_config::LevelTable {
                table: BTreeMap::new(),
                default_level: 2,
            },
            one_way_filter: mot_config::TagFilter::default(),
            station_filter: mot_config::TagFilter {
                keep: station_keep,
                drop: BTreeMap::new(),
                multi_val_match: false,
            },
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

    #[test]
    fn extract_keeps_tagged_way_and_drops_untagged() {
        let bounds = GPSBounds::new();
        let mut nodes = BTreeMap::new();
        let mut a_tags = Tags::empty();
        a_tags.insert("foo", "bar");
        nodes.insert(
            NodeID(1),
            DocNode {
                pt: Pt2D::new(0.0, 0.0),
                tags: a_tags,
            },
        );
        nodes.insert(
            NodeID(2),
            DocNode {
                pt: Pt2D::new(10.0, 0.0),
                tags: Tags::empty(),
            },
        );

        let mut ways = BTreeMap::new();
        let mut bus_tags = Tags::empty();
        bus_tags.insert("highway", "bus");
        ways.insert(
            WayID(10),
            DocWay {
                nodes: vec![NodeID(1), NodeID(2)],
                pts: vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)],
                tags: bus_tags,
            },
        );
        let mut other_tags = Tags::empty();
        other_tags.insert("highway", "footway");
        ways.insert(
            WayID(11),
            DocWay {
                nodes: vec![NodeID(1), NodeID(2)],
                pts: vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)],
                tags: other_tags,
            },
        );

        let doc = Document {
            gps_bounds: bounds,
            nodes,
            ways,
            relations: BTreeMap::new(),
        };

        let mut timer = abstutil::Timer::throwaway();
        let extracted = extract(&doc, &mot_fixture(), &mut timer);
        assert_eq!(extracted.ways.len(), 1);
        assert_eq!(extracted.ways[0].id, WayID(10));
        assert_eq!(extracted.nodes.len(), 2);
    }

    #[test]
    fn restriction_with_multiple_from_members_is_ignored() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            NodeID(1),
            DocNode {
                pt: Pt2D::new(0.0, 0.0),
                tags: Tags::empty(),
            },
        );
        let mut ways = BTreeMap::new();
        ways.insert(
            WayID(1),
            DocWay {
                nodes: vec![NodeID(1)],
                pts: vec![Pt2D::new(0.0, 0.0)],
                tags: Tags::empty(),
            },
        );
        ways.insert(
            WayID(2),
            DocWay {
                nodes: vec![NodeID(1)],
                pts: vec![Pt2D::new(0.0, 0.0)],
                tags: Tags::empty(),
            },
        );
        ways.insert(
            WayID(3),
            DocWay {
                nodes: vec![NodeID(1)],
                pts: vec![Pt2D::new(0.0, 0.0)],
                tags: Tags::empty(),
            },
        );

        let mut rel_tags = Tags::empty();
        rel_tags.insert("type", "restriction");
        rel_tags.insert("restriction", "no_left_turn");
        let relation = Relation {
            tags: rel_tags,
            members: vec![
                ("from".to_string(), Member::Way(WayID(1))),
                ("from".to_string(), Member::Way(WayID(2))),
                ("to".to_string(), Member::Way(WayID(3))),
                ("via".to_string(), Member::Node(NodeID(1))),
            ],
        };
        let mut relations = BTreeMap::new();
        relations.insert(RelationID(1), relation);

        let doc = Document {
            gps_bounds: GPSBounds::new(),
            nodes,
            ways,
            relations,
        };
        let mut timer = abstutil::Timer::throwaway();
        let extracted = extract(&doc, &mot_fixture(), &mut timer);
        assert!(extracted.restrictions.is_empty());
    }
}
