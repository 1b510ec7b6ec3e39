use std::collections::HashSet;

use transit_graph::{GraphContext, LineId, TransitEdgeLine};

/// `(from, to, shortName)` summary of a trip's direction/line (spec.md §3), derived once per
/// trip from its route's short/long name and head/tail stop names. Used both to score edges
/// against transit-line metadata and as the outer key of the router cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoutingAttributes {
    pub from: String,
    pub to: String,
    pub short_name: String,
}

impl RoutingAttributes {
    /// spec.md §4.C step 2: prefer the route's short name, falling back to its long name when
    /// the short name is blank.
    pub fn from_trip(route_short_name: &str, route_long_name: &str, head_stop_name: &str, tail_stop_name: &str) -> RoutingAttributes {
        let short_name = if route_short_name.is_empty() {
            route_long_name
        } else {
            route_short_name
        };
        RoutingAttributes {
            from: head_stop_name.to_string(),
            to: tail_stop_name.to_string(),
            short_name: short_name.to_string(),
        }
    }

    pub fn has_line_info(&self) -> bool {
        !self.short_name.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMatch {
    Matched,
    Mismatched,
    NoLines,
}

/// Crude token/case-fold string similarity in `[0, 1]`, exact match (case-insensitive) scoring
/// 1.0 and otherwise falling back to whitespace-token overlap. Mirrors
/// `transit_graph::StationInfo::similarity`'s approach, reused here for line short-name/to/from
/// comparisons.
fn text_similarity(a: &str, b: &str) -> f64 {
    if a.eq_ignore_ascii_case(b) {
        return 1.0;
    }
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let overlap = ta.intersection(&tb).count() as f64;
    overlap / ta.len().max(tb.len()) as f64
}

/// True when `line` satisfies a trip's routing attributes closely enough to count as the same
/// line. Weighs short_name/to/from independently (spec.md §3's three-component line identity):
/// a blank attribute (on either side, for to/from) doesn't count against the match, but a
/// populated attribute that doesn't clear a 0.5 similarity threshold against the edge's line
/// does — so a line that matches on name but runs the wrong direction is not a match.
fn line_matches(line: &TransitEdgeLine, attrs: &RoutingAttributes) -> bool {
    let short_name_ok = attrs.short_name.is_empty() || text_similarity(&line.short_name, &attrs.short_name) > 0.5;
    let to_ok = attrs.to.is_empty() || line.to.is_empty() || text_similarity(&line.to, &attrs.to) > 0.5;
    let from_ok = attrs.from.is_empty() || line.from.is_empty() || text_similarity(&line.from, &attrs.from) > 0.5;
    short_name_ok && to_ok && from_ok
}

/// Scores one edge's transit-line metadata against a trip's routing attributes (spec.md §3,
/// §4.D cost function). An edge with no line metadata only counts against a trip that expects
/// one (`noLinesPunishFact`); an edge that does carry lines but none match the trip's short
/// name/direction is `Mismatched` (`lineUnmatchedPunishFact`).
pub fn score_line(ctx: &GraphContext, lines: &[LineId], attrs: &RoutingAttributes) -> LineMatch {
    if lines.is_empty() {
        return if attrs.has_line_info() {
            LineMatch::NoLines
        } else {
            LineMatch::Matched
        };
    }
    let any_match = lines.iter().any(|&id| line_matches(ctx.lines.get(id), attrs));
    if any_match {
        LineMatch::Matched
    } else {
        LineMatch::Mismatched
    }
}

#[cfg(test)]
mod tests {
    use transit_graph::{LineTable, TransitEdgeLine};

    use super::*;

    #[test]
    fn blank_edge_only_penalized_when_trip_expects_a_line() {
        let mut lines = LineTable::new();
        let _id = lines.intern(TransitEdgeLine {
            from: "A".into(),
            to: "B".into(),
            short_name: "12".into(),
        });
        let ctx = GraphContext {
            graph: transit_graph::TransitGraph::new(),
            lines,
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: Vec::new(),
        };
        let with_line = RoutingAttributes {
            from: "A".into(),
            to: "B".into(),
            short_name: "12".into(),
        };
        assert_eq!(score_line(&ctx, &[], &with_line), LineMatch::NoLines);
        assert_eq!(score_line(&ctx, &[], &RoutingAttributes::default()), LineMatch::Matched);
    }

    /// A line whose short_name matches the trip but whose direction doesn't is not a match
    /// (spec.md §3's three-component line identity, weighted 1/3 each).
    #[test]
    fn name_match_with_mismatched_direction_is_not_matched() {
        let mut lines = LineTable::new();
        let id = lines.intern(TransitEdgeLine {
            from: "A".into(),
            to: "B".into(),
            short_name: "12".into(),
        });
        let ctx = GraphContext {
            graph: transit_graph::TransitGraph::new(),
            lines,
            restrictor: transit_graph::Restrictor::new(),
            groups: transit_graph::StationGroupTable::new(),
            components: Vec::new(),
        };
        let wrong_direction = RoutingAttributes {
            from: "B".into(),
            to: "A".into(),
            short_name: "12".into(),
        };
        assert_eq!(score_line(&ctx, &[id], &wrong_direction), LineMatch::Mismatched);

        let right_direction = RoutingAttributes {
            from: "A".into(),
            to: "B".into(),
            short_name: "12".into(),
        };
        assert_eq!(score_line(&ctx, &[id], &right_direction), LineMatch::Matched);
    }
}
