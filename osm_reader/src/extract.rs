use std::collections::{BTreeMap, BTreeSet};

use abstutil::Tags;
use mot_config::MotConfig;

use crate::document::{Document, Member, NodeID, RelationID, WayID};

/// One `(from, to, shortName)` triple, interned per edge rather than per way (spec.md §3's
/// "transit edge line"). Kept as plain owned strings here; `transit_graph::lines::LineTable`
/// does the actual interning once edges are materialized.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransitLineRaw {
    pub from: String,
    pub to: String,
    pub short_name: String,
}

#[derive(Clone, Debug)]
pub struct ExtractedNode {
    pub pt: geom::Pt2D,
    pub tags: Tags,
    pub is_station: bool,
    pub is_blocker: bool,
}

#[derive(Clone, Debug)]
pub struct ExtractedWay {
    pub id: WayID,
    pub nodes: Vec<NodeID>,
    pub pts: Vec<geom::Pt2D>,
    /// 0 = both directions, 1 = forward only, 2 = reverse only (spec.md §3 invariant 1-2).
    pub one_way: u8,
    pub level: u8,
    pub max_speed_kmh: Option<f64>,
    pub track: Option<String>,
    pub transit_lines: Vec<TransitLineRaw>,
}

/// `(via, fromWay, toWay, positive)` — a turn restriction carried forward from an OSM
/// `type=restriction` relation (spec.md §4.A pass 1). `transit_graph::restrictor::Restrictor`
/// resolves `fromWay`/`toWay` to the actual edges once ways are split into edges.
#[derive(Clone, Debug)]
pub struct RestrictionRule {
    pub via: NodeID,
    pub from_way: WayID,
    pub to_way: WayID,
    pub positive: bool,
}

pub struct OsmExtract {
    pub nodes: BTreeMap<NodeID, ExtractedNode>,
    pub ways: Vec<ExtractedWay>,
    pub restrictions: Vec<RestrictionRule>,
}

/// Runs the three logical passes of spec.md §4.A over an already-parsed `Document`, scoped to
/// one MOT's filter rules. Elements outside the kept-attribute set for this MOT were already
/// dropped by `read_tags` at parse time for global junk (tiger:/old_name:); everything else is
/// filtered here per-MOT since two MOTs reading the same file can keep different elements.
pub fn extract(doc: &Document, mot: &MotConfig, timer: &mut abstutil::Timer) -> OsmExtract {
    timer.start("pass 1: nodes & relations");
    let usable_node_set: BTreeSet<NodeID> = doc.nodes.keys().copied().collect();
    let restrictions = extract_restrictions(doc, mot);
    timer.stop("pass 1: nodes & relations");

    timer.start("pass 2: ways");
    let (ways, referenced_nodes) = extract_ways(doc, mot, &usable_node_set);
    timer.stop("pass 2: ways");

    timer.start("pass 3: nodes (detailed)");
    let nodes = extract_nodes(doc, mot, &referenced_nodes);
    timer.stop("pass 3: nodes (detailed)");

    timer.note(format!(
        "kept {} nodes, {} ways, {} restrictions for mot {}",
        nodes.len(),
        ways.len(),
        restrictions.len(),
        mot.name
    ));

    OsmExtract {
        nodes,
        ways,
        restrictions,
    }
}

/// Pass 1: `type=restriction` relations with exactly one `from` and one `to` member become
/// `RestrictionRule`s; anything with more members is ignored per spec.md §4.A's failure
/// semantics ("restriction relations with more than one from/to member are ignored").
fn extract_restrictions(doc: &Document, mot: &MotConfig) -> Vec<RestrictionRule> {
    let mut out = Vec::new();
    for relation in doc.relations.values() {
        if !relation.tags.is("type", "restriction") {
            continue;
        }
        if !mot.relation_filter.admits(&relation.tags) {
            continue;
        }
        let restriction_value = match relation.tags.get("restriction") {
            Some(v) => v,
            None => continue,
        };
        let positive = restriction_value.starts_with("only_");
        let negative = restriction_value.starts_with("no_");
        if !positive && !negative {
            continue;
        }
        if !mot.positive_restriction_filter.admits(&relation.tags)
            && !mot.negative_restriction_filter.admits(&relation.tags)
        {
            continue;
        }

        let froms: Vec<WayID> = relation
            .members
            .iter()
            .filter(|(role, _)| role == "from")
            .filter_map(|(_, m)| match m {
                Member::Way(w) => Some(*w),
                _ => None,
            })
            .collect();
        let tos: Vec<WayID> = relation
            .members
            .iter()
            .filter(|(role, _)| role == "to")
            .filter_map(|(_, m)| match m {
                Member::Way(w) => Some(*w),
                _ => None,
            })
            .collect();
        let vias: Vec<NodeID> = relation
            .members
            .iter()
            .filter(|(role, _)| role == "via")
            .filter_map(|(_, m)| match m {
                Member::Node(n) => Some(*n),
                _ => None,
            })
            .collect();

        if froms.len() != 1 || tos.len() != 1 || vias.len() != 1 {
            continue;
        }
        out.push(RestrictionRule {
            via: vias[0],
            from_way: froms[0],
            to_way: tos[0],
            positive,
        });
    }
    out
}

/// Pass 2: `keep_way` per spec.md §4.A — kept by its own tags, not dropped, and touches at least
/// one usable node. Returns the kept ways plus the set of node IDs they actually reference (used
/// by pass 3 to distinguish orphan stations from ordinary untouched nodes).
fn extract_ways(
    doc: &Document,
    mot: &MotConfig,
    usable_node_set: &BTreeSet<NodeID>,
) -> (Vec<ExtractedWay>, BTreeSet<NodeID>) {
    let mut ways = Vec::new();
    let mut referenced = BTreeSet::new();
    for (id, way) in &doc.ways {
        if !mot.way_filter.admits(&way.tags) {
            continue;
        }
        if !way.nodes.iter().any(|n| usable_node_set.contains(n)) {
            continue;
        }

        let one_way = one_way_flag(mot, &way.tags);
        let level = mot.level_table.level_of(&way.tags);
        let max_speed_kmh = way.tags.get("maxspeed").and_then(|v| parse_maxspeed(v));
        let track = deep_attr_value(&way.tags, &mot.edge_platform_rule);
        let transit_lines = transit_lines_for_way(&way.tags, mot);

        for n in &way.nodes {
            referenced.insert(*n);
        }
        ways.push(ExtractedWay {
            id: *id,
            nodes: way.nodes.clone(),
            pts: way.pts.clone(),
            one_way,
            level,
            max_speed_kmh,
            track,
            transit_lines,
        });
    }
    (ways, referenced)
}

fn one_way_flag(mot: &MotConfig, tags: &Tags) -> u8 {
    if mot.one_way_filter.drops(tags) {
        return 0;
    }
    if !mot.one_way_filter.keeps(tags) {
        return 0;
    }
    match tags.get("oneway").map(String::as_str) {
        Some("-1") | Some("reverse") => 2,
        Some("yes") | Some("1") | Some("true") => 1,
        _ => 0,
    }
}

fn parse_maxspeed(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Some(mph) = trimmed.strip_suffix(" mph") {
        return mph.trim().parse::<f64>().ok().map(|v| v * 1.60934);
    }
    trimmed
        .trim_end_matches(" km/h")
        .trim()
        .parse::<f64>()
        .ok()
}

/// A way can host more than one transit line (e.g. shared bus+tram corridor); spec.md §3 keeps
/// the set on the edge. `wayRels` would normally be an index built in pass 1; since ways are few
/// enough per MOT bounding box, we look the relations up directly here instead of pre-indexing,
/// a deliberate simplification documented in DESIGN.md.
fn transit_lines_for_way(tags: &Tags, mot: &MotConfig) -> Vec<TransitLineRaw> {
    if let Some(short_name) = deep_attr_value(tags, &mot.transit_line_rule) {
        vec![TransitLineRaw {
            from: tags.get("from").cloned().unwrap_or_default(),
            to: tags.get("to").cloned().unwrap_or_default(),
            short_name,
        }]
    } else {
        Vec::new()
    }
}

fn deep_attr_value(tags: &Tags, rule: &mot_config::DeepAttrRule) -> Option<String> {
    tags.get(&rule.tag_key).cloned()
}

/// Pass 3: every kept node gets geometry; nodes matching the station filter get station info.
/// Nodes with station tags but never referenced by a kept way are still returned — they're
/// orphan stations, resolved later by `transit_graph`'s snap pass.
fn extract_nodes(
    doc: &Document,
    mot: &MotConfig,
    referenced: &BTreeSet<NodeID>,
) -> BTreeMap<NodeID, ExtractedNode> {
    let mut out = BTreeMap::new();
    for (id, node) in &doc.nodes {
        let is_station = mot.station_filter.admits(&node.tags);
        let is_blocker = mot.station_blocker_filter.admits(&node.tags);
        if !referenced.contains(id) && !is_station && !is_blocker {
            continue;
        }
        if !mot.node_filter.admits(&node.tags) && !is_station && !is_blocker {
            continue;
        }
        out.insert(
            *id,
            ExtractedNode {
                pt: node.pt,
                tags: node.tags.clone(),
                is_station,
                is_blocker,
            },
        );
    }
    out
}
