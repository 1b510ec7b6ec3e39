use std::collections::BTreeMap;
use std::fmt;

use abstutil::{prettyprint_usize, Tags, Timer};
use core_error::CoreError;
use geom::{GPSBounds, LonLat, Pt2D};

// Elements are assumed to come in OSM XML's conventional order: nodes, then ways, then
// relations. References to elements the file never defines (or that were outside the bounding
// box) are just filtered out rather than treated as an error.

pub struct Document {
    pub gps_bounds: GPSBounds,
    pub nodes: BTreeMap<NodeID, Node>,
    pub ways: BTreeMap<WayID, Way>,
    pub relations: BTreeMap<RelationID, Relation>,
}

pub struct Node {
    pub pt: Pt2D,
    pub tags: Tags,
}

pub struct Way {
    pub nodes: Vec<NodeID>,
    pub pts: Vec<Pt2D>,
    pub tags: Tags,
}

pub struct Relation {
    pub tags: Tags,
    pub members: Vec<(String, Member)>,
}

pub enum Member {
    Node(NodeID),
    Way(WayID),
    Relation(RelationID),
}

/// Reads an OSM XML file (PBF is out of scope, per spec.md §6) into a `Document`. If
/// `input_gps_bounds` is non-empty, it is trusted over the file's own `<bounds>` element — this
/// is how a caller-supplied clip boundary takes precedence over whatever the file itself claims.
pub fn read(path: &str, input_gps_bounds: &GPSBounds, timer: &mut Timer) -> Result<Document, CoreError> {
    timer.start(format!("read {path}"));
    let bytes =
        std::fs::read(path).map_err(|e| CoreError::OsmParse(format!("reading {path}: {e}")))?;
    let raw_string =
        std::str::from_utf8(&bytes).map_err(|e| CoreError::OsmParse(format!("{path} is not UTF-8: {e}")))?;
    let tree = roxmltree::Document::parse(raw_string)
        .map_err(|e| CoreError::OsmParse(format!("{path}: {e}")))?;
    timer.stop(format!("read {path}"));

    let mut doc = Document {
        gps_bounds: input_gps_bounds.clone(),
        nodes: BTreeMap::new(),
        ways: BTreeMap::new(),
        relations: BTreeMap::new(),
    };

    timer.start("scrape objects");
    for obj in tree.descendants() {
        if !obj.is_element() {
            continue;
        }
        match obj.tag_name().name() {
            "bounds" => {
                if doc.gps_bounds != GPSBounds::new() {
                    continue;
                }
                doc.gps_bounds.update(LonLat::new(
                    parse_attr(obj, "minlon")?,
                    parse_attr(obj, "minlat")?,
                ));
                doc.gps_bounds.update(LonLat::new(
                    parse_attr(obj, "maxlon")?,
                    parse_attr(obj, "maxlat")?,
                ));
            }
            "node" => {
                let id = NodeID(parse_attr(obj, "id")?);
                let pt = LonLat::new(parse_attr(obj, "lon")?, parse_attr(obj, "lat")?).to_pt(&doc.gps_bounds);
                let tags = read_tags(obj);
                doc.nodes.insert(id, Node { pt, tags });
            }
            "way" => {
                let id = WayID(parse_attr(obj, "id")?);
                let tags = read_tags(obj);
                let mut nodes = Vec::new();
                let mut pts = Vec::new();
                for child in obj.children() {
                    if child.tag_name().name() == "nd" {
                        let n = NodeID(parse_attr(child, "ref")?);
                        if let Some(node) = doc.nodes.get(&n) {
                            nodes.push(n);
                            pts.push(node.pt);
                        }
                    }
                }
                if !nodes.is_empty() {
                    doc.ways.insert(id, Way { tags, nodes, pts });
                }
            }
            "relation" => {
                let id = RelationID(parse_attr(obj, "id")?);
                let tags = read_tags(obj);
                let mut members = Vec::new();
                for child in obj.children() {
                    if child.tag_name().name() == "member" {
                        let member = match child.attribute("type") {
                            Some("node") => {
                                let n = NodeID(parse_attr(child, "ref")?);
                                if !doc.nodes.contains_key(&n) {
                                    continue;
                                }
                                Member::Node(n)
                            }
                            Some("way") => {
                                let w = WayID(parse_attr(child, "ref")?);
                                if !doc.ways.contains_key(&w) {
                                    continue;
                                }
                                Member::Way(w)
                            }
                            Some("relation") => {
                                let r = RelationID(parse_attr(child, "ref")?);
                                if !doc.relations.contains_key(&r) {
                                    continue;
                                }
                                Member::Relation(r)
                            }
                            _ => continue,
                        };
                        let role = child.attribute("role").unwrap_or("").to_string();
                        members.push((role, member));
                    }
                }
                doc.relations.insert(id, Relation { tags, members });
            }
            _ => {}
        }
    }
    timer.stop("scrape objects");
    timer.note(format!(
        "found {} nodes, {} ways, {} relations",
        prettyprint_usize(doc.nodes.len()),
        prettyprint_usize(doc.ways.len()),
        prettyprint_usize(doc.relations.len())
    ));

    if doc.nodes.is_empty() {
        return Err(CoreError::BoundingBoxEmpty);
    }

    Ok(doc)
}

fn parse_attr<T: std::str::FromStr>(obj: roxmltree::Node, key: &str) -> Result<T, CoreError> {
    obj.attribute(key)
        .ok_or_else(|| CoreError::OsmParse(format!("missing attribute {key}")))?
        .parse()
        .map_err(|_| CoreError::OsmParse(format!("bad attribute {key}")))
}

fn read_tags(obj: roxmltree::Node) -> Tags {
    let mut tags = Tags::empty();
    for child in obj.children() {
        if child.tag_name().name() == "tag" {
            let (Some(key), Some(val)) = (child.attribute("k"), child.attribute("v")) else {
                continue;
            };
            // Filter out noisy, low-value attribution tags regardless of MOT config.
            if key.starts_with("tiger:") || key.starts_with("old_name:") {
                continue;
            }
            tags.insert(key, val);
        }
    }
    tags
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NodeID(pub i64);
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct WayID(pub i64);
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct RelationID(pub i64);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/node/{}", self.0)
    }
}
impl fmt::Display for WayID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/way/{}", self.0)
    }
}
impl fmt::Display for RelationID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/relation/{}", self.0)
    }
}
