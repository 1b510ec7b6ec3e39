//! Typed schema for the per-mode-of-transport (MOT) configuration described in spec.md §6.
//!
//! The *parser* is intentionally thin (spec.md §1 calls the CLI/config parser an external
//! collaborator); what matters for the core is this schema, since `osm_reader`, `transit_graph`,
//! and `shape_router` all read fields straight off `MotConfig`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use core_error::CoreError;
use regex::Regex;
use serde::Deserialize;

/// One `tagKey -> {tagValue -> flags}` rule table, used for keep/drop filters, station filters,
/// and blocker filters alike (spec.md §4.A: "A filter is a pair (keep, drop) of multimaps").
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub keep: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub drop: BTreeMap<String, Vec<String>>,
    /// spec.md §4.A's `MULT_VAL_MATCH` flag: semicolon-separated tag values count as a set.
    #[serde(default)]
    pub multi_val_match: bool,
}

impl TagFilter {
    fn matches_table(table: &BTreeMap<String, Vec<String>>, tags: &abstutil::Tags, multi: bool) -> bool {
        table.iter().any(|(key, values)| {
            values
                .iter()
                .any(|v| tags.matches(key, v, multi))
        })
    }

    pub fn keeps(&self, tags: &abstutil::Tags) -> bool {
        Self::matches_table(&self.keep, tags, self.multi_val_match)
    }

    pub fn drops(&self, tags: &abstutil::Tags) -> bool {
        Self::matches_table(&self.drop, tags, self.multi_val_match)
    }

    /// `keep AND NOT drop`, per spec.md §4.A's element-kept predicate (the bounding-box / kept-by
    /// reference half of that predicate is evaluated by the caller, not here).
    pub fn admits(&self, tags: &abstutil::Tags) -> bool {
        self.keeps(tags) && !self.drops(tags)
    }
}

/// `tagKey -> tagValue -> level (0..7)` (spec.md glossary: "Level").
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LevelTable {
    pub table: BTreeMap<String, BTreeMap<String, u8>>,
    pub default_level: u8,
}

impl LevelTable {
    pub fn level_of(&self, tags: &abstutil::Tags) -> u8 {
        for (key, by_value) in &self.table {
            if let Some(v) = tags.get(key) {
                if let Some(level) = by_value.get(v) {
                    return *level;
                }
            }
        }
        self.default_level
    }
}

/// `(deep_attr, maxDist)` rule used for station-group clustering (spec.md §6) and for the
/// name/platform/track/id lookups component A's pass 3 performs.
#[derive(Clone, Debug, Deserialize)]
pub struct DeepAttrRule {
    pub tag_key: String,
    #[serde(default)]
    pub max_dist: f64,
}

/// A sequence of regex-replace rules, applied in order — the "normalizer" entries of spec.md §6
/// (station/line/track/id normalizers).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NormalizerRules {
    pub rules: Vec<(String, String)>,
}

impl NormalizerRules {
    pub fn compile(&self) -> Result<CompiledNormalizer> {
        let mut compiled = Vec::with_capacity(self.rules.len());
        for (pattern, replacement) in &self.rules {
            let re = Regex::new(pattern)
                .with_context(|| format!("invalid normalizer regex {pattern:?}"))?;
            compiled.push((re, replacement.clone()));
        }
        Ok(CompiledNormalizer { rules: compiled })
    }
}

#[derive(Default)]
pub struct CompiledNormalizer {
    rules: Vec<(Regex, String)>,
}

impl CompiledNormalizer {
    /// Applies every rule in order; a failed tag normalization yields `""`, treated as absent
    /// per spec.md §4.A's failure semantics.
    pub fn normalize(&self, input: &str) -> String {
        let mut s = input.to_string();
        for (re, replacement) in &self.rules {
            s = re.replace_all(&s, replacement.as_str()).into_owned();
        }
        s
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum Solver {
    #[default]
    Global,
    Greedy,
    Greedy2,
}

/// Every tunable of the router's cost function and hop-band pilot (spec.md §4.D), plus the two
/// constants Design Notes §9 calls out as having "no derivation in the source" and instructs us
/// to treat as tunable rather than silently fix.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RoutingOptions {
    pub level_punish: [f64; 8],
    pub one_way_punish_fac: f64,
    pub one_way_edge_punish: f64,
    pub line_unmatched_punish_fact: f64,
    pub no_lines_punish_fact: f64,
    pub full_turn_punish_fac: f64,
    pub pass_thru_stations_punish: f64,
    pub full_turn_angle: f64,
    pub max_angle_snap_reach: f64,
    pub max_snap_level: u8,
    pub snap_distances: Vec<f64>,
    pub dist_pen_factor: f64,
    pub track_pen: f64,
    pub non_osm_pen: f64,
    pub platform_unmatched_pen: f64,
    /// spec.md §9's open question: the hop-band `maxD` factor, undocumented in the source.
    pub hop_band_factor: f64,
    pub solver: Solver,
    pub use_caching: bool,
}

impl Default for RoutingOptions {
    fn default() -> RoutingOptions {
        RoutingOptions {
            level_punish: [1.0, 1.1, 1.3, 1.6, 2.0, 3.0, 5.0, 10.0],
            one_way_punish_fac: 3.0,
            one_way_edge_punish: 50.0,
            line_unmatched_punish_fact: 2.0,
            no_lines_punish_fact: 1.2,
            full_turn_punish_fac: 300.0,
            pass_thru_stations_punish: 40.0,
            full_turn_angle: 45.0,
            max_angle_snap_reach: 30.0,
            max_snap_level: 4,
            snap_distances: vec![5.0, 15.0, 35.0, 75.0],
            dist_pen_factor: 1.0,
            track_pen: 25.0,
            non_osm_pen: 10.0,
            platform_unmatched_pen: 15.0,
            hop_band_factor: 3.0,
            solver: Solver::Global,
            use_caching: true,
        }
    }
}

impl RoutingOptions {
    /// Every penalty/factor here adds straight into an edge's Dijkstra weight (shape_router's
    /// cost function, spec.md §4.D): a negative one would let the router manufacture negative-
    /// weight edges, which breaks Dijkstra's non-negative-edge-weight invariant. Reject those up
    /// front instead of corrupting a route silently.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (i, p) in self.level_punish.iter().enumerate() {
            if *p < 0.0 {
                return Err(CoreError::InvalidRoutingOption(format!("level_punish[{i}] = {p} must be >= 0")));
            }
        }
        let named = [
            ("one_way_punish_fac", self.one_way_punish_fac),
            ("one_way_edge_punish", self.one_way_edge_punish),
            ("line_unmatched_punish_fact", self.line_unmatched_punish_fact),
            ("no_lines_punish_fact", self.no_lines_punish_fact),
            ("full_turn_punish_fac", self.full_turn_punish_fac),
            ("pass_thru_stations_punish", self.pass_thru_stations_punish),
            ("dist_pen_factor", self.dist_pen_factor),
            ("track_pen", self.track_pen),
            ("non_osm_pen", self.non_osm_pen),
            ("platform_unmatched_pen", self.platform_unmatched_pen),
            ("hop_band_factor", self.hop_band_factor),
        ];
        for (name, value) in named {
            if value < 0.0 {
                return Err(CoreError::InvalidRoutingOption(format!("{name} = {value} must be >= 0")));
            }
        }
        Ok(())
    }
}

/// The complete configuration for one mode of transport (bus, tram, rail, ...), aggregating
/// every section spec.md §6 enumerates.
#[derive(Clone, Debug, Deserialize)]
pub struct MotConfig {
    pub name: String,
    /// GTFS `route_type` values this MOT config applies to.
    pub gtfs_route_types: Vec<u16>,

    pub node_filter: TagFilter,
    pub way_filter: TagFilter,
    pub relation_filter: TagFilter,

    pub level_table: LevelTable,
    pub one_way_filter: TagFilter,

    pub station_filter: TagFilter,
    pub station_blocker_filter: TagFilter,
    pub station_group_rule: DeepAttrRule,
    pub station_name_rule: DeepAttrRule,
    pub platform_rule: DeepAttrRule,
    pub id_rule: DeepAttrRule,
    pub transit_line_rule: DeepAttrRule,
    pub edge_platform_rule: DeepAttrRule,

    pub positive_restriction_filter: TagFilter,
    pub negative_restriction_filter: TagFilter,
    pub no_restriction_filter: TagFilter,

    #[serde(default)]
    pub station_normalizer: NormalizerRules,
    #[serde(default)]
    pub line_normalizer: NormalizerRules,
    #[serde(default)]
    pub track_normalizer: NormalizerRules,
    #[serde(default)]
    pub id_normalizer: NormalizerRules,

    #[serde(default)]
    pub routing_options: RoutingOptions,
}

impl MotConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.routing_options.validate()
    }
}

/// Loads one or more `MotConfig` values from a TOML file containing a top-level `[[mot]]` array.
/// This is the thin, out-of-scope-per-spec parser; the schema above is what matters.
pub fn load(path: &std::path::Path) -> Result<Vec<MotConfig>> {
    #[derive(Deserialize)]
    struct Root {
        mot: Vec<MotConfig>,
    }
    let text = fs_err::read_to_string(path)?;
    let root: Root = toml::from_str(&text).with_context(|| format!("parsing {path:?}"))?;
    for mot in &root.mot {
        mot.validate().with_context(|| format!("{:?} in {path:?}", mot.name))?;
    }
    Ok(root.mot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_level_punish_is_rejected() {
        let mut opts = RoutingOptions::default();
        opts.level_punish[3] = -1.0;
        assert!(matches!(opts.validate(), Err(CoreError::InvalidRoutingOption(_))));
    }

    #[test]
    fn negative_full_turn_punish_fac_is_rejected() {
        let mut opts = RoutingOptions::default();
        opts.full_turn_punish_fac = -300.0;
        assert!(matches!(opts.validate(), Err(CoreError::InvalidRoutingOption(_))));
    }

    #[test]
    fn default_routing_options_are_valid() {
        assert!(RoutingOptions::default().validate().is_ok());
    }

    #[test]
    fn normalizer_applies_rules_in_order() {
        let rules = NormalizerRules {
            rules: vec![("Str\\.".to_string(), "Street".to_string()), ("\\s+".to_string(), " ".to_string())],
        };
        let compiled = rules.compile().unwrap();
        assert_eq!(compiled.normalize("Main  Str."), "Main Street");
    }
}
