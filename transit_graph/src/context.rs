use crate::component::Component;
use crate::graph::TransitGraph;
use crate::lines::LineTable;
use crate::restrictor::Restrictor;
use crate::station::StationGroupTable;

/// Everything the builder and router need, threaded explicitly instead of living behind
/// globals/statics (spec.md §9, Design Notes: "replace global static maps ... with an explicit
/// `GraphContext` value"). One `GraphContext` exists per MOT configuration.
pub struct GraphContext {
    pub graph: TransitGraph,
    pub lines: LineTable,
    pub restrictor: Restrictor,
    pub groups: StationGroupTable,
    pub components: Vec<Component>,
}
