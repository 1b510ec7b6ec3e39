use std::collections::HashMap;

/// Immutable `(fromStr, toStr, shortName)` triple describing a transit line's direction and
/// display name (spec.md §3). Interned via `LineTable` instead of reference-counted, per spec.md
/// §9's Design Notes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransitEdgeLine {
    pub from: String,
    pub to: String,
    pub short_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub u32);

/// Owns the canonical set of `TransitEdgeLine` values for one transit graph; edges store
/// `LineId`s rather than duplicating the strings (spec.md §9's "dedicated intern table").
#[derive(Clone, Debug, Default)]
pub struct LineTable {
    values: Vec<TransitEdgeLine>,
    index: HashMap<TransitEdgeLine, LineId>,
}

impl LineTable {
    pub fn new() -> LineTable {
        LineTable::default()
    }

    pub fn intern(&mut self, line: TransitEdgeLine) -> LineId {
        if let Some(id) = self.index.get(&line) {
            return *id;
        }
        let id = LineId(self.values.len() as u32);
        self.index.insert(line.clone(), id);
        self.values.push(line);
        id
    }

    pub fn get(&self, id: LineId) -> &TransitEdgeLine {
        &self.values[id.0 as usize]
    }
}
