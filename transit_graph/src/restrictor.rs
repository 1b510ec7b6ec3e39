use std::collections::HashMap;

use crate::graph::{EdgeIdx, NodeIdx};

/// Per-via-node turn-restriction rules (spec.md §3). Positive rules ("only go to") and negative
/// rules ("must not go to") are stored separately so `may` can apply source semantics exactly:
/// if any positive rule exists for `(from, via)`, only its `to` edges are allowed; otherwise every
/// edge is allowed except ones named by a negative rule.
#[derive(Clone, Debug, Default)]
pub struct Restrictor {
    positive: HashMap<(NodeIdx, EdgeIdx), Vec<EdgeIdx>>,
    negative: HashMap<(NodeIdx, EdgeIdx), Vec<EdgeIdx>>,
}

impl Restrictor {
    pub fn new() -> Restrictor {
        Restrictor::default()
    }

    pub fn add_positive(&mut self, via: NodeIdx, from: EdgeIdx, to: EdgeIdx) {
        self.positive.entry((via, from)).or_default().push(to);
    }

    pub fn add_negative(&mut self, via: NodeIdx, from: EdgeIdx, to: EdgeIdx) {
        self.negative.entry((via, from)).or_default().push(to);
    }

    pub fn may(&self, via: NodeIdx, from: EdgeIdx, to: EdgeIdx) -> bool {
        if let Some(allowed) = self.positive.get(&(via, from)) {
            return allowed.contains(&to);
        }
        if let Some(forbidden) = self.negative.get(&(via, from)) {
            return !forbidden.contains(&to);
        }
        true
    }

    /// Rewrites every rule mentioning `old` (as either the `from` or a `to` member) to mention
    /// `new` instead. Used when an edge is split or duplicated during snapping/collapsing, to
    /// preserve spec.md §8 invariant 2 ("restriction preservation under transforms").
    pub fn replace_edge(&mut self, old: EdgeIdx, new: EdgeIdx) {
        Self::replace_in(&mut self.positive, old, new);
        Self::replace_in(&mut self.negative, old, new);
    }

    fn replace_in(table: &mut HashMap<(NodeIdx, EdgeIdx), Vec<EdgeIdx>>, old: EdgeIdx, new: EdgeIdx) {
        let keys_to_move: Vec<(NodeIdx, EdgeIdx)> =
            table.keys().copied().filter(|(_, from)| *from == old).collect();
        for key in keys_to_move {
            if let Some(v) = table.remove(&key) {
                table.insert((key.0, new), v);
            }
        }
        for v in table.values_mut() {
            for slot in v.iter_mut() {
                if *slot == old {
                    *slot = new;
                }
            }
        }
    }

    /// Like `replace_edge`, but the old edge's rules apply to *both* `new1` and `new2` — used
    /// when a way is split into two edges at an intermediate node rather than fully superseded.
    pub fn duplicate_edge(&mut self, old: EdgeIdx, new1: EdgeIdx, new2: EdgeIdx) {
        let positive_from: Vec<((NodeIdx, EdgeIdx), Vec<EdgeIdx>)> = self
            .positive
            .iter()
            .filter(|((_, from), _)| *from == old)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        for ((via, _), tos) in positive_from {
            for to in &tos {
                self.positive.entry((via, new1)).or_default().push(*to);
                self.positive.entry((via, new2)).or_default().push(*to);
            }
        }
        let negative_from: Vec<((NodeIdx, EdgeIdx), Vec<EdgeIdx>)> = self
            .negative
            .iter()
            .filter(|((_, from), _)| *from == old)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        for ((via, _), tos) in negative_from {
            for to in &tos {
                self.negative.entry((via, new1)).or_default().push(*to);
                self.negative.entry((via, new2)).or_default().push(*to);
            }
        }
        for v in self.positive.values_mut() {
            if v.contains(&old) {
                v.push(new1);
                v.push(new2);
            }
        }
        for v in self.negative.values_mut() {
            if v.contains(&old) {
                v.push(new1);
                v.push(new2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_restriction_blocks_named_turn_only() {
        let via = NodeIdx(0);
        let from = EdgeIdx(0);
        let blocked = EdgeIdx(1);
        let allowed = EdgeIdx(2);
        let mut r = Restrictor::new();
        r.add_negative(via, from, blocked);
        assert!(!r.may(via, from, blocked));
        assert!(r.may(via, from, allowed));
    }

    #[test]
    fn positive_restriction_allows_only_named_turn() {
        let via = NodeIdx(0);
        let from = EdgeIdx(0);
        let only = EdgeIdx(1);
        let other = EdgeIdx(2);
        let mut r = Restrictor::new();
        r.add_positive(via, from, only);
        assert!(r.may(via, from, only));
        assert!(!r.may(via, from, other));
    }
}
