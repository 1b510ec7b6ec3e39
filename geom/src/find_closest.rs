use std::collections::HashMap;

use crate::Pt2D;

/// A uniform grid spatial index, good enough for the bounded-radius queries station snapping
/// and gap-fixing need (spec.md §4.B, §4.B.1), without pulling in a full R-tree crate.
pub struct FindClosest<K: Clone> {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<(K, Pt2D)>>,
}

impl<K: Clone> FindClosest<K> {
    pub fn new(cell_size_meters: f64) -> FindClosest<K> {
        FindClosest {
            cell_size: cell_size_meters.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, pt: Pt2D) -> (i64, i64) {
        (
            (pt.x() / self.cell_size).floor() as i64,
            (pt.y() / self.cell_size).floor() as i64,
        )
    }

    pub fn add(&mut self, key: K, pt: Pt2D) {
        self.cells.entry(self.cell_of(pt)).or_default().push((key, pt));
    }

    /// All entries within `radius` meters of `query`, nearest first.
    pub fn all_within(&self, query: Pt2D, radius: f64) -> Vec<(K, Pt2D, f64)> {
        let (cx, cy) = self.cell_of(query);
        let reach = (radius / self.cell_size).ceil() as i64 + 1;
        let mut out = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if let Some(entries) = self.cells.get(&(cx + dx, cy + dy)) {
                    for (k, pt) in entries {
                        let d = query.dist_to(*pt);
                        if d <= radius {
                            out.push((k.clone(), *pt, d));
                        }
                    }
                }
            }
        }
        out.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap());
        out
    }

    pub fn closest_within(&self, query: Pt2D, radius: f64) -> Option<(K, Pt2D, f64)> {
        self.all_within(query, radius).into_iter().next()
    }
}
