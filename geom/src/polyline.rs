use serde::{Deserialize, Serialize};

use crate::Pt2D;

/// An ordered, non-empty sequence of points, used for edge geometry and GTFS shape output.
/// No rendering thickness/caps — this crate never draws anything.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine, String> {
        if pts.len() < 2 {
            return Err(format!("PolyLine must have >= 2 points, got {}", pts.len()));
        }
        Ok(PolyLine { pts })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// A degenerate "polyline" over a single point, used when a trip's stops collapse to one
    /// physical location (spec.md §8's "two identical consecutive stops" boundary case).
    pub fn dummy() -> PolyLine {
        PolyLine {
            pts: vec![Pt2D::new(0.0, 0.0), Pt2D::new(0.0, 0.0)],
        }
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    pub fn length(&self) -> f64 {
        self.pts.windows(2).map(|w| w[0].dist_to(w[1])).sum()
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine { pts }
    }

    /// Concatenates `other` onto `self`, assuming `self.last_pt() == other.first_pt()` (the
    /// shared-vertex convention edges are split/stitched under in component B and C).
    pub fn extend(&mut self, other: &PolyLine) {
        let mut rest = other.pts.clone();
        rest.remove(0);
        self.pts.extend(rest);
    }

    /// Ramer-Douglas-Peucker simplification (spec.md §4.B step 10), tolerance in meters.
    pub fn simplify(&self, tolerance: f64) -> PolyLine {
        if self.pts.len() <= 2 {
            return self.clone();
        }
        let mut keep = vec![false; self.pts.len()];
        keep[0] = true;
        *keep.last_mut().unwrap() = true;
        rdp(&self.pts, 0, self.pts.len() - 1, tolerance, &mut keep);
        let pts: Vec<Pt2D> = self
            .pts
            .iter()
            .zip(keep.iter())
            .filter(|(_, k)| **k)
            .map(|(p, _)| *p)
            .collect();
        PolyLine::must_new(pts)
    }
}

fn perpendicular_dist(pt: Pt2D, a: Pt2D, b: Pt2D) -> f64 {
    let (ax, ay) = (a.x(), a.y());
    let (bx, by) = (b.x(), b.y());
    let (px, py) = (pt.x(), pt.y());
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return pt.dist_to(a);
    }
    let t = ((px - ax) * dx + (py - ay) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = Pt2D::new(ax + t * dx, ay + t * dy);
    pt.dist_to(proj)
}

fn rdp(pts: &[Pt2D], lo: usize, hi: usize, tolerance: f64, keep: &mut [bool]) {
    if hi <= lo + 1 {
        return;
    }
    let (mut split, mut max_dist) = (lo, 0.0);
    for i in (lo + 1)..hi {
        let d = perpendicular_dist(pts[i], pts[lo], pts[hi]);
        if d > max_dist {
            max_dist = d;
            split = i;
        }
    }
    if max_dist > tolerance {
        keep[split] = true;
        rdp(pts, lo, split, tolerance, keep);
        rdp(pts, split, hi, tolerance, keep);
    }
}
