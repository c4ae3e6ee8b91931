// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cap triangulation
//!
//! The reference strategy triangulates the footprint vertices with spade's
//! Delaunay triangulation, which covers the convex hull, then keeps only the
//! triangles whose centroid falls inside the footprint. earcutr is available
//! as a polygon-aware alternative for very large rings.

use crate::error::{Error, Result};
use crate::footprint::{Containment, Footprint};
use nalgebra::Point2;
use spade::{DelaunayTriangulation, Triangulation as _};

/// Triangles with `|2 * area| <= DEGENERATE_AREA_EPSILON * extent²` are
/// treated as collinear and skipped before the containment test.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// How cap triangles are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStrategy {
    /// Delaunay over the convex hull, filtered by centroid containment
    #[default]
    DelaunayFiltered,
    /// Ear clipping on the ring itself
    Earcut,
}

/// Outcome of filtering a triangulation against its footprint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Triangles kept for the caps, as ring indices
    pub kept: Vec<[usize; 3]>,
    /// Triangles dropped because their centroid lies outside the footprint
    pub outside: usize,
    /// Zero-area triangles dropped without a containment test
    pub degenerate: usize,
}

/// Twice the signed area of a 2D triangle, positive when counter-clockwise
#[inline]
pub fn twice_signed_area(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Delaunay triangulation of a point set.
/// Returns triangles as indices into `points`, covering their convex hull.
pub fn delaunay(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    if points.len() < 3 {
        return Err(Error::Triangulation(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    let mut triangulation: DelaunayTriangulation<spade::Point2<f64>> =
        DelaunayTriangulation::new();

    // Spade hands out vertex indices in insertion order and returns the
    // existing handle for a repeated position.
    let mut ring_index = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let handle = triangulation
            .insert(spade::Point2::new(p.x, p.y))
            .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;
        if handle.index() == ring_index.len() {
            ring_index.push(i);
        }
    }

    let triangles = triangulation
        .inner_faces()
        .map(|face| {
            let [a, b, c] = face.vertices();
            [
                ring_index[a.fix().index()],
                ring_index[b.fix().index()],
                ring_index[c.fix().index()],
            ]
        })
        .collect();

    Ok(triangles)
}

/// Ear-clipping triangulation of a simple ring
pub fn earcut(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    if points.len() < 3 {
        return Err(Error::Triangulation(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    let mut vertices = Vec::with_capacity(points.len() * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;

    Ok(indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect())
}

/// Keep the triangles whose centroid lies inside the footprint.
///
/// A centroid on the boundary counts as inside. Degenerate triangles are
/// counted and skipped before the containment test.
pub fn classify(footprint: &Footprint, triangles: &[[usize; 3]]) -> Classification {
    let points = footprint.points();
    let min_twice_area = DEGENERATE_AREA_EPSILON * footprint.extent().powi(2);
    let mut result = Classification {
        kept: Vec::with_capacity(triangles.len()),
        ..Default::default()
    };

    for &triangle in triangles {
        let [a, b, c] = triangle.map(|i| points[i]);

        if twice_signed_area(a, b, c).abs() <= min_twice_area {
            result.degenerate += 1;
            continue;
        }

        let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        match footprint.classify_point(centroid) {
            Containment::Inside | Containment::OnBoundary => result.kept.push(triangle),
            Containment::Outside => result.outside += 1,
        }
    }

    result
}

/// Triangulate a footprint with the given strategy and filter the result
pub fn cap_triangles(footprint: &Footprint, strategy: CapStrategy) -> Result<Classification> {
    let triangles = match strategy {
        CapStrategy::DelaunayFiltered => delaunay(footprint.points())?,
        CapStrategy::Earcut => earcut(footprint.points())?,
    };
    Ok(classify(footprint, &triangles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kept_area(footprint: &Footprint, classification: &Classification) -> f64 {
        let points = footprint.points();
        classification
            .kept
            .iter()
            .map(|t| twice_signed_area(points[t[0]], points[t[1]], points[t[2]]).abs() * 0.5)
            .sum()
    }

    fn l_shape() -> Footprint {
        Footprint::from_coords(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_delaunay_square() {
        let footprint =
            Footprint::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
        let triangles = delaunay(footprint.points()).unwrap();
        assert_eq!(triangles.len(), 2);
        for t in &triangles {
            assert!(t.iter().all(|&i| i < 4));
        }
    }

    #[test]
    fn test_delaunay_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(delaunay(&points).is_err());
    }

    #[test]
    fn test_l_shape_notch_triangle_is_dropped() {
        let footprint = l_shape();
        let triangles = delaunay(footprint.points()).unwrap();

        // The hull edge (2,1)-(1,2) closes the notch with the reflex vertex (1,1)
        let notch = triangles.iter().find(|t| {
            let mut sorted = **t;
            sorted.sort_unstable();
            sorted == [2, 3, 4]
        });
        assert!(notch.is_some(), "hull triangulation should span the notch");

        let classification = classify(&footprint, &triangles);
        assert_eq!(classification.outside, 1);
        assert_eq!(classification.kept.len(), triangles.len() - 1);
        assert!(!classification.kept.contains(notch.unwrap()));
        assert_relative_eq!(kept_area(&footprint, &classification), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let footprint =
            Footprint::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
        let classification = classify(&footprint, &[[0, 1, 2], [0, 0, 1]]);
        assert_eq!(classification.degenerate, 1);
        assert_eq!(classification.kept, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_earcut_matches_footprint_area() {
        let footprint = l_shape();
        let classification = cap_triangles(&footprint, CapStrategy::Earcut).unwrap();
        assert_eq!(classification.kept.len(), 4);
        assert_eq!(classification.outside, 0);
        assert_relative_eq!(kept_area(&footprint, &classification), 3.0, epsilon = 1e-9);
    }
}
