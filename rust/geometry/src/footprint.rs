// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building footprints: validated, simple 2D boundary rings

use crate::error::{Error, Result};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{coord, Coord, Line, LineString, Polygon};
use nalgebra::Point2;

/// Winding direction of a footprint ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
}

/// Position of a point relative to a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnBoundary,
    Outside,
}

/// A simple polygon boundary without holes.
///
/// The ring is stored open: an explicit closing point equal to the first
/// point is dropped, as are consecutive repeated points, so vertex `i` and
/// vertex `(i + 1) % len` always form a real edge.
#[derive(Debug, Clone)]
pub struct Footprint {
    points: Vec<Point2<f64>>,
    signed_area: f64,
    was_closed: bool,
    collapsed_duplicates: usize,
    polygon: Polygon<f64>,
}

impl Footprint {
    /// Build a footprint from an ordered ring, closed or not
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "non-finite coordinate ({}, {})",
                p.x, p.y
            )));
        }

        let input_len = points.len();
        let mut ring: Vec<Point2<f64>> = Vec::with_capacity(input_len);
        for p in points {
            if ring.last() != Some(&p) {
                ring.push(p);
            }
        }

        let was_closed = ring.len() > 1 && ring.first() == ring.last();
        if was_closed {
            ring.pop();
        }
        let collapsed_duplicates = input_len - ring.len() - usize::from(was_closed);

        if ring.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "footprint needs at least 3 distinct points, got {}",
                ring.len()
            )));
        }

        check_simple(&ring)?;

        let signed_area = shoelace(&ring);
        if signed_area == 0.0 {
            return Err(Error::InvalidGeometry(
                "footprint encloses zero area".to_string(),
            ));
        }

        let polygon = Polygon::new(
            LineString::from(ring.iter().map(|p| to_coord(*p)).collect::<Vec<_>>()),
            Vec::new(),
        );

        Ok(Self {
            points: ring,
            signed_area,
            was_closed,
            collapsed_duplicates,
            polygon,
        })
    }

    /// Build a footprint from raw `[x, y]` pairs
    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self> {
        Self::new(coords.iter().map(|c| Point2::new(c[0], c[1])).collect())
    }

    /// Boundary points, open ring order
    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Number of distinct boundary points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated footprint
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the input ring repeated its first point at the end
    #[inline]
    pub fn was_closed(&self) -> bool {
        self.was_closed
    }

    /// Number of consecutive repeated points removed from the input
    #[inline]
    pub fn collapsed_duplicates(&self) -> usize {
        self.collapsed_duplicates
    }

    /// Shoelace area, positive for counter-clockwise rings
    #[inline]
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        if self.signed_area > 0.0 {
            Orientation::CounterClockwise
        } else {
            Orientation::Clockwise
        }
    }

    /// Length of the bounding box diagonal
    pub fn extent(&self) -> f64 {
        let (min_x, max_x, min_y, max_y) = self.points.iter().fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(min_x, max_x, min_y, max_y), p| {
                (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
            },
        );
        ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt()
    }

    /// Locate a point relative to the footprint boundary
    pub fn classify_point(&self, point: Point2<f64>) -> Containment {
        match self.polygon.coordinate_position(&to_coord(point)) {
            CoordPos::Inside => Containment::Inside,
            CoordPos::OnBoundary => Containment::OnBoundary,
            CoordPos::Outside => Containment::Outside,
        }
    }
}

#[inline]
fn to_coord(p: Point2<f64>) -> Coord<f64> {
    coord! { x: p.x, y: p.y }
}

/// Shoelace formula taken relative to the first point, which keeps large
/// projected coordinates from cancelling out.
fn shoelace(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    let origin = ring[0];
    let twice_area: f64 = (0..n)
        .map(|i| {
            let a = ring[i] - origin;
            let b = ring[(i + 1) % n] - origin;
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice_area * 0.5
}

/// Reject rings where non-adjacent edges touch or adjacent edges fold back
/// onto each other. Quadratic in the edge count.
fn check_simple(ring: &[Point2<f64>]) -> Result<()> {
    let n = ring.len();
    let edge = |i: usize| Line::new(to_coord(ring[i]), to_coord(ring[(i + 1) % n]));

    for i in 0..n {
        let a = edge(i);
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(a, edge(j)) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => {
                    return Err(Error::InvalidGeometry(format!(
                        "ring is not simple: edges {} and {} intersect",
                        i, j
                    )));
                }
            }
        }
    }

    Ok(())
}
