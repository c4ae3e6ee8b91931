// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

/// Indexed triangle mesh.
///
/// Positions stay in f64: footprints usually arrive in projected metre
/// coordinates (UTM and similar) where f32 would lose sub-metre precision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) {
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Position of vertex `index`
    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3::new(p[0], p[1], p[2])
    }

    /// Vertex indices of triangle `index`
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        let t = &self.indices[index * 3..index * 3 + 3];
        [t[0], t[1], t[2]]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Unnormalized face normal (cross product of the two leading edges).
    /// Its length is twice the triangle area.
    pub fn face_normal(&self, index: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangle(index).map(|i| self.vertex(i as usize));
        (b - a).cross(&(c - a))
    }

    pub fn triangle_area(&self, index: usize) -> f64 {
        self.face_normal(index).norm() * 0.5
    }

    /// Signed enclosed volume (divergence theorem). Positive when a closed
    /// mesh has outward-facing triangles.
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| {
                let [a, b, c] = t.map(|i| self.vertex(i as usize).coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Whether every index refers to an existing vertex
    pub fn indices_valid(&self) -> bool {
        let count = self.vertex_count();
        self.indices.iter().all(|&i| (i as usize) < count)
    }

    /// Number of directed edges without an oppositely oriented partner
    pub fn boundary_edges(&self) -> usize {
        let mut edges: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        for [a, b, c] in self.triangles() {
            for edge in [(a, b), (b, c), (c, a)] {
                *edges.entry(edge).or_insert(0) += 1;
            }
        }

        edges
            .iter()
            .filter(|&(&(a, b), &count)| count != 1 || edges.get(&(b, a)) != Some(&1))
            .map(|(_, &count)| count)
            .sum()
    }

    /// Closed and consistently oriented: every directed edge is matched by
    /// exactly one edge running the other way.
    pub fn is_watertight(&self) -> bool {
        !self.indices.is_empty() && self.boundary_edges() == 0
    }

    /// Append another mesh, offsetting its indices past this mesh's vertices
    pub fn merge(&mut self, other: &Mesh) -> Result<()> {
        let vertex_offset = self.vertex_count();
        let total = vertex_offset + other.vertex_count();
        if total > u32::MAX as usize {
            return Err(Error::IndexOverflow { vertices: total });
        }
        let vertex_offset = vertex_offset as u32;

        self.positions.reserve(other.positions.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));

        Ok(())
    }
}
