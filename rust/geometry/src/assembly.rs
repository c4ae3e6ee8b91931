// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concatenation of per-footprint meshes into one combined mesh
//!
//! Local meshes are indexed from zero. The accumulator owns the running
//! vertex offset and advances it exactly once per appended mesh, so prisms
//! can be built anywhere (including in parallel) and merged afterwards in
//! input order with identical output.

use crate::error::Result;
use crate::footprint::Footprint;
use crate::mesh::Mesh;
use crate::prism::{build_prism, Prism, PrismOptions};
use std::ops::Range;

/// Where an appended mesh landed inside the combined mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSpan {
    /// Global vertex indices
    pub vertices: Range<u32>,
    /// Global triangle indices
    pub faces: Range<usize>,
}

impl MeshSpan {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        (self.vertices.end - self.vertices.start) as usize
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Running combined mesh with its vertex offset
#[derive(Debug, Clone, Default)]
pub struct MeshAccumulator {
    mesh: Mesh,
}

impl MeshAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next appended mesh will receive
    #[inline]
    pub fn vertex_offset(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Append a locally indexed mesh. Fails only if the combined vertex
    /// count no longer fits in u32 indices, in which case nothing is appended.
    pub fn append(&mut self, local: &Mesh) -> Result<MeshSpan> {
        let vertex_start = self.mesh.vertex_count();
        let face_start = self.mesh.triangle_count();

        self.mesh.merge(local)?;

        Ok(MeshSpan {
            vertices: vertex_start as u32..self.mesh.vertex_count() as u32,
            faces: face_start..self.mesh.triangle_count(),
        })
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Builds prisms footprint by footprint and concatenates them
#[derive(Debug, Clone, Default)]
pub struct PrismBuilder {
    options: PrismOptions,
    accumulator: MeshAccumulator,
}

impl PrismBuilder {
    pub fn new(options: PrismOptions) -> Self {
        Self {
            options,
            accumulator: MeshAccumulator::new(),
        }
    }

    #[inline]
    pub fn options(&self) -> &PrismOptions {
        &self.options
    }

    /// Build one prism and append it. On error the combined mesh is unchanged.
    pub fn add(&mut self, footprint: &Footprint, elevation: f64) -> Result<(MeshSpan, Prism)> {
        let prism = build_prism(footprint, elevation, &self.options)?;
        let span = self.append(&prism)?;
        Ok((span, prism))
    }

    /// Append a prism that was built elsewhere
    pub fn append(&mut self, prism: &Prism) -> Result<MeshSpan> {
        self.accumulator.append(&prism.mesh)
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        self.accumulator.mesh()
    }

    pub fn finish(self) -> Mesh {
        self.accumulator.into_mesh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn square(x: f64, y: f64) -> Footprint {
        Footprint::from_coords(&[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0]]).unwrap()
    }

    #[test]
    fn test_accumulator_offsets() {
        let mut acc = MeshAccumulator::new();
        let a = build_prism(&square(0.0, 0.0), 1.0, &PrismOptions::default()).unwrap();
        let b = build_prism(&square(5.0, 0.0), 2.0, &PrismOptions::default()).unwrap();

        let span_a = acc.append(&a.mesh).unwrap();
        assert_eq!(acc.vertex_offset(), 8);
        let span_b = acc.append(&b.mesh).unwrap();

        assert_eq!(span_a, MeshSpan { vertices: 0..8, faces: 0..12 });
        assert_eq!(span_b, MeshSpan { vertices: 8..16, faces: 12..24 });

        let mesh = acc.into_mesh();
        assert_eq!(mesh.vertex_count(), 16);
        assert!(mesh.indices_valid());
        assert!(mesh.is_watertight());
        for f in span_b.faces {
            assert!(mesh.triangle(f).iter().all(|i| span_b.vertices.contains(i)));
        }
    }

    #[test]
    fn test_empty_mesh_keeps_offset() {
        let mut acc = MeshAccumulator::new();
        let span = acc.append(&Mesh::new()).unwrap();
        assert_eq!(span.vertex_count(), 0);
        assert_eq!(span.face_count(), 0);
        assert_eq!(acc.vertex_offset(), 0);
    }

    #[test]
    fn test_builder_rejects_without_touching_mesh() {
        let mut builder = PrismBuilder::default();
        builder.add(&square(0.0, 0.0), 3.0).unwrap();
        let before = builder.mesh().clone();

        let result = builder.add(&square(2.0, 0.0), -4.0);
        assert!(matches!(result, Err(Error::InvalidElevation(_))));
        assert_eq!(builder.mesh(), &before);

        let (span, prism) = builder.add(&square(2.0, 0.0), 4.0).unwrap();
        assert_eq!(span.vertices, 8..16);
        assert_eq!(prism.mesh.vertex_count(), 8);
        assert_eq!(builder.finish().triangle_count(), 24);
    }
}
