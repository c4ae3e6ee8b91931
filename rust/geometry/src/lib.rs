// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LOD1 Prism Geometry
//!
//! Extrudes building footprints into closed prisms: Delaunay triangulation
//! via spade, centroid containment filtering via geo, and nalgebra for
//! vertex math.

pub mod assembly;
pub mod error;
pub mod footprint;
pub mod mesh;
pub mod prism;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use assembly::{MeshAccumulator, MeshSpan, PrismBuilder};
pub use error::{Error, Result};
pub use footprint::{Containment, Footprint, Orientation};
pub use mesh::Mesh;
pub use prism::{
    build_prism, check_elevation, Prism, PrismOptions, PrismWarning, WallMode, CAP_AREA_TOLERANCE,
};
pub use triangulation::{cap_triangles, classify, delaunay, CapStrategy, Classification};
