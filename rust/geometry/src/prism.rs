// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Prism extrusion - turning a footprint and a height into a closed solid

use crate::error::{Error, Result};
use crate::footprint::{Footprint, Orientation};
use crate::mesh::Mesh;
use crate::triangulation::{cap_triangles, twice_signed_area, CapStrategy};
use nalgebra::Point3;

/// Which boundary edges receive a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallMode {
    /// Wall every edge including last -> first; the prism is watertight
    #[default]
    Closed,
    /// Skip the last -> first edge, leaving one wall segment open
    Open,
}

/// Options controlling prism construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrismOptions {
    pub caps: CapStrategy,
    pub walls: WallMode,
}

/// Relative tolerance between the summed cap area and the footprint area
pub const CAP_AREA_TOLERANCE: f64 = 1e-9;

/// Non-fatal findings while building a prism
#[derive(Debug, Clone, PartialEq)]
pub enum PrismWarning {
    /// No cap triangle survived classification; only walls were emitted
    DegenerateTriangulation { outside: usize, degenerate: usize },
    /// Elevation is zero, caps coincide and walls have no area
    ZeroHeight,
    /// Consecutive repeated ring points were removed
    CollapsedDuplicates(usize),
    /// The kept cap triangles do not tessellate the footprint: a triangle
    /// crosses the ring or an interior one was dropped. `open_edges` counts
    /// unmatched directed edges beyond those the wall mode leaves open.
    CapMismatch {
        cap_area: f64,
        footprint_area: f64,
        open_edges: usize,
    },
}

/// A single extruded footprint.
///
/// Vertices `0..n` form the base ring at Z=0 and `n..2n` the top ring at the
/// elevation, in footprint order. Faces are stored base cap first, then top
/// cap, then walls.
#[derive(Debug, Clone)]
pub struct Prism {
    pub mesh: Mesh,
    pub base_faces: usize,
    pub top_faces: usize,
    pub wall_faces: usize,
    pub warnings: Vec<PrismWarning>,
}

/// Validate an elevation value for extrusion
pub fn check_elevation(elevation: Option<f64>) -> Result<f64> {
    match elevation {
        Some(h) if !h.is_finite() => Err(Error::MissingElevation),
        Some(h) if h < 0.0 => Err(Error::InvalidElevation(h)),
        Some(h) => Ok(h),
        None => Err(Error::MissingElevation),
    }
}

/// Extrude a footprint from Z=0 up to `elevation`
pub fn build_prism(
    footprint: &Footprint,
    elevation: f64,
    options: &PrismOptions,
) -> Result<Prism> {
    let height = check_elevation(Some(elevation))?;

    let n = footprint.len();
    if n * 2 > u32::MAX as usize {
        return Err(Error::IndexOverflow { vertices: n * 2 });
    }
    let offset = n as u32;

    let classification = cap_triangles(footprint, options.caps)?;

    let wall_edges = match options.walls {
        WallMode::Closed => n,
        WallMode::Open => n - 1,
    };
    let cap_faces = classification.kept.len();
    let mut mesh = Mesh::with_capacity(n * 2, (cap_faces * 2 + wall_edges * 2) * 3);

    // Base ring then top ring, sharing (x, y) per index
    for p in footprint.points() {
        mesh.add_vertex(Point3::new(p.x, p.y, 0.0));
    }
    for p in footprint.points() {
        mesh.add_vertex(Point3::new(p.x, p.y, height));
    }

    // Base cap faces down: clockwise when seen from above
    let points = footprint.points();
    let base: Vec<[u32; 3]> = classification
        .kept
        .iter()
        .map(|&[a, b, c]| {
            if twice_signed_area(points[a], points[b], points[c]) > 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .map(|t| t.map(|i| i as u32))
        .collect();

    for &[a, b, c] in &base {
        mesh.add_triangle(a, b, c);
    }
    // Shifted to the top ring with the trailing pair swapped to face up
    for &[a, b, c] in &base {
        mesh.add_triangle(a + offset, c + offset, b + offset);
    }

    create_walls(footprint.orientation(), n, wall_edges, &mut mesh);

    let mut warnings = Vec::new();
    if cap_faces == 0 {
        warnings.push(PrismWarning::DegenerateTriangulation {
            outside: classification.outside,
            degenerate: classification.degenerate,
        });
    } else if let Some(mismatch) =
        check_caps(footprint, &classification.kept, &mesh, options.walls)
    {
        warnings.push(mismatch);
    }
    if height == 0.0 {
        warnings.push(PrismWarning::ZeroHeight);
    }
    if footprint.collapsed_duplicates() > 0 {
        warnings.push(PrismWarning::CollapsedDuplicates(
            footprint.collapsed_duplicates(),
        ));
    }

    Ok(Prism {
        mesh,
        base_faces: cap_faces,
        top_faces: cap_faces,
        wall_faces: wall_edges * 2,
        warnings,
    })
}

/// Compare the kept caps against the footprint by area and by mesh closure
fn check_caps(
    footprint: &Footprint,
    kept: &[[usize; 3]],
    mesh: &Mesh,
    walls: WallMode,
) -> Option<PrismWarning> {
    let points = footprint.points();
    let cap_area = kept
        .iter()
        .map(|&[a, b, c]| twice_signed_area(points[a], points[b], points[c]).abs())
        .sum::<f64>()
        * 0.5;
    let footprint_area = footprint.area();

    // The skipped closing quad leaves its four edges unmatched
    let expected_open = match walls {
        WallMode::Closed => 0,
        WallMode::Open => 4,
    };
    let open_edges = mesh.boundary_edges().saturating_sub(expected_open);

    let area_matches = (cap_area - footprint_area).abs() <= CAP_AREA_TOLERANCE * footprint_area;
    if area_matches && open_edges == 0 {
        return None;
    }

    Some(PrismWarning::CapMismatch {
        cap_area,
        footprint_area,
        open_edges,
    })
}

/// Two triangles per boundary edge between base vertex `i` and top vertex
/// `i + n`. The CCW pattern points outward for counter-clockwise rings;
/// clockwise rings get the trailing indices swapped.
fn create_walls(orientation: Orientation, n: usize, edges: usize, mesh: &mut Mesh) {
    let offset = n as u32;

    for i in 0..edges {
        let a = i as u32;
        let b = ((i + 1) % n) as u32;

        match orientation {
            Orientation::CounterClockwise => {
                mesh.add_triangle(a, b, a + offset);
                mesh.add_triangle(b, b + offset, a + offset);
            }
            Orientation::Clockwise => {
                mesh.add_triangle(a, a + offset, b);
                mesh.add_triangle(b, a + offset, b + offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Footprint {
        Footprint::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_unit_square_closed() {
        let prism = build_prism(&unit_square(), 5.0, &PrismOptions::default()).unwrap();
        assert_eq!(prism.mesh.vertex_count(), 8);
        assert_eq!(prism.base_faces, 2);
        assert_eq!(prism.top_faces, 2);
        assert_eq!(prism.wall_faces, 8);
        assert_eq!(prism.mesh.triangle_count(), 12);
        assert!(prism.mesh.is_watertight());
        assert!(prism.warnings.is_empty());
        assert_relative_eq!(prism.mesh.signed_volume(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_square_open_walls() {
        let options = PrismOptions {
            walls: WallMode::Open,
            ..Default::default()
        };
        let prism = build_prism(&unit_square(), 5.0, &options).unwrap();
        assert_eq!(prism.wall_faces, 6);
        assert_eq!(prism.mesh.triangle_count(), 10);
        assert!(!prism.mesh.is_watertight());
        // The missing quad leaves its four edges unmatched
        assert_eq!(prism.mesh.boundary_edges(), 4);
    }

    #[test]
    fn test_cap_normals_face_away() {
        let prism = build_prism(&unit_square(), 3.0, &PrismOptions::default()).unwrap();
        for i in 0..prism.base_faces {
            assert!(prism.mesh.face_normal(i).z < 0.0);
        }
        for i in prism.base_faces..prism.base_faces + prism.top_faces {
            assert!(prism.mesh.face_normal(i).z > 0.0);
        }
    }

    #[test]
    fn test_clockwise_ring_walls_point_outward() {
        let footprint =
            Footprint::from_coords(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]).unwrap();
        assert_eq!(footprint.orientation(), Orientation::Clockwise);

        let prism = build_prism(&footprint, 2.0, &PrismOptions::default()).unwrap();
        assert!(prism.mesh.is_watertight());
        assert_relative_eq!(prism.mesh.signed_volume(), 2.0, epsilon = 1e-9);

        let walls = prism.base_faces + prism.top_faces..prism.mesh.triangle_count();
        for i in walls {
            let [a, b, c] = prism.mesh.triangle(i).map(|v| prism.mesh.vertex(v as usize));
            let mid = (a.coords + b.coords + c.coords) / 3.0;
            let outward = nalgebra::Vector3::new(mid.x - 0.5, mid.y - 0.5, 0.0);
            assert!(prism.mesh.face_normal(i).dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_top_vertices_share_base_xy() {
        let prism = build_prism(&unit_square(), 7.5, &PrismOptions::default()).unwrap();
        for i in 0..4 {
            let base = prism.mesh.vertex(i);
            let top = prism.mesh.vertex(i + 4);
            assert_eq!((base.x, base.y), (top.x, top.y));
            assert_eq!(base.z, 0.0);
            assert_eq!(top.z, 7.5);
        }
    }

    #[test]
    fn test_zero_height_warns() {
        let prism = build_prism(&unit_square(), 0.0, &PrismOptions::default()).unwrap();
        assert_eq!(prism.warnings, vec![PrismWarning::ZeroHeight]);
    }

    #[test]
    fn test_elevation_validation() {
        assert_eq!(check_elevation(None), Err(Error::MissingElevation));
        assert_eq!(check_elevation(Some(f64::NAN)), Err(Error::MissingElevation));
        assert_eq!(check_elevation(Some(f64::INFINITY)), Err(Error::MissingElevation));
        assert_eq!(check_elevation(Some(-1.0)), Err(Error::InvalidElevation(-1.0)));
        assert_eq!(check_elevation(Some(12.5)), Ok(12.5));

        let result = build_prism(&unit_square(), f64::NAN, &PrismOptions::default());
        assert!(matches!(result, Err(Error::MissingElevation)));
    }

    #[test]
    fn test_sliver_emits_walls_only() {
        let sliver =
            Footprint::from_coords(&[[0.0, 0.0], [1.0, 0.0], [0.5, 1e-14]]).unwrap();
        let prism = build_prism(&sliver, 3.0, &PrismOptions::default()).unwrap();
        assert_eq!(prism.base_faces, 0);
        assert_eq!(prism.top_faces, 0);
        assert_eq!(prism.wall_faces, 6);
        assert_eq!(prism.mesh.triangle_count(), 6);
        assert_eq!(
            prism.warnings,
            vec![PrismWarning::DegenerateTriangulation {
                outside: 0,
                degenerate: 1
            }]
        );
    }

    #[test]
    fn test_crossing_cap_triangle_warns() {
        // Delaunay keeps a triangle across the 3 -> 4 edge
        let footprint = Footprint::from_coords(&[
            [15.0, 0.0],
            [3.0, 2.0],
            [3.0, 7.0],
            [0.0, 3.0],
            [-13.0, 15.0],
            [-8.0, 2.0],
            [-17.0, -5.0],
            [-13.0, -15.0],
            [-1.0, -10.0],
            [5.0, -11.0],
            [4.0, -3.0],
        ])
        .unwrap();
        let prism = build_prism(&footprint, 4.0, &PrismOptions::default()).unwrap();
        assert_eq!(prism.base_faces, 10);
        assert!(matches!(
            prism.warnings.as_slice(),
            [PrismWarning::CapMismatch { cap_area, .. }] if *cap_area > footprint.area()
        ));
    }

    #[test]
    fn test_open_walls_alone_do_not_warn() {
        let options = PrismOptions {
            walls: WallMode::Open,
            ..Default::default()
        };
        let prism = build_prism(&unit_square(), 5.0, &options).unwrap();
        assert!(prism.warnings.is_empty());
    }

    #[test]
    fn test_collapsed_duplicates_warn() {
        let footprint = Footprint::from_coords(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ])
        .unwrap();
        let prism = build_prism(&footprint, 1.0, &PrismOptions::default()).unwrap();
        assert_eq!(prism.warnings, vec![PrismWarning::CollapsedDuplicates(1)]);
        assert_eq!(prism.mesh.vertex_count(), 8);
    }
}
