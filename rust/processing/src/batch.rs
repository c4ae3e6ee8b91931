// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch extrusion with per-feature failure isolation.
//!
//! Every record is built into its own locally indexed prism, optionally in
//! parallel with rayon. The prisms are then appended to a single
//! [`PrismBuilder`] strictly in input order, so vertex and face ordering is
//! the same whichever mode ran.

use crate::error::Result;
use crate::types::{
    BatchOutput, BatchStats, FeatureReport, FeatureSpan, FootprintGeometry, FootprintRecord,
    ReportKind, Severity,
};
use lod1_geometry::{
    build_prism, check_elevation, Error, Footprint, Prism, PrismBuilder, PrismOptions,
};
use rayon::prelude::*;
use std::time::Instant;

/// Batch configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub prism: PrismOptions,
    /// Build prisms on the rayon pool before the ordered merge
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            prism: PrismOptions::default(),
            parallel: true,
        }
    }
}

/// A prism plus the warnings found while building it
struct BuiltFeature {
    prism: Prism,
    warnings: Vec<(ReportKind, String)>,
}

fn build_record(
    record: &FootprintRecord,
    options: &PrismOptions,
) -> std::result::Result<BuiltFeature, Error> {
    let (exterior, interior_rings) = match &record.geometry {
        FootprintGeometry::Polygon {
            exterior,
            interior_rings,
        } => (exterior, *interior_rings),
        FootprintGeometry::Invalid(reason) => return Err(Error::InvalidGeometry(reason.clone())),
    };

    let footprint = Footprint::from_coords(exterior)?;
    let elevation = check_elevation(record.elevation)?;
    let prism = build_prism(&footprint, elevation, options)?;

    let mut warnings: Vec<(ReportKind, String)> = prism
        .warnings
        .iter()
        .map(|w| (ReportKind::for_warning(w), describe_warning(w)))
        .collect();
    if interior_rings > 0 {
        warnings.push((
            ReportKind::IgnoredHoles,
            format!("{} interior ring(s) ignored", interior_rings),
        ));
    }

    Ok(BuiltFeature { prism, warnings })
}

fn describe_warning(warning: &lod1_geometry::PrismWarning) -> String {
    use lod1_geometry::PrismWarning;
    match warning {
        PrismWarning::DegenerateTriangulation { outside, degenerate } => format!(
            "no cap triangles survived ({} outside, {} degenerate); walls only",
            outside, degenerate
        ),
        PrismWarning::ZeroHeight => "elevation is zero; prism is flat".to_string(),
        PrismWarning::CollapsedDuplicates(count) => {
            format!("{} repeated boundary point(s) removed", count)
        }
        PrismWarning::CapMismatch {
            cap_area,
            footprint_area,
            open_edges,
        } => format!(
            "cap area {:.3} differs from footprint area {:.3} ({} open edge(s)); \
             try earcut caps",
            cap_area, footprint_area, open_edges
        ),
    }
}

/// Extrude every record and concatenate the results.
///
/// Per-feature failures are collected as reports; the call only fails when
/// the combined mesh can no longer be indexed.
pub fn process_footprints(
    records: &[FootprintRecord],
    options: &BatchOptions,
) -> Result<BatchOutput> {
    let start = Instant::now();
    tracing::info!(
        records = records.len(),
        parallel = options.parallel,
        caps = ?options.prism.caps,
        walls = ?options.prism.walls,
        "Starting prism extrusion"
    );

    let built: Vec<std::result::Result<BuiltFeature, Error>> = if options.parallel {
        records
            .par_iter()
            .map(|record| build_record(record, &options.prism))
            .collect()
    } else {
        records
            .iter()
            .map(|record| build_record(record, &options.prism))
            .collect()
    };

    let mut builder = PrismBuilder::new(options.prism);
    let mut features = Vec::with_capacity(records.len());
    let mut reports = Vec::new();
    let mut stats = BatchStats {
        records: records.len(),
        ..Default::default()
    };

    for (index, (record, outcome)) in records.iter().zip(built).enumerate() {
        match outcome {
            Ok(feature) => {
                let span = builder.append(&feature.prism)?;
                tracing::debug!(
                    index,
                    id = ?record.id,
                    vertices = span.vertex_count(),
                    faces = span.face_count(),
                    "Footprint extruded"
                );

                for (kind, message) in feature.warnings {
                    tracing::warn!(index, id = ?record.id, kind = ?kind, "{}", message);
                    reports.push(FeatureReport {
                        index,
                        id: record.id.clone(),
                        kind,
                        severity: Severity::Warning,
                        message,
                    });
                    stats.warnings += 1;
                }

                stats.built += 1;
                features.push(FeatureSpan {
                    index,
                    id: record.id.clone(),
                    vertices: span.vertices,
                    faces: span.faces,
                });
            }
            Err(error) if error.is_fatal() => {
                tracing::error!(index, id = ?record.id, error = %error, "Aborting batch");
                return Err(error.into());
            }
            Err(error) => {
                tracing::warn!(index, id = ?record.id, error = %error, "Footprint rejected");
                reports.push(FeatureReport {
                    index,
                    id: record.id.clone(),
                    kind: ReportKind::for_error(&error),
                    severity: Severity::Rejected,
                    message: error.to_string(),
                });
                stats.rejected += 1;
            }
        }
    }

    let mesh = builder.finish();
    stats.vertices = mesh.vertex_count();
    stats.faces = mesh.triangle_count();
    stats.elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        built = stats.built,
        rejected = stats.rejected,
        warnings = stats.warnings,
        vertices = stats.vertices,
        faces = stats.faces,
        elapsed_ms = stats.elapsed_ms,
        "Prism extrusion complete"
    );

    Ok(BatchOutput {
        mesh,
        features,
        reports,
        stats,
    })
}
