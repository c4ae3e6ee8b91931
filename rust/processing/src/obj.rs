// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export of the combined mesh and JSON export of the reports

use crate::error::Result;
use crate::types::{BatchOutput, BatchStats, FeatureReport, FeatureSpan};
use lod1_geometry::Mesh;
use serde::Serialize;
use std::io::Write;

/// Write the combined mesh as OBJ, one `o` group per feature.
///
/// Face indices are 1-based and global, so the groups can be split apart
/// later without renumbering. Vertices not covered by any span are written
/// in a trailing group.
pub fn write_obj<W: Write>(mesh: &Mesh, features: &[FeatureSpan], mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "# LOD1 prisms: {} vertices, {} faces, {} features",
        mesh.vertex_count(),
        mesh.triangle_count(),
        features.len()
    )?;

    let mut next_vertex = 0usize;
    let mut next_face = 0usize;
    for feature in features {
        writeln!(writer, "o {}", object_name(&feature.label()))?;
        for v in feature.vertices.clone() {
            let p = mesh.vertex(v as usize);
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for f in feature.faces.clone() {
            let [a, b, c] = mesh.triangle(f);
            writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
        next_vertex = feature.vertices.end as usize;
        next_face = feature.faces.end;
    }

    if next_vertex < mesh.vertex_count() || next_face < mesh.triangle_count() {
        writeln!(writer, "o unassigned")?;
        for v in next_vertex..mesh.vertex_count() {
            let p = mesh.vertex(v);
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for f in next_face..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(f);
            writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// OBJ names end at whitespace
fn object_name(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    stats: &'a BatchStats,
    reports: &'a [FeatureReport],
    features: &'a [FeatureSpan],
}

/// Write statistics, per-feature reports and spans as pretty JSON
pub fn write_report<W: Write>(output: &BatchOutput, writer: W) -> Result<()> {
    let document = ReportDocument {
        stats: &output.stats,
        reports: &output.reports,
        features: &output.features,
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}
