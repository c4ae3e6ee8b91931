// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared pipeline types

use lod1_geometry::{Error, Mesh, PrismWarning};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Footprint geometry as delivered by the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FootprintGeometry {
    /// Exterior ring plus the number of interior rings that were present
    Polygon {
        exterior: Vec<[f64; 2]>,
        interior_rings: usize,
    },
    /// Anything that cannot be extruded, with the reason
    Invalid(String),
}

/// One input feature: a footprint and its aggregated elevation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintRecord {
    pub id: Option<String>,
    pub geometry: FootprintGeometry,
    /// Absent when the source value was missing or not numeric
    pub elevation: Option<f64>,
}

impl FootprintRecord {
    pub fn polygon(id: Option<String>, exterior: Vec<[f64; 2]>, elevation: Option<f64>) -> Self {
        Self {
            id,
            geometry: FootprintGeometry::Polygon {
                exterior,
                interior_rings: 0,
            },
            elevation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The feature produced no geometry
    Rejected,
    /// The feature was extruded but something deserves attention
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    InvalidGeometry,
    MissingElevation,
    InvalidElevation,
    DegenerateTriangulation,
    IgnoredHoles,
    ZeroHeight,
    DuplicatePoints,
    CapMismatch,
}

impl ReportKind {
    /// Report kind for a non-fatal geometry error
    pub fn for_error(error: &Error) -> Self {
        match error {
            Error::MissingElevation => ReportKind::MissingElevation,
            Error::InvalidElevation(_) => ReportKind::InvalidElevation,
            Error::InvalidGeometry(_) | Error::Triangulation(_) | Error::IndexOverflow { .. } => {
                ReportKind::InvalidGeometry
            }
        }
    }

    pub fn for_warning(warning: &PrismWarning) -> Self {
        match warning {
            PrismWarning::DegenerateTriangulation { .. } => ReportKind::DegenerateTriangulation,
            PrismWarning::ZeroHeight => ReportKind::ZeroHeight,
            PrismWarning::CollapsedDuplicates(_) => ReportKind::DuplicatePoints,
            PrismWarning::CapMismatch { .. } => ReportKind::CapMismatch,
        }
    }
}

/// A per-feature problem found during the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Position of the feature in the input sequence
    pub index: usize,
    pub id: Option<String>,
    pub kind: ReportKind,
    pub severity: Severity,
    pub message: String,
}

/// Where a successfully extruded feature lives in the combined mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpan {
    pub index: usize,
    pub id: Option<String>,
    pub vertices: Range<u32>,
    pub faces: Range<usize>,
}

impl FeatureSpan {
    /// Id if present, otherwise a name derived from the input position
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("feature_{}", self.index),
        }
    }
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub records: usize,
    pub built: usize,
    pub rejected: usize,
    pub warnings: usize,
    pub vertices: usize,
    pub faces: usize,
    pub elapsed_ms: u64,
}

/// Combined mesh plus everything needed to attribute it back to features
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub mesh: Mesh,
    pub features: Vec<FeatureSpan>,
    pub reports: Vec<FeatureReport>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Reports that removed a feature from the output
    pub fn rejected(&self) -> impl Iterator<Item = &FeatureReport> {
        self.reports
            .iter()
            .filter(|r| r.severity == Severity::Rejected)
    }
}
