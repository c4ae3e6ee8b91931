// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint-to-LOD1 batch pipeline shared by the CLI and library users.

pub mod batch;
pub mod error;
pub mod geojson;
pub mod obj;
pub mod types;

pub use batch::{process_footprints, BatchOptions};
pub use error::{ProcessingError, Result};
pub use geojson::{parse_feature_collection, GeoJsonOptions};
pub use obj::{write_obj, write_report};
pub use types::{
    BatchOutput, BatchStats, FeatureReport, FeatureSpan, FootprintGeometry, FootprintRecord,
    ReportKind, Severity,
};
