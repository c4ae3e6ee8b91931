// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use lod1_geometry::{CapStrategy, PrismOptions, WallMode};
use lod1_processing::{BatchOptions, GeoJsonOptions};
use std::path::PathBuf;

/// Run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GeoJSON FeatureCollection with footprints.
    pub input: Option<PathBuf>,
    /// OBJ file for the combined mesh.
    pub output: PathBuf,
    /// Optional JSON file for statistics and per-feature reports.
    pub report: Option<PathBuf>,
    /// Feature property holding the elevation.
    pub elevation_property: String,
    /// Feature property used as id when the feature has none.
    pub id_property: Option<String>,
    /// Cap triangulation strategy ("delaunay" or "earcut").
    pub caps: CapStrategy,
    /// Wall closure ("closed" or "open").
    pub walls: WallMode,
    /// Build prisms in parallel before the ordered merge.
    pub parallel: bool,
    /// Number of worker threads for parallel processing.
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            input: lookup("LOD1_INPUT").map(PathBuf::from),
            output: lookup("LOD1_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./output/lod1.obj")),
            report: lookup("LOD1_REPORT").map(PathBuf::from),
            elevation_property: lookup("LOD1_ELEVATION_PROPERTY")
                .unwrap_or_else(|| "elevation".into()),
            id_property: match lookup("LOD1_ID_PROPERTY") {
                Some(key) if key.is_empty() => None,
                Some(key) => Some(key),
                None => Some("id".into()),
            },
            caps: lookup("LOD1_CAPS")
                .and_then(|v| parse_caps(&v))
                .unwrap_or_default(),
            walls: lookup("LOD1_WALLS")
                .and_then(|v| parse_walls(&v))
                .unwrap_or_default(),
            parallel: lookup("LOD1_PARALLEL")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            worker_threads: lookup("WORKER_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }

    /// Positional arguments `[input] [output]` override the environment.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter();
        if let Some(input) = args.next() {
            self.input = Some(PathBuf::from(input));
        }
        if let Some(output) = args.next() {
            self.output = PathBuf::from(output);
        }
        self
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            prism: PrismOptions {
                caps: self.caps,
                walls: self.walls,
            },
            parallel: self.parallel,
        }
    }

    pub fn geojson_options(&self) -> GeoJsonOptions {
        GeoJsonOptions {
            elevation_property: self.elevation_property.clone(),
            id_property: self.id_property.clone(),
        }
    }
}

fn parse_caps(value: &str) -> Option<CapStrategy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "delaunay" => Some(CapStrategy::DelaunayFiltered),
        "earcut" => Some(CapStrategy::Earcut),
        _ => None,
    }
}

fn parse_walls(value: &str) -> Option<WallMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "closed" => Some(WallMode::Closed),
        "open" => Some(WallMode::Open),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
