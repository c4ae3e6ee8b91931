// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LOD1 CLI - extrude building footprints into a combined prism mesh.
//!
//! Reads a GeoJSON FeatureCollection of polygon footprints, each carrying an
//! aggregated elevation property, and writes one Wavefront OBJ with an
//! object group per building.
//!
//! # Usage
//!
//! ```text
//! lod1 [input.geojson] [output.obj]
//! ```
//!
//! Everything else is configured through `LOD1_*` environment variables,
//! see [`config::Config`].

use anyhow::{bail, Context};
use std::fs::{self, File};
use std::io::BufWriter;

mod config;

use config::Config;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,lod1_processing=info".into()),
        )
        .init();

    let config = Config::from_env().with_args(std::env::args().skip(1));

    let Some(input) = config.input.clone() else {
        bail!("no input given: pass a GeoJSON path or set LOD1_INPUT");
    };

    tracing::info!(
        input = %input.display(),
        output = %config.output.display(),
        caps = ?config.caps,
        walls = ?config.walls,
        parallel = config.parallel,
        worker_threads = config.worker_threads,
        "Starting LOD1 extrusion"
    );

    // Initialize rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("failed to initialize rayon thread pool")?;

    let content = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let records = lod1_processing::parse_feature_collection(&content, &config.geojson_options())
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let output = lod1_processing::process_footprints(&records, &config.batch_options())?;

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(&config.output)
        .with_context(|| format!("failed to create {}", config.output.display()))?;
    lod1_processing::write_obj(&output.mesh, &output.features, BufWriter::new(file))?;

    if let Some(report_path) = &config.report {
        let file = File::create(report_path)
            .with_context(|| format!("failed to create {}", report_path.display()))?;
        lod1_processing::write_report(&output, BufWriter::new(file))?;
    }

    tracing::info!(
        built = output.stats.built,
        rejected = output.stats.rejected,
        warnings = output.stats.warnings,
        vertices = output.stats.vertices,
        faces = output.stats.faces,
        elapsed_ms = output.stats.elapsed_ms,
        output = %config.output.display(),
        "LOD1 mesh written"
    );

    Ok(())
}
