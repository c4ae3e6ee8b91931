// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building prisms
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Missing elevation: value is absent or not finite")]
    MissingElevation,

    #[error("Invalid elevation {0}: prism height must not be negative")]
    InvalidElevation(f64),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Index overflow: {vertices} vertices exceed the u32 index range")]
    IndexOverflow { vertices: usize },
}

impl Error {
    /// Whether this error must abort the whole batch rather than a single footprint
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::IndexOverflow { .. })
    }
}
