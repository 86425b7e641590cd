// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or writing meshes
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot write STL file '{path}': {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Too many facets for binary STL: {0} (limit is u32::MAX)")]
    TooManyFacets(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
