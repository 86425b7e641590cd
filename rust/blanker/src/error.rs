// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for blank generation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by configuration, image loading and generation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration for '{parameter}': {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    #[error("Cannot load image '{path}': {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    #[error("Cannot read configuration file '{path}': {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Geometry error: {0}")]
    Geometry(#[from] blanker_geometry::Error),
}

impl Error {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            parameter,
            reason: reason.into(),
        }
    }
}
