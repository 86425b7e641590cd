// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blanker
//!
//! Turns a mask image into a watertight solid for a lathe-turned pen blank,
//! or a mold to cast one, and writes it as binary STL.
//!
//! # Pipeline
//!
//! 1. [`BlankConfiguration::validate`] normalizes units and checks every
//!    dimension
//! 2. [`load_mask`] decodes the image into an [`OccupancyMask`]
//! 3. [`BlankGenerator`] builds the ring tables and slice schedule, then
//!    emits the mold shell, top cap, shaft and bottom in that order
//! 4. [`Mesh::save_stl`](blanker_geometry::Mesh::save_stl) writes the file
//!
//! The image is read with one column per longitudinal step and one row per
//! angular step. Opaque black pixels raise the surface from the bore radius
//! to the outer radius.

pub mod caps;
pub mod config;
pub mod error;
pub mod generator;
pub mod mask;
pub mod mold;
pub mod rings;
pub mod schedule;
pub mod shaft;

pub use config::{BlankConfiguration, Dimensions, Mold, Tunables, Units};
pub use error::{Error, Result};
pub use generator::{generate_blank, BlankGenerator, GeneratedBlank, APPLICATION};
pub use mask::{load_mask, DilatedMask, DilationWindow, Occupancy, OccupancyMask, Unoccupied};
pub use rings::{RingKind, RingTable};
pub use schedule::{Slice, SliceSchedule};
pub use shaft::{Sampling, StepStats, StepSurface, Sweep};

pub use blanker_geometry::{Mesh, Polarity, StlHeader};
