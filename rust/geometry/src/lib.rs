// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blanker Geometry
//!
//! Facet meshes, angular rings and binary STL output. Geometry is single
//! precision and expressed in millimetres using nalgebra points.

pub mod emit;
pub mod error;
pub mod mesh;
pub mod ring;
pub mod stl;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use emit::{FacetEmitter, Polarity};
pub use error::{Error, Result};
pub use mesh::{compute_normal, Facet, Mesh, StlHeader, UnitNormal, HEADER_LEN};
pub use ring::Ring;
pub use stl::{binary_len, write_binary, FACET_RECORD_LEN};
