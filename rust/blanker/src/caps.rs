// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top cap, bottom cap and pour funnel

use crate::config::Dimensions;
use crate::rings::RingTable;
use crate::shaft::Sweep;
use blanker_geometry::{FacetEmitter, Ring};
use nalgebra::Point3;

/// z levels at and below the end of the shaft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CavityLevels {
    /// End of the shaft
    pub length: f32,
    /// Where the funnel frustum meets the funnel wall
    pub funnel_mouth: Option<f32>,
    /// Lowest point of the cavity
    pub bottom: f32,
}

impl CavityLevels {
    pub fn new(dims: &Dimensions) -> Self {
        let mouth = dims
            .funnel_radius
            .map(|_| dims.length + dims.tunables.funnel_depth);
        Self {
            length: dims.length,
            funnel_mouth: mouth,
            bottom: mouth.map_or(dims.length, |m| m + dims.tunables.funnel_height),
        }
    }
}

/// Depth of the top cap's centre point
pub fn top_center_z(dims: &Dimensions) -> f32 {
    if dims.centered {
        dims.tunables.center_depth
    } else {
        0.0
    }
}

/// Fan the bore ring at z = 0 to the centre point
pub fn top_cap(emitter: &mut FacetEmitter<'_>, bore: &Ring, center_z: f32, sweep: Sweep) {
    let center = Point3::new(0.0, 0.0, center_z);
    for i in 0..sweep.cells(bore.steps()) {
        emitter.triangle(center, bore.at(i, 0.0), bore.at(i + 1, 0.0));
    }
}

/// Close the shaft at the blank length.
///
/// With a funnel this is a frustum out to the funnel ring, the funnel wall
/// and, for a positive solid, a disc over the funnel. Without one a positive
/// solid gets a flat fan; a negative one stays open as the pour hole.
pub fn bottom(emitter: &mut FacetEmitter<'_>, rings: &RingTable, levels: &CavityLevels, sweep: Sweep) {
    let bore = rings.bore();
    let cells = sweep.cells(bore.steps());
    let length = levels.length;
    let closed = emitter.polarity().is_positive();

    let (funnel, mouth) = match (rings.funnel(), levels.funnel_mouth) {
        (Some(funnel), Some(mouth)) => (funnel, mouth),
        _ => {
            if closed {
                let center = Point3::new(0.0, 0.0, length);
                for i in 0..cells {
                    emitter.triangle(center, bore.at(i + 1, length), bore.at(i, length));
                }
            }
            return;
        }
    };

    let top = levels.bottom;
    for i in 0..cells {
        emitter.quad(
            bore.at(i, length),
            funnel.at(i, mouth),
            funnel.at(i + 1, mouth),
            bore.at(i + 1, length),
        );
        emitter.quad(
            funnel.at(i, mouth),
            funnel.at(i, top),
            funnel.at(i + 1, top),
            funnel.at(i + 1, mouth),
        );
    }

    if closed {
        let center = Point3::new(0.0, 0.0, top);
        for i in 0..cells {
            emitter.triangle(center, funnel.at(i + 1, top), funnel.at(i, top));
        }
    }
}
