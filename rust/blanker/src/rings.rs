// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring tables for one generation run

use crate::config::{Dimensions, Mold};
use crate::error::{Error, Result};
use blanker_geometry::Ring;

/// Fewest angular steps that still enclose a volume
pub const MIN_STEPS: usize = 3;

/// Radii a blank may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    Bore,
    Outer,
    Funnel,
    RoundMold,
    BoreWall,
    OuterWall,
}

/// Every ring of one run, computed once and shared read-only
#[derive(Debug, Clone)]
pub struct RingTable {
    bore: Ring,
    outer: Ring,
    funnel: Option<Ring>,
    round_mold: Option<Ring>,
    bore_wall: Ring,
    outer_wall: Ring,
}

impl RingTable {
    /// Sample all rings with `steps` angular steps (the mask height)
    pub fn new(dims: &Dimensions, steps: usize) -> Result<Self> {
        if steps < MIN_STEPS {
            return Err(Error::config(
                "image height",
                format!("need at least {} rows for the angular steps, got {}", MIN_STEPS, steps),
            ));
        }

        let round_mold = match dims.mold {
            Mold::Round { radius } => Some(Ring::new(steps, radius)),
            _ => None,
        };

        Ok(Self {
            bore: Ring::new(steps, dims.bore_radius),
            outer: Ring::new(steps, dims.outer_radius),
            funnel: dims.funnel_radius.map(|r| Ring::new(steps, r)),
            round_mold,
            bore_wall: Ring::new(steps, dims.bore_radius + dims.wall_thickness),
            outer_wall: Ring::new(steps, dims.outer_radius + dims.wall_thickness),
        })
    }

    /// Number of angular steps
    #[inline]
    pub fn steps(&self) -> usize {
        self.bore.steps()
    }

    /// Ring of the given kind, if the blank has one
    pub fn get(&self, kind: RingKind) -> Option<&Ring> {
        match kind {
            RingKind::Bore => Some(&self.bore),
            RingKind::Outer => Some(&self.outer),
            RingKind::Funnel => self.funnel.as_ref(),
            RingKind::RoundMold => self.round_mold.as_ref(),
            RingKind::BoreWall => Some(&self.bore_wall),
            RingKind::OuterWall => Some(&self.outer_wall),
        }
    }

    #[inline]
    pub fn bore(&self) -> &Ring {
        &self.bore
    }

    #[inline]
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    #[inline]
    pub fn funnel(&self) -> Option<&Ring> {
        self.funnel.as_ref()
    }

    /// Ring the cavity opens through at its bottom
    #[inline]
    pub fn opening(&self) -> &Ring {
        self.funnel.as_ref().unwrap_or(&self.bore)
    }
}
