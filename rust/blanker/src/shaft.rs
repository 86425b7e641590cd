// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Step marcher
//!
//! Walks the slice schedule and, for every angular cell, places a wall quad
//! on the low or the high ring depending on the oracle. Wherever the state
//! changes from one slice to the next a radial step face joins the rings at
//! the slice boundary; wherever it changes between neighbouring cells an
//! axial step face joins them along the shared ring step. The shaft and the
//! round mold shell are both built this way.
//!
//! Cell `i` spans ring steps `i` and `i + 1`. Faces are emitted with the
//! low ring as the inside, so a positive emitter bounds the material between
//! the axis and the surface.

use crate::mask::Occupancy;
use crate::schedule::{Slice, SliceSchedule};
use blanker_geometry::{FacetEmitter, Ring};

/// Angular extent of a march
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// All cells, wrapping at step N
    Full,
    /// Cells `[0, N/2)`, open at the parting plane
    Half,
}

impl Sweep {
    /// Number of cells swept on a ring of `steps` steps
    #[inline]
    pub fn cells(self, steps: usize) -> usize {
        match self {
            Sweep::Full => steps,
            Sweep::Half => steps / 2,
        }
    }
}

/// Which slices consult the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Only slices at or past image zero
    ImageColumns,
    /// Every slice except the closing one
    AllSlices,
}

impl Sampling {
    #[inline]
    fn samples(self, slice: &Slice) -> bool {
        match self {
            Sampling::ImageColumns => slice.samples_image(),
            Sampling::AllSlices => !slice.closing,
        }
    }
}

/// Faces emitted by a march
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Radial step quads at slice boundaries
    pub radial_steps: usize,
    /// Axial step quads between neighbouring cells
    pub axial_steps: usize,
    pub wall_quads: usize,
}

/// A stepped surface of revolution between two rings
#[derive(Debug, Clone, Copy)]
pub struct StepSurface<'a> {
    pub low: &'a Ring,
    pub high: &'a Ring,
    pub sweep: Sweep,
    pub sampling: Sampling,
}

impl StepSurface<'_> {
    /// March the whole schedule, appending faces to `emitter`
    pub fn march<O: Occupancy>(
        &self,
        emitter: &mut FacetEmitter<'_>,
        schedule: &SliceSchedule,
        oracle: &O,
    ) -> StepStats {
        let cells = self.sweep.cells(self.low.steps());
        let mut stats = StepStats::default();
        let mut previous = vec![false; cells];
        let mut current = vec![false; cells];

        for slice in schedule.slices() {
            let sampled = self.sampling.samples(slice);
            for (row, state) in current.iter_mut().enumerate() {
                *state = sampled && oracle.is_raised(slice.column, row as isize);
            }

            for i in 0..cells {
                if current[i] != previous[i] {
                    self.radial_step(emitter, i, slice.z_lo, current[i]);
                    stats.radial_steps += 1;
                }

                let neighbour = match (i, self.sweep) {
                    (0, Sweep::Full) => Some(current[cells - 1]),
                    (0, Sweep::Half) => None,
                    _ => Some(current[i - 1]),
                };
                if let Some(neighbour) = neighbour {
                    if neighbour != current[i] {
                        self.axial_step(emitter, i, slice, current[i]);
                        stats.axial_steps += 1;
                    }
                }

                let ring = if current[i] { self.high } else { self.low };
                emitter.quad(
                    ring.at(i, slice.z_lo),
                    ring.at(i, slice.z_hi),
                    ring.at(i + 1, slice.z_hi),
                    ring.at(i + 1, slice.z_lo),
                );
                stats.wall_quads += 1;
            }

            std::mem::swap(&mut previous, &mut current);
        }

        stats
    }

    /// Annulus of cell `i` at `z`, facing up on a rise and down on a fall
    fn radial_step(&self, emitter: &mut FacetEmitter<'_>, i: usize, z: f32, rise: bool) {
        let (b0, b1) = (self.low.at(i, z), self.low.at(i + 1, z));
        let (o0, o1) = (self.high.at(i, z), self.high.at(i + 1, z));
        if rise {
            emitter.quad(b0, o0, o1, b1);
        } else {
            emitter.quad(b0, b1, o1, o0);
        }
    }

    /// Face on ring step `i` between cells `i - 1` and `i`
    fn axial_step(&self, emitter: &mut FacetEmitter<'_>, i: usize, slice: &Slice, raised: bool) {
        let (lo, hi) = (slice.z_lo, slice.z_hi);
        let (b_lo, b_hi) = (self.low.at(i, lo), self.low.at(i, hi));
        let (o_lo, o_hi) = (self.high.at(i, lo), self.high.at(i, hi));
        if raised {
            emitter.quad(b_lo, b_hi, o_hi, o_lo);
        } else {
            emitter.quad(b_lo, o_lo, o_hi, b_hi);
        }
    }
}
