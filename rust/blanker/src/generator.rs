// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generation orchestrator
//!
//! Order of emission: mold shell (if any), top cap, shaft, bottom cap or
//! funnel. Everything a generator reads is fixed before the first facet is
//! emitted.

use crate::caps::{self, CavityLevels};
use crate::config::{BlankConfiguration, Dimensions, Mold};
use crate::error::{Error, Result};
use crate::mask::OccupancyMask;
use crate::mold;
use crate::rings::RingTable;
use crate::schedule::SliceSchedule;
use crate::shaft::{Sampling, StepStats, StepSurface, Sweep};
use blanker_geometry::{FacetEmitter, Mesh, Polarity, StlHeader};
use tracing::{debug, info, warn};

/// Application name written into STL headers
pub const APPLICATION: &str = "blanker";

/// A finished mesh with generation statistics
#[derive(Debug, Clone)]
pub struct GeneratedBlank {
    pub mesh: Mesh,
    /// Faces of the shaft march
    pub shaft: StepStats,
    /// Faces of the round mold shell march
    pub mold_shell: Option<StepStats>,
    pub slices: usize,
    /// Degenerate triangles skipped during emission
    pub degenerate: usize,
}

/// Read-only state of one generation run
#[derive(Debug)]
pub struct BlankGenerator<'a> {
    dims: Dimensions,
    mask: &'a OccupancyMask,
    rings: RingTable,
    schedule: SliceSchedule,
    levels: CavityLevels,
}

impl<'a> BlankGenerator<'a> {
    /// Prepare ring tables and the slice schedule for `mask`
    pub fn new(dims: &Dimensions, mask: &'a OccupancyMask) -> Result<Self> {
        let steps = mask.height();
        let rings = RingTable::new(dims, steps)?;

        if matches!(dims.mold, Mold::Square { .. }) && steps % 2 != 0 {
            return Err(Error::config(
                "image height",
                format!("a square mold needs an even number of rows, got {}", steps),
            ));
        }

        let mut dims = dims.clone();
        dims.image_zero = dims.effective_image_zero(mask.width());

        let schedule = SliceSchedule::new(dims.length, dims.tunables.step_size, dims.image_zero);
        let levels = CavityLevels::new(&dims);

        Ok(Self {
            dims,
            mask,
            rings,
            schedule,
            levels,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn mask(&self) -> &OccupancyMask {
        self.mask
    }

    #[inline]
    pub fn rings(&self) -> &RingTable {
        &self.rings
    }

    #[inline]
    pub fn schedule(&self) -> &SliceSchedule {
        &self.schedule
    }

    #[inline]
    pub fn levels(&self) -> &CavityLevels {
        &self.levels
    }

    /// Angular extent of the cavity
    pub fn sweep(&self) -> Sweep {
        match self.dims.mold {
            Mold::Square { .. } => Sweep::Half,
            _ => Sweep::Full,
        }
    }

    /// Emit the whole solid
    pub fn generate(&self, header: StlHeader) -> GeneratedBlank {
        let dims = &self.dims;
        let sweep = self.sweep();
        info!(
            steps = self.rings.steps(),
            columns = self.mask.width(),
            slices = self.schedule.slices().len(),
            lead_in = self.schedule.lead_in(),
            image_zero = dims.image_zero,
            polarity = ?dims.polarity,
            mold = ?dims.mold,
            "generating blank"
        );

        // Room for the caps and walls of a relief-free blank
        let cells = sweep.cells(self.rings.steps());
        let mut mesh = Mesh::with_capacity(header, 2 * cells * (self.schedule.slices().len() + 1));
        let mut degenerate = 0;
        let mut mold_shell = None;

        if dims.mold != Mold::None {
            let mut emitter = FacetEmitter::new(&mut mesh, Polarity::Positive);
            match dims.mold {
                Mold::Round { radius } => {
                    let stats = mold::round_shell(&mut emitter, self, radius);
                    debug!(facets = emitter.emitted(), ?stats, "round mold shell");
                    mold_shell = Some(stats);
                }
                Mold::Square { half_width } => {
                    mold::square_block(&mut emitter, self, half_width);
                    debug!(facets = emitter.emitted(), "square mold block");
                }
                Mold::None => {}
            }
            degenerate += emitter.degenerate();
        }

        let mut emitter = FacetEmitter::new(&mut mesh, dims.polarity);

        caps::top_cap(&mut emitter, self.rings.bore(), caps::top_center_z(dims), sweep);
        let cap_facets = emitter.emitted();
        debug!(facets = cap_facets, centered = dims.centered, "top cap");

        let surface = StepSurface {
            low: self.rings.bore(),
            high: self.rings.outer(),
            sweep,
            sampling: Sampling::ImageColumns,
        };
        let shaft = surface.march(&mut emitter, &self.schedule, self.mask);
        let shaft_facets = emitter.emitted() - cap_facets;
        debug!(facets = shaft_facets, ?shaft, "shaft");

        caps::bottom(&mut emitter, &self.rings, &self.levels, sweep);
        debug!(
            facets = emitter.emitted() - cap_facets - shaft_facets,
            funnel = self.levels.funnel_mouth.is_some(),
            "bottom"
        );
        degenerate += emitter.degenerate();

        if degenerate > 0 {
            warn!(degenerate, "skipped degenerate facets");
        }
        info!(facets = mesh.len(), "generated blank");

        GeneratedBlank {
            mesh,
            shaft,
            mold_shell,
            slices: self.schedule.slices().len(),
            degenerate,
        }
    }
}

/// Validate `config` and generate a blank from an already decoded mask
pub fn generate_blank(config: &BlankConfiguration, mask: &OccupancyMask, name: &str) -> Result<GeneratedBlank> {
    let dims = config.validate()?;
    let generator = BlankGenerator::new(&dims, mask)?;
    Ok(generator.generate(StlHeader::for_application(APPLICATION, name)))
}
