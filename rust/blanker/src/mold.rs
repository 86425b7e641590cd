// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mold shells
//!
//! Both shells are emitted with positive winding around the mold material;
//! the cavity itself is emitted separately with negative winding. The shell
//! meets the cavity only along the pour opening at the cavity bottom (and,
//! for the square mold, along the parting plane x = 0).

use crate::generator::BlankGenerator;
use crate::mask::{DilatedMask, DilationWindow, Occupancy, Unoccupied};
use crate::rings::RingKind;
use crate::schedule::Slice;
use crate::shaft::{Sampling, StepStats, StepSurface, Sweep};
use blanker_geometry::{FacetEmitter, Ring};
use nalgebra::Point3;

/// Round mold shell around a full cavity
///
/// The shell wall follows the round mold ring, bulging out to the
/// wall-augmented rings wherever the dilated mask says the relief would
/// otherwise come closer than the wall thickness.
pub fn round_shell(emitter: &mut FacetEmitter<'_>, blank: &BlankGenerator<'_>, radius: f32) -> StepStats {
    let dims = blank.dimensions();
    let rings = blank.rings();
    let levels = blank.levels();
    let tunables = &dims.tunables;
    let wall = dims.wall_thickness;

    let (mold, bore_wall, outer_wall) = match (
        rings.get(RingKind::RoundMold),
        rings.get(RingKind::BoreWall),
        rings.get(RingKind::OuterWall),
    ) {
        (Some(mold), Some(bore_wall), Some(outer_wall)) => (mold, bore_wall, outer_wall),
        _ => return StepStats::default(),
    };

    let low = if radius >= dims.bore_radius + wall { mold } else { bore_wall };
    let high = if radius >= dims.outer_radius + wall { mold } else { outer_wall };
    let steps = low.steps();

    let top = -tunables.mold_padding;
    let recess = if dims.centered {
        tunables.center_depth.min(tunables.mold_padding / 2.0)
    } else {
        0.0
    };

    let center = Point3::new(0.0, 0.0, top + recess);
    for i in 0..steps {
        emitter.triangle(center, low.at(i, top), low.at(i + 1, top));
    }
    wall_band(emitter, low, top, 0.0);

    let surface = StepSurface {
        low,
        high,
        sweep: Sweep::Full,
        sampling: Sampling::AllSlices,
    };
    let stats = if std::ptr::eq(low, high) {
        surface.march(emitter, blank.schedule(), &Unoccupied)
    } else {
        let window = DilationWindow::new(wall, tunables.step_size, dims.outer_radius, steps);
        let dilated = DilatedMask::new(blank.mask(), window);
        tracing::debug!(
            columns = window.columns,
            rows = window.rows,
            low = low.radius(),
            high = high.radius(),
            "round mold wall thickness window"
        );
        surface.march(emitter, blank.schedule(), &dilated)
    };

    if levels.bottom > levels.length {
        wall_band(emitter, low, levels.length, levels.bottom);
    }

    let opening = rings.opening();
    let z = levels.bottom;
    for i in 0..steps {
        emitter.quad(
            opening.at(i, z),
            opening.at(i + 1, z),
            low.at(i + 1, z),
            low.at(i, z),
        );
    }

    stats
}

/// Cylinder band on `ring` from `z0` down to `z1`
fn wall_band(emitter: &mut FacetEmitter<'_>, ring: &Ring, z0: f32, z1: f32) {
    for i in 0..ring.steps() {
        emitter.quad(ring.at(i, z0), ring.at(i, z1), ring.at(i + 1, z1), ring.at(i + 1, z0));
    }
}

/// Fan a convex polygon from one of its vertices
fn fan_from(emitter: &mut FacetEmitter<'_>, polygon: &[Point3<f32>], apex: usize) {
    let rim: Vec<Point3<f32>> = polygon[apex + 1..]
        .iter()
        .chain(&polygon[..apex])
        .copied()
        .collect();
    emitter.fan(polygon[apex], &rim);
}

/// Fan one parting face strip.
///
/// `polygon` is a rectangle in outward winding whose slot 2 may hold a step
/// vertex on its upper edge and slot 5 one on its lower edge. Fanning from a
/// step vertex keeps every triangle non-degenerate.
fn strip(emitter: &mut FacetEmitter<'_>, polygon: &[Option<Point3<f32>>; 6]) {
    let points: Vec<Point3<f32>> = polygon.iter().flatten().copied().collect();
    let index_of = |slot: usize| polygon[..slot].iter().flatten().count();

    let apex = if polygon[5].is_some() {
        index_of(5)
    } else if polygon[2].is_some() {
        index_of(2)
    } else {
        0
    };
    fan_from(emitter, &points, apex);
}

/// Square half-mold block around a half cavity, including its parting face
pub fn square_block(emitter: &mut FacetEmitter<'_>, blank: &BlankGenerator<'_>, half_width: f32) {
    let dims = blank.dimensions();
    let rings = blank.rings();
    let levels = blank.levels();
    let tunables = &dims.tunables;
    let (bore, outer) = (rings.bore(), rings.outer());
    let half = rings.steps() / 2;

    let w = half_width;
    let top = -tunables.mold_padding;
    let bottom = levels.bottom;
    let lip_bottom = bottom + tunables.lip_height;
    let lip_x = w - tunables.lip_depth;
    let block = |x: f32, y: f32, z: f32| Point3::new(x, y, z);
    let parting = |y: f32, z: f32| Point3::new(0.0, y, z);

    // Seam ring of a cell in a slice, matching the shaft's sampling
    let seam = |slice: &Slice, cell: usize| {
        if slice.samples_image() && blank.mask().is_raised(slice.column, cell as isize) {
            outer
        } else {
            bore
        }
    };

    // Top, back, lip riser and lip floor
    emitter.quad(block(0.0, -w, top), block(0.0, w, top), block(w, w, top), block(w, -w, top));
    emitter.quad(block(w, -w, top), block(w, w, top), block(w, w, lip_bottom), block(w, -w, lip_bottom));
    emitter.quad(
        block(lip_x, w, bottom),
        block(lip_x, -w, bottom),
        block(lip_x, -w, lip_bottom),
        block(lip_x, w, lip_bottom),
    );
    emitter.quad(
        block(lip_x, -w, lip_bottom),
        block(w, -w, lip_bottom),
        block(w, w, lip_bottom),
        block(lip_x, w, lip_bottom),
    );

    // Every z where the parting face has a vertex on its outer edges
    let slices = blank.schedule().slices();
    let mut edge_levels: Vec<f32> = Vec::with_capacity(slices.len() + 3);
    edge_levels.push(0.0);
    edge_levels.extend(slices.iter().map(|s| s.z_hi));
    if let Some(mouth) = levels.funnel_mouth {
        edge_levels.push(mouth);
        edge_levels.push(bottom);
    }

    // Sides y = +w and y = -w
    let mut rim: Vec<Point3<f32>> = Vec::with_capacity(edge_levels.len() + 4);
    rim.push(block(0.0, w, top));
    rim.extend(edge_levels.iter().map(|&z| block(0.0, w, z)));
    rim.extend([block(lip_x, w, bottom), block(lip_x, w, lip_bottom), block(w, w, lip_bottom)]);
    emitter.fan(block(w, w, top), &rim);

    let mut rim: Vec<Point3<f32>> = Vec::with_capacity(edge_levels.len() + 4);
    rim.extend([block(w, -w, lip_bottom), block(lip_x, -w, lip_bottom), block(lip_x, -w, bottom)]);
    rim.extend(edge_levels.iter().rev().map(|&z| block(0.0, -w, z)));
    rim.push(block(0.0, -w, top));
    emitter.fan(block(w, -w, top), &rim);

    // Floor around the pour opening
    let opening = rings.opening();
    let k_pos = block(lip_x, w, bottom);
    let k_neg = block(lip_x, -w, bottom);
    let turn = (0..half)
        .find(|&i| opening.point(i).y + opening.point(i + 1).y <= 0.0)
        .unwrap_or(half);
    for i in 0..half {
        let k = if i < turn { k_pos } else { k_neg };
        emitter.triangle(opening.at(i, bottom), opening.at(i + 1, bottom), k);
    }
    emitter.triangle(opening.at(0, bottom), k_pos, parting(w, bottom));
    emitter.triangle(opening.at(half, bottom), parting(-w, bottom), k_neg);
    emitter.triangle(opening.at(turn, bottom), k_neg, k_pos);

    // Parting face: band above the cavity
    let first = &slices[0];
    let first_pos = seam(first, 0);
    let first_neg = seam(first, half - 1);
    let mut band: Vec<Point3<f32>> = vec![parting(-w, 0.0)];
    if !std::ptr::eq(first_neg, bore) {
        band.push(first_neg.at(half, 0.0));
    }
    band.push(bore.at(half, 0.0));
    if !dims.centered {
        band.push(Point3::new(0.0, 0.0, 0.0));
    }
    band.push(bore.at(0, 0.0));
    if !std::ptr::eq(first_pos, bore) {
        band.push(first_pos.at(0, 0.0));
    }
    band.extend([parting(w, 0.0), parting(w, top)]);
    emitter.fan(parting(-w, top), &band);
    if dims.centered {
        emitter.triangle(bore.at(half, 0.0), Point3::new(0.0, 0.0, tunables.center_depth), bore.at(0, 0.0));
    }

    // Parting face: one strip per slice on each side of the cavity
    for (k, slice) in slices.iter().enumerate() {
        let (lo, hi) = (slice.z_lo, slice.z_hi);
        let previous = k.checked_sub(1).map(|p| &slices[p]);
        let next = slices.get(k + 1);

        let ring = seam(slice, 0);
        let step_after = next
            .map(|n| seam(n, 0))
            .filter(|r| r.radius() > ring.radius())
            .map(|r| r.at(0, hi));
        let step_before = previous
            .map(|p| seam(p, 0))
            .filter(|r| r.radius() > ring.radius())
            .map(|r| r.at(0, lo));
        strip(
            emitter,
            &[
                Some(ring.at(0, lo)),
                Some(ring.at(0, hi)),
                step_after,
                Some(parting(w, hi)),
                Some(parting(w, lo)),
                step_before,
            ],
        );

        let ring = seam(slice, half - 1);
        let step_after = next
            .map(|n| seam(n, half - 1))
            .filter(|r| r.radius() > ring.radius())
            .map(|r| r.at(half, hi));
        let step_before = previous
            .map(|p| seam(p, half - 1))
            .filter(|r| r.radius() > ring.radius())
            .map(|r| r.at(half, lo));
        strip(
            emitter,
            &[
                Some(parting(-w, lo)),
                Some(parting(-w, hi)),
                step_after,
                Some(ring.at(half, hi)),
                Some(ring.at(half, lo)),
                step_before,
            ],
        );
    }

    // Parting face beside the funnel
    if let (Some(funnel), Some(mouth)) = (rings.funnel(), levels.funnel_mouth) {
        let length = levels.length;
        emitter.quad(bore.at(0, length), funnel.at(0, mouth), parting(w, mouth), parting(w, length));
        emitter.quad(funnel.at(0, mouth), funnel.at(0, bottom), parting(w, bottom), parting(w, mouth));
        emitter.quad(
            parting(-w, length),
            parting(-w, mouth),
            funnel.at(half, mouth),
            bore.at(half, length),
        );
        emitter.quad(
            parting(-w, mouth),
            parting(-w, bottom),
            funnel.at(half, bottom),
            funnel.at(half, mouth),
        );
    }
}
