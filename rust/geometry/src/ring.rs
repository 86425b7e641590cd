// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Angularly sampled rings around the z axis

use nalgebra::{Point2, Point3};
use std::f64::consts::TAU;

/// Points at a fixed radius, one per angular step.
///
/// Step `i` lies at angle `2*pi*i/N` measured from +y towards +x, i.e. at
/// `(sin(theta) * r, cos(theta) * r)`. Lookups wrap modulo N, so step N
/// returns exactly the coordinates of step 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    radius: f32,
    points: Vec<Point2<f32>>,
}

impl Ring {
    /// Sample a ring of `steps` points. `steps` must be non-zero.
    pub fn new(steps: usize, radius: f32) -> Self {
        debug_assert!(steps > 0, "ring needs at least one angular step");

        let delta = TAU / steps as f64;
        let r = radius as f64;
        let points = (0..steps)
            .map(|i| {
                let angle = delta * i as f64;
                Point2::new((angle.sin() * r) as f32, (angle.cos() * r) as f32)
            })
            .collect();

        Self { radius, points }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Number of angular steps
    #[inline]
    pub fn steps(&self) -> usize {
        self.points.len()
    }

    /// Point of step `step`, wrapping modulo the step count
    #[inline]
    pub fn point(&self, step: usize) -> Point2<f32> {
        self.points[step % self.points.len()]
    }

    /// Point of step `step` lifted to height `z`
    #[inline]
    pub fn at(&self, step: usize, z: f32) -> Point3<f32> {
        let p = self.point(step);
        Point3::new(p.x, p.y, z)
    }
}
