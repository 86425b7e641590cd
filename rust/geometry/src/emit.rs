// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Winding-aware facet emission
//!
//! Every generator hands its triangles to a [`FacetEmitter`] with vertices
//! ordered counter-clockwise as seen from outside a positive solid. The
//! emitter applies the polarity flip in one place.

use crate::mesh::{Facet, Mesh};
use nalgebra::Point3;

/// Whether the emitted surface bounds the object or its negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    #[inline]
    pub fn is_positive(self) -> bool {
        self == Polarity::Positive
    }
}

/// Appends facets to a mesh, reversing winding for negative polarity
pub struct FacetEmitter<'m> {
    mesh: &'m mut Mesh,
    polarity: Polarity,
    emitted: usize,
    degenerate: usize,
}

impl<'m> FacetEmitter<'m> {
    pub fn new(mesh: &'m mut Mesh, polarity: Polarity) -> Self {
        Self {
            mesh,
            polarity,
            emitted: 0,
            degenerate: 0,
        }
    }

    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Emit one triangle.
    ///
    /// Negative polarity swaps `b` and `c`. A degenerate triangle is a
    /// construction defect: it asserts in debug builds and is skipped with a
    /// warning otherwise.
    pub fn triangle(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        let (b, c) = match self.polarity {
            Polarity::Positive => (b, c),
            Polarity::Negative => (c, b),
        };

        match Facet::new(a, b, c) {
            Some(facet) => {
                self.mesh.push(facet);
                self.emitted += 1;
            }
            None => {
                self.degenerate += 1;
                tracing::warn!(?a, ?b, ?c, "skipping degenerate facet");
                debug_assert!(false, "degenerate facet {:?} {:?} {:?}", a, b, c);
            }
        }
    }

    /// Emit the quad (a, b, c, d) as triangles (a, b, c) and (a, c, d)
    #[inline]
    pub fn quad(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, d: Point3<f32>) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    /// Fan-triangulate a rim around `apex`: (apex, rim[j], rim[j + 1])
    pub fn fan(&mut self, apex: Point3<f32>, rim: &[Point3<f32>]) {
        for pair in rim.windows(2) {
            self.triangle(apex, pair[0], pair[1]);
        }
    }

    /// Facets appended by this emitter
    #[inline]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Degenerate triangles that were skipped
    #[inline]
    pub fn degenerate(&self) -> usize {
        self.degenerate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::StlHeader;
    use approx::assert_relative_eq;

    fn unit_square() -> [Point3<f32>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_positive_keeps_winding() {
        let mut mesh = Mesh::new(StlHeader::default());
        let [a, b, c, _] = unit_square();
        FacetEmitter::new(&mut mesh, Polarity::Positive).triangle(a, b, c);

        assert_eq!(mesh.facets()[0].vertices(), &[a, b, c]);
        assert_relative_eq!(mesh.facets()[0].normal().z(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_swaps_b_and_c() {
        let mut mesh = Mesh::new(StlHeader::default());
        let [a, b, c, _] = unit_square();
        FacetEmitter::new(&mut mesh, Polarity::Negative).triangle(a, b, c);

        assert_eq!(mesh.facets()[0].vertices(), &[a, c, b]);
        assert_relative_eq!(mesh.facets()[0].normal().z(), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quad_and_fan_counts() {
        let mut mesh = Mesh::new(StlHeader::default());
        let [a, b, c, d] = unit_square();
        let mut emitter = FacetEmitter::new(&mut mesh, Polarity::Positive);
        emitter.quad(a, b, c, d);
        emitter.fan(Point3::new(0.5, 0.5, 1.0), &[a, b, c, d, a]);
        assert_eq!(emitter.emitted(), 6);
        assert_eq!(emitter.degenerate(), 0);

        assert_eq!(mesh.len(), 6);
        assert!(mesh.facets()[..2].iter().all(|f| f.normal().z() > 0.99));
    }

    #[test]
    fn test_default_polarity() {
        assert!(Polarity::default().is_positive());
        assert!(!Polarity::Negative.is_positive());
    }
}
