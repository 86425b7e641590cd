// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facet mesh data structures

use nalgebra::{Point3, Unit, Vector3};

/// Size of the free-text STL header in bytes
pub const HEADER_LEN: usize = 80;

/// Cross products at or below this norm are treated as degenerate triangles
const DEGENERATE_NORM: f32 = 1e-12;

/// Unit-length facet normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitNormal(Unit<Vector3<f32>>);

impl UnitNormal {
    /// Normalize the given components.
    ///
    /// Returns `None` for a zero-length vector, so a stored normal is never NaN.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Option<Self> {
        Self::from_vector(Vector3::new(x, y, z))
    }

    /// Normalize an arbitrary vector
    #[inline]
    pub fn from_vector(vector: Vector3<f32>) -> Option<Self> {
        Unit::try_new(vector, DEGENERATE_NORM).map(Self)
    }

    /// Normal of the triangle (a, b, c): the unit cross product (a - c) x (b - c)
    #[inline]
    pub fn from_vertices(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Option<Self> {
        Self::from_vector((a - c).cross(&(b - c)))
    }

    #[inline]
    pub fn as_vector(&self) -> &Vector3<f32> {
        self.0.as_ref()
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0.z
    }
}

/// Derive the outward normal of a triangle from its winding.
///
/// Returns `None` when the vertices are coincident or collinear.
#[inline]
pub fn compute_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Option<UnitNormal> {
    UnitNormal::from_vertices(a, b, c)
}

/// One triangle of an STL mesh
///
/// The attribute byte count of every facet is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    normal: UnitNormal,
    vertices: [Point3<f32>; 3],
}

impl Facet {
    /// Create a facet whose normal is derived from the winding of (a, b, c)
    #[inline]
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Option<Self> {
        compute_normal(&a, &b, &c).map(|normal| Self {
            normal,
            vertices: [a, b, c],
        })
    }

    /// Create a facet with an explicitly supplied normal
    #[inline]
    pub fn with_normal(normal: UnitNormal, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            normal,
            vertices: [a, b, c],
        }
    }

    #[inline]
    pub fn normal(&self) -> &UnitNormal {
        &self.normal
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// Attribute byte count written with the facet
    #[inline]
    pub fn attribute_byte_count(&self) -> u16 {
        0
    }

    /// Arithmetic mean of the three vertices
    #[inline]
    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }
}

/// Fixed 80-byte STL header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StlHeader([u8; HEADER_LEN]);

impl StlHeader {
    /// Header holding `text`, truncated or NUL-padded to 80 bytes
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; HEADER_LEN];
        let len = text.len().min(HEADER_LEN);
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self(bytes)
    }

    /// Header in the `<application>,name:<name>` form
    pub fn for_application(application: &str, name: &str) -> Self {
        Self::new(&format!("{},name:{}", application, name))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.0
    }

    /// Header text up to the first NUL byte
    pub fn text(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(HEADER_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl Default for StlHeader {
    fn default() -> Self {
        Self([0u8; HEADER_LEN])
    }
}

/// Append-only triangle mesh with an STL header
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    header: StlHeader,
    facets: Vec<Facet>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(header: StlHeader) -> Self {
        Self {
            header,
            facets: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(header: StlHeader, facet_count: usize) -> Self {
        Self {
            header,
            facets: Vec::with_capacity(facet_count),
        }
    }

    /// Append a facet
    #[inline]
    pub fn push(&mut self, facet: Facet) {
        self.facets.push(facet);
    }

    #[inline]
    pub fn header(&self) -> &StlHeader {
        &self.header
    }

    #[inline]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Get facet count
    #[inline]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Calculate bounds (min, max) over every facet vertex
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        for vertex in self.facets.iter().flat_map(|f| f.vertices.iter()) {
            min = min.inf(vertex);
            max = max.sup(vertex);
        }

        (min, max)
    }

    /// Calculate the vertex centroid in f64 precision
    ///
    /// Every facet contributes its three vertices, so shared vertices are
    /// counted once per facet.
    pub fn centroid_f64(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }

        let mut sum = Vector3::new(0.0f64, 0.0f64, 0.0f64);
        for vertex in self.facets.iter().flat_map(|f| f.vertices.iter()) {
            sum.x += vertex.x as f64;
            sum.y += vertex.y as f64;
            sum.z += vertex.z as f64;
        }

        Point3::from(sum / (self.facets.len() * 3) as f64)
    }
}
