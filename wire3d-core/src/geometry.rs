/// Geometry primitives for wireframe scenes
use std::collections::HashSet;

use nalgebra::{distance, Point3, Vector3};

use crate::error::{Error, Result};

/// A triangle resolved to its corner coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point3<f32>,
    pub b: Point3<f32>,
    pub c: Point3<f32>,
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self { a, b, c }
    }

    /// Surface area via Heron's formula. Collinear corners give zero.
    pub fn area(&self) -> f32 {
        let ab = distance(&self.a, &self.b);
        let bc = distance(&self.b, &self.c);
        let ca = distance(&self.c, &self.a);
        let s = (ab + bc + ca) / 2.0;
        (s * (s - ab) * (s - bc) * (s - ca)).max(0.0).sqrt()
    }

    pub fn perimeter(&self) -> f32 {
        distance(&self.a, &self.b) + distance(&self.b, &self.c) + distance(&self.c, &self.a)
    }
}

/// Index of a vertex inside the shape that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// A triangle face expressed as three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub a: VertexId,
    pub b: VertexId,
    pub c: VertexId,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            a: VertexId(a),
            b: VertexId(b),
            c: VertexId(c),
        }
    }

    /// The three directed edges in winding order: a→b, b→c, c→a
    pub fn edges(&self) -> [(VertexId, VertexId); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Triangle,
    Quadrilateral,
    Cube,
    Pyramid,
    Custom,
}

/// A composite shape: a vertex arena plus the faces built over it.
///
/// Faces reference vertices by index, so a vertex shared by several faces
/// has one stable identity for the lifetime of the shape.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeKind,
    vertices: Vec<Point3<f32>>,
    faces: Vec<Face>,
}

impl Shape {
    fn from_parts(kind: ShapeKind, vertices: Vec<Point3<f32>>, faces: Vec<Face>) -> Self {
        debug_assert!(!faces.is_empty());
        Self {
            kind,
            vertices,
            faces,
        }
    }

    pub fn triangle(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self::from_parts(ShapeKind::Triangle, vec![a, b, c], vec![Face::new(0, 1, 2)])
    }

    /// Two triangles a-b-c and a-c-d
    pub fn quadrilateral(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, d: Point3<f32>) -> Self {
        Self::from_parts(
            ShapeKind::Quadrilateral,
            vec![a, b, c, d],
            vec![Face::new(0, 1, 2), Face::new(0, 2, 3)],
        )
    }

    /// Axis-aligned square in the z = center.z plane
    pub fn square(center: Point3<f32>, side: f32) -> Self {
        let [a, b, c, d] = square_corners(center, side);
        Self::quadrilateral(a, b, c, d)
    }

    /// Axis-aligned cube: 8 corners at ±side/2 from the center, 2 triangles per face.
    pub fn cube(center: Point3<f32>, side: f32) -> Self {
        let half = side / 2.0;
        let corner = |dx: f32, dy: f32, dz: f32| {
            Point3::new(
                center.x + dx * half,
                center.y + dy * half,
                center.z + dz * half,
            )
        };
        let vertices = [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ];
        Self::cube_with_corners(vertices)
    }

    /// Cube over caller-supplied corners, ordered like [`Shape::cube`] lays them out.
    pub fn cube_from_vertices(vertices: &[Point3<f32>]) -> Result<Self> {
        let corners: [Point3<f32>; 8] = vertices.try_into().map_err(|_| {
            Error::invalid_shape(format!("a cube needs 8 vertices, got {}", vertices.len()))
        })?;
        Ok(Self::cube_with_corners(corners))
    }

    fn cube_with_corners(corners: [Point3<f32>; 8]) -> Self {
        // Winding is consistent within a face only.
        let faces = vec![
            // Back (z-)
            Face::new(0, 1, 2),
            Face::new(0, 2, 3),
            // Front (z+)
            Face::new(4, 5, 6),
            Face::new(4, 6, 7),
            // Bottom (y-)
            Face::new(0, 1, 5),
            Face::new(0, 5, 4),
            // Top (y+)
            Face::new(2, 3, 7),
            Face::new(2, 7, 6),
            // Right (x+)
            Face::new(1, 2, 6),
            Face::new(1, 6, 5),
            // Left (x-)
            Face::new(0, 3, 7),
            Face::new(0, 7, 4),
        ];
        Self::from_parts(ShapeKind::Cube, corners.to_vec(), faces)
    }

    /// Square-based pyramid with its apex `height` above the base center along z.
    ///
    /// The base is fanned from its center into 4 triangles; each base edge
    /// gets one side triangle to the apex.
    pub fn pyramid(base_center: Point3<f32>, base_side: f32, height: f32) -> Self {
        let mut vertices = square_corners(base_center, base_side).to_vec();
        vertices.push(base_center);
        vertices.push(base_center + Vector3::z() * height);
        let (center, apex) = (4, 5);

        let mut faces = Vec::with_capacity(8);
        for i in 0..4 {
            faces.push(Face::new(center, i, (i + 1) % 4));
        }
        for i in 0..4 {
            faces.push(Face::new(i, (i + 1) % 4, apex));
        }
        Self::from_parts(ShapeKind::Pyramid, vertices, faces)
    }

    /// Arbitrary polygon, fan-triangulated from `vertices[0]`.
    pub fn custom(vertices: &[Point3<f32>]) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::invalid_shape(format!(
                "a shape needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let faces = (1..vertices.len() - 1)
            .map(|i| Face::new(0, i, i + 1))
            .collect();
        let shape = Self::from_parts(ShapeKind::Custom, vertices.to_vec(), faces);
        Ok(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn vertex(&self, id: VertexId) -> Point3<f32> {
        self.vertices[id.0]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn resolve(&self, face: &Face) -> Triangle {
        let [a, b, c] = [face.a, face.b, face.c].map(|id| self.vertex(id));
        Triangle::new(a, b, c)
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|face| self.resolve(face))
    }

    /// Sum of the triangle areas
    pub fn area(&self) -> f32 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Sum of the lengths of all distinct directed edges.
    ///
    /// Edges are keyed by (from, to) vertex ids, so an internal diagonal shared
    /// by two triangles with opposite winding is counted once per direction.
    /// Quadrilaterals instead report half the sum of their two triangle
    /// perimeters.
    pub fn perimeter(&self) -> f32 {
        if self.kind == ShapeKind::Quadrilateral {
            return self.triangles().map(|t| t.perimeter()).sum::<f32>() / 2.0;
        }
        let edges: HashSet<(VertexId, VertexId)> =
            self.faces.iter().flat_map(Face::edges).collect();
        edges
            .into_iter()
            .map(|(from, to)| distance(&self.vertex(from), &self.vertex(to)))
            .sum()
    }

    /// Edge length cubed, for cubes only
    pub fn volume(&self) -> Option<f32> {
        if self.kind != ShapeKind::Cube {
            return None;
        }
        let first = self.resolve(&self.faces[0]);
        Some(distance(&first.a, &first.b).powi(3))
    }
}

fn square_corners(center: Point3<f32>, side: f32) -> [Point3<f32>; 4] {
    let half = side / 2.0;
    [
        Point3::new(center.x - half, center.y - half, center.z),
        Point3::new(center.x + half, center.y - half, center.z),
        Point3::new(center.x + half, center.y + half, center.z),
        Point3::new(center.x - half, center.y + half, center.z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_vertices_and_area() {
        let cube = Shape::cube(Point3::origin(), 60.0);
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.faces().len(), 12);
        for v in cube.vertices() {
            assert_relative_eq!(
                distance(v, &Point3::origin()),
                30.0 * 3f32.sqrt(),
                epsilon = 1e-3
            );
        }
        assert_relative_eq!(cube.area(), 6.0 * 60.0 * 60.0, epsilon = 1e-1);
        assert_relative_eq!(cube.volume().unwrap(), 216_000.0, epsilon = 1.0);
    }

    #[test]
    fn test_cube_from_vertices_requires_eight() {
        let corners = [Point3::origin(); 7];
        assert!(matches!(
            Shape::cube_from_vertices(&corners),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_custom_shape_needs_three_vertices() {
        let result = Shape::custom(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(matches!(result, Err(Error::InvalidShape { .. })));
    }

    #[test]
    fn test_custom_shape_fans_from_first_vertex() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(15.0, 0.0, 0.0),
            Point3::new(15.0, 15.0, 0.0),
            Point3::new(0.0, 15.0, 0.0),
            Point3::new(7.5, 20.0, 0.0),
        ];
        let shape = Shape::custom(&vertices).unwrap();
        assert_eq!(shape.faces().len(), 3);
        assert!(shape.faces().iter().all(|f| f.a == VertexId(0)));
        assert_eq!(shape.kind(), ShapeKind::Custom);
    }

    #[test]
    fn test_perimeter_counts_diagonals_per_direction() {
        let square = Shape::custom(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ])
        .unwrap();
        let diagonal = 200f32.sqrt();
        assert_relative_eq!(square.perimeter(), 40.0 + 2.0 * diagonal, epsilon = 1e-3);
        assert_relative_eq!(square.area(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_quadrilateral_perimeter_halves_triangle_sum() {
        let square = Shape::square(Point3::new(5.0, 5.0, 0.0), 10.0);
        assert_eq!(square.kind(), ShapeKind::Quadrilateral);
        assert_eq!(square.faces().len(), 2);
        assert_relative_eq!(square.perimeter(), 20.0 + 200f32.sqrt(), epsilon = 1e-3);
        assert_relative_eq!(square.area(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_pyramid_layout() {
        let pyramid = Shape::pyramid(Point3::origin(), 30.0, 60.0);
        assert_eq!(pyramid.faces().len(), 8);
        assert_eq!(pyramid.vertices().len(), 6);
        assert_relative_eq!(pyramid.vertices()[5].z, 60.0);
        // Base fan covers the full square
        let base: f32 = pyramid.triangles().take(4).map(|t| t.area()).sum();
        assert_relative_eq!(base, 900.0, epsilon = 1e-2);
        assert!(pyramid.volume().is_none());
    }

    #[test]
    fn test_degenerate_triangle_has_zero_area() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert_relative_eq!(t.area(), 0.0, epsilon = 1e-2);
        assert_relative_eq!(t.perimeter(), 4.0 * 3f32.sqrt(), epsilon = 1e-4);
    }
}
