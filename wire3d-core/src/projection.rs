/// Perspective projection and pixel-space mapping
use nalgebra::{Point2, Point3};

use crate::error::{Error, Result};

pub const DEFAULT_FOCAL_LENGTH: f32 = 200.0;

/// Smallest focal length reachable through [`Projector::adjust_focal_length`]
const MIN_FOCAL_LENGTH: f32 = 5.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// A vertex mapped onto the pixel grid (rows grow downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Scale a point toward the viewer by `focal_length / (z + focal_length)`.
pub fn project_perspective(point: &Point3<f32>, focal_length: f32) -> Result<Point2<f32>> {
    let depth = point.z + focal_length;

    // Prevent division by near-zero depth values
    if depth.abs() < 1e-6 {
        return Err(Error::DegenerateProjection {
            z: point.z,
            focal_length,
        });
    }

    let factor = focal_length / depth;
    Ok(Point2::new(point.x * factor, point.y * factor))
}

/// Map a centered, y-up point onto a y-down pixel grid.
pub fn to_screen(point: &Point2<f32>, width: u32, height: u32) -> PixelPoint {
    let x = (point.x + width as f32 / 2.0).round();
    let y = (height as f32 / 2.0 - point.y).round();
    PixelPoint::new(x as i32, y as i32)
}

/// Projection settings for a surface of a given size
#[derive(Debug, Clone)]
pub struct Projector {
    pub focal_length: f32,
    pub mode: ProjectionMode,
    pub width: u32,
    pub height: u32,
}

impl Projector {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            mode: ProjectionMode::Perspective,
            width,
            height,
        }
    }

    pub fn with_focal_length(mut self, focal_length: f32) -> Self {
        self.focal_length = focal_length;
        self
    }

    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Project a rotated 3D point to the 2D model plane
    pub fn project(&self, point: &Point3<f32>) -> Result<Point2<f32>> {
        match self.mode {
            ProjectionMode::Perspective => project_perspective(point, self.focal_length),
            ProjectionMode::Orthographic => Ok(Point2::new(point.x, point.y)),
        }
    }

    /// Project a rotated 3D point all the way to pixel coordinates
    pub fn project_to_screen(&self, point: &Point3<f32>) -> Result<PixelPoint> {
        let flat = self.project(point)?;
        Ok(to_screen(&flat, self.width, self.height))
    }

    pub fn adjust_focal_length(&mut self, delta: f32) {
        self.focal_length = (self.focal_length + delta).max(MIN_FOCAL_LENGTH);
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        };
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
