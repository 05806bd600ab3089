/// Wire3D Core Library - Shared geometry, raster and glyph logic
///
/// This library provides the front-end independent pieces of the wireframe
/// renderer: shape construction, rotation and projection, line strategies,
/// the STF glyph format and the per-frame scene renderer.

pub mod config;
pub mod error;
pub mod geometry;
pub mod jitter;
pub mod projection;
pub mod raster;
pub mod scene;
pub mod stf;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use geometry::{Face, Shape, ShapeKind, Triangle, VertexId};
pub use jitter::{JitterSource, XorShiftJitter};
pub use projection::{PixelPoint, ProjectionMode, Projector};
pub use raster::{LineRasterizer, LineStrategy};
pub use scene::{FrameStats, Scene, SceneCommand, SceneRenderer};
pub use stf::{ContourCommand, Font, GlyphOutline};
pub use surface::{PixelBuffer, PixelSurface, Rgb};
pub use transform::{Axis, RotationState, Transform};
