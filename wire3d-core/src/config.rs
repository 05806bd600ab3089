/// Render settings shared by the scene, the renderer and front-ends
use std::time::Duration;

use crate::projection::{ProjectionMode, DEFAULT_FOCAL_LENGTH};
use crate::raster::{LineStrategy, DEFAULT_SEGMENT_LENGTH};
use crate::surface::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub focal_length: f32,
    pub projection: ProjectionMode,
    /// Degrees added to every axis per tick while spinning
    pub rotation_speed: f32,
    /// Degrees per discrete rotate input
    pub rotation_step: f32,
    pub focal_step: f32,
    pub spinning: bool,
    pub strategy: LineStrategy,
    pub segment_length: f32,
    /// `None` seeds the jitter source from the clock
    pub jitter_seed: Option<u64>,
    /// Glyph height in pixels
    pub font_size: f32,
    /// Horizontal advance per character, in font sizes
    pub advance_factor: f32,
    /// Vertical distance between overlay lines, in font sizes
    pub line_spacing: f32,
    pub show_overlay: bool,
    pub frame_rate: u32,
    pub line_color: Rgb,
    pub text_color: Rgb,
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            focal_length: DEFAULT_FOCAL_LENGTH,
            projection: ProjectionMode::Perspective,
            rotation_speed: 0.5,
            rotation_step: 5.0,
            focal_step: 5.0,
            spinning: false,
            strategy: LineStrategy::Bresenham,
            segment_length: DEFAULT_SEGMENT_LENGTH,
            jitter_seed: None,
            font_size: 10.0,
            advance_factor: 3.0,
            line_spacing: 2.0,
            show_overlay: true,
            frame_rate: 120,
            line_color: Rgb::WHITE,
            text_color: Rgb::WHITE,
            background: Rgb::BLACK,
        }
    }
}

impl RenderConfig {
    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_strategy(mut self, strategy: LineStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    pub fn with_spinning(mut self, spinning: bool) -> Self {
        self.spinning = spinning;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Target time per frame; a zero rate is treated as one frame per second
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Horizontal cursor advance per character, in pixels
    pub fn glyph_advance(&self) -> f32 {
        self.font_size * self.advance_factor
    }
}
