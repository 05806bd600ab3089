/// Frame orchestration: scene state, input commands and the wireframe renderer
use nalgebra::Point2;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::geometry::{Shape, VertexId};
use crate::jitter::XorShiftJitter;
use crate::projection::Projector;
use crate::raster::{LineRasterizer, LineStrategy};
use crate::stf::Font;
use crate::surface::{PixelSurface, Rgb};
use crate::transform::{Axis, RotationState, Transform};

/// Input vocabulary applied between frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    ToggleSpin,
    Rotate { axis: Axis, delta: f32 },
    AdjustFocalLength(f32),
    ToggleProjection,
    SelectStrategy(LineStrategy),
    Quit,
}

/// Everything a frame depends on that input can change
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    rotation: RotationState,
    projector: Projector,
    strategy: LineStrategy,
    spinning: bool,
    rotation_speed: f32,
    running: bool,
}

impl Scene {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            shapes: Vec::new(),
            rotation: RotationState::zero(),
            projector: Projector::new(config.width, config.height)
                .with_focal_length(config.focal_length)
                .with_mode(config.projection),
            strategy: config.strategy,
            spinning: config.spinning,
            rotation_speed: config.rotation_speed,
            running: true,
        }
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: RotationState) {
        self.rotation = rotation;
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projector.resize(width, height);
    }

    pub fn strategy(&self) -> LineStrategy {
        self.strategy
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::ToggleSpin => self.spinning = !self.spinning,
            SceneCommand::Rotate { axis, delta } => {
                self.rotation = self.rotation.adjusted(axis, delta);
            }
            SceneCommand::AdjustFocalLength(delta) => self.projector.adjust_focal_length(delta),
            SceneCommand::ToggleProjection => {
                self.projector.toggle_mode();
                info!("projection mode {:?}", self.projector.mode);
            }
            SceneCommand::SelectStrategy(strategy) => self.strategy = strategy,
            SceneCommand::Quit => self.running = false,
        }
    }

    /// Advance automatic rotation by one tick
    pub fn tick(&mut self) {
        if self.spinning {
            self.rotation = Transform::update_rotation(self.rotation, self.rotation_speed);
        }
    }

    /// Apply a batch of inputs, then tick once
    pub fn step(&mut self, commands: impl IntoIterator<Item = SceneCommand>) {
        for command in commands {
            self.apply(command);
        }
        self.tick();
    }

    /// Text lines for the on-screen status overlay
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![self.strategy.name().to_uppercase()];
        if self.spinning {
            lines.push("SPIN".to_string());
        }
        lines
    }
}

/// Counters from one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub vertices_projected: usize,
    pub vertices_skipped: usize,
    pub edges_drawn: usize,
    pub glyphs_drawn: usize,
}

/// Draws a [`Scene`] and glyph text onto a pixel surface
pub struct SceneRenderer {
    rasterizer: LineRasterizer,
    font: Font,
    font_size: f32,
    advance: f32,
    line_spacing: f32,
    show_overlay: bool,
    line_color: Rgb,
    text_color: Rgb,
    background: Rgb,
}

impl SceneRenderer {
    pub fn new(config: &RenderConfig, font: Font) -> Self {
        let jitter = match config.jitter_seed {
            Some(seed) => XorShiftJitter::new(seed),
            None => XorShiftJitter::from_time(),
        };
        let rasterizer = LineRasterizer::new(config.strategy)
            .with_segment_length(config.segment_length)
            .with_jitter(jitter);
        Self {
            rasterizer,
            font,
            font_size: config.font_size,
            advance: config.glyph_advance(),
            line_spacing: config.font_size * config.line_spacing,
            show_overlay: config.show_overlay,
            line_color: config.line_color,
            text_color: config.text_color,
            background: config.background,
        }
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn strategy(&self) -> LineStrategy {
        self.rasterizer.strategy()
    }

    /// Render one full frame: clear, wireframes, then the status overlay.
    pub fn render<S: PixelSurface + ?Sized>(
        &mut self,
        scene: &Scene,
        surface: &mut S,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        surface.clear(self.background);
        self.rasterizer.set_strategy(scene.strategy());

        for shape in scene.shapes() {
            self.render_shape(scene, shape, surface, &mut stats);
        }

        if self.show_overlay {
            for (row, line) in scene.status_lines().iter().enumerate() {
                let origin = Point2::new(10.0, 10.0 + row as f32 * self.line_spacing);
                stats.glyphs_drawn += self.draw_text(surface, line, origin);
            }
        }
        stats
    }

    fn render_shape<S: PixelSurface + ?Sized>(
        &mut self,
        scene: &Scene,
        shape: &Shape,
        surface: &mut S,
        stats: &mut FrameStats,
    ) {
        // One slot per vertex; filled the first time any face touches it.
        let mut screen: Vec<Option<Option<Point2<f32>>>> = vec![None; shape.vertices().len()];

        for face in shape.faces() {
            let corners = [face.a, face.b, face.c].map(|id| {
                *screen[id.0].get_or_insert_with(|| project_vertex(scene, shape, id, stats))
            });

            for i in 0..3 {
                if let (Some(from), Some(to)) = (corners[i], corners[(i + 1) % 3]) {
                    self.rasterizer.draw_line(surface, from, to, self.line_color);
                    stats.edges_drawn += 1;
                }
            }
        }
    }

    /// Draw a string with its top-left corner at `origin`. Returns the number
    /// of characters that had a glyph.
    pub fn draw_text<S: PixelSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        text: &str,
        origin: Point2<f32>,
    ) -> usize {
        let mut cursor = origin;
        let mut drawn = 0;
        for c in text.chars() {
            match self.font.glyph(c) {
                Some(glyph) => {
                    for polyline in glyph.polylines() {
                        for edge in polyline.windows(2) {
                            let from = glyph_to_pixel(edge[0], cursor, self.font_size);
                            let to = glyph_to_pixel(edge[1], cursor, self.font_size);
                            self.rasterizer.draw_line(surface, from, to, self.text_color);
                        }
                    }
                    drawn += 1;
                }
                None if c != ' ' => debug!("no glyph for {c:?}"),
                None => {}
            }
            cursor.x += self.advance;
        }
        drawn
    }
}

fn project_vertex(
    scene: &Scene,
    shape: &Shape,
    id: VertexId,
    stats: &mut FrameStats,
) -> Option<Point2<f32>> {
    let rotated = Transform::apply_rotation(&shape.vertex(id), &scene.rotation());
    match scene.projector().project_to_screen(&rotated) {
        Ok(pixel) => {
            stats.vertices_projected += 1;
            Some(Point2::new(pixel.x as f32, pixel.y as f32))
        }
        Err(err) => {
            warn!("skipping vertex {}: {err}", id.0);
            stats.vertices_skipped += 1;
            None
        }
    }
}

/// Unit y-up glyph space to y-down pixels
fn glyph_to_pixel(point: Point2<f32>, cursor: Point2<f32>, size: f32) -> Point2<f32> {
    Point2::new(cursor.x + point.x * size, cursor.y + (1.0 - point.y) * size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stf::{ContourCommand, GlyphOutline};
    use crate::surface::PixelBuffer;
    use nalgebra::Point3;

    fn bar_font() -> Font {
        // A single vertical stroke for 'I'
        let stroke = vec![
            ContourCommand::MoveTo(Point2::new(0.0, 0.0)),
            ContourCommand::LineTo(Point2::new(0.0, 1.0)),
        ];
        Font::from_glyphs([('I', GlyphOutline::from_contours(&[stroke], 1.0))])
    }

    fn config() -> RenderConfig {
        RenderConfig {
            show_overlay: false,
            ..RenderConfig::default().with_surface_size(200, 200).with_jitter_seed(1)
        }
    }

    #[test]
    fn test_cube_vertices_are_projected_once() {
        let config = config();
        let mut scene = Scene::new(&config);
        scene.add_shape(Shape::cube(Point3::origin(), 60.0));
        let mut renderer = SceneRenderer::new(&config, Font::default());
        let mut surface = PixelBuffer::new(200, 200);

        let stats = renderer.render(&scene, &mut surface);
        assert_eq!(stats.vertices_projected, 8);
        assert_eq!(stats.edges_drawn, 36);
        assert_eq!(stats.vertices_skipped, 0);
        assert!(surface.lit_count(Rgb::BLACK) > 0);
    }

    #[test]
    fn test_degenerate_vertex_is_skipped() {
        let config = config();
        let mut scene = Scene::new(&config);
        scene.add_shape(Shape::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, -200.0),
        ));
        let mut renderer = SceneRenderer::new(&config, Font::default());
        let mut surface = PixelBuffer::new(200, 200);

        let stats = renderer.render(&scene, &mut surface);
        assert_eq!(stats.vertices_skipped, 1);
        assert_eq!(stats.edges_drawn, 1);
    }

    #[test]
    fn test_near_plane_vertices_render_without_overflow() {
        let config = config();
        let near = Shape::custom(&[
            Point3::new(2000.0, 0.0, -199.9999),
            Point3::new(-2000.0, 0.0, -199.9999),
            Point3::new(0.0, 10.0, 0.0),
        ])
        .unwrap();
        let mut scene = Scene::new(&config);
        scene.add_shape(near);
        let mut renderer = SceneRenderer::new(&config, Font::default());

        for strategy in LineStrategy::ALL {
            scene.apply(SceneCommand::SelectStrategy(strategy));
            let mut surface = PixelBuffer::new(200, 200);
            let stats = renderer.render(&scene, &mut surface);
            assert_eq!(stats.vertices_skipped, 0, "{strategy}");
            assert_eq!(stats.edges_drawn, 3, "{strategy}");
            assert!(surface.lit_count(Rgb::BLACK) > 0, "{strategy}");
        }

        // The near edge projects far past both borders and crosses row 100.
        scene.apply(SceneCommand::SelectStrategy(LineStrategy::Bresenham));
        let mut surface = PixelBuffer::new(200, 200);
        renderer.render(&scene, &mut surface);
        assert!((0..200).all(|x| surface.get(x, 100) == Some(Rgb::WHITE)));
    }

    #[test]
    fn test_commands_and_ticks() {
        let config = config();
        let mut scene = Scene::new(&config);
        scene.step([SceneCommand::Rotate {
            axis: Axis::X,
            delta: -5.0,
        }]);
        assert_eq!(scene.rotation(), RotationState::new(-5.0, 0.0, 0.0));

        scene.step([SceneCommand::ToggleSpin]);
        assert_eq!(scene.rotation(), RotationState::new(-4.5, 0.5, 0.5));

        scene.step([
            SceneCommand::SelectStrategy(LineStrategy::Wu),
            SceneCommand::Quit,
        ]);
        assert_eq!(scene.strategy(), LineStrategy::Wu);
        assert!(!scene.is_running());
        assert_eq!(scene.status_lines(), vec!["WU".to_string(), "SPIN".to_string()]);
    }

    #[test]
    fn test_renderer_follows_scene_strategy() {
        let config = config();
        let mut scene = Scene::new(&config);
        let mut renderer = SceneRenderer::new(&config, Font::default());
        let mut surface = PixelBuffer::new(50, 50);
        scene.apply(SceneCommand::SelectStrategy(LineStrategy::Midpoint));
        renderer.render(&scene, &mut surface);
        assert_eq!(renderer.strategy(), LineStrategy::Midpoint);
    }

    #[test]
    fn test_text_is_flipped_and_advanced() {
        let config = config().with_font_size(10.0).with_strategy(LineStrategy::Dda);
        let mut renderer = SceneRenderer::new(&config, bar_font());
        let mut surface = PixelBuffer::new(100, 40);

        let drawn = renderer.draw_text(&mut surface, "I?I", Point2::new(5.0, 5.0));
        assert_eq!(drawn, 2);
        // First bar spans rows 5..=15 at x = 5; the third starts 60 px later.
        for y in 5..=15 {
            assert_eq!(surface.get(5, y), Some(Rgb::WHITE));
            assert_eq!(surface.get(65, y), Some(Rgb::WHITE));
        }
        assert_eq!(surface.get(35, 10), Some(Rgb::BLACK));
    }
}
