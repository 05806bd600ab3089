/// Terminal front-end for the wireframe renderer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::debug;
use wire3d_core::{
    Axis, Font, LineStrategy, RenderConfig, Scene, SceneCommand, SceneRenderer, Shape,
};

pub mod renderer;

pub use renderer::TerminalSurface;

const CONTROLS: &str = "Space=Spin Arrows/Q/E=Rotate W/S=Zoom P=Projection 1-6=Line Esc=Quit";

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    config: RenderConfig,
    scene: Scene,
    renderer: SceneRenderer,
    surface: TerminalSurface,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// The surface is sized from the terminal, two pixel rows per cell.
    pub fn new(config: RenderConfig, font: Font, shapes: Vec<Shape>) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let config = config.with_surface_size(columns as u32, rows as u32 * 2);

        let mut scene = Scene::new(&config);
        for shape in shapes {
            scene.add_shape(shape);
        }

        Ok(Self {
            renderer: SceneRenderer::new(&config, font),
            surface: TerminalSurface::new(columns, rows),
            scene,
            config,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = self.config.frame_interval();

        while self.scene.is_running() {
            let frame_start = Instant::now();

            // Handle input
            let commands = self.poll_input()?;
            self.scene.step(commands);
            if !self.scene.is_running() {
                break;
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Drain pending terminal events without blocking
    fn poll_input(&mut self) -> io::Result<Vec<SceneCommand>> {
        let mut commands = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => commands.extend(map_key(&key, &self.config)),
                Event::Resize(columns, rows) => {
                    debug!("terminal resized to {columns}x{rows}");
                    self.surface.resize(columns, rows);
                    self.scene.resize(columns as u32, rows as u32 * 2);
                }
                _ => {}
            }
        }
        Ok(commands)
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.render(&self.scene, &mut self.surface);

        // Output to terminal
        let mut stdout = stdout();
        self.surface.draw(&mut stdout)?;

        // Status line along the bottom row
        let (_, rows) = terminal::size()?;
        queue!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Wire3D | FPS: {:.1} | f={:.0} | {CONTROLS}",
                self.fps,
                self.scene.projector().focal_length,
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Translate a key press into a scene command. Releases and unbound keys map
/// to nothing.
pub fn map_key(key: &KeyEvent, config: &RenderConfig) -> Option<SceneCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let step = config.rotation_step;
    let rotate = |axis, delta| Some(SceneCommand::Rotate { axis, delta });

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SceneCommand::Quit)
        }
        KeyCode::Esc => Some(SceneCommand::Quit),
        KeyCode::Char(' ') => Some(SceneCommand::ToggleSpin),
        KeyCode::Left => rotate(Axis::Y, -step),
        KeyCode::Right => rotate(Axis::Y, step),
        KeyCode::Up => rotate(Axis::X, -step),
        KeyCode::Down => rotate(Axis::X, step),
        KeyCode::Char('q') => rotate(Axis::Z, -step),
        KeyCode::Char('e') => rotate(Axis::Z, step),
        KeyCode::Char('w') => Some(SceneCommand::AdjustFocalLength(config.focal_step)),
        KeyCode::Char('s') => Some(SceneCommand::AdjustFocalLength(-config.focal_step)),
        KeyCode::Char('p') => Some(SceneCommand::ToggleProjection),
        KeyCode::Char(c) => c
            .to_digit(10)
            .and_then(|d| LineStrategy::from_index(d as usize))
            .map(SceneCommand::SelectStrategy),
        _ => None,
    }
}
