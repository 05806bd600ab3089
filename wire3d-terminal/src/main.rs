/// Wire3D Terminal Demo - Rotating Cube and Pyramid
///
/// Usage: wire3d [font.stf]
/// Controls:
///   - Space: Toggle spinning
///   - Arrow Keys / Q,E: Rotate about X, Y and Z
///   - W/S: Focal length
///   - P: Perspective / orthographic
///   - 1-6: Line strategy
///   - ESC / Ctrl-C: Quit

use nalgebra::Point3;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wire3d_core::{Font, RenderConfig, Shape};
use wire3d_terminal::TerminalApp;

const BUNDLED_FONT: &str = include_str!("../assets/basic.stf");

fn main() -> io::Result<()> {
    // Logs go to stderr so they stay out of the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let font = match std::env::args().nth(1) {
        Some(path) => {
            Font::load(&path).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
        }
        None => Font::parse(BUNDLED_FONT),
    };
    info!("using font with {} glyphs", font.len());
    font.debug_dump();

    let shapes = vec![
        Shape::cube(Point3::new(-45.0, 0.0, 0.0), 60.0),
        Shape::pyramid(Point3::new(45.0, 0.0, -30.0), 60.0, 60.0),
    ];

    let config = RenderConfig::default().with_font_size(6.0);
    let mut app = TerminalApp::new(config, font, shapes)?;
    app.run()
}
