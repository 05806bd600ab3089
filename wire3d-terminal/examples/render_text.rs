/// Example: Render a string with an STF font and print it as text art
///
/// Usage: cargo run --example render_text -- path/to/font.stf "HELLO" [strategy]

use nalgebra::Point2;
use std::env;
use std::io;
use tracing_subscriber::EnvFilter;
use wire3d_core::{Font, LineRasterizer, PixelBuffer, RenderConfig, Rgb, SceneRenderer};

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <font.stf> <text> [strategy]", args[0]);
        return Ok(());
    }

    let font = Font::load(&args[1]).map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    // Unknown names warn and keep bresenham
    let mut rasterizer = LineRasterizer::default();
    if let Some(name) = args.get(3) {
        rasterizer.select_by_name(name);
    }
    let strategy = rasterizer.strategy();

    let config = RenderConfig::default()
        .with_font_size(8.0)
        .with_strategy(strategy);
    let text = &args[2];
    let width = (text.chars().count() as f32 * config.glyph_advance()) as u32 + 4;
    let height = config.font_size as u32 + 4;

    let mut surface = PixelBuffer::new(width, height);
    let mut renderer = SceneRenderer::new(&config, font);
    let drawn = renderer.draw_text(&mut surface, text, Point2::new(2.0, 2.0));
    println!("{drawn} glyphs drawn with {strategy}");

    for y in 0..height as i32 {
        let row: String = (0..width as i32)
            .map(|x| match surface.get(x, y) {
                Some(p) if p.luminance() > 0.5 => '#',
                Some(p) if p != Rgb::BLACK => '+',
                _ => ' ',
            })
            .collect();
        println!("{}", row.trim_end());
    }

    Ok(())
}
