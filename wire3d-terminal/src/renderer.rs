/// Half-block terminal surface: two pixel rows per terminal cell
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wire3d_core::{PixelBuffer, PixelSurface, Rgb};

/// Upper half block; foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Pixel surface backed by a [`PixelBuffer`] and flushed to the terminal as
/// half-block cells
pub struct TerminalSurface {
    columns: u16,
    rows: u16,
    buffer: PixelBuffer,
}

impl TerminalSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            buffer: PixelBuffer::new(columns as u32, rows as u32 * 2),
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        self.buffer.resize(columns as u32, rows as u32 * 2);
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Queue the whole frame; the caller flushes.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Rgb, Rgb)> = None;

        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, row))?;
            let top_y = row as i32 * 2;
            for x in 0..self.columns as i32 {
                let top = self.buffer.get(x, top_y).unwrap_or_default();
                let bottom = self.buffer.get(x, top_y + 1).unwrap_or_default();

                // Only emit color changes
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(to_color(top)))?;
                    writer.queue(SetBackgroundColor(to_color(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl PixelSurface for TerminalSurface {
    fn width(&self) -> u32 {
        self.buffer.width()
    }

    fn height(&self) -> u32 {
        self.buffer.height()
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        self.buffer.set_pixel(x, y, color);
    }

    fn clear(&mut self, color: Rgb) {
        self.buffer.clear(color);
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
