/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale each channel by a coverage value in [0, 1]
    pub fn scaled(self, intensity: f32) -> Self {
        let k = intensity.clamp(0.0, 1.0);
        let channel = |c: u8| (c as f32 * k).round() as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Perceived brightness in [0, 1]
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

/// Write-only pixel target. The pipeline never reads pixels back.
pub trait PixelSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb);
    fn clear(&mut self, color: Rgb);
}

/// In-memory framebuffer; writes outside its bounds are dropped
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Number of pixels that differ from `background`
    pub fn lit_count(&self, background: Rgb) -> usize {
        self.pixels.iter().filter(|&&p| p != background).count()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb::BLACK; width as usize * height as usize];
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl PixelSurface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }
}
