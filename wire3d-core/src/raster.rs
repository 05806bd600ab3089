/// Line rasterization strategies
///
/// Every strategy turns two endpoints in pixel space into a sequence of
/// `(x, y, intensity)` writes. Only `wu` produces fractional intensities;
/// the others always write `1.0`.
use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use tracing::{info, warn};

use crate::error::Error;
use crate::jitter::{JitterSource, XorShiftJitter};
use crate::surface::{PixelSurface, Rgb};

pub const DEFAULT_SEGMENT_LENGTH: f32 = 2.0;

/// The six line-stepping algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStrategy {
    Bresenham,
    Midpoint,
    Dda,
    Simit,
    Quantum,
    Wu,
}

impl LineStrategy {
    /// In key-binding order (1 through 6)
    pub const ALL: [LineStrategy; 6] = [
        LineStrategy::Bresenham,
        LineStrategy::Midpoint,
        LineStrategy::Dda,
        LineStrategy::Simit,
        LineStrategy::Quantum,
        LineStrategy::Wu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LineStrategy::Bresenham => "bresenham",
            LineStrategy::Midpoint => "midpoint",
            LineStrategy::Dda => "dda",
            LineStrategy::Simit => "simit",
            LineStrategy::Quantum => "quantum",
            LineStrategy::Wu => "wu",
        }
    }

    /// 1-based lookup matching the number keys
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for LineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LineStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

/// Saturate a wide pixel coordinate into the plot range
fn narrow(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Integer error-accumulator line.
///
/// Stops as soon as the major axis reaches the target, so the terminal
/// pixel is never written: (0,0)→(5,0) lights x = 0..=4.
pub fn bresenham<F: FnMut(i32, i32, f32)>(from: Point2<f32>, to: Point2<f32>, mut plot: F) {
    // Wide integers keep the deltas and doubled error terms from overflowing.
    let (x1, y1) = (from.x as i64, from.y as i64);
    let (x2, y2) = (to.x as i64, to.y as i64);
    if x1 == x2 && y1 == y2 {
        plot(narrow(x1), narrow(y1), 1.0);
        return;
    }

    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 > x2 { -1 } else { 1 };
    let sy = if y1 > y2 { -1 } else { 1 };
    let (mut x, mut y) = (x1, y1);

    // Error terms are doubled so the initial half step stays integral.
    if dx > dy {
        let mut err = dx;
        while x != x2 {
            plot(narrow(x), narrow(y), 1.0);
            err -= 2 * dy;
            if err < 0 {
                y += sy;
                err += 2 * dx;
            }
            x += sx;
        }
    } else {
        let mut err = dy;
        while y != y2 {
            plot(narrow(x), narrow(y), 1.0);
            err -= 2 * dx;
            if err < 0 {
                x += sx;
                err += 2 * dy;
            }
            y += sy;
        }
    }
}

/// Bisection line: both endpoints, then integer midpoints until every
/// sub-segment spans at most one pixel on both axes.
pub fn midpoint<F: FnMut(i32, i32, f32)>(from: Point2<f32>, to: Point2<f32>, mut plot: F) {
    let (x1, y1) = (from.x as i64, from.y as i64);
    let (x2, y2) = (to.x as i64, to.y as i64);
    let mut put = |x: i64, y: i64| plot(narrow(x), narrow(y), 1.0);
    put(x1, y1);
    if x1 == x2 && y1 == y2 {
        return;
    }
    put(x2, y2);

    // Left halves are popped first, giving the same order as a depth-first recursion.
    let mut pending = vec![(x1, y1, x2, y2)];
    while let Some((ax, ay, bx, by)) = pending.pop() {
        if (bx - ax).abs() <= 1 && (by - ay).abs() <= 1 {
            continue;
        }
        let mx = (ax + bx).div_euclid(2);
        let my = (ay + by).div_euclid(2);
        put(mx, my);
        pending.push((mx, my, bx, by));
        pending.push((ax, ay, mx, my));
    }
}

/// Float stepping over `max(|dx|, |dy|)` steps, endpoints inclusive.
pub fn dda<F: FnMut(i32, i32, f32)>(from: Point2<f32>, to: Point2<f32>, mut plot: F) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs()) as i32;
    if steps == 0 {
        plot(from.x as i32, from.y as i32, 1.0);
        return;
    }

    let x_inc = dx / steps as f32;
    let y_inc = dy / steps as f32;
    let (mut x, mut y) = (from.x, from.y);
    for _ in 0..=steps {
        plot(x as i32, y as i32, 1.0);
        x += x_inc;
        y += y_inc;
    }
}

/// Fixed-length stepping: `floor(distance / segment_length)` steps, then the
/// end point is written explicitly.
pub fn simit<F: FnMut(i32, i32, f32)>(
    from: Point2<f32>,
    to: Point2<f32>,
    segment_length: f32,
    mut plot: F,
) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = (dx.hypot(dy) / segment_length) as i32;

    if steps > 0 {
        let x_inc = dx / steps as f32;
        let y_inc = dy / steps as f32;
        let (mut x, mut y) = (from.x, from.y);
        for _ in 0..steps {
            plot(x as i32, y as i32, 1.0);
            x += x_inc;
            y += y_inc;
        }
    }
    plot(to.x as i32, to.y as i32, 1.0);
}

/// Unit-length stepping where every step drifts by a random deviation in
/// [-0.5, 0.5), applied to both axes. The end point is written explicitly.
pub fn quantum<F: FnMut(i32, i32, f32)>(
    from: Point2<f32>,
    to: Point2<f32>,
    jitter: &mut dyn JitterSource,
    mut plot: F,
) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.hypot(dy) as i32;

    if steps > 0 {
        let x_inc = dx / steps as f32;
        let y_inc = dy / steps as f32;
        let (mut x, mut y) = (from.x, from.y);
        for _ in 0..steps {
            plot(x as i32, y as i32, 1.0);
            let deviation = jitter.deviation();
            x += x_inc + deviation;
            y += y_inc + deviation;
        }
    }
    plot(to.x as i32, to.y as i32, 1.0);
}

/// Clip a segment to the box `min..=max` (Liang-Barsky).
///
/// Returns `None` when the segment misses the box or has a non-finite
/// endpoint. Endpoints already inside the box come back unchanged.
pub fn clip_segment(
    from: Point2<f32>,
    to: Point2<f32>,
    min: Point2<f32>,
    max: Point2<f32>,
) -> Option<(Point2<f32>, Point2<f32>)> {
    if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let dx = f64::from(to.x) - x0;
    let dy = f64::from(to.y) - y0;

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, x0 - f64::from(min.x)),
        (dx, f64::from(max.x) - x0),
        (-dy, y0 - f64::from(min.y)),
        (dy, f64::from(max.y) - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Point2::new((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    let start = if t0 > 0.0 { at(t0) } else { from };
    let end = if t1 < 1.0 { at(t1) } else { to };
    Some((start, end))
}

fn fpart(v: f32) -> f32 {
    v - v.floor()
}

fn rfpart(v: f32) -> f32 {
    1.0 - fpart(v)
}

/// Xiaolin Wu's anti-aliased line.
///
/// Each interior column (or row, for steep lines) writes two neighbouring
/// pixels whose intensities sum to 1. The far endpoint is rewritten at full
/// intensity at the end.
pub fn wu<F: FnMut(i32, i32, f32)>(from: Point2<f32>, to: Point2<f32>, mut plot: F) {
    if from == to {
        plot(from.x.floor() as i32, from.y.floor() as i32, 1.0);
        return;
    }

    let (mut x0, mut y0, mut x1, mut y1) = (from.x, from.y, to.x, to.y);
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let mut put = |major: i32, minor: i32, coverage: f32| {
        if steep {
            plot(minor, major, coverage);
        } else {
            plot(major, minor, coverage);
        }
    };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx == 0.0 { 1.0 } else { dy / dx };

    // First endpoint
    let xend = (x0 + 0.5).floor();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;
    put(xpxl1, ypxl1, rfpart(yend) * xgap);
    put(xpxl1, ypxl1 + 1, fpart(yend) * xgap);
    let mut intery = yend + gradient;

    // Second endpoint
    let xend = (x1 + 0.5).floor();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;
    put(xpxl2, ypxl2, rfpart(yend) * xgap);
    put(xpxl2, ypxl2 + 1, fpart(yend) * xgap);

    for x in (xpxl1 + 1)..xpxl2 {
        let base = intery.floor() as i32;
        put(x, base, rfpart(intery));
        put(x, base + 1, fpart(intery));
        intery += gradient;
    }

    put(x1.floor() as i32, y1.floor() as i32, 1.0);
}

/// The active line strategy plus the knobs some strategies need
pub struct LineRasterizer {
    strategy: LineStrategy,
    segment_length: f32,
    jitter: Box<dyn JitterSource>,
}

impl LineRasterizer {
    pub fn new(strategy: LineStrategy) -> Self {
        Self {
            strategy,
            segment_length: DEFAULT_SEGMENT_LENGTH,
            jitter: Box::new(XorShiftJitter::from_time()),
        }
    }

    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    /// Non-positive lengths fall back to the default.
    pub fn with_segment_length(mut self, segment_length: f32) -> Self {
        self.segment_length = if segment_length > 0.0 {
            segment_length
        } else {
            DEFAULT_SEGMENT_LENGTH
        };
        self
    }

    pub fn strategy(&self) -> LineStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: LineStrategy) {
        if strategy != self.strategy {
            info!("switched to {strategy} line strategy");
        }
        self.strategy = strategy;
    }

    /// Select a strategy by name. Unknown names keep the current strategy.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        match name.parse::<LineStrategy>() {
            Ok(strategy) => {
                self.set_strategy(strategy);
                true
            }
            Err(err) => {
                warn!("{err}; keeping {}", self.strategy);
                false
            }
        }
    }

    /// Run the active strategy, reporting each `(x, y, intensity)` write.
    pub fn trace<F: FnMut(i32, i32, f32)>(
        &mut self,
        from: Point2<f32>,
        to: Point2<f32>,
        mut plot: F,
    ) {
        match self.strategy {
            LineStrategy::Bresenham => bresenham(from, to, &mut plot),
            LineStrategy::Midpoint => midpoint(from, to, &mut plot),
            LineStrategy::Dda => dda(from, to, &mut plot),
            LineStrategy::Simit => simit(from, to, self.segment_length, &mut plot),
            LineStrategy::Quantum => quantum(from, to, self.jitter.as_mut(), &mut plot),
            LineStrategy::Wu => wu(from, to, &mut plot),
        }
    }

    /// Draw a line onto a surface, scaling `color` by each write's intensity.
    /// The segment is clipped to the surface first, so far off-screen
    /// endpoints cost no more than on-screen ones.
    pub fn draw_line<S: PixelSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        from: Point2<f32>,
        to: Point2<f32>,
        color: Rgb,
    ) {
        // One pixel of margin so truncation at the border matches the unclipped line.
        let min = Point2::new(-1.0, -1.0);
        let max = Point2::new(surface.width() as f32, surface.height() as f32);
        let Some((from, to)) = clip_segment(from, to, min, max) else {
            return;
        };
        self.trace(from, to, |x, y, intensity| {
            surface.set_pixel(x, y, color.scaled(intensity))
        });
    }
}

impl Default for LineRasterizer {
    fn default() -> Self {
        Self::new(LineStrategy::Bresenham)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::FixedJitter;
    use crate::surface::PixelBuffer;
    use approx::assert_relative_eq;
    use std::collections::{BTreeMap, HashSet};

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn collect(
        rasterizer: &mut LineRasterizer,
        from: Point2<f32>,
        to: Point2<f32>,
    ) -> Vec<(i32, i32, f32)> {
        let mut writes = Vec::new();
        rasterizer.trace(from, to, |x, y, c| writes.push((x, y, c)));
        writes
    }

    fn pixels(writes: &[(i32, i32, f32)]) -> Vec<(i32, i32)> {
        writes.iter().map(|&(x, y, _)| (x, y)).collect()
    }

    #[test]
    fn test_bresenham_skips_terminal_pixel() {
        let mut writes = Vec::new();
        bresenham(p(0.0, 0.0), p(5.0, 0.0), |x, y, c| writes.push((x, y, c)));
        let row: Vec<(i32, i32)> = (0..5).map(|x| (x, 0)).collect();
        assert_eq!(pixels(&writes), row);
        assert!(writes.iter().all(|&(_, _, c)| c == 1.0));
    }

    #[test]
    fn test_bresenham_steep_and_diagonal() {
        let mut writes = Vec::new();
        bresenham(p(0.0, 0.0), p(0.0, -3.0), |x, y, c| writes.push((x, y, c)));
        assert_eq!(pixels(&writes), vec![(0, 0), (0, -1), (0, -2)]);

        writes.clear();
        bresenham(p(0.0, 0.0), p(3.0, 3.0), |x, y, c| writes.push((x, y, c)));
        assert_eq!(pixels(&writes), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_bresenham_shallow_slope() {
        let mut writes = Vec::new();
        bresenham(p(0.0, 0.0), p(4.0, 2.0), |x, y, c| writes.push((x, y, c)));
        assert_eq!(pixels(&writes), vec![(0, 0), (1, 0), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_dda_includes_terminal_pixel() {
        let mut writes = Vec::new();
        dda(p(0.0, 0.0), p(4.0, 0.0), |x, y, c| writes.push((x, y, c)));
        let row: Vec<(i32, i32)> = (0..=4).map(|x| (x, 0)).collect();
        assert_eq!(pixels(&writes), row);
    }

    #[test]
    fn test_coincident_endpoints_draw_one_pixel() {
        for strategy in LineStrategy::ALL {
            let mut rasterizer = LineRasterizer::new(strategy).with_jitter(FixedJitter(0.5));
            let writes = collect(&mut rasterizer, p(2.0, 3.0), p(2.0, 3.0));
            assert_eq!(pixels(&writes), vec![(2, 3)], "{strategy}");
        }
    }

    #[test]
    fn test_midpoint_fills_horizontal_run() {
        let mut writes = Vec::new();
        midpoint(p(0.0, 0.0), p(8.0, 0.0), |x, y, c| writes.push((x, y, c)));
        assert_eq!(
            pixels(&writes),
            vec![(0, 0), (8, 0), (4, 0), (2, 0), (1, 0), (3, 0), (6, 0), (5, 0), (7, 0)]
        );
    }

    #[test]
    fn test_midpoint_floors_negative_midpoints() {
        let mut writes = Vec::new();
        midpoint(p(0.0, 0.0), p(-4.0, -2.0), |x, y, c| writes.push((x, y, c)));
        let lit: HashSet<_> = pixels(&writes).into_iter().collect();
        assert!(lit.contains(&(-2, -1)));
        assert!(lit.contains(&(-4, -2)));
        assert!(lit.contains(&(0, 0)));
    }

    #[test]
    fn test_simit_steps_by_segment_and_forces_end() {
        let mut writes = Vec::new();
        simit(p(0.0, 0.0), p(10.0, 0.0), 2.0, |x, y, _| writes.push((x, y)));
        assert_eq!(
            writes,
            vec![(0, 0), (2, 0), (4, 0), (6, 0), (8, 0), (10, 0)]
        );
    }

    #[test]
    fn test_quantum_without_deviation_walks_unit_steps() {
        let mut rasterizer =
            LineRasterizer::new(LineStrategy::Quantum).with_jitter(FixedJitter(0.5));
        let writes = collect(&mut rasterizer, p(0.0, 0.0), p(5.0, 0.0));
        assert_eq!(
            pixels(&writes),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]
        );
    }

    #[test]
    fn test_quantum_is_reproducible_with_a_seed() {
        let from = p(3.0, 4.0);
        let to = p(60.0, 41.0);
        let seeded = || {
            LineRasterizer::new(LineStrategy::Quantum).with_jitter(XorShiftJitter::new(99))
        };
        let (mut a, mut b) = (seeded(), seeded());
        let first = collect(&mut a, from, to);
        assert_eq!(first, collect(&mut b, from, to));
        assert_eq!(pixels(&first)[0], (3, 4));
        assert_eq!(*pixels(&first).last().unwrap(), (60, 41));
    }

    #[test]
    fn test_wu_conserves_coverage() {
        let mut writes = Vec::new();
        wu(p(0.0, 0.0), p(10.0, 3.0), |x, y, c| writes.push((x, y, c)));

        let mut columns: BTreeMap<i32, f32> = BTreeMap::new();
        for &(x, _, c) in &writes {
            assert!((0.0..=1.0).contains(&c));
            *columns.entry(x).or_default() += c;
        }
        for x in 1..10 {
            assert_relative_eq!(columns[&x], 1.0, epsilon = 1e-5);
        }
        assert_eq!(*writes.last().unwrap(), (10, 3, 1.0));
    }

    #[test]
    fn test_wu_steep_line_swaps_axes() {
        let mut writes = Vec::new();
        wu(p(1.0, 0.0), p(3.0, 10.0), |x, y, c| writes.push((x, y, c)));

        let mut rows: BTreeMap<i32, f32> = BTreeMap::new();
        for &(_, y, c) in &writes {
            *rows.entry(y).or_default() += c;
        }
        for y in 1..10 {
            assert_relative_eq!(rows[&y], 1.0, epsilon = 1e-5);
        }
        assert_eq!(*writes.last().unwrap(), (3, 10, 1.0));
    }

    #[test]
    fn test_unknown_strategy_is_retained() {
        let mut rasterizer = LineRasterizer::new(LineStrategy::Wu);
        assert!(!rasterizer.select_by_name("spline"));
        assert_eq!(rasterizer.strategy(), LineStrategy::Wu);
        assert!(rasterizer.select_by_name("DDA"));
        assert_eq!(rasterizer.strategy(), LineStrategy::Dda);

        let mut fallback = LineRasterizer::default();
        assert!(!fallback.select_by_name("bogus"));
        assert_eq!(fallback.strategy(), LineStrategy::Bresenham);
    }

    #[test]
    fn test_strategy_names_and_indices() {
        for (i, strategy) in LineStrategy::ALL.into_iter().enumerate() {
            assert_eq!(strategy.name().parse::<LineStrategy>().unwrap(), strategy);
            assert_eq!(LineStrategy::from_index(i + 1), Some(strategy));
        }
        assert_eq!(LineStrategy::from_index(0), None);
        assert_eq!(LineStrategy::from_index(7), None);
        assert!(matches!(
            "nope".parse::<LineStrategy>(),
            Err(Error::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_clip_segment() {
        let (min, max) = (p(0.0, 0.0), p(10.0, 10.0));
        let inside = clip_segment(p(1.0, 2.0), p(8.0, 9.0), min, max);
        assert_eq!(inside, Some((p(1.0, 2.0), p(8.0, 9.0))));

        let (from, to) = clip_segment(p(-10.0, 5.0), p(20.0, 5.0), min, max).unwrap();
        assert_relative_eq!(from, p(0.0, 5.0), epsilon = 1e-5);
        assert_relative_eq!(to, p(10.0, 5.0), epsilon = 1e-5);

        assert_eq!(clip_segment(p(-5.0, -1.0), p(20.0, -1.0), min, max), None);
        assert_eq!(clip_segment(p(f32::NAN, 0.0), p(5.0, 5.0), min, max), None);
    }

    #[test]
    fn test_far_endpoints_are_clipped_before_stepping() {
        let (from, to) = (p(-3.0e9, 10.0), p(3.0e9, 10.0));
        for strategy in LineStrategy::ALL {
            let mut surface = PixelBuffer::new(50, 50);
            let mut rasterizer =
                LineRasterizer::new(strategy).with_jitter(XorShiftJitter::new(3));
            rasterizer.draw_line(&mut surface, from, to, Rgb::WHITE);
            assert!(surface.lit_count(Rgb::BLACK) > 0, "{strategy}");
        }

        let mut surface = PixelBuffer::new(50, 50);
        let mut rasterizer = LineRasterizer::new(LineStrategy::Bresenham);
        rasterizer.draw_line(&mut surface, from, to, Rgb::WHITE);
        assert!((0..49).all(|x| surface.get(x, 10) == Some(Rgb::WHITE)));
        assert_eq!(surface.get(25, 11), Some(Rgb::BLACK));
    }

    #[test]
    fn test_midpoint_near_integer_limit() {
        // 2^31 - 512 to 2^31, both exact in f32
        let (from, to) = (p(2_147_483_136.0, 0.0), p(2_147_483_648.0, 0.0));
        let mut xs = Vec::new();
        midpoint(from, to, |x, _, _| xs.push(x));
        assert_eq!(xs.len(), 513);
        assert!(xs.iter().all(|&x| x >= 2_147_483_136));
        assert!(xs.contains(&i32::MAX));
    }

    #[test]
    fn test_draw_line_scales_color() {
        let mut surface = PixelBuffer::new(16, 16);
        let mut rasterizer = LineRasterizer::new(LineStrategy::Wu);
        let color = Rgb::new(200, 100, 50);
        rasterizer.draw_line(&mut surface, p(2.0, 2.0), p(12.0, 7.0), color);
        assert_eq!(surface.get(12, 7), Some(color));
        assert!(surface.lit_count(Rgb::BLACK) > 10);
    }
}
