/// STF vector glyph format: parsing, serialization and contour encoding
///
/// ```text
/// char A {
/// init {
/// 1[0.000000,0.000000];
/// 2[0.500000,1.000000];
/// 3[1.000000,0.000000];
/// }
/// struct(1>2>3)
/// }
/// ```
///
/// Coordinates are unit-square, y-up. A connection that repeats its first id
/// at the end is a closed contour.
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::mem;
use std::path::Path;

use nalgebra::Point2;
use nom::{
    bytes::complete::tag,
    character::complete::{char as symbol, space0, u32 as decimal},
    combinator::{all_consuming, opt},
    multi::{separated_list0, separated_list1},
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Header token reserved for the space character
pub const SPACE_TOKEN: &str = "space";

/// One drawing command from an outline extractor, already scaled to the
/// target size with y growing downward.
#[derive(Debug, Clone, PartialEq)]
pub enum ContourCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    /// Control points followed by the on-curve end point
    CurveTo(Vec<Point2<f32>>),
    QCurveTo(Vec<Point2<f32>>),
    ClosePath,
}

pub type Contour = Vec<ContourCommand>;

/// An ordered chain of point ids drawn edge to edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection(pub Vec<u32>);

impl Connection {
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn is_closed(&self) -> bool {
        self.0.len() > 1 && self.0.first() == self.0.last()
    }
}

/// Point table plus connections for one character
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    points: BTreeMap<u32, Point2<f32>>,
    connections: Vec<Connection>,
}

impl GlyphOutline {
    /// Build an outline, dropping connection ids that have no point.
    pub fn from_parts(
        key: char,
        points: BTreeMap<u32, Point2<f32>>,
        connections: Vec<Vec<u32>>,
    ) -> Self {
        let connections = connections
            .into_iter()
            .filter_map(|chain| {
                let ids: Vec<u32> = chain
                    .into_iter()
                    .filter(|id| {
                        let known = points.contains_key(id);
                        if !known {
                            warn!("point {id} not found for character {key:?}");
                        }
                        known
                    })
                    .collect();
                (!ids.is_empty()).then_some(Connection(ids))
            })
            .collect();
        Self {
            points,
            connections,
        }
    }

    /// Encode extractor contours: ids are assigned from 1 in traversal order,
    /// curves keep only their end point, and y is flipped into unit y-up space.
    /// A glyph with no points becomes a closed unit square.
    pub fn from_contours(contours: &[Contour], scale: f32) -> Self {
        let mut points = BTreeMap::new();
        let mut connections = Vec::new();
        let mut current: Vec<u32> = Vec::new();
        let mut next_id = 1u32;

        let mut add_point = |p: &Point2<f32>, points: &mut BTreeMap<u32, Point2<f32>>| {
            let id = next_id;
            points.insert(id, Point2::new(p.x / scale, 1.0 - p.y / scale));
            next_id += 1;
            id
        };

        for command in contours.iter().flatten() {
            match command {
                ContourCommand::MoveTo(p) => {
                    if !current.is_empty() {
                        connections.push(mem::take(&mut current));
                    }
                    current.push(add_point(p, &mut points));
                }
                ContourCommand::LineTo(p) => current.push(add_point(p, &mut points)),
                ContourCommand::CurveTo(pts) | ContourCommand::QCurveTo(pts) => match pts.last() {
                    Some(end) => current.push(add_point(end, &mut points)),
                    None => warn!("curve command without an end point skipped"),
                },
                ContourCommand::ClosePath => {
                    if let (Some(&first), Some(&last)) = (current.first(), current.last()) {
                        if first != last {
                            current.push(first);
                        }
                    }
                }
            }
        }
        if !current.is_empty() {
            connections.push(current);
        }

        if points.is_empty() {
            return Self::fallback_square(scale);
        }
        Self {
            points,
            connections: connections.into_iter().map(Connection).collect(),
        }
    }

    fn fallback_square(scale: f32) -> Self {
        let square = vec![
            ContourCommand::MoveTo(Point2::new(0.0, 0.0)),
            ContourCommand::LineTo(Point2::new(scale, 0.0)),
            ContourCommand::LineTo(Point2::new(scale, scale)),
            ContourCommand::LineTo(Point2::new(0.0, scale)),
            ContourCommand::ClosePath,
        ];
        Self::from_contours(&[square], scale)
    }

    pub fn points(&self) -> &BTreeMap<u32, Point2<f32>> {
        &self.points
    }

    pub fn point(&self, id: u32) -> Option<Point2<f32>> {
        self.points.get(&id).copied()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections resolved to coordinates
    pub fn polylines(&self) -> Vec<Vec<Point2<f32>>> {
        self.connections
            .iter()
            .map(|c| {
                c.ids()
                    .iter()
                    .filter_map(|id| self.point(*id))
                    .collect()
            })
            .collect()
    }

    /// Serialize as one STF block
    pub fn to_stf(&self, key: char) -> String {
        let mut out = String::new();
        let header = if key == ' ' {
            SPACE_TOKEN.to_string()
        } else {
            key.to_string()
        };
        out.push_str(&format!("char {header} {{\n"));
        out.push_str("init {\n");
        for (id, p) in &self.points {
            out.push_str(&format!("{id}[{:.6},{:.6}];\n", p.x, p.y));
        }
        out.push_str("}\n");
        let chains: Vec<String> = self
            .connections
            .iter()
            .map(|c| {
                c.ids()
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(">")
            })
            .collect();
        out.push_str(&format!("struct({})\n", chains.join("/")));
        out.push_str("}\n");
        out
    }
}

/// Encode one character's contours straight to an STF block
pub fn write_glyph(key: char, contours: &[Contour], scale: f32) -> String {
    GlyphOutline::from_contours(contours, scale).to_stf(key)
}

/// A character → outline table, loaded once and then only read
#[derive(Debug, Clone, Default)]
pub struct Font {
    glyphs: HashMap<char, GlyphOutline>,
}

impl Font {
    pub fn from_glyphs(glyphs: impl IntoIterator<Item = (char, GlyphOutline)>) -> Self {
        Self {
            glyphs: glyphs.into_iter().collect(),
        }
    }

    /// Read and parse an STF file. Only I/O failures are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::parse(&text);
        info!("loaded {} glyphs from {}", font.len(), path.display());
        Ok(font)
    }

    /// Parse STF text. Malformed lines are logged and skipped.
    pub fn parse(text: &str) -> Self {
        let mut parser = StfParser::default();
        for (index, line) in text.lines().enumerate() {
            parser.feed(index + 1, line.trim());
        }
        parser.finish()
    }

    pub fn glyph(&self, key: char) -> Option<&GlyphOutline> {
        self.glyphs.get(&key)
    }

    /// Defined characters in ascending order
    pub fn chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.glyphs.keys().copied().collect();
        chars.sort_unstable();
        chars
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Serialize every glyph, blocks in character order
    pub fn to_stf(&self) -> String {
        self.chars()
            .into_iter()
            .map(|key| self.glyphs[&key].to_stf(key))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_stf())?;
        Ok(())
    }

    pub fn debug_dump(&self) {
        for key in self.chars() {
            let glyph = &self.glyphs[&key];
            debug!(
                character = ?key,
                points = glyph.points.len(),
                connections = ?glyph.connections,
                "glyph"
            );
        }
    }
}

enum Block {
    Outside,
    /// Inside a block whose header could not be used
    Skipping,
    Glyph {
        key: char,
        points: BTreeMap<u32, Point2<f32>>,
        connections: Vec<Vec<u32>>,
    },
}

struct StfParser {
    block: Block,
    glyphs: HashMap<char, GlyphOutline>,
}

impl Default for StfParser {
    fn default() -> Self {
        Self {
            block: Block::Outside,
            glyphs: HashMap::new(),
        }
    }
}

impl StfParser {
    fn feed(&mut self, line_no: usize, line: &str) {
        if line.is_empty() || line.starts_with('}') || line.starts_with("init") {
            return;
        }
        if let Some(rest) = header_rest(line) {
            self.close_block();
            self.block = match header_key(rest) {
                Some(key) => Block::Glyph {
                    key,
                    points: BTreeMap::new(),
                    connections: Vec::new(),
                },
                None => {
                    warn!(line_no, "unusable glyph header {line:?}, skipping block");
                    Block::Skipping
                }
            };
            return;
        }

        let (points, connections) = match &mut self.block {
            Block::Glyph {
                points,
                connections,
                ..
            } => (points, connections),
            Block::Skipping => return,
            Block::Outside => {
                warn!(line_no, "line outside any glyph block: {line:?}");
                return;
            }
        };

        if line.starts_with("struct") {
            match all_consuming(struct_line)(line) {
                Ok((_, chains)) => connections.extend(chains),
                Err(_) => warn!(line_no, "malformed struct line {line:?}"),
            }
        } else if line.contains('[') {
            match all_consuming(point_line)(line) {
                Ok((_, (id, x, y))) if id > 0 && x.is_finite() && y.is_finite() => {
                    if points.insert(id, Point2::new(x, y)).is_some() {
                        warn!(line_no, "point {id} redefined");
                    }
                }
                _ => warn!(line_no, "malformed point line {line:?}"),
            }
        } else {
            warn!(line_no, "unrecognised line {line:?}");
        }
    }

    fn close_block(&mut self) {
        if let Block::Glyph {
            key,
            points,
            connections,
        } = mem::replace(&mut self.block, Block::Outside)
        {
            let outline = GlyphOutline::from_parts(key, points, connections);
            if self.glyphs.insert(key, outline).is_some() {
                warn!("character {key:?} defined more than once, keeping the last");
            }
        }
    }

    fn finish(mut self) -> Font {
        self.close_block();
        Font {
            glyphs: self.glyphs,
        }
    }
}

/// Text after a `char` keyword, if the line is a header
fn header_rest(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("char")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// `X {` names X, `space {` names ' ', and a bare `{` is a space whose
/// character token was lost to whitespace splitting.
fn header_key(rest: &str) -> Option<char> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        ["{"] => Some(' '),
        [token, "{"] if *token == SPACE_TOKEN => Some(' '),
        [token, "{"] => {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        _ => None,
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}

/// `<id>[<x>,<y>];`
fn point_line(input: &str) -> IResult<&str, (u32, f32, f32)> {
    let (input, (id, _, x, _, y, _, _)) = tuple((
        ws(decimal),
        ws(symbol('[')),
        ws(float),
        ws(symbol(',')),
        ws(float),
        ws(symbol(']')),
        opt(ws(symbol(';'))),
    ))(input)?;
    Ok((input, (id, x, y)))
}

/// `struct(1>2>3/4>5)`
fn struct_line(input: &str) -> IResult<&str, Vec<Vec<u32>>> {
    preceded(
        ws(tag("struct")),
        delimited(
            ws(symbol('(')),
            separated_list0(
                ws(symbol('/')),
                separated_list1(ws(symbol('>')), ws(decimal)),
            ),
            ws(symbol(')')),
        ),
    )(input)
}
