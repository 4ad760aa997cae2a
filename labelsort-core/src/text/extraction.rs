//! Text extraction from PDF content streams
//!
//! This module interprets page content streams far enough to place every
//! shown glyph on the page: graphics state (`q`/`Q`/`cm`), text state and
//! positioning operators, text showing operators, and Form XObjects. Glyph
//! boxes are reported in top-left page coordinates so they can be tested
//! against a [`Region`].

use super::font::FontDecoder;
use crate::error::Result;
use crate::geometry::Region;
use crate::objects::{self, as_number};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;
use std::rc::Rc;

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text extraction options
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Gap (as a fraction of the font size) that inserts a space
    pub space_threshold: f64,
    /// Maximum difference in `top` for glyphs to share a line, in points
    pub line_tolerance: f64,
    /// How deep nested Form XObjects are followed
    pub max_form_depth: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            space_threshold: 0.2,
            line_tolerance: 3.0,
            max_form_depth: 8,
        }
    }
}

/// A placed glyph
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    /// Unicode text of the glyph
    pub text: String,
    /// Glyph box in top-left page coordinates
    pub bbox: Region,
    /// Effective font size on the page
    pub font_size: f64,
}

/// Text extraction state
#[derive(Clone)]
struct TextState {
    /// Character spacing
    char_space: f64,
    /// Word spacing
    word_space: f64,
    /// Horizontal scaling as a factor (Tz / 100)
    horizontal_scale: f64,
    /// Text leading (line spacing)
    leading: f64,
    /// Text rise
    rise: f64,
    /// Current font size
    font_size: f64,
    /// Current font
    font: Option<Rc<FontDecoder>>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
            font_size: 0.0,
            font: None,
        }
    }
}

#[derive(Clone)]
struct GraphicsState {
    ctm: [f64; 6],
    text: TextState,
}

/// Where user space sits on the page: MediaBox lower-left x and upper-right y
#[derive(Debug, Clone, Copy)]
struct PageOrigin {
    x: f64,
    top: f64,
}

struct Interpreter<'a> {
    doc: &'a Document,
    options: &'a ExtractionOptions,
    origin: PageOrigin,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: [f64; 6],
    text_line_matrix: [f64; 6],
    chars: Vec<TextChar>,
}

/// Text extractor for PDF pages
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    options: ExtractionOptions,
}

impl TextExtractor {
    /// Create a new text extractor with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text extractor with custom options
    pub fn with_options(options: ExtractionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Place every glyph of a content stream.
    ///
    /// `media_box` is `[llx, lly, urx, ury]`; it anchors the conversion to
    /// top-left coordinates.
    pub fn extract_chars(
        &self,
        doc: &Document,
        content: &[u8],
        resources: Option<&Dictionary>,
        media_box: [f64; 4],
    ) -> Result<Vec<TextChar>> {
        let mut interpreter = Interpreter {
            doc,
            options: &self.options,
            origin: PageOrigin {
                x: media_box[0],
                top: media_box[3],
            },
            state: GraphicsState {
                ctm: IDENTITY,
                text: TextState::default(),
            },
            stack: Vec::new(),
            text_matrix: IDENTITY,
            text_line_matrix: IDENTITY,
            chars: Vec::new(),
        };

        let operations = Content::decode(content)?.operations;
        interpreter.run(&operations, resources, 0);
        Ok(interpreter.chars)
    }

    /// Lay glyphs out as text: lines top to bottom, glyphs left to right
    pub fn chars_to_text<'c, I>(&self, chars: I) -> String
    where
        I: IntoIterator<Item = &'c TextChar>,
    {
        let mut sorted: Vec<&TextChar> = chars.into_iter().collect();
        sorted.sort_by(|a, b| {
            a.bbox
                .top
                .partial_cmp(&b.bbox.top)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut lines: Vec<Vec<&TextChar>> = Vec::new();
        let mut line_top = f64::NEG_INFINITY;
        for ch in sorted {
            if lines.is_empty() || ch.bbox.top - line_top > self.options.line_tolerance {
                line_top = ch.bbox.top;
                lines.push(vec![ch]);
            } else if let Some(line) = lines.last_mut() {
                line.push(ch);
            }
        }

        let mut result = String::new();
        for (i, line) in lines.iter_mut().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            line.sort_by(|a, b| {
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut last_x1: Option<f64> = None;
            for ch in line.iter() {
                if let Some(x1) = last_x1 {
                    if ch.bbox.x0 - x1 > self.options.space_threshold * ch.font_size
                        && !result.ends_with(' ')
                    {
                        result.push(' ');
                    }
                }
                result.push_str(&ch.text);
                last_x1 = Some(ch.bbox.x1);
            }
        }

        result
    }
}

impl Interpreter<'_> {
    fn run(&mut self, operations: &[Operation], resources: Option<&Dictionary>, depth: usize) {
        let fonts = resources.map(|r| load_fonts(self.doc, r)).unwrap_or_default();

        for op in operations {
            let nums: Vec<f64> = op.operands.iter().filter_map(as_number).collect();

            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(saved) = self.stack.pop() {
                        self.state = saved;
                    }
                }
                "cm" if nums.len() == 6 => {
                    let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    self.state.ctm = multiply_matrix(&m, &self.state.ctm);
                }
                "BT" => {
                    self.text_matrix = IDENTITY;
                    self.text_line_matrix = IDENTITY;
                }
                "Tm" if nums.len() == 6 => {
                    let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                    self.text_matrix = m;
                    self.text_line_matrix = m;
                }
                "Td" if nums.len() == 2 => self.move_text(nums[0], nums[1]),
                "TD" if nums.len() == 2 => {
                    self.state.text.leading = -nums[1];
                    self.move_text(nums[0], nums[1]);
                }
                "T*" => self.next_line(),
                "TL" if !nums.is_empty() => self.state.text.leading = nums[0],
                "Tc" if !nums.is_empty() => self.state.text.char_space = nums[0],
                "Tw" if !nums.is_empty() => self.state.text.word_space = nums[0],
                "Tz" if !nums.is_empty() => self.state.text.horizontal_scale = nums[0] / 100.0,
                "Ts" if !nums.is_empty() => self.state.text.rise = nums[0],
                "Tf" => {
                    if let (Some(Object::Name(name)), Some(size)) = (
                        op.operands.first(),
                        op.operands.get(1).and_then(as_number),
                    ) {
                        self.state.text.font = Some(
                            fonts
                                .get(name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| Rc::new(FontDecoder::default())),
                        );
                        self.state.text.font_size = size;
                    }
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show_text(bytes);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show_text(bytes);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (
                        op.operands.first().and_then(as_number),
                        op.operands.get(1).and_then(as_number),
                    ) {
                        self.state.text.word_space = aw;
                        self.state.text.char_space = ac;
                    }
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                        self.show_text(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show_text(bytes),
                                other => {
                                    if let Some(adjustment) = as_number(other) {
                                        // Text position adjustment (negative = move right)
                                        let tx = -adjustment / 1000.0
                                            * self.state.text.font_size
                                            * self.state.text.horizontal_scale;
                                        self.translate_text(tx);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let (Some(Object::Name(name)), Some(resources)) =
                        (op.operands.first(), resources)
                    {
                        self.run_form(name, resources, depth);
                    }
                }
                _ => {
                    // Other operations don't affect text placement
                }
            }
        }
    }

    fn run_form(&mut self, name: &[u8], resources: &Dictionary, depth: usize) {
        if depth >= self.options.max_form_depth {
            tracing::debug!("Form XObject nesting deeper than {depth}; skipping");
            return;
        }

        let doc = self.doc;
        let Some(Object::Stream(form)) = objects::get_dict(doc, resources, b"XObject")
            .and_then(|xobjects| objects::get(doc, xobjects, name))
        else {
            return;
        };
        if objects::get_name(doc, &form.dict, b"Subtype") != Some(b"Form".as_slice()) {
            return;
        }

        let operations = match Content::decode(&objects::stream_data(form)) {
            Ok(content) => content.operations,
            Err(e) => {
                tracing::warn!("Skipping undecodable form XObject: {e}");
                return;
            }
        };

        let matrix = objects::get_array(doc, &form.dict, b"Matrix")
            .and_then(|items| objects::number_array(doc, items))
            .filter(|m| m.len() == 6)
            .map(|m| [m[0], m[1], m[2], m[3], m[4], m[5]])
            .unwrap_or(IDENTITY);
        let form_resources = objects::get_dict(doc, &form.dict, b"Resources").unwrap_or(resources);

        // Text objects do not span the form boundary
        let saved_text = (self.text_matrix, self.text_line_matrix);
        self.stack.push(self.state.clone());
        self.state.ctm = multiply_matrix(&matrix, &self.state.ctm);
        self.run(&operations, Some(form_resources), depth + 1);
        if let Some(saved) = self.stack.pop() {
            self.state = saved;
        }
        (self.text_matrix, self.text_line_matrix) = saved_text;
    }

    fn move_text(&mut self, tx: f64, ty: f64) {
        let new_matrix = multiply_matrix(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.text_line_matrix);
        self.text_matrix = new_matrix;
        self.text_line_matrix = new_matrix;
    }

    fn next_line(&mut self) {
        self.move_text(0.0, -self.state.text.leading);
    }

    fn translate_text(&mut self, tx: f64) {
        self.text_matrix = multiply_matrix(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.text_matrix);
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let font = self
            .state
            .text
            .font
            .clone()
            .unwrap_or_else(|| Rc::new(FontDecoder::default()));
        let ts = self.state.text.clone();

        for glyph in font.decode(bytes) {
            let render = multiply_matrix(
                &[
                    ts.font_size * ts.horizontal_scale,
                    0.0,
                    0.0,
                    ts.font_size,
                    0.0,
                    ts.rise,
                ],
                &multiply_matrix(&self.text_matrix, &self.state.ctm),
            );

            if !glyph.text.is_empty() {
                let corners = [
                    transform_point(0.0, font.descent, &render),
                    transform_point(glyph.advance, font.descent, &render),
                    transform_point(0.0, font.descent + 1.0, &render),
                    transform_point(glyph.advance, font.descent + 1.0, &render),
                ];
                let min_x = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
                let max_x = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
                let min_y = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
                let max_y = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

                self.chars.push(TextChar {
                    text: glyph.text.clone(),
                    bbox: Region::new(
                        min_x - self.origin.x,
                        self.origin.top - max_y,
                        max_x - self.origin.x,
                        self.origin.top - min_y,
                    ),
                    font_size: (render[2] * render[2] + render[3] * render[3]).sqrt(),
                });
            }

            let spacing = if glyph.is_space { ts.word_space } else { 0.0 };
            let tx = (glyph.advance * ts.font_size + ts.char_space + spacing) * ts.horizontal_scale;
            self.translate_text(tx);
        }
    }
}

fn load_fonts(doc: &Document, resources: &Dictionary) -> HashMap<Vec<u8>, Rc<FontDecoder>> {
    let Some(fonts) = objects::get_dict(doc, resources, b"Font") else {
        return HashMap::new();
    };

    fonts
        .iter()
        .filter_map(|(name, value)| match objects::resolve(doc, value)? {
            Object::Dictionary(font) => {
                Some((name.clone(), Rc::new(FontDecoder::from_dict(doc, font))))
            }
            _ => None,
        })
        .collect()
}

/// Multiply two transformation matrices
fn multiply_matrix(a: &[f64; 6], b: &[f64; 6]) -> [f64; 6] {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

/// Transform a point using a transformation matrix
fn transform_point(x: f64, y: f64, matrix: &[f64; 6]) -> (f64, f64) {
    let tx = matrix[0] * x + matrix[2] * y + matrix[4];
    let ty = matrix[1] * x + matrix[3] * y + matrix[5];
    (tx, ty)
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod extraction_tests;
