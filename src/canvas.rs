//! Per-page drawing surface.
//!
//! A `Canvas` records PDF content operators for one page along with the
//! resources those operators refer to (fonts, images) and the clickable regions
//! on the page. The writer turns finished canvases into PDF objects.

use crate::colour::{colours, Colour};
use crate::fonts::{encode, BuiltinFont};
use crate::figure::ImageData;
use crate::rect::Rect;
use crate::units::Pt;
use pdf_writer::types::LineCapStyle;
use pdf_writer::{Content, Name, Str};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Bezier control distance for a quarter circle
const KAPPA: f32 = 0.552_284_8;

/// A location inside the document that links and bookmarks can jump to
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Destination {
    /// 0-based page index
    pub page_index: usize,
    /// Vertical position on that page
    pub top: Pt,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    Internal(Destination),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub rect: Rect,
    pub target: LinkTarget,
}

pub struct Canvas {
    pub(crate) content: Content,
    pub(crate) fonts: BTreeSet<BuiltinFont>,
    pub(crate) images: Vec<Arc<ImageData>>,
    pub(crate) links: Vec<Link>,
    /// 1-based page number
    pub page_number: usize,
    pub width: Pt,
    pub height: Pt,
    font: BuiltinFont,
    font_size: Pt,
    fill: Colour,
    stack: Vec<(BuiltinFont, Pt, Colour)>,
}

impl Canvas {
    pub fn new(page_number: usize, width: Pt, height: Pt) -> Canvas {
        Canvas {
            content: Content::new(),
            fonts: BTreeSet::new(),
            images: Vec::new(),
            links: Vec::new(),
            page_number,
            width,
            height,
            font: BuiltinFont::Helvetica,
            font_size: Pt(12.0),
            fill: colours::BLACK,
            stack: Vec::new(),
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn fonts_used(&self) -> impl Iterator<Item = &BuiltinFont> {
        self.fonts.iter()
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.stack.push((self.font, self.font_size, self.fill));
        self.content.save_state();
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        if let Some((font, size, fill)) = self.stack.pop() {
            self.font = font;
            self.font_size = size;
            self.fill = fill;
        }
        self.content.restore_state();
        self
    }

    pub fn set_font(&mut self, font: BuiltinFont, size: Pt) -> &mut Self {
        self.font = font;
        self.font_size = size;
        self
    }

    pub fn set_fill_colour(&mut self, colour: Colour) -> &mut Self {
        self.fill = colour;
        if colour.is_grey() {
            self.content.set_fill_gray(colour.r);
        } else {
            self.content.set_fill_rgb(colour.r, colour.g, colour.b);
        }
        self
    }

    pub fn set_stroke_colour(&mut self, colour: Colour) -> &mut Self {
        if colour.is_grey() {
            self.content.set_stroke_gray(colour.r);
        } else {
            self.content.set_stroke_rgb(colour.r, colour.g, colour.b);
        }
        self
    }

    pub fn set_line_width(&mut self, width: Pt) -> &mut Self {
        self.content.set_line_width(*width);
        self
    }

    /// Concatenates `[a b c d e f]` onto the current transformation matrix
    pub fn transform(&mut self, matrix: [f32; 6]) -> &mut Self {
        self.content.transform(matrix);
        self
    }

    pub fn string_width(&self, text: &str) -> Pt {
        self.font.width_of_text(text, self.font_size)
    }

    /// Draws text with its baseline starting at `(x, y)` in the current font
    pub fn draw_string(&mut self, x: Pt, y: Pt, text: &str) -> &mut Self {
        let (font, size) = (self.font, self.font_size);
        self.show_text(font, size, x, y, text)
    }

    /// Draws text ending at `x`
    pub fn draw_right_string(&mut self, x: Pt, y: Pt, text: &str) -> &mut Self {
        let width = self.string_width(text);
        self.draw_string(x - width, y, text)
    }

    /// Draws a run of text in an explicit font and colour
    pub fn draw_text(
        &mut self,
        font: BuiltinFont,
        size: Pt,
        colour: Colour,
        x: Pt,
        y: Pt,
        text: &str,
    ) -> &mut Self {
        if self.fill != colour {
            self.set_fill_colour(colour);
        }
        self.show_text(font, size, x, y, text)
    }

    fn show_text(&mut self, font: BuiltinFont, size: Pt, x: Pt, y: Pt, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.fonts.insert(font);
        let bytes = encode(text);
        self.content
            .begin_text()
            .set_font(Name(font.resource_name()), *size)
            .next_line(*x, *y)
            .show(Str(&bytes))
            .end_text();
        self
    }

    pub fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) -> &mut Self {
        self.content
            .set_line_cap(LineCapStyle::ButtCap)
            .move_to(*x1, *y1)
            .line_to(*x2, *y2)
            .stroke();
        self
    }

    pub fn polyline(&mut self, points: &[(Pt, Pt)]) -> &mut Self {
        let Some(((x, y), rest)) = points.split_first() else {
            return self;
        };
        self.content.move_to(**x, **y);
        for (x, y) in rest {
            self.content.line_to(**x, **y);
        }
        self.content.stroke();
        self
    }

    pub fn rect(&mut self, rect: Rect, fill: bool, stroke: bool) -> &mut Self {
        self.content
            .rect(*rect.x1, *rect.y1, *rect.width(), *rect.height());
        self.paint(fill, stroke);
        self
    }

    pub fn circle(&mut self, cx: Pt, cy: Pt, r: Pt, fill: bool, stroke: bool) -> &mut Self {
        let (cx, cy, r) = (*cx, *cy, *r);
        let k = r * KAPPA;
        self.content
            .move_to(cx + r, cy)
            .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
            .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
            .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
            .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
            .close_path();
        self.paint(fill, stroke);
        self
    }

    fn paint(&mut self, fill: bool, stroke: bool) {
        match (fill, stroke) {
            (true, true) => {
                self.content.fill_nonzero_and_stroke();
            }
            (true, false) => {
                self.content.fill_nonzero();
            }
            (false, true) => {
                self.content.stroke();
            }
            (false, false) => {
                self.content.end_path();
            }
        }
    }

    /// Paints an image stretched over `rect`
    pub fn draw_image(&mut self, image: &Arc<ImageData>, rect: Rect) -> &mut Self {
        let index = match self.images.iter().position(|i| Arc::ptr_eq(i, image)) {
            Some(index) => index,
            None => {
                self.images.push(image.clone());
                self.images.len() - 1
            }
        };
        let name = image_resource_name(index);
        self.content
            .save_state()
            .transform([*rect.width(), 0.0, 0.0, *rect.height(), *rect.x1, *rect.y1])
            .x_object(Name(name.as_bytes()))
            .restore_state();
        self
    }

    /// Makes `rect` open an external URL
    pub fn link_url(&mut self, url: &str, rect: Rect) -> &mut Self {
        self.links.push(Link {
            rect,
            target: LinkTarget::Uri(url.to_string()),
        });
        self
    }

    /// Makes `rect` jump to another place in the document
    pub fn link_to(&mut self, destination: Destination, rect: Rect) -> &mut Self {
        self.links.push(Link {
            rect,
            target: LinkTarget::Internal(destination),
        });
        self
    }
}

pub(crate) fn image_resource_name(index: usize) -> String {
    format!("Im{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_track_fonts_and_links() {
        let mut canvas = Canvas::new(1, Pt(100.0), Pt(100.0));
        canvas
            .set_font(BuiltinFont::HelveticaBold, Pt(6.0))
            .draw_string(Pt(10.0), Pt(10.0), "Page 1");
        canvas.draw_text(
            BuiltinFont::Helvetica,
            Pt(12.0),
            colours::RED,
            Pt(0.0),
            Pt(50.0),
            "hello",
        );
        // empty strings don't pull in a font
        canvas.draw_text(
            BuiltinFont::HelveticaOblique,
            Pt(12.0),
            colours::RED,
            Pt(0.0),
            Pt(50.0),
            "",
        );
        let fonts: Vec<BuiltinFont> = canvas.fonts_used().copied().collect();
        assert_eq!(fonts, vec![BuiltinFont::Helvetica, BuiltinFont::HelveticaBold]);

        let rect = Rect::new(Pt(0.0), Pt(0.0), Pt(10.0), Pt(10.0));
        canvas.link_url("http://example.com", rect);
        canvas.link_to(
            Destination {
                page_index: 0,
                top: Pt(90.0),
            },
            rect,
        );
        assert_eq!(canvas.links().len(), 2);
        assert_eq!(
            canvas.links()[0].target,
            LinkTarget::Uri("http://example.com".to_string())
        );
    }

    #[test]
    fn can_measure_with_current_font() {
        let mut canvas = Canvas::new(1, Pt(100.0), Pt(100.0));
        canvas.set_font(BuiltinFont::Helvetica, Pt(10.0));
        assert!((canvas.string_width("Hi").0 - 9.44).abs() < 1e-4);
        canvas.save_state();
        canvas.set_font(BuiltinFont::HelveticaBold, Pt(10.0));
        assert!((canvas.string_width("Hi").0 - 10.0).abs() < 1e-4);
        canvas.restore_state();
        assert!((canvas.string_width("Hi").0 - 9.44).abs() < 1e-4);
    }
}
