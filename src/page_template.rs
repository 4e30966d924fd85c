//! Page templates: where content flows on a page and what gets drawn around it.
//!
//! The built-in templates are:
//! - `blank_page` - one full-width frame named `normal`, no decoration
//! - `numbered_page` - the same frame with a numbered footer
//! - `2column_numbered_page` - `left_col` and `right_col` frames 12pt apart,
//!   with a numbered footer

use crate::canvas::Canvas;
use crate::fonts::BuiltinFont;
use crate::rect::{Margins, Rect};
use crate::units::{Pt, INCH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const BLANK_PAGE: &str = "blank_page";
pub const NUMBERED_PAGE: &str = "numbered_page";
pub const TWO_COLUMN_NUMBERED_PAGE: &str = "2column_numbered_page";

/// Gap between the columns of the two-column template
const COLUMN_GAP: Pt = Pt(12.0);

/// A rectangular region that flowables are laid out into, top to bottom
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub id: String,
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
    pub padding: Pt,
}

impl Frame {
    pub fn new(id: impl Into<String>, x: Pt, y: Pt, width: Pt, height: Pt) -> Frame {
        Frame {
            id: id.into(),
            x,
            y,
            width,
            height,
            padding: Pt(6.0),
        }
    }

    /// The area inside the padding
    pub fn content_box(&self) -> Rect {
        Rect::new(
            self.x + self.padding,
            self.y + self.padding,
            self.width - self.padding * 2.0,
            self.height - self.padding * 2.0,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FooterConfig {
    /// Text right-aligned on the footer line
    #[serde(default)]
    pub tag: Option<String>,
    /// URL the tag links to
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "FooterConfig::default_font_size")]
    pub font_size: Pt,
}

impl FooterConfig {
    fn default_font_size() -> Pt {
        Pt(6.0)
    }
}

impl Default for FooterConfig {
    fn default() -> Self {
        FooterConfig {
            tag: None,
            link: None,
            font_size: FooterConfig::default_font_size(),
        }
    }
}

/// What a page decoration gets to know about the page being drawn
#[derive(Debug)]
pub struct PageInfo<'a> {
    /// 1-based page number
    pub page_number: usize,
    pub page_width: Pt,
    pub page_height: Pt,
    pub margins: Margins,
    pub footer: &'a FooterConfig,
}

impl PageInfo<'_> {
    /// Width between the left and right margins
    pub fn content_width(&self) -> Pt {
        self.page_width - self.margins.left - self.margins.right
    }
}

pub type DecorationFn = Arc<dyn Fn(&mut Canvas, &PageInfo<'_>) + Send + Sync>;

#[derive(Clone, Default)]
pub enum PageDecoration {
    #[default]
    Blank,
    Numbered,
    Custom(DecorationFn),
}

impl fmt::Debug for PageDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageDecoration::Blank => write!(f, "Blank"),
            PageDecoration::Numbered => write!(f, "Numbered"),
            PageDecoration::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PageDecoration {
    pub fn draw(&self, canvas: &mut Canvas, info: &PageInfo<'_>) {
        canvas.save_state();
        match self {
            PageDecoration::Blank => {}
            PageDecoration::Numbered => draw_numbered_footer(canvas, info),
            PageDecoration::Custom(decorate) => decorate(canvas, info),
        }
        canvas.restore_state();
    }
}

/// `Page N` an inch from the left edge and the optional tag right-aligned to
/// the right margin, both sitting on the bottom margin
pub fn draw_numbered_footer(canvas: &mut Canvas, info: &PageInfo<'_>) {
    let footer = info.footer;
    let bottom = info.margins.bottom;
    let line_end = info.margins.left + info.content_width();

    canvas.set_font(BuiltinFont::Helvetica, footer.font_size);
    canvas.draw_string(INCH, bottom, &format!("Page {}", info.page_number));

    let Some(tag) = footer.tag.as_deref().filter(|t| !t.is_empty()) else {
        return;
    };
    canvas.draw_right_string(line_end, bottom, tag);
    if let Some(link) = footer.link.as_deref() {
        let width = canvas.string_width(tag);
        canvas.link_url(
            link,
            Rect::new(line_end - width, bottom, width, footer.font_size),
        );
    }
}

#[derive(Clone, Debug)]
pub struct PageTemplate {
    pub id: String,
    pub frames: Vec<Frame>,
    pub decoration: PageDecoration,
}

impl PageTemplate {
    pub fn new(id: impl Into<String>, frames: Vec<Frame>, decoration: PageDecoration) -> PageTemplate {
        PageTemplate {
            id: id.into(),
            frames,
            decoration,
        }
    }
}

/// The three standard templates for a page of the given size and margins
pub fn builtin_templates(page_width: Pt, page_height: Pt, margins: Margins) -> Vec<PageTemplate> {
    let width = page_width - margins.left - margins.right;
    let height = page_height - margins.top - margins.bottom;
    let full = Frame::new("normal", margins.left, margins.bottom, width, height);

    let column_width = width / 2.0 - COLUMN_GAP / 2.0;
    let left = Frame::new("left_col", margins.left, margins.bottom, column_width, height);
    let right = Frame::new(
        "right_col",
        margins.left + width / 2.0 + COLUMN_GAP / 2.0,
        margins.bottom,
        column_width,
        height,
    );

    vec![
        PageTemplate::new(BLANK_PAGE, vec![full.clone()], PageDecoration::Blank),
        PageTemplate::new(NUMBERED_PAGE, vec![full], PageDecoration::Numbered),
        PageTemplate::new(
            TWO_COLUMN_NUMBERED_PAGE,
            vec![left, right],
            PageDecoration::Numbered,
        ),
    ]
}
