//! The units of content that flow through frames.
//!
//! Every flowable can measure itself against an available width (`wrap`), and
//! draw itself with its bottom-left corner at a given point. Paragraphs, tables
//! and tables of contents can also split themselves when they don't fit in the
//! space remaining in a frame.

use crate::canvas::Canvas;
use crate::drawing::Drawing;
use crate::figure::Figure;
use crate::paragraph::Paragraph;
use crate::table::Table;
use crate::toc::TableOfContents;
use crate::units::Pt;

#[derive(Clone, Debug)]
pub enum Flowable {
    Paragraph(Paragraph),
    Spacer { width: Pt, height: Pt },
    /// Ends the current page
    PageBreak,
    /// Selects the template used for the next page
    NextPageTemplate(String),
    Figure(Figure),
    Drawing(Drawing),
    Table(Table),
    TableOfContents(TableOfContents),
}

impl Flowable {
    pub fn name(&self) -> &'static str {
        match self {
            Flowable::Paragraph(_) => "paragraph",
            Flowable::Spacer { .. } => "spacer",
            Flowable::PageBreak => "page break",
            Flowable::NextPageTemplate(_) => "next page template",
            Flowable::Figure(_) => "figure",
            Flowable::Drawing(_) => "drawing",
            Flowable::Table(_) => "table",
            Flowable::TableOfContents(_) => "table of contents",
        }
    }

    /// Width and height the flowable needs when given `avail_width`
    pub fn wrap(&self, avail_width: Pt) -> (Pt, Pt) {
        match self {
            Flowable::Paragraph(p) => p.wrap(avail_width),
            Flowable::Spacer { width, height } => (*width, *height),
            Flowable::PageBreak | Flowable::NextPageTemplate(_) => (Pt(0.0), Pt(0.0)),
            Flowable::Figure(f) => f.wrap(avail_width),
            Flowable::Drawing(d) => d.wrap(),
            Flowable::Table(t) => t.wrap(avail_width),
            Flowable::TableOfContents(toc) => toc.wrap(avail_width),
        }
    }

    /// Tells the flowable the height of the frame it's about to be laid out in
    pub fn fit_frame(&mut self, frame_height: Pt) {
        if let Flowable::Figure(f) = self {
            f.fit_height(frame_height);
        }
    }

    pub fn space_before(&self) -> Pt {
        match self {
            Flowable::Paragraph(p) if !p.is_continuation() => p.style.space_before,
            _ => Pt(0.0),
        }
    }

    pub fn space_after(&self) -> Pt {
        match self {
            Flowable::Paragraph(p) => p.style.space_after,
            _ => Pt(0.0),
        }
    }

    /// Splits into a part fitting in `avail_height` and the rest, if possible
    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> Option<(Flowable, Flowable)> {
        match self {
            Flowable::Paragraph(p) => p
                .split(avail_width, avail_height)
                .map(|(a, b)| (Flowable::Paragraph(a), Flowable::Paragraph(b))),
            Flowable::Table(t) => t
                .split(avail_width, avail_height)
                .map(|(a, b)| (Flowable::Table(a), Flowable::Table(b))),
            Flowable::TableOfContents(toc) => toc
                .split(avail_height)
                .map(|(a, b)| (Flowable::TableOfContents(a), Flowable::TableOfContents(b))),
            _ => None,
        }
    }

    /// Draws with the bottom-left corner of the flowable's box at `(x, y)`
    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        match self {
            Flowable::Paragraph(p) => p.draw(canvas, x, y, avail_width),
            Flowable::Figure(f) => f.draw(canvas, x, y, avail_width),
            Flowable::Drawing(d) => d.draw(canvas, x, y),
            Flowable::Table(t) => t.draw(canvas, x, y, avail_width),
            Flowable::TableOfContents(toc) => toc.draw(canvas, x, y, avail_width),
            Flowable::Spacer { .. } | Flowable::PageBreak | Flowable::NextPageTemplate(_) => {}
        }
    }
}

impl From<Paragraph> for Flowable {
    fn from(value: Paragraph) -> Self {
        Flowable::Paragraph(value)
    }
}

impl From<Drawing> for Flowable {
    fn from(value: Drawing) -> Self {
        Flowable::Drawing(value)
    }
}

impl From<Table> for Flowable {
    fn from(value: Table) -> Self {
        Flowable::Table(value)
    }
}

impl From<Figure> for Flowable {
    fn from(value: Figure) -> Self {
        Flowable::Figure(value)
    }
}
