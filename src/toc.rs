//! Table of contents: collecting headings during layout and rendering them.
//!
//! Any paragraph whose style name contains `toc-entry-<N>` is a level `N`
//! heading. Entries collected in one layout pass are rendered by the
//! `TableOfContents` flowable in the next, which is why documents with a table
//! of contents are built in multiple passes.

use crate::canvas::{Canvas, Destination};
use crate::colour::{colours, Colour};
use crate::flowable::Flowable;
use crate::fonts::BuiltinFont;
use crate::rect::Rect;
use crate::units::Pt;

const MARKER: &str = "toc-entry-";

#[derive(Clone, Debug, PartialEq)]
pub struct TocEntry {
    pub level: usize,
    pub text: String,
    /// 1-based page number
    pub page: usize,
    pub destination: Destination,
}

/// The heading level encoded in a style name, if any
pub fn heading_level(style_name: &str) -> Option<usize> {
    let start = style_name.find(MARKER)? + MARKER.len();
    let digits: String = style_name[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Gathers TOC entries while flowables are placed on pages
#[derive(Debug, Default)]
pub struct TocCollector {
    entries: Vec<TocEntry>,
}

impl TocCollector {
    pub fn after_flowable(&mut self, flowable: &Flowable, page: usize, destination: Destination) {
        let Flowable::Paragraph(paragraph) = flowable else {
            return;
        };
        if paragraph.is_continuation() {
            return;
        }
        let Some(level) = heading_level(paragraph.style_name()) else {
            return;
        };
        log::trace!("TOC entry level {level} on page {page}: {}", paragraph.plain_text());
        self.entries.push(TocEntry {
            level,
            text: paragraph.plain_text().to_string(),
            page,
            destination,
        });
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TocLevelStyle {
    pub font: BuiltinFont,
    pub font_size: Pt,
    pub leading: Pt,
    pub indent: Pt,
    pub colour: Colour,
}

/// Default look per heading level; deeper levels reuse the last one
pub fn level_styles() -> Vec<TocLevelStyle> {
    vec![
        TocLevelStyle {
            font: BuiltinFont::HelveticaBold,
            font_size: Pt(12.0),
            leading: Pt(18.0),
            indent: Pt(0.0),
            colour: colours::BLACK,
        },
        TocLevelStyle {
            font: BuiltinFont::Helvetica,
            font_size: Pt(10.0),
            leading: Pt(14.0),
            indent: Pt(20.0),
            colour: colours::BLACK,
        },
        TocLevelStyle {
            font: BuiltinFont::Helvetica,
            font_size: Pt(10.0),
            leading: Pt(12.0),
            indent: Pt(40.0),
            colour: colours::BLACK,
        },
    ]
}

/// A list of headings with dot leaders and page numbers
#[derive(Clone, Debug, PartialEq)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    pub level_styles: Vec<TocLevelStyle>,
    pub dot: String,
}

impl Default for TableOfContents {
    fn default() -> Self {
        TableOfContents {
            entries: Vec::new(),
            level_styles: level_styles(),
            dot: ".".to_string(),
        }
    }
}

impl TableOfContents {
    fn style_for(&self, level: usize) -> Option<&TocLevelStyle> {
        let index = level.saturating_sub(1).min(self.level_styles.len().saturating_sub(1));
        self.level_styles.get(index)
    }

    fn line_height(&self, entry: &TocEntry) -> Pt {
        self.style_for(entry.level)
            .map(|style| style.leading)
            .unwrap_or(Pt(12.0))
    }

    /// Zero height until entries have been collected
    pub fn wrap(&self, avail_width: Pt) -> (Pt, Pt) {
        let height = self.entries.iter().map(|e| self.line_height(e)).sum();
        (avail_width, height)
    }

    pub fn split(&self, avail_height: Pt) -> Option<(TableOfContents, TableOfContents)> {
        let mut used = Pt(0.0);
        let mut fit = 0;
        for entry in &self.entries {
            let height = self.line_height(entry);
            if used + height > avail_height + Pt(1e-3) {
                break;
            }
            used += height;
            fit += 1;
        }
        if fit == 0 || fit >= self.entries.len() {
            return None;
        }
        let first = TableOfContents {
            entries: self.entries[..fit].to_vec(),
            ..self.clone()
        };
        let rest = TableOfContents {
            entries: self.entries[fit..].to_vec(),
            ..self.clone()
        };
        Some((first, rest))
    }

    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let mut top = y + self.wrap(avail_width).1;
        let right = x + avail_width;

        for entry in &self.entries {
            let Some(style) = self.style_for(entry.level) else {
                continue;
            };
            let height = style.leading;
            let baseline = top - style.font.ascent(style.font_size) - (height - style.font_size) / 2.0;
            let text_x = x + style.indent;
            let page = entry.page.to_string();
            let text_width = style.font.width_of_text(&entry.text, style.font_size);
            let page_width = style.font.width_of_text(&page, style.font_size);

            canvas.draw_text(style.font, style.font_size, style.colour, text_x, baseline, &entry.text);
            canvas.draw_text(style.font, style.font_size, style.colour, right - page_width, baseline, &page);

            let gap = style.font.width_of_text(" ", style.font_size);
            let leader_start = text_x + text_width + gap;
            let leader_end = right - page_width - gap;
            let dot_width = style.font.width_of_text(&self.dot, style.font_size);
            if dot_width > Pt(0.0) && leader_end > leader_start {
                let count = ((leader_end - leader_start) / dot_width).floor() as usize;
                let leader = self.dot.repeat(count);
                let width = dot_width * count as f32;
                canvas.draw_text(
                    style.font,
                    style.font_size,
                    style.colour,
                    leader_end - width,
                    baseline,
                    &leader,
                );
            }

            canvas.link_to(entry.destination, Rect::new(text_x, top - height, right - text_x, height));
            top -= height;
        }
    }
}
