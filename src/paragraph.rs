//! Paragraph line breaking and drawing.

use crate::canvas::Canvas;
use crate::fonts::BuiltinFont;
use crate::markup::{self, Span};
use crate::styles::{Alignment, ParagraphStyle};
use crate::units::Pt;
use std::sync::Arc;

/// Part of a word set in a single font
#[derive(Clone, Debug, PartialEq)]
struct Piece {
    text: String,
    font: BuiltinFont,
    width: Pt,
}

/// Text between two spaces; may change font mid-word
#[derive(Clone, Debug, PartialEq)]
struct Word {
    pieces: Vec<Piece>,
    width: Pt,
}

#[derive(Clone, Debug, PartialEq)]
enum Item {
    Word(Word),
    Break,
}

/// A laid out line of a paragraph
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    words: Vec<Word>,
    /// Natural width including one space between words
    pub width: Pt,
    /// The line was ended by an explicit `<br/>`
    forced_break: bool,
}

impl Line {
    fn empty() -> Line {
        Line {
            words: Vec::new(),
            width: Pt(0.0),
            forced_break: false,
        }
    }

    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.pieces.iter().map(|p| p.text.as_str()).collect::<String>())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// A run of text in one font at its position on the page
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRun {
    pub text: String,
    pub font: BuiltinFont,
    pub x: Pt,
    pub baseline: Pt,
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub style: Arc<ParagraphStyle>,
    items: Vec<Item>,
    bullet: Option<String>,
    text: String,
    continuation: bool,
    justify_last_line: bool,
}

impl Paragraph {
    /// Creates a paragraph from marked-up text
    pub fn new(text: &str, style: Arc<ParagraphStyle>) -> Paragraph {
        let markup = markup::parse(text);
        let items = tokenize(&markup.spans, &style);
        Paragraph {
            style,
            items,
            bullet: markup.bullet,
            text: markup::plain_text(text),
            continuation: false,
            justify_last_line: false,
        }
    }

    /// Creates a paragraph with a `•` bullet hanging at the style's bullet indent
    pub fn bullet(text: &str, style: Arc<ParagraphStyle>) -> Paragraph {
        Paragraph::new(text, style).with_bullet("•")
    }

    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Paragraph {
        self.bullet = Some(bullet.into());
        self
    }

    pub fn bullet_text(&self) -> Option<&str> {
        self.bullet.as_deref()
    }

    /// Visible text without markup
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    pub fn style_name(&self) -> &str {
        &self.style.name
    }

    /// True for the trailing part of a paragraph that was split across frames
    pub fn is_continuation(&self) -> bool {
        self.continuation
    }

    fn space_width(&self) -> Pt {
        self.style.font.width_of_text(" ", self.style.font_size)
    }

    fn text_width(&self, avail_width: Pt) -> Pt {
        avail_width - self.style.left_indent
    }

    /// Greedily breaks the paragraph into lines no wider than the available width.
    /// A single word wider than the line gets a line of its own.
    pub fn lines(&self, avail_width: Pt) -> Vec<Line> {
        let max_width = self.text_width(avail_width);
        let space = self.space_width();
        let mut lines = Vec::new();
        let mut line = Line::empty();

        for item in &self.items {
            match item {
                Item::Word(word) => {
                    if !line.words.is_empty() && line.width + space + word.width > max_width {
                        lines.push(std::mem::replace(&mut line, Line::empty()));
                    }
                    if !line.words.is_empty() {
                        line.width += space;
                    }
                    line.width += word.width;
                    line.words.push(word.clone());
                }
                Item::Break => {
                    line.forced_break = true;
                    lines.push(std::mem::replace(&mut line, Line::empty()));
                }
            }
        }
        if !line.words.is_empty() {
            lines.push(line);
        }
        lines
    }

    pub fn height_of(&self, lines: &[Line]) -> Pt {
        self.style.leading * lines.len() as f32
    }

    pub fn wrap(&self, avail_width: Pt) -> (Pt, Pt) {
        let lines = self.lines(avail_width);
        (avail_width, self.height_of(&lines))
    }

    /// Splits into a part that fits in `avail_height` and the remainder
    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> Option<(Paragraph, Paragraph)> {
        let lines = self.lines(avail_width);
        let fit = ((*avail_height + 1e-3) / *self.style.leading).floor();
        if fit < 1.0 {
            return None;
        }
        let fit = fit as usize;
        if fit >= lines.len() {
            return None;
        }

        let (head, tail) = lines.split_at(fit);
        let first = Paragraph {
            style: self.style.clone(),
            items: items_of(head),
            bullet: self.bullet.clone(),
            text: self.text.clone(),
            continuation: self.continuation,
            justify_last_line: !head.last().map(|l| l.forced_break).unwrap_or(false),
        };
        let rest = Paragraph {
            style: self.style.clone(),
            items: items_of(tail),
            bullet: None,
            text: self.text.clone(),
            continuation: true,
            justify_last_line: self.justify_last_line,
        };
        Some((first, rest))
    }

    /// Positions every run of text, bullet included, for a paragraph whose
    /// box has its bottom-left corner at `(x, y)`
    pub fn placed_runs(&self, x: Pt, y: Pt, avail_width: Pt) -> Vec<PlacedRun> {
        let lines = self.lines(avail_width);
        let style = &self.style;
        let top = y + self.height_of(&lines);
        let text_x = x + style.left_indent;
        let max_width = self.text_width(avail_width);
        let space = self.space_width();
        let ascent = style.font.ascent(style.font_size);
        let mut runs = Vec::new();

        if let (Some(bullet), false) = (&self.bullet, self.continuation) {
            runs.push(PlacedRun {
                text: bullet.clone(),
                font: style.font,
                x: x + style.bullet_indent,
                baseline: top - ascent,
            });
        }

        let count = lines.len();
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - ascent - style.leading * i as f32;
            let is_last = i + 1 == count;
            let slack = (max_width - line.width).max(Pt(0.0));

            let (offset, extra_space) = match style.alignment {
                Alignment::Left => (Pt(0.0), Pt(0.0)),
                Alignment::Right => (slack, Pt(0.0)),
                Alignment::Centre => (slack / 2.0, Pt(0.0)),
                Alignment::Justify => {
                    let stretch = !line.forced_break && (!is_last || self.justify_last_line);
                    if stretch && line.words.len() > 1 {
                        (Pt(0.0), slack / (line.words.len() - 1) as f32)
                    } else {
                        (Pt(0.0), Pt(0.0))
                    }
                }
            };

            let mut cursor = text_x + offset;
            for (wi, word) in line.words.iter().enumerate() {
                if wi > 0 {
                    cursor += space + extra_space;
                }
                for piece in &word.pieces {
                    runs.push(PlacedRun {
                        text: piece.text.clone(),
                        font: piece.font,
                        x: cursor,
                        baseline,
                    });
                    cursor += piece.width;
                }
            }
        }
        runs
    }

    /// Draws the paragraph with its box's bottom-left corner at `(x, y)`
    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let style = &self.style;
        for run in self.placed_runs(x, y, avail_width) {
            canvas.draw_text(
                run.font,
                style.font_size,
                style.text_colour,
                run.x,
                run.baseline,
                &run.text,
            );
        }
    }
}

fn items_of(lines: &[Line]) -> Vec<Item> {
    let mut items = Vec::new();
    for line in lines {
        items.extend(line.words.iter().cloned().map(Item::Word));
        if line.forced_break {
            items.push(Item::Break);
        }
    }
    items
}

fn tokenize(spans: &[Span], style: &ParagraphStyle) -> Vec<Item> {
    fn finish_word(word: &mut Vec<Piece>, items: &mut Vec<Item>, size: Pt) {
        if word.is_empty() {
            return;
        }
        let mut pieces = std::mem::take(word);
        for piece in pieces.iter_mut() {
            piece.width = piece.font.width_of_text(&piece.text, size);
        }
        let width = pieces.iter().map(|p| p.width).sum();
        items.push(Item::Word(Word { pieces, width }));
    }

    let size = style.font_size;
    let mut items = Vec::new();
    let mut word: Vec<Piece> = Vec::new();

    for span in spans {
        match span {
            Span::LineBreak => {
                finish_word(&mut word, &mut items, size);
                items.push(Item::Break);
            }
            Span::Text(run) => {
                let font = style.font.with_emphasis(run.bold, run.italic);
                for ch in run.text.chars() {
                    if ch.is_whitespace() {
                        finish_word(&mut word, &mut items, size);
                        continue;
                    }
                    match word.last_mut() {
                        Some(piece) if piece.font == font => piece.text.push(ch),
                        _ => word.push(Piece {
                            text: ch.to_string(),
                            font,
                            width: Pt(0.0),
                        }),
                    }
                }
            }
        }
    }
    finish_word(&mut word, &mut items, size);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{bullet_style, heading1_style, paragraph_style};

    fn para(text: &str) -> Paragraph {
        Paragraph::new(text, Arc::new(paragraph_style()))
    }

    #[test]
    fn can_break_lines() {
        let p = para("aaa bbb ccc ddd");
        let word = BuiltinFont::Helvetica.width_of_text("aaa", Pt(12.0));
        let space = BuiltinFont::Helvetica.width_of_text(" ", Pt(12.0));
        // room for exactly two words per line
        let width = word * 2.0 + space + Pt(0.5);
        let lines = p.lines(width);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "aaa bbb");
        assert_eq!(lines[1].text(), "ccc ddd");
        assert_eq!(p.wrap(width).1, Pt(24.0));
    }

    #[test]
    fn long_words_get_their_own_line() {
        let p = para("a supercalifragilistic b");
        let lines = p.lines(Pt(20.0));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text(), "supercalifragilistic");
    }

    #[test]
    fn can_force_line_breaks() {
        let p = para("one<br/><br/>two");
        let lines = p.lines(Pt(500.0));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text(), "");
        assert_eq!(lines[2].text(), "two");
    }

    #[test]
    fn can_mix_fonts_within_a_word() {
        let p = para("un<b>bold</b>ed");
        let lines = p.lines(Pt(500.0));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words.len(), 1);
        let pieces = &lines[0].words[0].pieces;
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1].font, BuiltinFont::HelveticaBold);
        assert_eq!(p.plain_text(), "unbolded");
    }

    #[test]
    fn can_split_between_lines() {
        let p = Paragraph::bullet("aaa bbb ccc ddd eee", Arc::new(bullet_style()));
        let word = BuiltinFont::Helvetica.width_of_text("aaa", Pt(12.0));
        let width = word + Pt(10.0) + Pt(1.0);
        assert_eq!(p.lines(width).len(), 5);

        let (first, rest) = p.split(width, Pt(25.0)).expect("can split");
        assert_eq!(first.lines(width).len(), 2);
        assert_eq!(rest.lines(width).len(), 3);
        assert_eq!(first.bullet_text(), Some("•"));
        assert_eq!(rest.bullet_text(), None);
        assert!(!first.is_continuation());
        assert!(rest.is_continuation());

        // nothing fits, or everything fits
        assert!(p.split(width, Pt(5.0)).is_none());
        assert!(p.split(width, Pt(100.0)).is_none());
    }

    #[test]
    fn headings_keep_style_name() {
        let p = Paragraph::new("Chapter 1", Arc::new(heading1_style()));
        assert_eq!(p.style_name(), "toc-entry-1");
        assert_eq!(p.wrap(Pt(400.0)).1, Pt(20.0));
    }

    fn styled(alignment: Alignment) -> Arc<ParagraphStyle> {
        Arc::new(ParagraphStyle {
            alignment,
            left_indent: Pt(0.0),
            ..paragraph_style()
        })
    }

    fn xs(runs: &[PlacedRun]) -> Vec<f32> {
        runs.iter().map(|r| *r.x).collect()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn can_align_lines() {
        let word = *BuiltinFont::Helvetica.width_of_text("aaa", Pt(12.0));
        let space = *BuiltinFont::Helvetica.width_of_text(" ", Pt(12.0));
        let line = word * 2.0 + space;
        let (x, width) = (10.0, 200.0);

        let p = Paragraph::new("aaa bbb", styled(Alignment::Left));
        assert_close(&xs(&p.placed_runs(Pt(x), Pt(0.0), Pt(width))), &[x, x + word + space]);

        let p = Paragraph::new("aaa bbb", styled(Alignment::Right));
        let start = x + width - line;
        assert_close(
            &xs(&p.placed_runs(Pt(x), Pt(0.0), Pt(width))),
            &[start, start + word + space],
        );

        let p = Paragraph::new("aaa bbb", styled(Alignment::Centre));
        let start = x + (width - line) / 2.0;
        assert_close(
            &xs(&p.placed_runs(Pt(x), Pt(0.0), Pt(width))),
            &[start, start + word + space],
        );

        // baselines step down by the leading from the top of the box
        let p = Paragraph::new("aaa<br/>bbb", styled(Alignment::Left));
        let runs = p.placed_runs(Pt(x), Pt(0.0), Pt(width));
        assert!((*runs[0].baseline - *runs[1].baseline - 12.0).abs() < 1e-3);
    }

    #[test]
    fn can_justify_all_but_the_last_line() {
        let word = *BuiltinFont::Helvetica.width_of_text("aaa", Pt(12.0));
        let space = *BuiltinFont::Helvetica.width_of_text(" ", Pt(12.0));
        let width = word * 2.0 + space + 5.0;
        let p = Paragraph::new("aaa bbb ccc ddd", styled(Alignment::Justify));
        assert_eq!(p.lines(Pt(width)).len(), 2);

        // the first line is stretched to both edges, the last keeps single spaces
        assert_close(
            &xs(&p.placed_runs(Pt(0.0), Pt(0.0), Pt(width))),
            &[0.0, width - word, 0.0, word + space],
        );

        // lines ended by <br/> aren't stretched either
        let p = Paragraph::new("aaa bbb<br/>ccc", styled(Alignment::Justify));
        assert_close(
            &xs(&p.placed_runs(Pt(0.0), Pt(0.0), Pt(200.0))),
            &[0.0, word + space, 0.0],
        );
    }

    #[test]
    fn split_first_part_justifies_its_last_line() {
        let word = *BuiltinFont::Helvetica.width_of_text("aaa", Pt(12.0));
        let space = *BuiltinFont::Helvetica.width_of_text(" ", Pt(12.0));
        let width = word * 2.0 + space + 5.0;
        let p = Paragraph::new("aaa bbb ccc ddd", styled(Alignment::Justify));
        let (first, rest) = p.split(Pt(width), Pt(12.0)).expect("can split");
        assert_close(
            &xs(&first.placed_runs(Pt(0.0), Pt(0.0), Pt(width))),
            &[0.0, width - word],
        );
        assert_close(
            &xs(&rest.placed_runs(Pt(0.0), Pt(0.0), Pt(width))),
            &[0.0, word + space],
        );

        // unless the split falls on a forced break
        let p = Paragraph::new("aaa bbb<br/>ccc ddd", styled(Alignment::Justify));
        let (first, _) = p.split(Pt(width), Pt(12.0)).expect("can split");
        assert_close(
            &xs(&first.placed_runs(Pt(0.0), Pt(0.0), Pt(width))),
            &[0.0, word + space],
        );
    }

    #[test]
    fn can_draw_bullets_and_text() {
        let p = Paragraph::bullet("<b>bold</b> plain", Arc::new(bullet_style()));
        let runs = p.placed_runs(Pt(0.0), Pt(0.0), Pt(300.0));
        assert_eq!(runs[0].text, "•");
        assert_eq!(runs[0].x, bullet_style().bullet_indent);
        assert_eq!(runs[1].font, BuiltinFont::HelveticaBold);
        assert_eq!(runs[1].x, bullet_style().left_indent);

        let mut canvas = Canvas::new(1, Pt(400.0), Pt(400.0));
        p.draw(&mut canvas, Pt(0.0), Pt(0.0), Pt(300.0));
        let fonts: Vec<BuiltinFont> = canvas.fonts_used().copied().collect();
        assert_eq!(fonts, vec![BuiltinFont::Helvetica, BuiltinFont::HelveticaBold]);
    }

    #[test]
    fn empty_paragraph_has_no_height() {
        assert_eq!(para("").wrap(Pt(100.0)).1, Pt(0.0));
    }
}
