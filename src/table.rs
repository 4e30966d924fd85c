//! Simple text tables.

use crate::canvas::Canvas;
use crate::colour::{colours, Colour};
use crate::fonts::BuiltinFont;
use crate::rect::Rect;
use crate::styles::Alignment;
use crate::units::Pt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub font: BuiltinFont,
    pub header_font: BuiltinFont,
    pub font_size: Pt,
    pub leading: Pt,
    pub padding: Pt,
    pub text_colour: Colour,
    /// Line width and colour of the cell borders
    pub grid: Option<(Pt, Colour)>,
    pub header_rows: usize,
    pub header_background: Option<Colour>,
    /// Cycled over body rows
    pub row_backgrounds: Vec<Colour>,
    pub alignment: Alignment,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            font: BuiltinFont::Helvetica,
            header_font: BuiltinFont::HelveticaBold,
            font_size: Pt(10.0),
            leading: Pt(12.0),
            padding: Pt(3.0),
            text_colour: colours::BLACK,
            grid: Some((Pt(0.5), colours::LIGHT_GREY)),
            header_rows: 1,
            header_background: Some(Colour::new_grey(0.9)),
            row_backgrounds: Vec::new(),
            alignment: Alignment::Left,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
    pub col_widths: Option<Vec<Pt>>,
    pub style: TableStyle,
    /// Leading rows repeated at the top of every continuation
    pub repeat_rows: usize,
    /// Body rows already drawn by earlier parts, so striping carries on
    stripe_offset: usize,
}

struct Layout {
    col_widths: Vec<Pt>,
    /// Wrapped lines per row per column
    cells: Vec<Vec<Vec<String>>>,
    row_heights: Vec<Pt>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>, style: TableStyle) -> Table {
        Table {
            rows,
            col_widths: None,
            repeat_rows: style.header_rows,
            style,
            stripe_offset: 0,
        }
    }

    pub fn with_col_widths(mut self, widths: Vec<Pt>) -> Table {
        self.col_widths = Some(widths);
        self
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn font_for_row(&self, row: usize) -> BuiltinFont {
        if row < self.style.header_rows {
            self.style.header_font
        } else {
            self.style.font
        }
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// Explicit widths, or natural widths scaled down to fit
    pub fn column_widths(&self, avail_width: Pt) -> Vec<Pt> {
        let columns = self.column_count();
        if let Some(widths) = &self.col_widths {
            return (0..columns)
                .map(|c| widths.get(c).copied().unwrap_or(Pt(0.0)))
                .collect();
        }

        let padding = self.style.padding * 2.0;
        let natural: Vec<Pt> = (0..columns)
            .map(|col| {
                (0..self.rows.len())
                    .map(|row| {
                        let font = self.font_for_row(row);
                        self.cell(row, col)
                            .lines()
                            .map(|line| font.width_of_text(line, self.style.font_size))
                            .fold(Pt(0.0), Pt::max)
                    })
                    .fold(Pt(0.0), Pt::max)
                    + padding
            })
            .collect();

        let total: Pt = natural.iter().copied().sum();
        if total > avail_width && total > Pt(0.0) {
            let scale = avail_width / total;
            natural.into_iter().map(|w| w * scale).collect()
        } else {
            natural
        }
    }

    fn layout(&self, avail_width: Pt) -> Layout {
        let col_widths = self.column_widths(avail_width);
        let style = &self.style;
        let mut cells = Vec::with_capacity(self.rows.len());
        let mut row_heights = Vec::with_capacity(self.rows.len());

        for row in 0..self.rows.len() {
            let font = self.font_for_row(row);
            let wrapped: Vec<Vec<String>> = col_widths
                .iter()
                .enumerate()
                .map(|(col, width)| {
                    wrap_text(
                        self.cell(row, col),
                        font,
                        style.font_size,
                        *width - style.padding * 2.0,
                    )
                })
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
            row_heights.push(style.leading * lines as f32 + style.padding * 2.0);
            cells.push(wrapped);
        }

        Layout {
            col_widths,
            cells,
            row_heights,
        }
    }

    pub fn wrap(&self, avail_width: Pt) -> (Pt, Pt) {
        let layout = self.layout(avail_width);
        (
            layout.col_widths.iter().copied().sum(),
            layout.row_heights.iter().copied().sum(),
        )
    }

    /// Splits between rows, repeating the header rows on the remainder
    pub fn split(&self, avail_width: Pt, avail_height: Pt) -> Option<(Table, Table)> {
        let layout = self.layout(avail_width);
        let mut used = Pt(0.0);
        let mut fit = 0;
        for height in &layout.row_heights {
            if used + *height > avail_height + Pt(1e-3) {
                break;
            }
            used += *height;
            fit += 1;
        }

        let repeat = self.repeat_rows.min(self.rows.len());
        if fit <= repeat || fit >= self.rows.len() {
            return None;
        }

        let first = Table {
            rows: self.rows[..fit].to_vec(),
            ..self.clone()
        };
        let mut rows = self.rows[..repeat].to_vec();
        rows.extend_from_slice(&self.rows[fit..]);
        let body_drawn = fit - self.style.header_rows.min(fit);
        let rest = Table {
            rows,
            stripe_offset: self.stripe_offset + body_drawn,
            ..self.clone()
        };
        Some((first, rest))
    }

    fn row_background(&self, row: usize) -> Option<Colour> {
        if row < self.style.header_rows {
            return self.style.header_background;
        }
        let backgrounds = &self.style.row_backgrounds;
        if backgrounds.is_empty() {
            return None;
        }
        let body_index = row - self.style.header_rows + self.stripe_offset;
        Some(backgrounds[body_index % backgrounds.len()])
    }

    /// Draws the table centred horizontally in `avail_width`, bottom at `y`
    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let layout = self.layout(avail_width);
        let style = &self.style;
        let table_width: Pt = layout.col_widths.iter().copied().sum();
        let table_height: Pt = layout.row_heights.iter().copied().sum();
        let left = x + ((avail_width - table_width) / 2.0).max(Pt(0.0));
        let mut row_top = y + table_height;

        canvas.save_state();
        for (row, (cells, height)) in layout.cells.iter().zip(&layout.row_heights).enumerate() {
            let row_bottom = row_top - *height;
            if let Some(background) = self.row_background(row) {
                canvas
                    .set_fill_colour(background)
                    .rect(Rect::new(left, row_bottom, table_width, *height), true, false);
            }

            let font = self.font_for_row(row);
            let mut cell_left = left;
            for (lines, width) in cells.iter().zip(&layout.col_widths) {
                let inner = *width - style.padding * 2.0;
                for (i, line) in lines.iter().enumerate() {
                    let baseline = row_top
                        - style.padding
                        - font.ascent(style.font_size)
                        - style.leading * i as f32;
                    let slack = (inner - font.width_of_text(line, style.font_size)).max(Pt(0.0));
                    let offset = match style.alignment {
                        Alignment::Right => slack,
                        Alignment::Centre => slack / 2.0,
                        Alignment::Left | Alignment::Justify => Pt(0.0),
                    };
                    canvas.draw_text(
                        font,
                        style.font_size,
                        style.text_colour,
                        cell_left + style.padding + offset,
                        baseline,
                        line,
                    );
                }
                cell_left += *width;
            }
            row_top = row_bottom;
        }

        if let Some((line_width, colour)) = style.grid {
            canvas.set_stroke_colour(colour).set_line_width(line_width);
            let top = y + table_height;
            let mut line_y = top;
            canvas.line(left, line_y, left + table_width, line_y);
            for height in &layout.row_heights {
                line_y -= *height;
                canvas.line(left, line_y, left + table_width, line_y);
            }
            let mut line_x = left;
            canvas.line(line_x, y, line_x, top);
            for width in &layout.col_widths {
                line_x += *width;
                canvas.line(line_x, y, line_x, top);
            }
        }
        canvas.restore_state();
    }
}

/// Greedy word wrap; explicit newlines always break
fn wrap_text(text: &str, font: BuiltinFont, size: Pt, width: Pt) -> Vec<String> {
    let space = font.width_of_text(" ", size);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = Pt(0.0);
        for word in paragraph.split_whitespace() {
            let word_width = font.width_of_text(word, size);
            if !line.is_empty() && line_width + space + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = Pt(0.0);
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += space;
            }
            line.push_str(word);
            line_width += word_width;
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn plain_style() -> TableStyle {
        TableStyle {
            padding: Pt(2.0),
            grid: None,
            ..TableStyle::default()
        }
    }

    #[test]
    fn can_wrap_cell_text() {
        let lines = wrap_text("aaa bbb ccc", BuiltinFont::Helvetica, Pt(10.0), Pt(40.0));
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
        let lines = wrap_text("one\ntwo", BuiltinFont::Helvetica, Pt(10.0), Pt(400.0));
        assert_eq!(lines, vec!["one", "two"]);
        assert!(wrap_text("", BuiltinFont::Helvetica, Pt(10.0), Pt(40.0)).is_empty());
    }

    #[test]
    fn can_size_columns_naturally() {
        let table = Table::new(rows(&[&["Name", "Mass"], &["ion", "1"]]), plain_style());
        let widths = table.column_widths(Pt(500.0));
        let name = BuiltinFont::HelveticaBold.width_of_text("Name", Pt(10.0)) + Pt(4.0);
        assert_eq!(widths[0], name);
        let (width, height) = table.wrap(Pt(500.0));
        assert_eq!(width, widths[0] + widths[1]);
        assert_eq!(height, Pt(32.0));
    }

    #[test]
    fn can_scale_columns_to_fit() {
        let table = Table::new(
            rows(&[&["a very long heading indeed", "another rather long heading"]]),
            plain_style(),
        );
        let widths = table.column_widths(Pt(100.0));
        let total: Pt = widths.iter().copied().sum();
        assert!((total.0 - 100.0).abs() < 1e-3);
        // wrapping makes the scaled row taller than a single line
        assert!(table.wrap(Pt(100.0)).1 > Pt(16.0));
    }

    #[test]
    fn can_split_repeating_header() {
        let table = Table::new(
            rows(&[&["h"], &["1"], &["2"], &["3"], &["4"]]),
            TableStyle {
                row_backgrounds: vec![colours::WHITE, colours::LIGHT_GREY],
                ..plain_style()
            },
        );
        // each row is 16pt tall; three rows fit in 50pt
        let (first, rest) = table.split(Pt(200.0), Pt(50.0)).expect("can split");
        assert_eq!(first.rows, rows(&[&["h"], &["1"], &["2"]]));
        assert_eq!(rest.rows, rows(&[&["h"], &["3"], &["4"]]));
        // striping continues where the first part left off
        assert_eq!(rest.row_background(1), Some(colours::WHITE));
        assert_eq!(table.row_background(3), Some(colours::WHITE));

        // only the header fits: no split
        assert!(table.split(Pt(200.0), Pt(20.0)).is_none());
        // everything fits: no split
        assert!(table.split(Pt(200.0), Pt(500.0)).is_none());
    }

    #[test]
    fn can_draw_with_grid() {
        let table = Table::new(rows(&[&["a", "b"], &["c"]]), TableStyle::default());
        let mut canvas = Canvas::new(1, Pt(300.0), Pt(300.0));
        table.draw(&mut canvas, Pt(0.0), Pt(0.0), Pt(300.0));
        let fonts: Vec<BuiltinFont> = canvas.fonts_used().copied().collect();
        assert_eq!(fonts, vec![BuiltinFont::Helvetica, BuiltinFont::HelveticaBold]);
    }
}
