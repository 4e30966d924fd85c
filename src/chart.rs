//! Stick/line/scatter charts rendered into a `Drawing`.
//!
//! The plot box sits `box_offset` points in from the drawing's bottom-left
//! corner, leaving room for the tick labels and the axis caption underneath.

use crate::colour::{colours, Colour};
use crate::drawing::{Drawing, Shape, TextAnchor};
use crate::rect::Rect;
use crate::units::Pt;
use anyhow::{bail, Result};

pub const PLOT_BACKGROUND: Colour = Colour::new_grey(0.98);
pub const LABEL_COLOUR: Colour = colours::LIGHT_GREY;
const FONT_SIZE: Pt = Pt(6.0);
const STICK_WIDTH: Pt = Pt(0.75);

/// A single data point for `Chart::plot`
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub x: f32,
    pub y: f32,
    pub label: Option<String>,
    pub colour: Option<Colour>,
}

impl ChartPoint {
    pub fn new(x: f32, y: f32) -> ChartPoint {
        ChartPoint {
            x,
            y,
            label: None,
            colour: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> ChartPoint {
        self.label = Some(label.into());
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> ChartPoint {
        self.colour = Some(colour);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Chart {
    drawing: Drawing,
    x_lims: [f32; 2],
    y_lims: [f32; 2],
    plot: Rect,
    x_label: String,
}

impl Chart {
    pub fn new(
        full_width: Pt,
        full_height: Pt,
        x_lims: [f32; 2],
        y_lims: [f32; 2],
        box_offset: Pt,
    ) -> Result<Chart> {
        for (axis, [lo, hi]) in [("x", x_lims), ("y", y_lims)] {
            if !lo.is_finite() || !hi.is_finite() || hi - lo == 0.0 {
                bail!("Chart {axis} limits [{lo}, {hi}] span no range");
            }
        }
        let plot = Rect::new(
            box_offset,
            box_offset,
            full_width - box_offset,
            full_height - box_offset,
        );

        let mut drawing = Drawing::new(full_width, full_height);
        drawing.add(Shape::Rect {
            rect: plot,
            fill: Some(PLOT_BACKGROUND),
            stroke: None,
            stroke_width: Pt(0.0),
        });

        Ok(Chart {
            drawing,
            x_lims,
            y_lims,
            plot,
            x_label: "M/Z".to_string(),
        })
    }

    /// `[0, max × 1.2]`, falling back to `[0, 1]` when nothing is positive
    pub fn auto_limits(values: &[f32]) -> [f32; 2] {
        let max = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f32::NEG_INFINITY, f32::max);
        if max > 0.0 {
            [0.0, max * 1.2]
        } else {
            [0.0, 1.0]
        }
    }

    pub fn with_x_label(mut self, label: impl Into<String>) -> Chart {
        self.x_label = label.into();
        self
    }

    pub fn x_to_i(&self, x: f32) -> Pt {
        let fraction = (x - self.x_lims[0]) / (self.x_lims[1] - self.x_lims[0]);
        self.plot.width() * fraction + self.plot.x1
    }

    pub fn y_to_j(&self, y: f32) -> Pt {
        let fraction = (y - self.y_lims[0]) / (self.y_lims[1] - self.y_lims[0]);
        self.plot.height() * fraction + self.plot.y1
    }

    /// A stick from the bottom of the plot up to `(x, y)`, with an optional
    /// label reading upwards from its tip
    pub fn add_vert_line(&mut self, x: f32, y: f32, label: Option<&str>, colour: Colour) -> &mut Self {
        let i = self.x_to_i(x);
        let j = self.y_to_j(y);
        self.drawing
            .add(Shape::line((i, self.plot.y1), (i, j), colour, STICK_WIDTH));

        if let Some(label) = label.filter(|l| !l.is_empty()) {
            let text = Shape::text(Pt(0.0), Pt(0.0), label, FONT_SIZE, TextAnchor::Start, colour);
            self.drawing.add(
                Shape::group(vec![text])
                    .translate(i + Pt(1.0), j + Pt(2.0))
                    .rotate(90.0),
            );
        }
        self
    }

    pub fn plot(&mut self, points: &[ChartPoint]) -> &mut Self {
        for point in points {
            self.add_vert_line(
                point.x,
                point.y,
                point.label.as_deref(),
                point.colour.unwrap_or(LABEL_COLOUR),
            );
        }
        self
    }

    pub fn add_line_series(&mut self, points: &[(f32, f32)], colour: Colour) -> &mut Self {
        let points = points
            .iter()
            .map(|&(x, y)| (self.x_to_i(x), self.y_to_j(y)))
            .collect();
        self.drawing.add(Shape::PolyLine {
            points,
            stroke: colour,
            stroke_width: STICK_WIDTH,
        });
        self
    }

    pub fn add_scatter(&mut self, points: &[(f32, f32)], colour: Colour) -> &mut Self {
        for &(x, y) in points {
            let centre = (self.x_to_i(x), self.y_to_j(y));
            self.drawing.add(Shape::Circle {
                centre,
                radius: Pt(1.5),
                fill: Some(colour),
                stroke: None,
            });
        }
        self
    }

    fn axis_labels(&self) -> Vec<Shape> {
        let below = self.plot.y1 - Pt(10.0);
        let left = self.plot.x1 - Pt(5.0);
        let label = |x: Pt, y: Pt, text: String, anchor: TextAnchor| {
            Shape::text(x, y, text, FONT_SIZE, anchor, LABEL_COLOUR)
        };
        vec![
            label(
                self.plot.x1 + self.plot.width() / 2.0,
                below,
                self.x_label.clone(),
                TextAnchor::Middle,
            ),
            label(self.plot.x1, below, format_tick(self.x_lims[0]), TextAnchor::Middle),
            label(
                self.plot.x2,
                below,
                format_tick(self.x_lims[1].trunc()),
                TextAnchor::Middle,
            ),
            label(left, self.plot.y1 - Pt(2.0), format_tick(self.y_lims[0]), TextAnchor::End),
            label(
                left,
                self.plot.y2 - Pt(2.0),
                format_tick(self.y_lims[1].trunc()),
                TextAnchor::End,
            ),
        ]
    }

    /// Finishes the chart: axis labels go in just above the plot background
    pub fn into_drawing(self) -> Drawing {
        let labels = self.axis_labels();
        let mut drawing = self.drawing;
        let at = 1.min(drawing.shapes.len());
        drawing.shapes.splice(at..at, labels);
        drawing
    }
}

/// Integers print without a fraction, anything else with at most two decimals
pub fn format_tick(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> Chart {
        Chart::new(Pt(450.0), Pt(120.0), [0.0, 120.0], [0.0, 60.0], Pt(30.0)).expect("valid chart")
    }

    #[test]
    fn can_map_data_into_plot_box() {
        let chart = chart();
        assert_eq!(chart.x_to_i(0.0), Pt(30.0));
        assert_eq!(chart.x_to_i(120.0), Pt(450.0));
        assert_eq!(chart.x_to_i(60.0), Pt(240.0));
        assert_eq!(chart.y_to_j(0.0), Pt(30.0));
        assert_eq!(chart.y_to_j(60.0), Pt(120.0));
    }

    #[test]
    fn rejects_empty_limits() {
        assert!(Chart::new(Pt(10.0), Pt(10.0), [1.0, 1.0], [0.0, 1.0], Pt(0.0)).is_err());
        assert!(Chart::new(Pt(10.0), Pt(10.0), [0.0, 1.0], [0.0, f32::NAN], Pt(0.0)).is_err());
    }

    #[test]
    fn can_compute_auto_limits() {
        assert_eq!(Chart::auto_limits(&[10.0, 50.0, 20.0]), [0.0, 60.0]);
        assert_eq!(Chart::auto_limits(&[0.0, 0.0]), [0.0, 1.0]);
        assert_eq!(Chart::auto_limits(&[]), [0.0, 1.0]);
    }

    #[test]
    fn can_plot_sticks_with_labels() {
        let mut chart = chart();
        chart.plot(&[
            ChartPoint::new(60.0, 30.0),
            ChartPoint::new(90.0, 60.0)
                .with_label("y3")
                .with_colour(colours::RED),
        ]);
        let drawing = chart.into_drawing();
        // background, 5 labels, 2 sticks and one label group
        assert_eq!(drawing.shapes.len(), 9);
        assert!(matches!(drawing.shapes[0], Shape::Rect { .. }));
        assert_eq!(
            drawing.shapes[6],
            Shape::line((Pt(240.0), Pt(30.0)), (Pt(240.0), Pt(75.0)), LABEL_COLOUR, STICK_WIDTH)
        );
        let Shape::Group { transform, .. } = &drawing.shapes[8] else {
            panic!("expected the label group last");
        };
        // label origin sits just right of and above the stick's tip
        let (x, y) = transform.apply(0.0, 0.0);
        assert!((x - 346.0).abs() < 1e-3);
        assert!((y - 122.0).abs() < 1e-3);
    }

    #[test]
    fn can_label_axes() {
        let labels = chart().axis_labels();
        let texts: Vec<&str> = labels
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["M/Z", "0", "120", "0", "60"]);

        let labels = chart().with_x_label("time").axis_labels();
        assert!(matches!(&labels[0], Shape::Text { text, .. } if text == "time"));
    }

    #[test]
    fn can_format_ticks() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(120.0), "120");
        assert_eq!(format_tick(1.5), "1.5");
        assert_eq!(format_tick(0.127), "0.13");
    }
}
