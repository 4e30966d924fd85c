//! Small retained-mode vector drawings.
//!
//! A `Drawing` is a fixed-size box of shapes in its own coordinate space (origin
//! bottom-left). It is laid out like any other flowable and rendered by
//! translating the canvas to the box's position.

use crate::canvas::Canvas;
use crate::colour::Colour;
use crate::fonts::BuiltinFont;
use crate::rect::Rect;
use crate::units::Pt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Affine transform `[a b c d e f]` in PDF's row-vector convention
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform(pub [f32; 6]);

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Transform {
        Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }

    /// Applies `local` inside this transform's coordinate system
    fn then(self, local: Transform) -> Transform {
        let [a, b, c, d, e, f] = self.0;
        let [la, lb, lc, ld, le, lf] = local.0;
        Transform([
            la * a + lb * c,
            la * b + lb * d,
            lc * a + ld * c,
            lc * b + ld * d,
            le * a + lf * c + e,
            le * b + lf * d + f,
        ])
    }

    pub fn translate(self, dx: f32, dy: f32) -> Transform {
        self.then(Transform([1.0, 0.0, 0.0, 1.0, dx, dy]))
    }

    /// Rotates counter-clockwise by `degrees`
    pub fn rotate(self, degrees: f32) -> Transform {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.then(Transform([cos, sin, -sin, cos, 0.0, 0.0]))
    }

    pub fn scale(self, sx: f32, sy: f32) -> Transform {
        self.then(Transform([sx, 0.0, 0.0, sy, 0.0, 0.0]))
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (x * a + y * c + e, x * b + y * d + f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Option<Colour>,
        stroke: Option<Colour>,
        stroke_width: Pt,
    },
    Line {
        from: (Pt, Pt),
        to: (Pt, Pt),
        stroke: Colour,
        stroke_width: Pt,
    },
    PolyLine {
        points: Vec<(Pt, Pt)>,
        stroke: Colour,
        stroke_width: Pt,
    },
    Circle {
        centre: (Pt, Pt),
        radius: Pt,
        fill: Option<Colour>,
        stroke: Option<Colour>,
    },
    Text {
        position: (Pt, Pt),
        text: String,
        font: BuiltinFont,
        size: Pt,
        anchor: TextAnchor,
        fill: Colour,
    },
    Group {
        transform: Transform,
        shapes: Vec<Shape>,
    },
}

impl Shape {
    /// A string in the default drawing font
    pub fn text(x: Pt, y: Pt, text: impl Into<String>, size: Pt, anchor: TextAnchor, fill: Colour) -> Shape {
        Shape::Text {
            position: (x, y),
            text: text.into(),
            font: BuiltinFont::Helvetica,
            size,
            anchor,
            fill,
        }
    }

    pub fn line(from: (Pt, Pt), to: (Pt, Pt), stroke: Colour, stroke_width: Pt) -> Shape {
        Shape::Line {
            from,
            to,
            stroke,
            stroke_width,
        }
    }

    pub fn group(shapes: Vec<Shape>) -> Shape {
        Shape::Group {
            transform: Transform::identity(),
            shapes,
        }
    }

    /// Moves a group's origin; no-op on other shapes
    pub fn translate(mut self, dx: Pt, dy: Pt) -> Shape {
        if let Shape::Group { transform, .. } = &mut self {
            *transform = transform.translate(*dx, *dy);
        }
        self
    }

    /// Rotates a group about its origin; no-op on other shapes
    pub fn rotate(mut self, degrees: f32) -> Shape {
        if let Shape::Group { transform, .. } = &mut self {
            *transform = transform.rotate(degrees);
        }
        self
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        match self {
            Shape::Rect {
                rect,
                fill,
                stroke,
                stroke_width,
            } => {
                canvas.save_state();
                if let Some(fill) = fill {
                    canvas.set_fill_colour(*fill);
                }
                if let Some(stroke) = stroke {
                    canvas.set_stroke_colour(*stroke).set_line_width(*stroke_width);
                }
                canvas.rect(*rect, fill.is_some(), stroke.is_some());
                canvas.restore_state();
            }
            Shape::Line {
                from,
                to,
                stroke,
                stroke_width,
            } => {
                canvas.save_state();
                canvas
                    .set_stroke_colour(*stroke)
                    .set_line_width(*stroke_width)
                    .line(from.0, from.1, to.0, to.1);
                canvas.restore_state();
            }
            Shape::PolyLine {
                points,
                stroke,
                stroke_width,
            } => {
                canvas.save_state();
                canvas
                    .set_stroke_colour(*stroke)
                    .set_line_width(*stroke_width)
                    .polyline(points);
                canvas.restore_state();
            }
            Shape::Circle {
                centre,
                radius,
                fill,
                stroke,
            } => {
                canvas.save_state();
                if let Some(fill) = fill {
                    canvas.set_fill_colour(*fill);
                }
                if let Some(stroke) = stroke {
                    canvas.set_stroke_colour(*stroke);
                }
                canvas.circle(centre.0, centre.1, *radius, fill.is_some(), stroke.is_some());
                canvas.restore_state();
            }
            Shape::Text {
                position,
                text,
                font,
                size,
                anchor,
                fill,
            } => {
                let width = font.width_of_text(text, *size);
                let x = match anchor {
                    TextAnchor::Start => position.0,
                    TextAnchor::Middle => position.0 - width / 2.0,
                    TextAnchor::End => position.0 - width,
                };
                canvas.save_state();
                canvas.draw_text(*font, *size, *fill, x, position.1, text);
                canvas.restore_state();
            }
            Shape::Group { transform, shapes } => {
                canvas.save_state();
                canvas.transform(transform.0);
                for shape in shapes {
                    shape.draw(canvas);
                }
                canvas.restore_state();
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
    pub width: Pt,
    pub height: Pt,
    pub shapes: Vec<Shape>,
}

impl Drawing {
    pub fn new(width: Pt, height: Pt) -> Drawing {
        Drawing {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn add(&mut self, shape: Shape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    pub fn wrap(&self) -> (Pt, Pt) {
        (self.width, self.height)
    }

    /// Renders the drawing with its bottom-left corner at `(x, y)`
    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt) {
        canvas.save_state();
        canvas.transform(Transform::identity().translate(*x, *y).0);
        for shape in &self.shapes {
            shape.draw(canvas);
        }
        canvas.restore_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn can_translate_then_rotate() {
        // rotation happens in the translated frame, so local +x points up the page
        let t = Transform::identity().translate(10.0, 20.0).rotate(90.0);
        assert!(close(t.apply(0.0, 0.0), (10.0, 20.0)));
        assert!(close(t.apply(5.0, 0.0), (10.0, 25.0)));
    }

    #[test]
    fn can_scale() {
        let t = Transform::identity().translate(1.0, 1.0).scale(2.0, 3.0);
        assert!(close(t.apply(1.0, 1.0), (3.0, 4.0)));
    }

    #[test]
    fn group_transforms_compose() {
        let group = Shape::group(vec![]).translate(Pt(4.0), Pt(6.0)).rotate(90.0);
        let Shape::Group { transform, .. } = group else {
            panic!("expected a group");
        };
        assert!(close(transform.apply(1.0, 0.0), (4.0, 7.0)));
        // non-groups ignore transforms
        let line = Shape::line((Pt(0.0), Pt(0.0)), (Pt(1.0), Pt(1.0)), colours::BLACK, Pt(1.0));
        assert_eq!(line.clone().rotate(45.0), line);
    }

    #[test]
    fn can_render_into_canvas() {
        let mut drawing = Drawing::new(Pt(100.0), Pt(50.0));
        drawing
            .add(Shape::text(Pt(50.0), Pt(10.0), "M/Z", Pt(6.0), TextAnchor::Middle, colours::LIGHT_GREY))
            .add(Shape::group(vec![Shape::text(
                Pt(0.0),
                Pt(0.0),
                "label",
                Pt(6.0),
                TextAnchor::Start,
                colours::BLACK,
            )]).rotate(90.0));
        assert_eq!(drawing.wrap(), (Pt(100.0), Pt(50.0)));
        let mut canvas = Canvas::new(1, Pt(200.0), Pt(200.0));
        drawing.draw(&mut canvas, Pt(10.0), Pt(10.0));
        assert_eq!(canvas.fonts_used().count(), 1);
    }
}
