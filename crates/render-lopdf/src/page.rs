use crate::encoding::to_win_ansi;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use monthly_report_document::{Color, FontFace, Stroke, TextRun};

/// Baseline offset from the top of a line box, as a fraction of the font size.
const BASELINE_RATIO: f32 = 0.8;

/// Bezier control point distance for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

pub(crate) fn font_resource_name(font: FontFace) -> &'static str {
    match font {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Italic => "F3",
        FontFace::BoldItalic => "F4",
    }
}

/// Accumulates the content stream of one page.
///
/// Callers work in top-down layout coordinates; every method flips y into
/// PDF user space.
pub(crate) struct PageContext {
    page_height: f32,
    content: Content,
    font: Option<(FontFace, f32)>,
    fill: Option<Color>,
}

impl PageContext {
    pub fn new(page_height: f32) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            font: None,
            fill: None,
        }
    }

    pub fn finish(self) -> Content {
        self.content
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }

    fn set_font(&mut self, font: FontFace, size: f32) {
        if self.font != Some((font, size)) {
            self.op(
                "Tf",
                vec![Object::Name(font_resource_name(font).as_bytes().to_vec()), size.into()],
            );
            self.font = Some((font, size));
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.fill != Some(color) {
            let [r, g, b] = color.to_unit();
            self.op("rg", vec![r.into(), g.into(), b.into()]);
            self.fill = Some(color);
        }
    }

    fn set_stroke(&mut self, stroke: Stroke) {
        let [r, g, b] = stroke.color.to_unit();
        self.op("RG", vec![r.into(), g.into(), b.into()]);
        self.op("w", vec![stroke.width.into()]);
    }

    /// Draws a run whose line box starts at `y`.
    pub fn text_run(&mut self, run: &TextRun, x: f32, y: f32) {
        let baseline = y + run.font_size * BASELINE_RATIO;
        self.text(&run.text, run.font, run.font_size, run.color, x, baseline);
    }

    /// Draws `text` with its baseline at `baseline`.
    pub fn text(
        &mut self,
        text: &str,
        font: FontFace,
        size: f32,
        color: Color,
        x: f32,
        baseline: f32,
    ) {
        if text.trim().is_empty() {
            return;
        }
        self.op("BT", vec![]);
        self.set_font(font, size);
        self.set_fill_color(color);
        let y = self.flip(baseline);
        self.op("Td", vec![x.into(), y.into()]);
        self.op("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.op("ET", vec![]);
    }

    /// Text rotated a quarter turn counter-clockwise, reading bottom to top.
    pub fn vertical_text(
        &mut self,
        text: &str,
        font: FontFace,
        size: f32,
        color: Color,
        x: f32,
        baseline: f32,
    ) {
        if text.trim().is_empty() {
            return;
        }
        self.op("BT", vec![]);
        self.set_font(font, size);
        self.set_fill_color(color);
        let y = self.flip(baseline);
        self.op(
            "Tm",
            vec![0.into(), 1.into(), (-1).into(), 0.into(), x.into(), y.into()],
        );
        self.op("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.op("ET", vec![]);
    }

    pub fn rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    ) {
        let bottom = self.flip(y + height);
        if let Some(color) = fill {
            self.set_fill_color(color);
        }
        if let Some(stroke) = stroke {
            self.set_stroke(stroke);
        }
        let operator = match (fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return,
        };
        self.op("re", vec![x.into(), bottom.into(), width.into(), height.into()]);
        self.op(operator, vec![]);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) {
        self.set_stroke(stroke);
        let (y1, y2) = (self.flip(y1), self.flip(y2));
        self.op("m", vec![x1.into(), y1.into()]);
        self.op("l", vec![x2.into(), y2.into()]);
        self.op("S", vec![]);
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32, fill: Color, outline: Option<Stroke>) {
        self.set_fill_color(fill);
        if let Some(stroke) = outline {
            self.set_stroke(stroke);
        }
        let cy = self.flip(cy);
        let k = radius * KAPPA;
        self.op("m", vec![(cx + radius).into(), cy.into()]);
        let quarters = [
            [cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius],
            [cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy],
            [cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius],
            [cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy],
        ];
        for quarter in quarters {
            self.op("c", quarter.iter().map(|&v| v.into()).collect());
        }
        self.op(if outline.is_some() { "b" } else { "f" }, vec![]);
    }

    /// Paints the image XObject `name` into the given box.
    pub fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        let bottom = self.flip(y + height);
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), bottom.into()],
        );
        self.op("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.op("Q", vec![]);
    }
}
