use crate::block::{Block, Document, ImageBlock, ImageData, Table};
use crate::chart::Chart;
use crate::style::{Color, FontFace, ReportStyles, StyleName, TextAlign, TextStyle};
use crate::text::{measure_text, wrap_text};
use log::debug;
use std::sync::Arc;

const EPSILON: f32 = 0.001;
const BULLET_INDENT: f32 = 14.0;
const BULLET_GLYPH: &str = "\u{2022}";

/// Flow layout: places blocks top to bottom, breaking pages as needed.
///
/// Coordinates are in points with the origin at the top-left corner of the
/// page and y growing downwards. Backends flip them as their format requires.
pub struct LayoutEngine<'s> {
    styles: &'s ReportStyles,
    pages: Vec<Page>,
    current_y: f32,
}

#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based.
    pub number: usize,
    pub elements: Vec<PositionedElement>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self {
            number,
            elements: Vec::new(),
        }
    }

    /// Text of every run on the page, in placement order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.element {
            LayoutElement::Text(run) => Some(run.text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PositionedElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub element: LayoutElement,
}

#[derive(Debug, Clone)]
pub enum LayoutElement {
    /// A single line of text; `y` is the top of its line box.
    Text(TextRun),
    Rect {
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// From `(x, y)` to `(x + width, y + height)`.
    Line { stroke: Stroke },
    Image(Arc<ImageData>),
    Chart(Chart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: FontFace,
    pub font_size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl<'s> LayoutEngine<'s> {
    pub fn new(styles: &'s ReportStyles) -> Self {
        Self {
            styles,
            pages: vec![Page::new(1)],
            current_y: styles.page.margins.top,
        }
    }

    pub fn layout(mut self, document: &Document) -> Vec<Page> {
        for (index, block) in document.blocks.iter().enumerate() {
            let next = document.blocks.get(index + 1);
            match block {
                Block::Text { style, text } => {
                    let keep = if style.is_heading() {
                        self.lead_height(next)
                    } else {
                        0.0
                    };
                    self.layout_text(*style, text, keep);
                }
                Block::Bullet { text } => self.layout_bullet(text),
                Block::Table(table) => self.layout_table(table),
                Block::Chart(chart) => self.layout_chart(chart),
                Block::Image(image) => self.layout_image(image),
                Block::Spacer(height) => self.layout_spacer(*height),
                Block::PageBreak => self.force_new_page(),
            }
        }
        if self.styles.page.footer {
            self.add_footers();
        }
        debug!(
            "Laid out '{}': {} blocks on {} pages",
            document.title,
            document.blocks.len(),
            self.pages.len()
        );
        self.pages
    }

    fn left(&self) -> f32 {
        self.styles.page.margins.left
    }

    fn top(&self) -> f32 {
        self.styles.page.margins.top
    }

    fn content_width(&self) -> f32 {
        self.styles.page.content_width()
    }

    fn needs_page_break(&self, height: f32) -> bool {
        self.current_y + height > self.styles.page.content_bottom() + EPSILON
    }

    fn at_page_top(&self) -> bool {
        self.current_y <= self.top() + EPSILON
    }

    /// Breaks the page unless `height` fits. Content taller than a whole page
    /// is placed at the top of a fresh page and allowed to overflow.
    fn ensure_space(&mut self, height: f32) {
        if !self.at_page_top() && self.needs_page_break(height) {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page::new(number));
        self.current_y = self.top();
    }

    fn force_new_page(&mut self) {
        let pristine = self
            .pages
            .last()
            .is_none_or(|p| p.elements.is_empty() && self.at_page_top());
        if !pristine {
            self.new_page();
        }
    }

    fn add(&mut self, element: PositionedElement) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn add_text(&mut self, text: &str, style: &TextStyle, x: f32, y: f32) {
        self.add(PositionedElement {
            x,
            y,
            width: measure_text(text, style.font, style.font_size),
            height: style.line_height_pt(),
            element: LayoutElement::Text(TextRun {
                text: text.to_string(),
                font: style.font,
                font_size: style.font_size,
                color: style.color,
            }),
        });
    }

    /// Height the start of `block` needs so a heading is not left alone at
    /// the bottom of a page.
    fn lead_height(&self, block: Option<&Block>) -> f32 {
        let styles = self.styles;
        match block {
            Some(Block::Text { style, .. }) => {
                let style = styles.text(*style);
                style.space_before + style.line_height_pt()
            }
            Some(Block::Bullet { .. }) => styles.bullet.line_height_pt(),
            Some(Block::Table(_)) => {
                let pad = 2.0 * styles.table.cell_padding;
                styles.table_header.line_height_pt()
                    + styles.table_cell.line_height_pt()
                    + 2.0 * pad
            }
            Some(Block::Chart(_)) => styles.chart.height,
            Some(Block::Image(image)) => self.image_size(image).1,
            Some(Block::Spacer(_)) | Some(Block::PageBreak) | None => 0.0,
        }
    }

    fn layout_text(&mut self, name: StyleName, text: &str, keep_with_next: f32) {
        let styles = self.styles;
        let style = styles.text(name);
        let x = self.left();
        let width = self.content_width();
        self.layout_lines(style, text, x, width, keep_with_next);
    }

    fn layout_lines(
        &mut self,
        style: &TextStyle,
        text: &str,
        x: f32,
        width: f32,
        keep_with_next: f32,
    ) {
        let lines = wrap_text(text, style.font, style.font_size, width);
        let line_height = style.line_height_pt();

        if !self.at_page_top() {
            self.current_y += style.space_before;
        }
        self.ensure_space(line_height + keep_with_next);

        for line in &lines {
            if self.needs_page_break(line_height) {
                self.new_page();
            }
            let offset = match style.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => {
                    (width - measure_text(line, style.font, style.font_size)) / 2.0
                }
                TextAlign::Right => width - measure_text(line, style.font, style.font_size),
            };
            let y = self.current_y;
            self.add_text(line, style, x + offset.max(0.0), y);
            self.current_y += line_height;
        }
        self.current_y += style.space_after;
    }

    fn layout_bullet(&mut self, text: &str) {
        let styles = self.styles;
        let style = &styles.bullet;
        let line_height = style.line_height_pt();

        if !self.at_page_top() {
            self.current_y += style.space_before;
        }
        self.ensure_space(line_height);
        let x = self.left();
        let y = self.current_y;
        self.add_text(BULLET_GLYPH, style, x + 4.0, y);

        // The glyph is already placed, so the text must not add space_before again.
        let body = TextStyle {
            space_before: 0.0,
            ..style.clone()
        };
        let width = self.content_width() - BULLET_INDENT;
        self.layout_lines(&body, text, x + BULLET_INDENT, width, 0.0);
    }

    fn layout_table(&mut self, table: &Table) {
        let styles = self.styles;
        let padding = styles.table.cell_padding;
        let widths = table.column_widths(self.content_width());
        let aligns: Vec<TextAlign> = table.columns.iter().map(|c| c.align).collect();

        let (header, header_height) = wrap_row(
            table.columns.iter().map(|c| c.header.as_str()),
            &widths,
            &styles.table_header,
            padding,
        );
        let rows: Vec<(Vec<Vec<String>>, f32)> = table
            .rows
            .iter()
            .map(|row| {
                wrap_row(row.iter().map(String::as_str), &widths, &styles.table_cell, padding)
            })
            .collect();

        let first_row_height = rows.first().map_or(0.0, |(_, h)| *h);
        self.ensure_space(header_height + first_row_height);
        self.place_row(
            &header,
            &widths,
            &aligns,
            &styles.table_header,
            header_height,
            Some(styles.table.header_background),
        );

        for (index, (cells, height)) in rows.iter().enumerate() {
            if self.needs_page_break(*height) {
                self.new_page();
                self.place_row(
                    &header,
                    &widths,
                    &aligns,
                    &styles.table_header,
                    header_height,
                    Some(styles.table.header_background),
                );
            }
            let background = if index % 2 == 1 {
                styles.table.stripe_background
            } else {
                None
            };
            self.place_row(cells, &widths, &aligns, &styles.table_cell, *height, background);
        }
        self.current_y += styles.table.space_after;
    }

    fn place_row(
        &mut self,
        cells: &[Vec<String>],
        widths: &[f32],
        aligns: &[TextAlign],
        style: &TextStyle,
        height: f32,
        background: Option<Color>,
    ) {
        let table = &self.styles.table;
        let (padding, rule) = (
            table.cell_padding,
            Stroke {
                color: table.rule_color,
                width: table.rule_width,
            },
        );
        let x0 = self.left();
        let y = self.current_y;
        let total_width: f32 = widths.iter().sum();

        if let Some(fill) = background {
            self.add(PositionedElement {
                x: x0,
                y,
                width: total_width,
                height,
                element: LayoutElement::Rect { fill: Some(fill), stroke: None },
            });
        }

        let mut x = x0;
        for ((lines, width), align) in cells.iter().zip(widths).zip(aligns) {
            let inner = width - 2.0 * padding;
            for (line_index, line) in lines.iter().enumerate() {
                let offset = match align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => {
                        (inner - measure_text(line, style.font, style.font_size)) / 2.0
                    }
                    TextAlign::Right => inner - measure_text(line, style.font, style.font_size),
                };
                let line_y = y + padding + line_index as f32 * style.line_height_pt();
                self.add_text(line, style, x + padding + offset.max(0.0), line_y);
            }
            x += width;
        }

        self.add(PositionedElement {
            x: x0,
            y: y + height,
            width: total_width,
            height: 0.0,
            element: LayoutElement::Line { stroke: rule },
        });
        self.current_y += height;
    }

    fn layout_chart(&mut self, chart: &Chart) {
        let chart_style = &self.styles.chart;
        let (height, space_after) = (chart_style.height, chart_style.space_after);
        self.ensure_space(height);
        self.add(PositionedElement {
            x: self.left(),
            y: self.current_y,
            width: self.content_width(),
            height,
            element: LayoutElement::Chart(chart.clone()),
        });
        self.current_y += height + space_after;
    }

    /// Drawn size, shrunk to fit the content area.
    fn image_size(&self, image: &ImageBlock) -> (f32, f32) {
        let page = &self.styles.page;
        let max_height = page.content_bottom() - page.margins.top;
        let mut width = image.width.min(self.content_width()).max(1.0);
        let mut height = width * image.image.aspect_ratio();
        if height > max_height {
            width *= max_height / height;
            height = max_height;
        }
        (width, height)
    }

    fn layout_image(&mut self, image: &ImageBlock) {
        let (width, height) = self.image_size(image);
        self.ensure_space(height);
        let x = match image.align {
            TextAlign::Left => self.left(),
            TextAlign::Center => self.left() + (self.content_width() - width) / 2.0,
            TextAlign::Right => self.left() + self.content_width() - width,
        };
        self.add(PositionedElement {
            x,
            y: self.current_y,
            width,
            height,
            element: LayoutElement::Image(Arc::clone(&image.image)),
        });
        self.current_y += height + self.styles.body.space_after;
    }

    fn layout_spacer(&mut self, height: f32) {
        if self.needs_page_break(height) {
            self.new_page();
        } else {
            self.current_y += height;
        }
    }

    fn add_footers(&mut self) {
        let styles = self.styles;
        let style = &styles.footer;
        let page = &styles.page;
        let total = self.pages.len();
        let y = page.height() - page.margins.bottom / 2.0 - style.line_height_pt() / 2.0;
        let left = page.margins.left;
        let width = page.content_width();

        for p in &mut self.pages {
            let text = format!("Page {} of {}", p.number, total);
            let text_width = measure_text(&text, style.font, style.font_size);
            let x = match style.align {
                TextAlign::Left => left,
                TextAlign::Center => left + (width - text_width) / 2.0,
                TextAlign::Right => left + width - text_width,
            };
            p.elements.push(PositionedElement {
                x,
                y,
                width: text_width,
                height: style.line_height_pt(),
                element: LayoutElement::Text(TextRun {
                    text,
                    font: style.font,
                    font_size: style.font_size,
                    color: style.color,
                }),
            });
        }
    }
}

/// Wrapped lines per cell and the height of the tallest cell.
fn wrap_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[f32],
    style: &TextStyle,
    padding: f32,
) -> (Vec<Vec<String>>, f32) {
    let wrapped: Vec<Vec<String>> = cells
        .zip(widths)
        .map(|(cell, width)| wrap_text(cell, style.font, style.font_size, width - 2.0 * padding))
        .collect();
    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    (wrapped, lines as f32 * style.line_height_pt() + 2.0 * padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Column;
    use crate::chart::{ScatterChart, ScatterPoint};

    fn styles_without_footer() -> ReportStyles {
        let mut styles = ReportStyles::default();
        styles.page.footer = false;
        styles
    }

    fn content_bottom(styles: &ReportStyles) -> f32 {
        styles.page.content_bottom() + EPSILON
    }

    fn filler(doc: &mut Document, paragraphs: usize) {
        for i in 0..paragraphs {
            doc.paragraph(format!("Paragraph {i} with enough words to take up a single line."));
        }
    }

    #[test]
    fn short_document_fits_one_page() {
        let styles = styles_without_footer();
        let mut doc = Document::new("Short");
        doc.heading("Summary").paragraph("Everything shipped on time.");
        let pages = LayoutEngine::new(&styles).layout(&doc);
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].texts().collect();
        assert_eq!(texts, vec!["Summary", "Everything shipped on time."]);
    }

    #[test]
    fn long_content_paginates_within_margins() {
        let styles = styles_without_footer();
        let mut doc = Document::new("Long");
        filler(&mut doc, 200);
        let pages = LayoutEngine::new(&styles).layout(&doc);
        assert!(pages.len() > 1);
        for page in &pages {
            for element in &page.elements {
                assert!(element.y >= styles.page.margins.top - EPSILON);
                assert!(element.y + element.height <= content_bottom(&styles));
            }
        }
        let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=pages.len()).collect::<Vec<_>>());
    }

    #[test]
    fn page_breaks_do_not_create_blank_pages() {
        let styles = styles_without_footer();
        let mut doc = Document::new("Breaks");
        doc.page_break().paragraph("first").page_break().page_break().paragraph("second");
        let pages = LayoutEngine::new(&styles).layout(&doc);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].texts().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn heading_moves_with_the_following_block() {
        let styles = styles_without_footer();
        let mut doc = Document::new("Keep");
        filler(&mut doc, 1);
        let pages = LayoutEngine::new(&styles).layout(&doc);
        let line = pages[0].elements[0].height + styles.body.space_after;
        let usable = styles.page.content_bottom() - styles.page.margins.top;
        // Leave room for the heading but not for the paragraph after it.
        let fill = ((usable - styles.heading1.line_height_pt() - styles.heading1.space_before)
            / line) as usize;

        let mut doc = Document::new("Keep");
        filler(&mut doc, fill);
        doc.heading("Next section").paragraph("Body of the next section.");
        let pages = LayoutEngine::new(&styles).layout(&doc);
        let last = pages.last().unwrap();
        assert_eq!(
            last.texts().collect::<Vec<_>>(),
            vec!["Next section", "Body of the next section."]
        );
    }

    #[test]
    fn table_header_repeats_after_a_page_break() {
        let styles = styles_without_footer();
        let mut table = Table::new(vec![
            Column::new("Account", 2.0),
            Column::new("Total", 1.0).right(),
        ]);
        for i in 0..120 {
            table.push_row(vec![format!("Account {i}"), format!("{i}.00")]).unwrap();
        }
        let mut doc = Document::new("Table");
        doc.table(table);
        let pages = LayoutEngine::new(&styles).layout(&doc);
        assert!(pages.len() > 1);
        for page in &pages {
            assert_eq!(page.texts().next(), Some("Account"));
        }
        let cells = pages
            .iter()
            .flat_map(|p| p.texts())
            .filter(|t| t.starts_with("Account "))
            .count();
        assert_eq!(cells, 120);
    }

    #[test]
    fn charts_are_never_split() {
        let styles = styles_without_footer();
        let chart = ScatterChart::new(
            "Risk matrix",
            "Likelihood",
            "Impact",
            (0.0, 5.0),
            vec![ScatterPoint {
                label: "R1".into(),
                x: 2.0,
                y: 3.0,
                color: Color::BLACK,
            }],
        )
        .unwrap();
        let mut doc = Document::new("Chart");
        filler(&mut doc, 40);
        doc.chart(chart);
        let pages = LayoutEngine::new(&styles).layout(&doc);
        let placed: Vec<&PositionedElement> = pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter(|e| matches!(e.element, LayoutElement::Chart(_)))
            .collect();
        assert_eq!(placed.len(), 1);
        assert!(placed[0].y + placed[0].height <= content_bottom(&styles));
    }

    #[test]
    fn footers_number_every_page() {
        let styles = ReportStyles::default();
        let mut doc = Document::new("Footer");
        doc.paragraph("one").page_break().paragraph("two");
        let pages = LayoutEngine::new(&styles).layout(&doc);
        assert_eq!(pages[0].texts().last(), Some("Page 1 of 2"));
        assert_eq!(pages[1].texts().last(), Some("Page 2 of 2"));
    }

    #[test]
    fn images_keep_their_aspect_ratio() {
        let styles = styles_without_footer();
        let image = Arc::new(ImageData {
            width_px: 200,
            height_px: 100,
            rgb: vec![0; 200 * 100 * 3],
        });
        let mut doc = Document::new("Logo");
        doc.image(ImageBlock {
            image,
            width: 120.0,
            align: TextAlign::Center,
        });
        let pages = LayoutEngine::new(&styles).layout(&doc);
        let logo = &pages[0].elements[0];
        assert_eq!((logo.width, logo.height), (120.0, 60.0));
        let expected_x = styles.page.margins.left + (styles.page.content_width() - 120.0) / 2.0;
        assert!((logo.x - expected_x).abs() < EPSILON);
    }
}
