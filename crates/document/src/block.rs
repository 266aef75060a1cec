use crate::chart::Chart;
use crate::error::LayoutError;
use crate::style::{StyleName, TextAlign};
use std::path::Path;
use std::sync::Arc;

/// An ordered list of content blocks, laid out top to bottom.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Text { style: StyleName, text: String },
    Bullet { text: String },
    Table(Table),
    Chart(Chart),
    Image(ImageBlock),
    /// Vertical gap in points.
    Spacer(f32),
    PageBreak,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn text(&mut self, style: StyleName, text: impl Into<String>) -> &mut Self {
        self.push(Block::Text {
            style,
            text: text.into(),
        })
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(StyleName::Heading1, text)
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(StyleName::Body, text)
    }

    pub fn bullet(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Block::Bullet { text: text.into() })
    }

    pub fn table(&mut self, table: Table) -> &mut Self {
        self.push(Block::Table(table))
    }

    pub fn chart(&mut self, chart: impl Into<Chart>) -> &mut Self {
        self.push(Block::Chart(chart.into()))
    }

    pub fn image(&mut self, image: ImageBlock) -> &mut Self {
        self.push(Block::Image(image))
    }

    pub fn spacer(&mut self, height: f32) -> &mut Self {
        self.push(Block::Spacer(height))
    }

    pub fn page_break(&mut self) -> &mut Self {
        self.push(Block::PageBreak)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    /// Share of the table width relative to the other columns.
    pub weight: f32,
    pub align: TextAlign,
}

impl Column {
    pub fn new(header: impl Into<String>, weight: f32) -> Self {
        Self {
            header: header.into(),
            weight,
            align: TextAlign::Left,
        }
    }

    pub fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) -> Result<(), LayoutError> {
        if cells.len() != self.columns.len() {
            return Err(LayoutError::TableShape {
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column widths in points for a table `total_width` wide.
    pub fn column_widths(&self, total_width: f32) -> Vec<f32> {
        let total_weight: f32 = self.columns.iter().map(|c| c.weight.max(0.0)).sum();
        if total_weight <= 0.0 {
            let even = total_width / self.columns.len().max(1) as f32;
            return vec![even; self.columns.len()];
        }
        self.columns
            .iter()
            .map(|c| total_width * c.weight.max(0.0) / total_weight)
            .collect()
    }
}

/// Decoded RGB pixels, shared between every place the image is drawn.
#[derive(Debug, PartialEq)]
pub struct ImageData {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

impl ImageData {
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let decoded = image::open(path).map_err(|e| LayoutError::Image {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let rgb = decoded.to_rgb8();
        log::debug!(
            "Decoded image {} ({}x{})",
            path.display(),
            rgb.width(),
            rgb.height()
        );
        Ok(Self {
            width_px: rgb.width(),
            height_px: rgb.height(),
            rgb: rgb.into_raw(),
        })
    }

    /// Height divided by width.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width_px == 0 {
            1.0
        } else {
            self.height_px as f32 / self.width_px as f32
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageBlock {
    pub image: Arc<ImageData>,
    /// Drawn width in points; height follows the aspect ratio.
    pub width: f32,
    pub align: TextAlign,
}
