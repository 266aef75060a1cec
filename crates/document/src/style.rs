//! Style configuration for laid-out reports.
//!
//! [`ReportStyles`] is built once (from defaults or a JSON stylesheet) and passed
//! by shared reference to everything that places or draws content. Nothing
//! mutates it after construction.

use crate::error::LayoutError;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Components scaled to the 0.0..=1.0 range PDF color operators take.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Parses `#RGB` or `#RRGGBB`.
    pub fn parse_hex(s: &str) -> Result<Color, String> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("Color must start with #, got: {s}"))?;
        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16)
                .map_err(|e| format!("Invalid color component '{digits}' in {s}: {e}"))
        };
        // Byte slicing below is only sound on ASCII.
        if !hex.is_ascii() {
            return Err(format!("Color must be #RGB or #RRGGBB, got: {s}"));
        }
        match hex.len() {
            3 => Ok(Color::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(format!("Color must be #RGB or #RRGGBB, got: {s}")),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s).map_err(de::Error::custom)
    }
}

/// The four faces of the built-in Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    pub const ALL: [FontFace; 4] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Italic,
        FontFace::BoldItalic,
    ];

    pub fn postscript_name(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
            FontFace::BoldItalic => "Helvetica-BoldOblique",
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold | FontFace::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    /// 2cm on every side.
    fn default() -> Self {
        Margins::all(56.69)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub size: PageSize,
    pub margins: Margins,
    /// Draw "Page N of M" in the bottom margin.
    pub footer: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margins: Margins::default(),
            footer: true,
        }
    }
}

impl PageSetup {
    pub fn width(&self) -> f32 {
        self.size.dimensions_pt().0
    }

    pub fn height(&self) -> f32 {
        self.size.dimensions_pt().1
    }

    pub fn content_width(&self) -> f32 {
        self.width() - self.margins.left - self.margins.right
    }

    /// Lowest y (top-down) content may reach.
    pub fn content_bottom(&self) -> f32 {
        self.height() - self.margins.bottom
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font: FontFace,
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub color: Color,
    pub space_before: f32,
    pub space_after: f32,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontFace::Regular,
            font_size: 10.5,
            line_height: 1.3,
            color: Color::gray(34),
            space_before: 0.0,
            space_after: 6.0,
            align: TextAlign::Left,
        }
    }
}

impl TextStyle {
    fn sized(font: FontFace, font_size: f32, space_before: f32, space_after: f32) -> Self {
        Self {
            font,
            font_size,
            line_height: 1.2,
            space_before,
            space_after,
            ..Self::default()
        }
    }

    pub fn line_height_pt(&self) -> f32 {
        self.font_size * self.line_height
    }
}

/// Named text styles a document block can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleName {
    Title,
    Subtitle,
    Heading1,
    Heading2,
    Heading3,
    Body,
    Bullet,
    TableHeader,
    TableCell,
    Caption,
    Footer,
}

impl StyleName {
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            StyleName::Title | StyleName::Heading1 | StyleName::Heading2 | StyleName::Heading3
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub header_background: Color,
    pub stripe_background: Option<Color>,
    pub rule_color: Color,
    pub rule_width: f32,
    pub cell_padding: f32,
    pub space_after: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: Color::rgb(0x2f, 0x4b, 0x7c),
            stripe_background: Some(Color::rgb(0xf2, 0xf5, 0xfa)),
            rule_color: Color::gray(200),
            rule_width: 0.5,
            cell_padding: 4.0,
            space_after: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub height: f32,
    pub space_after: f32,
    pub axis_color: Color,
    pub grid_color: Color,
    pub label_size: f32,
    pub title_size: f32,
    pub point_radius: f32,
    pub expected_color: Color,
    pub actual_color: Color,
    pub low_risk_color: Color,
    pub medium_risk_color: Color,
    pub high_risk_color: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            height: 240.0,
            space_after: 14.0,
            axis_color: Color::gray(60),
            grid_color: Color::gray(225),
            label_size: 8.0,
            title_size: 11.0,
            point_radius: 4.5,
            expected_color: Color::rgb(0x4e, 0x79, 0xa7),
            actual_color: Color::rgb(0xf2, 0x8e, 0x2b),
            low_risk_color: Color::rgb(0x59, 0xa1, 0x4f),
            medium_risk_color: Color::rgb(0xed, 0xc9, 0x48),
            high_risk_color: Color::rgb(0xe1, 0x57, 0x59),
        }
    }
}

/// Every style a report is laid out and drawn with.
///
/// A JSON stylesheet only needs the fields it overrides; anything absent keeps
/// its default. Note that a partially specified text style is completed from
/// [`TextStyle::default`], not from the named style's own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportStyles {
    pub page: PageSetup,
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub heading1: TextStyle,
    pub heading2: TextStyle,
    pub heading3: TextStyle,
    pub body: TextStyle,
    pub bullet: TextStyle,
    pub table_header: TextStyle,
    pub table_cell: TextStyle,
    pub caption: TextStyle,
    pub footer: TextStyle,
    pub table: TableStyle,
    pub chart: ChartStyle,
}

impl Default for ReportStyles {
    fn default() -> Self {
        let accent = Color::rgb(0x1f, 0x3a, 0x5f);
        Self {
            page: PageSetup::default(),
            title: TextStyle {
                color: accent,
                align: TextAlign::Center,
                ..TextStyle::sized(FontFace::Bold, 28.0, 0.0, 18.0)
            },
            subtitle: TextStyle {
                color: Color::gray(80),
                align: TextAlign::Center,
                ..TextStyle::sized(FontFace::Regular, 14.0, 0.0, 8.0)
            },
            heading1: TextStyle {
                color: accent,
                ..TextStyle::sized(FontFace::Bold, 18.0, 14.0, 8.0)
            },
            heading2: TextStyle {
                color: accent,
                ..TextStyle::sized(FontFace::Bold, 13.5, 10.0, 5.0)
            },
            heading3: TextStyle::sized(FontFace::BoldItalic, 11.5, 6.0, 4.0),
            body: TextStyle::default(),
            bullet: TextStyle {
                space_after: 3.0,
                ..TextStyle::default()
            },
            table_header: TextStyle {
                color: Color::WHITE,
                space_after: 0.0,
                ..TextStyle::sized(FontFace::Bold, 9.5, 0.0, 0.0)
            },
            table_cell: TextStyle {
                space_after: 0.0,
                ..TextStyle::sized(FontFace::Regular, 9.5, 0.0, 0.0)
            },
            caption: TextStyle {
                color: Color::gray(90),
                ..TextStyle::sized(FontFace::Italic, 9.0, 0.0, 8.0)
            },
            footer: TextStyle {
                color: Color::gray(120),
                align: TextAlign::Center,
                ..TextStyle::sized(FontFace::Regular, 8.0, 0.0, 0.0)
            },
            table: TableStyle::default(),
            chart: ChartStyle::default(),
        }
    }
}

impl ReportStyles {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn text(&self, name: StyleName) -> &TextStyle {
        match name {
            StyleName::Title => &self.title,
            StyleName::Subtitle => &self.subtitle,
            StyleName::Heading1 => &self.heading1,
            StyleName::Heading2 => &self.heading2,
            StyleName::Heading3 => &self.heading3,
            StyleName::Body => &self.body,
            StyleName::Bullet => &self.bullet,
            StyleName::TableHeader => &self.table_header,
            StyleName::TableCell => &self.table_cell,
            StyleName::Caption => &self.caption,
            StyleName::Footer => &self.footer,
        }
    }
}
