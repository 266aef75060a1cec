//! Flattens rendered HTML into text blocks for the plain PDF layout.
//!
//! Markup is read with quick-xml with end-name checks off, so unclosed HTML
//! tags such as `<br>` are tolerated. Only the block-level tags a report
//! template uses (headings, paragraphs, list items, table rows) shape the
//! output; everything else, including the whole `<head>`, is dropped.

use log::warn;
use monthly_report_document::{Block, Document, StyleName};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::borrow::Cow;

const SKIPPED: [&str; 4] = ["head", "script", "style", "title"];

pub(crate) fn html_to_document(html: &str, title: &str) -> Document {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    // HTML leaves <br>, <meta> and friends unclosed.
    config.check_end_names = false;

    let mut flattener = Flattener::new(title);
    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(e)) => flattener.start(&tag_name(e.name().as_ref())),
            Ok(XmlEvent::End(e)) => flattener.end(&tag_name(e.name().as_ref())),
            Ok(XmlEvent::Empty(e)) => flattener.empty(&tag_name(e.name().as_ref())),
            Ok(XmlEvent::Text(e)) => {
                let text = e
                    .unescape_with(resolve_html5_entity)
                    .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&e).into_owned()));
                flattener.text(&text);
            }
            Ok(XmlEvent::CData(e)) => flattener.text(&String::from_utf8_lossy(&e)),
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Stopped reading report HTML at byte {}: {e}",
                    reader.buffer_position()
                );
                break;
            }
        }
    }
    flattener.finish()
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

struct Flattener {
    document: Document,
    current: String,
    style: StyleName,
    bullet: bool,
    skip_depth: usize,
    row: Option<Vec<String>>,
}

impl Flattener {
    fn new(title: &str) -> Self {
        Self {
            document: Document::new(title),
            current: String::new(),
            style: StyleName::Body,
            bullet: false,
            skip_depth: 0,
            row: None,
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth == 0 {
            // Source newlines are plain whitespace; only <br> breaks a line.
            self.current.push_str(&text.replace(['\r', '\n'], " "));
        }
    }

    fn start(&mut self, name: &str) {
        if SKIPPED.contains(&name) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match name {
            "br" => self.current.push('\n'),
            "tr" => {
                self.flush();
                self.row = Some(Vec::new());
            }
            "td" | "th" => self.current.clear(),
            block if is_block(block) => {
                self.flush();
                self.bullet = block == "li";
                self.style = heading_style(block).unwrap_or(StyleName::Body);
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        if SKIPPED.contains(&name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match name {
            "tr" => {
                if let Some(cells) = self.row.take() {
                    let cells: Vec<String> = cells.into_iter().filter(|c| !c.is_empty()).collect();
                    if !cells.is_empty() {
                        self.document.push(Block::Text {
                            style: StyleName::Body,
                            text: cells.join(" | "),
                        });
                    }
                }
                self.current.clear();
            }
            "td" | "th" => {
                let cell = collapse_whitespace(&std::mem::take(&mut self.current));
                if let Some(cells) = self.row.as_mut() {
                    cells.push(cell);
                }
            }
            block if is_block(block) => {
                self.flush();
                self.bullet = false;
                self.style = StyleName::Body;
            }
            _ => {}
        }
    }

    /// `<br/>` breaks a line; every other self-closing tag carries no text.
    fn empty(&mut self, name: &str) {
        if self.skip_depth == 0 && name == "br" {
            self.current.push('\n');
        }
    }

    fn flush(&mut self) {
        if self.row.is_some() {
            return;
        }
        let text = collapse_whitespace(&std::mem::take(&mut self.current));
        if text.is_empty() {
            return;
        }
        let block = if self.bullet {
            Block::Bullet { text }
        } else {
            Block::Text {
                style: self.style,
                text,
            }
        };
        self.document.push(block);
    }

    fn finish(mut self) -> Document {
        self.row = None;
        self.flush();
        self.document
    }
}

fn heading_style(tag: &str) -> Option<StyleName> {
    match tag {
        "h1" => Some(StyleName::Heading1),
        "h2" => Some(StyleName::Heading2),
        "h3" | "h4" | "h5" | "h6" => Some(StyleName::Heading3),
        _ => None,
    }
}

fn is_block(tag: &str) -> bool {
    heading_style(tag).is_some()
        || matches!(
            tag,
            "p" | "div" | "li" | "ul" | "ol" | "table" | "section" | "header" | "footer"
                | "article" | "main" | "body" | "html" | "blockquote" | "pre"
        )
}

/// Collapses runs of whitespace within each line and drops empty lines.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
