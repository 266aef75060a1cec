use crate::chart::{ChartBox, draw_chart};
use crate::encoding::to_win_ansi;
use crate::page::{PageContext, font_resource_name};
use crate::RenderError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use monthly_report_document::{FontFace, ImageData, LayoutElement, Page, ReportStyles};
use std::io::Write;
use std::sync::Arc;

const PRODUCER: &str = "monthly-report";

/// A PDF renderer using the `lopdf` library.
///
/// The whole object graph is built in memory and written in one pass. No
/// timestamps are recorded, so the same pages always produce the same bytes.
pub struct LopdfRenderer<'s> {
    styles: &'s ReportStyles,
}

/// An image XObject shared by every page that draws the same decoded image.
struct ImageResource {
    image: Arc<ImageData>,
    name: String,
    id: ObjectId,
}

impl<'s> LopdfRenderer<'s> {
    pub fn new(styles: &'s ReportStyles) -> Self {
        Self { styles }
    }

    pub fn render_to_vec(&self, pages: &[Page], title: &str) -> Result<Vec<u8>, RenderError> {
        let mut buffer = Vec::new();
        self.render(pages, title, &mut buffer)?;
        Ok(buffer)
    }

    pub fn render<W: Write>(
        &self,
        pages: &[Page],
        title: &str,
        writer: &mut W,
    ) -> Result<(), RenderError> {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let images = Self::add_images(&mut document, pages)?;
        let resources_id = document.add_object(dictionary! {
            "Font" => Self::font_dictionary(),
            "XObject" => images
                .iter()
                .fold(Dictionary::new(), |mut dict, image| {
                    dict.set(image.name.as_bytes(), image.id);
                    dict
                }),
        });

        let (page_width, page_height) = (self.styles.page.width(), self.styles.page.height());
        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.render_page(page, page_height, &images);
            let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id);
        }

        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
                "Count" => page_ids.len() as i64,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(dictionary! {
            "Title" => Object::String(to_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal(PRODUCER),
        });
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);

        document.save_to(writer)?;
        log::debug!("Wrote PDF '{}' with {} pages and {} images", title, pages.len(), images.len());
        Ok(())
    }

    fn font_dictionary() -> Dictionary {
        FontFace::ALL.iter().fold(Dictionary::new(), |mut fonts, face| {
            fonts.set(
                font_resource_name(*face),
                dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => face.postscript_name(),
                    "Encoding" => "WinAnsiEncoding",
                },
            );
            fonts
        })
    }

    /// Adds one XObject per distinct image; an image drawn on several pages is
    /// stored once.
    fn add_images(
        document: &mut Document,
        pages: &[Page],
    ) -> Result<Vec<ImageResource>, RenderError> {
        let mut images: Vec<ImageResource> = Vec::new();
        let drawn = pages.iter().flat_map(|p| &p.elements).filter_map(|e| match &e.element {
            LayoutElement::Image(image) => Some(image),
            _ => None,
        });
        for image in drawn {
            if images.iter().any(|known| Arc::ptr_eq(&known.image, image)) {
                continue;
            }
            let mut stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width_px as i64,
                    "Height" => image.height_px as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                image.rgb.clone(),
            );
            stream.compress()?;
            let id = document.add_object(stream);
            images.push(ImageResource {
                image: Arc::clone(image),
                name: format!("Im{}", images.len() + 1),
                id,
            });
        }
        Ok(images)
    }

    fn render_page(
        &self,
        page: &Page,
        page_height: f32,
        images: &[ImageResource],
    ) -> lopdf::content::Content {
        let mut ctx = PageContext::new(page_height);
        for el in &page.elements {
            match &el.element {
                LayoutElement::Text(run) => ctx.text_run(run, el.x, el.y),
                LayoutElement::Rect { fill, stroke } => {
                    ctx.rect(el.x, el.y, el.width, el.height, *fill, *stroke)
                }
                LayoutElement::Line { stroke } => {
                    ctx.line(el.x, el.y, el.x + el.width, el.y + el.height, *stroke)
                }
                LayoutElement::Image(image) => {
                    match images.iter().find(|known| Arc::ptr_eq(&known.image, image)) {
                        Some(resource) => {
                            ctx.image(&resource.name, el.x, el.y, el.width, el.height)
                        }
                        None => log::warn!("Image on page {} has no XObject; skipped", page.number),
                    }
                }
                LayoutElement::Chart(chart) => {
                    let area = ChartBox {
                        x: el.x,
                        y: el.y,
                        width: el.width,
                        height: el.height,
                    };
                    draw_chart(&mut ctx, chart, area, &self.styles.chart);
                }
            }
        }
        ctx.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monthly_report_document::{Document as ReportDocument, ImageBlock, LayoutEngine, TextAlign};

    fn render(doc: &ReportDocument, styles: &ReportStyles) -> Vec<u8> {
        let pages = LayoutEngine::new(styles).layout(doc);
        LopdfRenderer::new(styles).render_to_vec(&pages, &doc.title).unwrap()
    }

    fn page_text(pdf: &Document, page: u32) -> String {
        pdf.extract_text(&[page]).unwrap_or_default()
    }

    #[test]
    fn writes_a_loadable_pdf_with_text() {
        let styles = ReportStyles::default();
        let mut doc = ReportDocument::new("Monthly Report");
        doc.heading("Summary").paragraph("All milestones met.");
        let bytes = render(&doc, &styles);
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let pdf = Document::load_mem(&bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), 1);
        let text = page_text(&pdf, 1);
        assert!(text.contains("Summary"), "got: {text}");
        assert!(text.contains("All milestones met."), "got: {text}");
        assert!(text.contains("Page 1 of 1"), "got: {text}");
    }

    #[test]
    fn every_page_gets_a_page_object() {
        let styles = ReportStyles::default();
        let mut doc = ReportDocument::new("Paged");
        doc.paragraph("one").page_break().paragraph("two").page_break().paragraph("three");
        let pdf = Document::load_mem(&render(&doc, &styles)).unwrap();
        assert_eq!(pdf.get_pages().len(), 3);
        assert!(page_text(&pdf, 3).contains("three"));
    }

    #[test]
    fn output_is_deterministic() {
        let styles = ReportStyles::default();
        let mut doc = ReportDocument::new("Same");
        doc.heading("Title").paragraph("Body");
        assert_eq!(render(&doc, &styles), render(&doc, &styles));
    }

    #[test]
    fn shared_images_are_stored_once() {
        let styles = ReportStyles::default();
        let logo = Arc::new(ImageData {
            width_px: 2,
            height_px: 2,
            rgb: vec![255; 12],
        });
        let block = ImageBlock {
            image: Arc::clone(&logo),
            width: 40.0,
            align: TextAlign::Left,
        };
        let mut doc = ReportDocument::new("Logos");
        doc.image(block.clone()).page_break().image(block);
        let pdf = Document::load_mem(&render(&doc, &styles)).unwrap();

        let image_streams = pdf
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|name| name == b"Image"),
                _ => false,
            })
            .count();
        assert_eq!(image_streams, 1);
        assert_eq!(pdf.get_pages().len(), 2);
    }

    #[test]
    fn all_four_type1_faces_are_declared() {
        let fonts = LopdfRenderer::font_dictionary();
        let names: Vec<&[u8]> = fonts
            .iter()
            .filter_map(|(_, font)| font.as_dict().ok()?.get(b"BaseFont").ok()?.as_name().ok())
            .collect();
        assert_eq!(
            names,
            vec![
                b"Helvetica".as_slice(),
                b"Helvetica-Bold",
                b"Helvetica-Oblique",
                b"Helvetica-BoldOblique"
            ]
        );
    }
}
