//! Minimal PDF writer for annotated comparison output.
//!
//! Produces a PDF 1.4 file with one shared Helvetica font (WinAnsiEncoding),
//! page backgrounds as Flate-compressed DeviceRGB image XObjects, and plain
//! uncompressed content streams.

use std::fmt::Write as _;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::ImageReader;

use super::{OutputDocument, PageHandle};
use crate::error::{Result, VellumError};
use crate::font::{Helvetica, TextMeasure, encode_winansi};
use crate::raster;
use crate::utils::{Color, Rect, fit_rect, rect_height, rect_width};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_ID: usize = 3;
const FIRST_PAGE_ID: usize = 4;

#[derive(Debug, Clone)]
struct PlacedImage {
    rect: Rect,
    png: Vec<u8>,
}

#[derive(Debug, Clone)]
struct TextBox {
    rect: Rect,
    text: String,
    font_size: f64,
    color: Color,
}

#[derive(Debug, Clone)]
struct PdfPage {
    width: f64,
    height: f64,
    images: Vec<PlacedImage>,
    texts: Vec<TextBox>,
}

/// In-memory PDF document; written out on [`OutputDocument::save`].
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    pages: Vec<PdfPage>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_mut(&mut self, page: PageHandle) -> Result<&mut PdfPage> {
        self.pages
            .get_mut(page.0)
            .ok_or(VellumError::UnknownPage(page.0))
    }

    /// Content stream of `page`, as it will be written.
    pub fn content_stream(&self, page: PageHandle) -> Result<String> {
        let page = self
            .pages
            .get(page.0)
            .ok_or(VellumError::UnknownPage(page.0))?;

        let mut content = String::new();
        for (i, image) in page.images.iter().enumerate() {
            let (x0, _, _, y1) = image.rect;
            let _ = writeln!(
                content,
                "q {} 0 0 {} {} {} cm /Im{} Do Q",
                fmt_num(rect_width(image.rect)),
                fmt_num(rect_height(image.rect)),
                fmt_num(x0),
                fmt_num(page.height - y1),
                i
            );
        }
        for text in &page.texts {
            let (r, g, b) = text.color;
            let baseline = page.height - (text.rect.1 + text.font_size);
            let _ = writeln!(
                content,
                "BT /F1 {} Tf {} {} {} rg {} {} Td ({}) Tj ET",
                fmt_num(text.font_size),
                fmt_num(r),
                fmt_num(g),
                fmt_num(b),
                fmt_num(text.rect.0),
                fmt_num(baseline),
                escape_string(&text.text)
            );
        }
        Ok(content)
    }

    /// Serializes the whole document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = ObjectWriter::new(Vec::new());
        out.write_raw(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

        // Object ids: page, content, then one per image, for each page in order.
        let mut page_ids = Vec::with_capacity(self.pages.len());
        let mut next_id = FIRST_PAGE_ID;
        for page in &self.pages {
            page_ids.push(next_id);
            next_id += 2 + page.images.len();
        }

        out.write_object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"))?;
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        out.write_object(
            PAGES_ID,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids,
                self.pages.len()
            ),
        )?;
        out.write_object(
            FONT_ID,
            &format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                Helvetica::BASE_FONT
            ),
        )?;

        for (index, (page, &page_id)) in self.pages.iter().zip(&page_ids).enumerate() {
            let content_id = page_id + 1;
            let xobjects = (0..page.images.len())
                .map(|i| format!("/Im{} {} 0 R", i, content_id + 1 + i))
                .collect::<Vec<_>>()
                .join(" ");
            out.write_object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 {FONT_ID} 0 R >> /XObject << {} >> >> \
                     /Contents {} 0 R >>",
                    fmt_num(page.width),
                    fmt_num(page.height),
                    xobjects,
                    content_id
                ),
            )?;

            let content = self.content_stream(PageHandle(index))?;
            out.write_stream(content_id, "", content.as_bytes())?;

            for (i, image) in page.images.iter().enumerate() {
                // Decode one image at a time so only a single raster is live.
                let rgb = raster::decode_png(&image.png)?;
                let (w, h) = rgb.dimensions();
                let data = deflate(rgb.as_raw())?;
                drop(rgb);
                out.write_stream(
                    content_id + 1 + i,
                    &format!(
                        "/Type /XObject /Subtype /Image /Width {w} /Height {h} \
                         /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode"
                    ),
                    &data,
                )?;
            }
        }

        out.finish(next_id - 1)
    }
}

impl TextMeasure for PdfWriter {
    fn measure_text_width(&self, text: &str, font_size: f64) -> f64 {
        Helvetica.measure_text_width(text, font_size)
    }
}

impl OutputDocument for PdfWriter {
    fn new_page(&mut self, width: f64, height: f64) -> PageHandle {
        self.pages.push(PdfPage {
            width,
            height,
            images: Vec::new(),
            texts: Vec::new(),
        });
        PageHandle(self.pages.len() - 1)
    }

    fn insert_image(
        &mut self,
        page: PageHandle,
        rect: Rect,
        png: &[u8],
        keep_aspect_ratio: bool,
    ) -> Result<()> {
        let rect = if keep_aspect_ratio {
            let (w, h) = ImageReader::new(Cursor::new(png))
                .with_guessed_format()?
                .into_dimensions()?;
            fit_rect(rect, f64::from(w), f64::from(h))
        } else {
            rect
        };
        self.page_mut(page)?.images.push(PlacedImage {
            rect,
            png: png.to_vec(),
        });
        Ok(())
    }

    fn insert_text_box(
        &mut self,
        page: PageHandle,
        rect: Rect,
        text: &str,
        font_size: f64,
        color: Color,
    ) -> Result<()> {
        self.page_mut(page)?.texts.push(TextBox {
            rect,
            text: text.to_string(),
            font_size,
            color,
        });
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Tracks byte offsets of indirect objects for the xref table.
struct ObjectWriter<W: Write> {
    out: W,
    offset: usize,
    offsets: Vec<usize>,
}

impl<W: Write> ObjectWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            offset: 0,
            offsets: Vec::new(),
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.offset += bytes.len();
        Ok(())
    }

    fn begin_object(&mut self, id: usize) -> Result<()> {
        if self.offsets.len() <= id {
            self.offsets.resize(id + 1, 0);
        }
        self.offsets[id] = self.offset;
        self.write_raw(format!("{id} 0 obj\n").as_bytes())
    }

    fn write_object(&mut self, id: usize, body: &str) -> Result<()> {
        self.begin_object(id)?;
        self.write_raw(body.as_bytes())?;
        self.write_raw(b"\nendobj\n")
    }

    fn write_stream(&mut self, id: usize, dict: &str, data: &[u8]) -> Result<()> {
        self.begin_object(id)?;
        let sep = if dict.is_empty() { "" } else { " " };
        self.write_raw(format!("<< {dict}{sep}/Length {} >>\nstream\n", data.len()).as_bytes())?;
        self.write_raw(data)?;
        self.write_raw(b"\nendstream\nendobj\n")
    }

    /// Writes the xref table and trailer for objects `1..=last_id`.
    fn finish(mut self, last_id: usize) -> Result<W> {
        let xref_offset = self.offset;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", last_id + 1);
        for id in 1..=last_id {
            let offset = self.offsets.get(id).copied().unwrap_or(0);
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R >>\nstartxref\n{}\n%%EOF\n",
            last_id + 1,
            xref_offset
        );
        self.write_raw(xref.as_bytes())?;
        self.out.flush()?;
        Ok(self.out)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Formats a number for a PDF content stream: at most three decimals, no
/// trailing zeros.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Encodes text as the body of a PDF literal string.
fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in encode_winansi(text) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            0x20..=0x7E => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(0.8), "0.8");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(1.23456), "1.235");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_string("caf\u{e9}"), "caf\\351");
    }

    #[test]
    fn test_unknown_page_handle() {
        let mut writer = PdfWriter::new();
        let err = writer
            .insert_text_box(PageHandle(3), (0.0, 0.0, 1.0, 1.0), "x", 8.0, (0.0, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, VellumError::UnknownPage(3)));
    }

    #[test]
    fn test_document_structure() {
        let mut writer = PdfWriter::new();
        let page = writer.new_page(200.0, 100.0);
        writer
            .insert_text_box(page, (10.0, 10.0, 40.0, 34.0), "Hi", 8.0, (0.8, 0.0, 0.0))
            .unwrap();
        let bytes = writer.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.contains("/Type /Catalog /Pages 2 0 R"));
        assert!(text.contains("/Kids [4 0 R] /Count 1"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/MediaBox [0 0 200 100]"));
        assert!(text.contains("(Hi) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut writer = PdfWriter::new();
        writer.new_page(10.0, 10.0);
        writer.new_page(10.0, 10.0);
        let bytes = writer.to_bytes().unwrap();

        let xref_at = bytes.windows(6).position(|w| w == b"\nxref\n").unwrap() + 1;
        let table = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        let entries: Vec<usize> = table
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        // Catalog, pages, font, then page + content for each of two pages.
        assert_eq!(entries.len(), 7);
        for (i, offset) in entries.iter().enumerate() {
            let marker = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(marker.as_bytes()));
        }
    }
}
