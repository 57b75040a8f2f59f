//! # PDF Serializer
//!
//! Writes the sealed page list as a valid PDF 1.7 byte stream. A from-scratch
//! writer: the subset needed for report output (text in the standard Type1
//! faces, lines, filled rectangles) is small enough that owning the bytes is
//! simpler than carrying a PDF library.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, page tree, fonts, pages, streams)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points at the catalog
//! %%EOF
//! ```
//!
//! Draw ops use top-down y; the flip to PDF's bottom-up coordinates happens
//! here, at write time.

use crate::error::ReportError;
use crate::surface::{DrawOp, Page};
use crate::text::Font;
use miniz_oxide::deflate::compress_to_vec_zlib;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize pages to PDF bytes. `extra_ops[i]` is appended after page
    /// `i`'s own ops without mutating the page; this is how the assembler
    /// stamps footers.
    pub fn write(&self, pages: &[Page], extra_ops: &[Vec<DrawOp>]) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Render("no pages to serialize".into()));
        }
        if !extra_ops.is_empty() && extra_ops.len() != pages.len() {
            return Err(ReportError::Render(format!(
                "footer op count {} does not match page count {}",
                extra_ops.len(),
                pages.len()
            )));
        }

        // 0 = free-list placeholder, 1 = Catalog, 2 = Pages tree, 3..=5 the
        // three standard fonts, then alternating content stream + page dicts.
        let mut objects: Vec<PdfObject> = Vec::new();
        objects.push(PdfObject { data: vec![] });
        objects.push(PdfObject { data: vec![] });
        objects.push(PdfObject { data: vec![] });

        for font in Font::ALL {
            objects.push(PdfObject {
                data: format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            });
        }
        let font_resources: String = Font::ALL
            .iter()
            .map(|f| format!("/F{} {} 0 R", f.resource_index(), 3 + f.resource_index()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            let mut stream = String::new();
            for op in page.ops() {
                write_op(&mut stream, op, page.height);
            }
            if let Some(extra) = extra_ops.get(i) {
                for op in extra {
                    write_op(&mut stream, op, page.height);
                }
            }
            let compressed = compress_to_vec_zlib(stream.as_bytes(), 6);

            let content_obj_id = objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            objects.push(PdfObject { data: content_data });

            let page_obj_id = objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = objects.len();
        objects.push(PdfObject {
            data: b"<< /Producer (ledgerpress 0.3) /Creator (ledgerpress) >>".to_vec(),
        });

        Ok(serialize(&objects, info_obj_id))
    }

    /// Escape text for a PDF literal string. The fonts are WinAnsi-encoded,
    /// so Latin-1 characters become octal escapes; anything outside that
    /// range draws as `?` rather than mojibake.
    pub fn escape_pdf_string(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '(' => out.push_str("\\("),
                ')' => out.push_str("\\)"),
                '\\' => out.push_str("\\\\"),
                ' '..='~' => out.push(ch),
                '\u{A0}'..='\u{FF}' => {
                    let _ = write!(out, "\\{:03o}", ch as u32);
                }
                _ => out.push('?'),
            }
        }
        out
    }
}

/// Write one draw op as PDF content-stream operators.
fn write_op(stream: &mut String, op: &DrawOp, page_height: f64) {
    match op {
        DrawOp::Text {
            x,
            y,
            text,
            font,
            size,
            color,
        } => {
            let pdf_y = page_height - y;
            let _ = write!(
                stream,
                "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                color.r,
                color.g,
                color.b,
                font.resource_index(),
                size,
                x,
                pdf_y,
                PdfWriter::escape_pdf_string(text)
            );
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        } => {
            let _ = write!(
                stream,
                "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                color.r,
                color.g,
                color.b,
                thickness,
                x1,
                page_height - y1,
                x2,
                page_height - y2,
            );
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            // Top-left origin -> PDF's bottom-left.
            let pdf_y = page_height - y - height;
            if let Some(fill) = fill {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                    fill.r, fill.g, fill.b, x, pdf_y, width, height,
                );
            }
            if let Some(stroke) = stroke {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                    stroke.color.r, stroke.color.g, stroke.color.b, stroke.width, x, pdf_y, width, height,
                );
            }
        }
    }
}

fn serialize(objects: &[PdfObject], info_obj_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let header = format!("{} 0 obj\n", i);
        output.extend_from_slice(header.as_bytes());
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len(),
        info_obj_id,
        xref_offset
    );

    output
}
