//! MOBI and AZW output.
//!
//! Both are Palm database containers holding a single synthetic HTML document:
//! a 78-byte Palm header, a MOBI header record, then the uncompressed HTML
//! bytes. AZW differs in its `TPEZ` creator code, its longer header with
//! zeroed DRM fields, and slightly different Kindle styling in the document.

use crate::book::Book;
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::escape::escape_markup;
use crate::palm::{MobiVariant, mobi_header, palm_database_header};
use crate::progress::ProgressSink;
use crate::util::{random_u32, split_paragraphs, time_now_secs};

/// Classic Mobipocket container.
pub struct MobiEncoder;

impl Encoder for MobiEncoder {
    fn format(&self) -> Format {
        Format::Mobi
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Initializing MOBI generator...");
        progress.progress(20, "Building MOBI structure...");

        let html = document_html(book, MobiVariant::Mobi);

        progress.progress(40, "Processing content...");
        progress.progress(60, "Creating MOBI file structure...");

        let bytes = assemble(book, MobiVariant::Mobi, &html);

        progress.progress(80, "Assembling MOBI file...");
        progress.progress(95, "Creating download...");
        Ok(bytes)
    }
}

/// Kindle-flavored container with the `TPEZ` creator and DRM header fields.
pub struct AzwEncoder;

impl Encoder for AzwEncoder {
    fn format(&self) -> Format {
        Format::Azw
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Initializing AZW generator...");
        progress.progress(20, "Building AZW structure...");

        let html = document_html(book, MobiVariant::Azw);

        progress.progress(40, "Creating AZW headers...");

        let bytes = assemble(book, MobiVariant::Azw, &html);

        progress.progress(80, "Assembling AZW file...");
        progress.progress(95, "Creating download...");
        Ok(bytes)
    }
}

fn assemble(book: &Book, variant: MobiVariant, html: &str) -> Vec<u8> {
    let palm = palm_database_header(&book.title, variant, time_now_secs());
    let mobi = mobi_header(variant, &book.title, random_u32());
    let html_bytes = html.as_bytes();

    let mut out = Vec::with_capacity(palm.len() + mobi.len() + html_bytes.len());
    out.extend_from_slice(&palm);
    out.extend_from_slice(&mobi);
    out.extend_from_slice(html_bytes);
    out
}

/// The whole book as one HTML document: title page, volume headings, chapter
/// divs with paragraph markup.
fn document_html(book: &Book, variant: MobiVariant) -> String {
    let mut html = match variant {
        MobiVariant::Mobi => format!(
            "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{}</title>\n    <style>{}</style>\n</head>\n<body>",
            escape_markup(&book.title),
            MOBI_STYLE
        ),
        MobiVariant::Azw => format!(
            "<!DOCTYPE html>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{}</title>\n    <style>{}</style>\n</head>\n<body>",
            escape_markup(&book.title),
            AZW_STYLE
        ),
    };

    html.push_str(&format!("<h1>{}</h1>", escape_markup(&book.title)));
    match variant {
        MobiVariant::Mobi => html.push_str(&format!(
            "<p class=\"author\">By {}</p>",
            escape_markup(&book.author)
        )),
        MobiVariant::Azw => html.push_str(&format!(
            "<p class=\"author no-indent\">By {}</p>",
            escape_markup(&book.author)
        )),
    }

    if let Some(description) = &book.description {
        html.push_str(&format!(
            "<p class=\"description\">{}</p>",
            escape_markup(description)
        ));
    }

    for volume in &book.volumes {
        html.push_str(&format!(
            "<h2>Volume {}: {}</h2>",
            volume.index,
            escape_markup(&volume.name)
        ));

        for chapter in &volume.chapters {
            html.push_str("<div class=\"chapter\">");
            html.push_str(&format!(
                "<h3>Chapter {}: {}</h3>",
                chapter.index,
                escape_markup(&chapter.title)
            ));

            for (i, paragraph) in split_paragraphs(&chapter.content).iter().enumerate() {
                // Kindle layout suppresses the indent on a chapter's opener
                if variant == MobiVariant::Azw && i == 0 {
                    html.push_str(&format!(
                        "<p class=\"no-indent\">{}</p>",
                        escape_markup(paragraph)
                    ));
                } else {
                    html.push_str(&format!("<p>{}</p>", escape_markup(paragraph)));
                }
            }

            html.push_str("</div>");
        }
    }

    html.push_str("</body></html>");
    html
}

const MOBI_STYLE: &str = "\n        body { font-family: serif; line-height: 1.6; margin: 20px; }\n        h1 { text-align: center; page-break-before: always; }\n        h2 { text-align: center; page-break-before: always; }\n        h3 { text-align: center; margin-top: 30px; }\n        .author { text-align: center; font-style: italic; margin-bottom: 30px; }\n        .description { text-align: justify; margin-bottom: 30px; }\n        .chapter { page-break-before: always; }\n        p { text-align: justify; text-indent: 2em; margin-bottom: 1em; }\n    ";

const AZW_STYLE: &str = "\n        body { font-family: serif; line-height: 1.6; margin: 10px; text-align: justify; }\n        h1 { text-align: center; page-break-before: always; font-size: 1.8em; margin-bottom: 0.5em; }\n        h2 { text-align: center; page-break-before: always; font-size: 1.5em; margin-top: 2em; }\n        h3 { text-align: center; margin-top: 1.5em; font-size: 1.3em; }\n        .author { text-align: center; font-style: italic; margin-bottom: 2em; }\n        .description { text-align: justify; margin-bottom: 2em; font-style: italic; }\n        .chapter { page-break-before: always; margin-bottom: 2em; }\n        p { text-align: justify; text-indent: 1.5em; margin-bottom: 1em; }\n        .no-indent { text-indent: 0; }\n    ";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    fn sample_book() -> Book {
        Book::from_json_str(
            r#"{
                "title": "T",
                "author": "A",
                "description": "D",
                "content": [
                    {"volume_index": 1, "volume_name": "V", "chapters": [
                        {"chapter_index": 2, "chapter_title": "C", "chapter_content": "P1\n\nP2"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_mobi_file_layout() {
        let bytes = MobiEncoder.encode(&sample_book(), &mut NullProgress).unwrap();

        assert_eq!(&bytes[0..1], b"T");
        assert_eq!(&bytes[60..64], b"BOOK");
        assert_eq!(&bytes[64..68], b"MOBI");
        // MOBI header record starts right after the Palm header
        assert_eq!(&bytes[78..82], b"MOBI");
        let tail = String::from_utf8_lossy(&bytes[78 + 232 + 1..]);
        assert!(tail.contains("<h2>Volume 1: V</h2>"));
        assert!(tail.contains("<h3>Chapter 2: C</h3>"));
        assert!(tail.contains("<p>P1</p>"));
        assert!(tail.contains("<p>P2</p>"));
    }

    #[test]
    fn test_azw_file_layout() {
        let bytes = AzwEncoder.encode(&sample_book(), &mut NullProgress).unwrap();

        assert_eq!(&bytes[64..68], b"TPEZ");
        assert_eq!(&bytes[78..82], b"MOBI");
        let tail = String::from_utf8_lossy(&bytes[78 + 248..]);
        assert!(tail.contains("<html xmlns=\"http://www.w3.org/1999/xhtml\">"));
        assert!(tail.contains("<p class=\"author no-indent\">By A</p>"));
        assert!(tail.contains("<p class=\"no-indent\">P1</p>"));
        assert!(tail.contains("<p>P2</p>"));
    }

    #[test]
    fn test_mobi_document_escapes_markup() {
        let book = Book::from_json_str(
            r#"{
                "title": "T",
                "author": "A & B",
                "content": [
                    {"volume_name": "V", "chapters": [
                        {"chapter_title": "a < b", "chapter_content": "x"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let html = document_html(&book, MobiVariant::Mobi);
        assert!(html.contains("By A &amp; B"));
        assert!(html.contains("Chapter 0: a &lt; b"));
    }
}
