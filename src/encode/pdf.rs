//! PDF output.
//!
//! A text-only paginated rendition built directly on `pdf-writer`: A4 pages,
//! one base-14 Helvetica font, millimeter-based layout mirroring the other
//! print-oriented encoders. Title page first, then each volume opens a fresh
//! page; chapter content wraps greedily and overflows onto new pages.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::book::Book;
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::progress::ProgressSink;

const MM_TO_PT: f32 = 72.0 / 25.4;
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const MAX_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

/// Average glyph advance as a fraction of the font size. Helvetica metrics
/// hover around this for body text; good enough for wrap estimation.
const AVG_GLYPH_FACTOR: f32 = 0.5;

pub struct PdfEncoder;

impl Encoder for PdfEncoder {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Initializing PDF generator...");

        let mut doc = Composer::new();

        progress.progress(20, "Adding title page...");

        doc.text_centered(24.0, 50.0, &book.title);
        doc.text_centered(16.0, 70.0, &format!("by {}", book.author));

        if let Some(description) = &book.description {
            let line_height = 12.0 * 1.15 / MM_TO_PT;
            let mut y = 100.0;
            for line in wrap_text(description, 12.0, MAX_WIDTH_MM) {
                doc.text_centered(12.0, y, &line);
                y += line_height;
            }
        }

        let total = book.total_chapters();
        let mut processed = 0usize;
        let mut current_y;

        for volume in &book.volumes {
            doc.new_page();
            doc.text_centered(20.0, 50.0, &volume.name);
            current_y = 80.0;

            for chapter in &volume.chapters {
                let percentage = (20.0 + (processed as f64 / total as f64) * 70.0) as u8;
                progress.progress(
                    percentage,
                    &format!("Processing chapter {} of {}...", processed + 1, total),
                );

                if current_y > PAGE_HEIGHT_MM - 60.0 {
                    doc.new_page();
                    current_y = MARGIN_MM;
                }

                doc.text(16.0, MARGIN_MM, current_y, &chapter.title);
                current_y += 20.0;

                for line in wrap_text(&chapter.content, 11.0, MAX_WIDTH_MM) {
                    if current_y > PAGE_HEIGHT_MM - MARGIN_MM {
                        doc.new_page();
                        current_y = MARGIN_MM;
                    }
                    doc.text(11.0, MARGIN_MM, current_y, &line);
                    current_y += 5.0;
                }

                current_y += 10.0; // gap between chapters
                processed += 1;
            }
        }

        progress.progress(95, "Finalizing PDF...");

        Ok(doc.finish())
    }
}

/// Accumulates page content streams and serializes the document skeleton
/// (catalog, page tree, one shared Type1 font) around them.
struct Composer {
    finished: Vec<Content>,
    current: Content,
}

impl Composer {
    fn new() -> Self {
        Composer {
            finished: Vec::new(),
            current: Content::new(),
        }
    }

    fn new_page(&mut self) {
        let page = std::mem::replace(&mut self.current, Content::new());
        self.finished.push(page);
    }

    /// Place a line of text with its left edge at `x_mm`, baseline `y_mm`
    /// measured from the top of the page.
    fn text(&mut self, size: f32, x_mm: f32, y_mm: f32, text: &str) {
        let x = x_mm * MM_TO_PT;
        let y = (PAGE_HEIGHT_MM - y_mm) * MM_TO_PT;
        let encoded = encode_win_ansi(text);

        self.current.begin_text();
        self.current.set_font(Name(b"F1"), size);
        self.current.next_line(x, y);
        self.current.show(Str(&encoded));
        self.current.end_text();
    }

    /// Place a line of text centered on the page.
    fn text_centered(&mut self, size: f32, y_mm: f32, text: &str) {
        let width_mm = estimate_width_mm(text, size);
        let x_mm = (PAGE_WIDTH_MM - width_mm) / 2.0;
        self.text(size, x_mm.max(MARGIN_MM), y_mm, text);
    }

    fn finish(mut self) -> Vec<u8> {
        self.finished.push(self.current);
        let pages = self.finished;

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_id = Ref::new(3);

        let mut next_id = 4;
        let mut ids = Vec::with_capacity(pages.len());
        for _ in &pages {
            ids.push((Ref::new(next_id), Ref::new(next_id + 1)));
            next_id += 2;
        }

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);

        {
            let mut page_tree = pdf.pages(page_tree_id);
            page_tree.kids(ids.iter().map(|(page_id, _)| *page_id));
            page_tree.count(pages.len() as i32);
        }

        let media_box = Rect::new(
            0.0,
            0.0,
            PAGE_WIDTH_MM * MM_TO_PT,
            PAGE_HEIGHT_MM * MM_TO_PT,
        );

        for (content, (page_id, content_id)) in pages.into_iter().zip(&ids) {
            let mut page = pdf.page(*page_id);
            page.media_box(media_box);
            page.parent(page_tree_id);
            page.contents(*content_id);
            page.resources().fonts().pair(Name(b"F1"), font_id);
            page.finish();

            pdf.stream(*content_id, &content.finish());
        }

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        pdf.finish()
    }
}

fn estimate_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_FACTOR / MM_TO_PT
}

/// Map text onto single-byte WinAnsi-style codes; anything outside the
/// single-byte range renders as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF { code as u8 } else { b'?' }
        })
        .collect()
}

/// Greedy word wrap against an estimated glyph width. Explicit newlines force
/// a break; over-long words are split mid-word.
fn wrap_text(text: &str, size: f32, max_width_mm: f32) -> Vec<String> {
    let char_width = size * AVG_GLYPH_FACTOR / MM_TO_PT;
    let max_chars = ((max_width_mm / char_width) as usize).max(1);

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        let mut line_chars = 0usize;
        for word in raw_line.split_whitespace() {
            let word_chars = word.chars().count();

            if line_chars > 0 && line_chars + 1 + word_chars > max_chars {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }

            if word_chars > max_chars {
                // Hard-break a word that cannot fit on any line
                let mut chunk = String::new();
                for c in word.chars() {
                    if chunk.chars().count() == max_chars {
                        lines.push(std::mem::take(&mut chunk));
                    }
                    chunk.push(c);
                }
                line = chunk;
                line_chars = line.chars().count();
                continue;
            }

            if line_chars > 0 {
                line.push(' ');
                line_chars += 1;
            }
            line.push_str(word);
            line_chars += word_chars;
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

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
                    {"volume_name": "V", "chapters": [
                        {"chapter_title": "C", "chapter_content": "Some chapter text."}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_pdf_magic_and_pages() {
        let bytes = PdfEncoder.encode(&sample_book(), &mut NullProgress).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        // Title page plus one volume page
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(text, 11.0, 40.0);
        assert!(lines.len() > 1);
        let max_chars = (40.0 / (11.0 * AVG_GLYPH_FACTOR / MM_TO_PT)) as usize;
        for line in &lines {
            assert!(line.chars().count() <= max_chars, "line too long: {}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_breaks_on_newline() {
        let lines = wrap_text("a\nb", 11.0, 170.0);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_text_hard_breaks_long_words() {
        let long = "x".repeat(500);
        let lines = wrap_text(&long, 11.0, 40.0);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().map(|l| l.chars().count()).sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn test_encode_win_ansi_fallback() {
        assert_eq!(encode_win_ansi("ab"), b"ab");
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
        assert_eq!(encode_win_ansi("你"), b"?");
    }
}
