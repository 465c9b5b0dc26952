//! RTF output.

use crate::book::Book;
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::escape::escape_rtf;
use crate::progress::ProgressSink;

/// A single-font RTF document: title page, page-broken volumes, bold chapter
/// headings. All user text passes through [`escape_rtf`], which also turns
/// every newline into a paragraph break, so chapter content keeps its line
/// structure rather than its blank-line paragraphing.
pub struct RtfEncoder;

impl Encoder for RtfEncoder {
    fn format(&self) -> Format {
        Format::Rtf
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Generating RTF content...");

        let mut rtf =
            String::from("{\\rtf1\\ansi\\deff0 {\\fonttbl {\\f0 Times New Roman;}}\\f0\\fs24 ");

        rtf.push_str(&format!("{{\\fs36\\b {}\\par}}", escape_rtf(&book.title)));
        rtf.push_str(&format!(
            "{{\\fs24 by {}\\par\\par}}",
            escape_rtf(&book.author)
        ));

        if let Some(description) = &book.description {
            rtf.push_str(&format!("{{\\fs20 {}\\par\\par}}", escape_rtf(description)));
        }

        let total = book.total_chapters();
        let mut processed = 0usize;

        for volume in &book.volumes {
            rtf.push_str(&format!(
                "{{\\page}}{{\\fs28\\b {}\\par\\par}}",
                escape_rtf(&volume.name)
            ));

            for chapter in &volume.chapters {
                let percentage = (10.0 + (processed as f64 / total as f64) * 80.0) as u8;
                progress.progress(
                    percentage,
                    &format!("Processing chapter {} of {}...", processed + 1, total),
                );

                rtf.push_str(&format!(
                    "{{\\fs24\\b {}\\par\\par}}",
                    escape_rtf(&chapter.title)
                ));
                rtf.push_str(&format!(
                    "{{\\fs20 {}\\par\\par}}",
                    escape_rtf(&chapter.content)
                ));

                processed += 1;
            }
        }

        rtf.push('}');

        progress.progress(95, "Creating download...");

        Ok(rtf.into_bytes())
    }
}
