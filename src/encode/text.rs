//! Plain-text output.

use crate::book::Book;
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::progress::ProgressSink;

/// Uppercased headings, underline rules, raw chapter content. No escaping:
/// the output is the text itself.
pub struct TxtEncoder;

impl Encoder for TxtEncoder {
    fn format(&self) -> Format {
        Format::Txt
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Generating text content...");

        let mut content = String::new();

        content.push_str(&book.title.to_uppercase());
        content.push('\n');
        content.push_str(&format!("by {}\n\n", book.author));

        if let Some(description) = &book.description {
            content.push_str(&format!("{}\n\n", description));
        }

        content.push_str(&"=".repeat(61));
        content.push_str("\n\n");

        let total = book.total_chapters();
        let mut processed = 0usize;

        for volume in &book.volumes {
            content.push_str(&volume.name.to_uppercase());
            content.push('\n');
            content.push_str(&"-".repeat(volume.name.chars().count()));
            content.push_str("\n\n");

            for chapter in &volume.chapters {
                let percentage = (10.0 + (processed as f64 / total as f64) * 80.0) as u8;
                progress.progress(
                    percentage,
                    &format!("Processing chapter {} of {}...", processed + 1, total),
                );

                content.push_str(&format!("Chapter {}: {}\n\n", chapter.index, chapter.title));
                content.push_str(&format!("{}\n\n", chapter.content));
                content.push('\n');
                content.push_str(&"-".repeat(40));
                content.push_str("\n\n");

                processed += 1;
            }
        }

        progress.progress(95, "Creating download...");

        Ok(content.into_bytes())
    }
}
