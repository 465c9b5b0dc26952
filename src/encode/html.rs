//! Zipped HTML bundle output.
//!
//! A browsable directory: `index.html` with a per-volume table of contents,
//! one HTML page per chapter with navigation links at the top and bottom, and
//! a shared stylesheet. Navigation order follows document order; the last
//! chapter of a volume links forward to the first chapter of the next volume.

use crate::archive::ArchiveBuilder;
use crate::book::{Book, Chapter, Volume};
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::escape::escape_markup;
use crate::progress::ProgressSink;
use crate::util::split_paragraphs;

pub struct HtmlEncoder;

impl Encoder for HtmlEncoder {
    fn format(&self) -> Format {
        Format::Html
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Creating HTML structure...");

        let mut archive = ArchiveBuilder::new();
        archive.add_text("styles.css", BUNDLE_CSS)?;

        progress.progress(20, "Generating index page...");
        archive.add_text("index.html", &generate_index(book))?;

        progress.progress(30, "Creating chapter files...");

        let total = book.total_chapters();
        let mut processed = 0usize;

        for (vi, volume) in book.volumes.iter().enumerate() {
            for (ci, chapter) in volume.chapters.iter().enumerate() {
                let links = NavLinks::for_chapter(book, vi, ci);
                let path = format!("{}.html", volume.chapter_key(chapter));
                archive.add_text(&path, &generate_chapter(book, volume, chapter, &links))?;

                processed += 1;
                let percentage = (30.0 + (processed as f64 / total as f64) * 60.0) as u8;
                progress.progress(
                    percentage,
                    &format!("Processing chapter {} of {}...", processed, total),
                );
            }
        }

        progress.progress(95, "Creating download...");
        archive.finish()
    }
}

/// Previous/next targets for one chapter page, as file stems.
struct NavLinks {
    previous: Option<String>,
    next: Option<String>,
}

impl NavLinks {
    fn for_chapter(book: &Book, volume_pos: usize, chapter_pos: usize) -> Self {
        let volume = &book.volumes[volume_pos];

        let previous = chapter_pos
            .checked_sub(1)
            .map(|p| volume.chapter_key(&volume.chapters[p]));

        let next = if chapter_pos + 1 < volume.chapters.len() {
            Some(volume.chapter_key(&volume.chapters[chapter_pos + 1]))
        } else {
            // Roll over into the next volume's opening chapter
            book.volumes
                .get(volume_pos + 1)
                .and_then(|v| v.chapters.first().map(|c| v.chapter_key(c)))
        };

        NavLinks { previous, next }
    }
}

fn nav_block(links: &NavLinks) -> String {
    let mut nav = String::from("        <div class=\"navigation\">\n");
    nav.push_str("            <a href=\"index.html\" class=\"nav-button\">\u{2190} Table of Contents</a>\n");
    if let Some(previous) = &links.previous {
        nav.push_str(&format!(
            "            <a href=\"{}.html\" class=\"nav-button\">\u{2190} Previous</a>\n",
            previous
        ));
    }
    if let Some(next) = &links.next {
        nav.push_str(&format!(
            "            <a href=\"{}.html\" class=\"nav-button\">Next \u{2192}</a>\n",
            next
        ));
    }
    nav.push_str("        </div>\n");
    nav
}

fn generate_index(book: &Book) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <div class="container">
        <div class="book-header">
            <h1>{}</h1>
            <p class="author">by {}</p>
"#,
        escape_markup(&book.title),
        escape_markup(&book.title),
        escape_markup(&book.author)
    );

    if let Some(description) = &book.description {
        html.push_str(&format!(
            "            <p class=\"description\">{}</p>\n",
            escape_markup(description)
        ));
    }

    html.push_str(
        "        </div>\n\n        <div class=\"table-of-contents\">\n            <h2>Table of Contents</h2>\n",
    );

    for volume in &book.volumes {
        html.push_str(&format!(
            "            <div class=\"volume-nav\">\n                <h3>{}</h3>\n",
            escape_markup(&volume.name)
        ));
        for chapter in &volume.chapters {
            html.push_str(&format!(
                "                <a href=\"{}.html\">{}</a>\n",
                volume.chapter_key(chapter),
                escape_markup(&chapter.title)
            ));
        }
        html.push_str("            </div>\n");
    }

    html.push_str("        </div>\n    </div>\n</body>\n</html>");
    html
}

fn generate_chapter(book: &Book, volume: &Volume, chapter: &Chapter, links: &NavLinks) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - {}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <div class="container">
"#,
        escape_markup(&chapter.title),
        escape_markup(&book.title)
    );

    html.push_str(&nav_block(links));

    html.push_str(&format!(
        "\n        <h1>{}</h1>\n        <h2>{}</h2>\n",
        escape_markup(&chapter.title),
        escape_markup(&volume.name)
    ));

    for paragraph in split_paragraphs(&chapter.content) {
        html.push_str(&format!("        <p>{}</p>\n", escape_markup(paragraph)));
    }

    html.push('\n');
    html.push_str(&nav_block(links));
    html.push_str("    </div>\n</body>\n</html>");
    html
}

const BUNDLE_CSS: &str = r#"body {
    font-family: Georgia, serif;
    line-height: 1.6;
    margin: 0;
    padding: 20px;
    background: #fafafa;
    color: #333;
}

.container {
    max-width: 800px;
    margin: 0 auto;
    background: white;
    padding: 40px;
    box-shadow: 0 0 20px rgba(0,0,0,0.1);
}

h1 {
    color: #2c3e50;
    font-size: 2.5em;
    margin-bottom: 0.5em;
    text-align: center;
    border-bottom: 3px solid #3498db;
    padding-bottom: 10px;
}

h2 {
    color: #34495e;
    font-size: 2em;
    margin-top: 2em;
    margin-bottom: 1em;
}

h3 {
    color: #2c3e50;
    font-size: 1.5em;
    margin-top: 1.5em;
    margin-bottom: 0.75em;
}

.book-header {
    text-align: center;
    margin-bottom: 3em;
    padding-bottom: 2em;
    border-bottom: 1px solid #ddd;
}

.author {
    font-size: 1.2em;
    color: #666;
    margin-bottom: 1em;
}

.description {
    font-style: italic;
    color: #555;
    margin-bottom: 2em;
}

.volume-nav {
    background: #f8f9fa;
    padding: 20px;
    margin: 20px 0;
    border-radius: 8px;
}

.chapter-nav {
    margin: 20px 0;
}

.chapter-nav a, .volume-nav a {
    display: inline-block;
    margin: 5px 10px 5px 0;
    padding: 8px 15px;
    background: #3498db;
    color: white;
    text-decoration: none;
    border-radius: 4px;
    transition: background 0.3s;
}

.chapter-nav a:hover, .volume-nav a:hover {
    background: #2980b9;
}

.navigation {
    background: #ecf0f1;
    padding: 20px;
    margin: 20px 0;
    border-radius: 8px;
    text-align: center;
}

.nav-button {
    display: inline-block;
    padding: 10px 20px;
    margin: 0 10px;
    background: #3498db;
    color: white;
    text-decoration: none;
    border-radius: 4px;
    transition: background 0.3s;
}

.nav-button:hover {
    background: #2980b9;
}

p {
    text-align: justify;
    text-indent: 2em;
    margin-bottom: 1em;
}

p:first-child {
    text-indent: 0;
}

@media (max-width: 600px) {
    body {
        padding: 10px;
    }

    .container {
        padding: 20px;
    }

    h1 {
        font-size: 2em;
    }

    h2 {
        font-size: 1.5em;
    }

    h3 {
        font-size: 1.2em;
    }

    .chapter-nav a, .volume-nav a {
        display: block;
        margin: 5px 0;
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::io::Read;

    fn two_volume_book() -> Book {
        Book::from_json_str(
            r#"{
                "title": "T",
                "author": "A",
                "content": [
                    {"volume_index": 1, "volume_name": "V1", "chapters": [
                        {"chapter_index": 1, "chapter_title": "C1", "chapter_content": "a"},
                        {"chapter_index": 2, "chapter_title": "C2", "chapter_content": "b"}
                    ]},
                    {"volume_index": 2, "volume_name": "V2", "chapters": [
                        {"chapter_index": 1, "chapter_title": "C3", "chapter_content": "c"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn read_entry(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_bundle_entries() {
        let bytes = HtmlEncoder.encode(&two_volume_book(), &mut NullProgress).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "styles.css",
                "index.html",
                "vol1_ch1.html",
                "vol1_ch2.html",
                "vol2_ch1.html",
            ]
        );
    }

    #[test]
    fn test_index_links_all_chapters() {
        let bytes = HtmlEncoder.encode(&two_volume_book(), &mut NullProgress).unwrap();
        let index = read_entry(bytes, "index.html");

        assert!(index.contains("<a href=\"vol1_ch1.html\">C1</a>"));
        assert!(index.contains("<a href=\"vol1_ch2.html\">C2</a>"));
        assert!(index.contains("<a href=\"vol2_ch1.html\">C3</a>"));
        assert!(index.contains("<h3>V1</h3>"));
        assert!(index.contains("<h3>V2</h3>"));
    }

    #[test]
    fn test_chapter_navigation_within_volume() {
        let bytes = HtmlEncoder.encode(&two_volume_book(), &mut NullProgress).unwrap();
        let page = read_entry(bytes, "vol1_ch2.html");

        assert!(page.contains("<a href=\"index.html\" class=\"nav-button\">"));
        assert!(page.contains("<a href=\"vol1_ch1.html\" class=\"nav-button\">\u{2190} Previous</a>"));
        // End of volume 1 rolls over to volume 2's first chapter
        assert!(page.contains("<a href=\"vol2_ch1.html\" class=\"nav-button\">Next \u{2192}</a>"));
        // Nav appears top and bottom
        assert_eq!(page.matches("class=\"navigation\"").count(), 2);
    }

    #[test]
    fn test_first_and_last_chapters_omit_dead_links() {
        let bytes = HtmlEncoder.encode(&two_volume_book(), &mut NullProgress).unwrap();
        let first = read_entry(bytes.clone(), "vol1_ch1.html");
        assert!(!first.contains("Previous"));
        assert!(first.contains("Next"));

        let last = read_entry(bytes, "vol2_ch1.html");
        assert!(!last.contains("Next"));
        assert!(!last.contains("Previous"));
    }
}
