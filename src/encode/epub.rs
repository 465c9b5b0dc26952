//! EPUB and AZW3 output.
//!
//! Both formats package the same OCF directory tree: an OPF package document,
//! an NCX and an XHTML table of contents, one XHTML file per chapter, the
//! stylesheet, and the cover image. They differ only in vendor dressing, so
//! one set of generators serves both, parameterized by [`PackageOptions`]:
//! AZW3 adds calibre metadata, an `opf:role` on the creator, Kindle CSS, and
//! skips the `mimetype` entry.

use crate::archive::ArchiveBuilder;
use crate::book::{Book, Chapter};
use crate::encode::{Encoder, Format};
use crate::error::Result;
use crate::escape::escape_markup;
use crate::progress::ProgressSink;
use crate::util::{iso_timestamp, split_paragraphs, uuid_v4};

/// Vendor-specific knobs for the shared package generators.
pub(crate) struct PackageOptions {
    pub package_prefix: Option<&'static str>,
    pub opf_namespace: bool,
    pub creator_role_aut: bool,
    pub publisher: &'static str,
    /// Emit the `<meta name="cover">` tag even without an attached cover.
    pub always_cover_meta: bool,
    pub calibre_metas: bool,
    pub css: &'static str,
}

const EPUB_OPTIONS: PackageOptions = PackageOptions {
    package_prefix: None,
    opf_namespace: false,
    creator_role_aut: false,
    publisher: "JSON2EPUB Converter",
    always_cover_meta: false,
    calibre_metas: false,
    css: EPUB_CSS,
};

const AZW3_OPTIONS: PackageOptions = PackageOptions {
    package_prefix: Some("calibre: https://calibre-ebook.com"),
    opf_namespace: true,
    creator_role_aut: true,
    publisher: "JSON2eBook Converter",
    always_cover_meta: true,
    calibre_metas: true,
    css: AZW3_CSS,
};

/// Standard EPUB 3 with an OCF `mimetype` entry.
pub struct EpubEncoder;

impl Encoder for EpubEncoder {
    fn format(&self) -> Format {
        Format::Epub
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Initializing EPUB generator...");

        let mut archive = ArchiveBuilder::new();

        // mimetype must be the first entry and uncompressed
        archive.add_stored_text("mimetype", "application/epub+zip")?;
        archive.add_folder("META-INF")?;
        archive.add_text("META-INF/container.xml", CONTAINER_XML)?;
        archive.add_folder("OEBPS")?;

        progress.progress(20, "Adding metadata...");

        archive.add_text("OEBPS/content.opf", &generate_opf(book, &EPUB_OPTIONS))?;
        archive.add_text("OEBPS/toc.ncx", &generate_ncx(book))?;
        archive.add_text("OEBPS/toc.xhtml", &generate_toc_xhtml(book))?;

        progress.progress(30, "Processing chapters...");
        add_chapters(&mut archive, book, progress, 30.0, 50.0)?;

        progress.progress(85, "Adding styles and images...");
        add_cover(&mut archive, book)?;
        archive.add_text("OEBPS/styles/style.css", EPUB_OPTIONS.css)?;

        progress.progress(95, "Finalizing EPUB...");
        archive.finish()
    }
}

/// EPUB-shaped package with calibre/Kindle metadata and no `mimetype` entry.
pub struct Azw3Encoder;

impl Encoder for Azw3Encoder {
    fn format(&self) -> Format {
        Format::Azw3
    }

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        progress.progress(10, "Initializing AZW3 generator...");
        progress.progress(20, "Building AZW3 structure...");

        let mut archive = ArchiveBuilder::new();
        archive.add_folder("META-INF")?;
        archive.add_text("META-INF/container.xml", CONTAINER_XML)?;
        archive.add_folder("OEBPS")?;

        progress.progress(30, "Adding AZW3 metadata...");

        archive.add_text("OEBPS/content.opf", &generate_opf(book, &AZW3_OPTIONS))?;
        archive.add_text("OEBPS/toc.ncx", &generate_ncx(book))?;
        archive.add_text("OEBPS/toc.xhtml", &generate_toc_xhtml(book))?;

        progress.progress(50, "Processing chapters...");
        add_chapters(&mut archive, book, progress, 50.0, 30.0)?;

        add_cover(&mut archive, book)?;
        archive.add_text("OEBPS/styles/style.css", AZW3_OPTIONS.css)?;

        progress.progress(90, "Finalizing AZW3 file...");
        let bytes = archive.finish()?;
        progress.progress(95, "Creating download...");
        Ok(bytes)
    }
}

fn add_chapters(
    archive: &mut ArchiveBuilder,
    book: &Book,
    progress: &mut dyn ProgressSink,
    base: f64,
    span: f64,
) -> Result<()> {
    let total = book.total_chapters();
    let mut processed = 0usize;

    for volume in &book.volumes {
        for chapter in &volume.chapters {
            let path = format!("OEBPS/content/{}.xhtml", volume.chapter_key(chapter));
            archive.add_text(&path, &generate_chapter_xhtml(chapter))?;

            processed += 1;
            let percentage = (base + (processed as f64 / total as f64) * span) as u8;
            progress.progress(
                percentage,
                &format!("Processing chapter {} of {}...", processed, total),
            );
        }
    }
    Ok(())
}

fn add_cover(archive: &mut ArchiveBuilder, book: &Book) -> Result<()> {
    if let Some(cover) = &book.cover_image {
        let path = format!("OEBPS/images/cover.{}", cover.extension);
        archive.add_base64(&path, cover.base64_payload())?;
    }
    Ok(())
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

fn generate_opf(book: &Book, options: &PackageOptions) -> String {
    let uuid = uuid_v4();
    let now = iso_timestamp();

    let mut opf = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    match options.package_prefix {
        Some(prefix) => opf.push_str(&format!(
            "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"BookId\" prefix=\"{}\">\n",
            prefix
        )),
        None => opf.push_str(
            "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"BookId\">\n",
        ),
    }

    if options.opf_namespace {
        opf.push_str("    <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:opf=\"http://www.idpf.org/2007/opf\">\n");
    } else {
        opf.push_str("    <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
    }

    opf.push_str(&format!(
        "        <dc:title>{}</dc:title>\n",
        escape_markup(&book.title)
    ));
    if options.creator_role_aut {
        opf.push_str(&format!(
            "        <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
            escape_markup(&book.author)
        ));
    } else {
        opf.push_str(&format!(
            "        <dc:creator>{}</dc:creator>\n",
            escape_markup(&book.author)
        ));
    }
    opf.push_str("        <dc:language>en</dc:language>\n");
    opf.push_str(&format!(
        "        <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        uuid
    ));
    opf.push_str(&format!(
        "        <meta property=\"dcterms:modified\">{}</meta>\n",
        now
    ));
    opf.push_str(&format!(
        "        <dc:description>{}</dc:description>\n",
        escape_markup(book.description.as_deref().unwrap_or(""))
    ));
    opf.push_str(&format!(
        "        <dc:publisher>{}</dc:publisher>\n",
        options.publisher
    ));
    opf.push_str("        <dc:rights>All rights reserved</dc:rights>\n");
    opf.push_str(&format!("        <dc:date>{}</dc:date>\n", now));

    if options.always_cover_meta || book.cover_image.is_some() {
        opf.push_str("        <meta name=\"cover\" content=\"cover-image\"/>\n");
    }
    if options.calibre_metas {
        opf.push_str("        <meta name=\"calibre:series_index\" content=\"1\"/>\n");
        opf.push_str(&format!(
            "        <meta name=\"calibre:timestamp\" content=\"{}\"/>\n",
            now
        ));
        opf.push_str(&format!(
            "        <meta name=\"calibre:title_sort\" content=\"{}\"/>\n",
            escape_markup(&book.title)
        ));
        opf.push_str("        <meta name=\"calibre:author_link_map\" content=\"{}\"/>\n");
    }

    opf.push_str("    </metadata>\n    <manifest>\n");
    opf.push_str(
        "        <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    opf.push_str(
        "        <item id=\"nav\" href=\"toc.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
    );
    opf.push_str("        <item id=\"css\" href=\"styles/style.css\" media-type=\"text/css\"/>\n");

    if let Some(cover) = &book.cover_image {
        opf.push_str(&format!(
            "        <item id=\"cover-image\" href=\"images/cover.{}\" media-type=\"{}\" properties=\"cover-image\"/>\n",
            cover.extension, cover.mime_type
        ));
    }

    for volume in &book.volumes {
        for chapter in &volume.chapters {
            let key = volume.chapter_key(chapter);
            opf.push_str(&format!(
                "        <item id=\"{}\" href=\"content/{}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
                key, key
            ));
        }
    }

    opf.push_str("    </manifest>\n    <spine toc=\"ncx\">\n");
    opf.push_str("        <itemref idref=\"nav\"/>\n");

    for volume in &book.volumes {
        for chapter in &volume.chapters {
            opf.push_str(&format!(
                "        <itemref idref=\"{}\"/>\n",
                volume.chapter_key(chapter)
            ));
        }
    }

    opf.push_str("    </spine>\n</package>");
    opf
}

fn generate_ncx(book: &Book) -> String {
    let uuid = uuid_v4();

    let mut ncx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <head>
        <meta name="dtb:uid" content="{}"/>
        <meta name="dtb:depth" content="2"/>
        <meta name="dtb:totalPageCount" content="0"/>
        <meta name="dtb:maxPageNumber" content="0"/>
    </head>
    <docTitle>
        <text>{}</text>
    </docTitle>
    <navMap>
"#,
        uuid,
        escape_markup(&book.title)
    );

    // playOrder 1 is the table of contents itself
    ncx.push_str(
        r#"        <navPoint id="navPoint-1" playOrder="1">
            <navLabel>
                <text>Table of Contents</text>
            </navLabel>
            <content src="toc.xhtml"/>
        </navPoint>
"#,
    );

    let mut play_order = 2;
    for volume in &book.volumes {
        for chapter in &volume.chapters {
            let label = format!("{} - {}", volume.name, chapter.title);
            ncx.push_str(&format!(
                r#"        <navPoint id="navPoint-{}" playOrder="{}">
            <navLabel>
                <text>{}</text>
            </navLabel>
            <content src="content/{}.xhtml"/>
        </navPoint>
"#,
                play_order,
                play_order,
                escape_markup(&label),
                volume.chapter_key(chapter)
            ));
            play_order += 1;
        }
    }

    ncx.push_str("    </navMap>\n</ncx>");
    ncx
}

fn generate_toc_xhtml(book: &Book) -> String {
    let mut toc = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
    <title>Table of Contents</title>
    <link rel="stylesheet" href="styles/style.css"/>
</head>
<body>
    <nav epub:type="toc" id="toc">
        <h1>Table of Contents</h1>
        <ol>
"#,
    );

    for volume in &book.volumes {
        toc.push_str(&format!(
            "            <li><span>{}</span>\n                <ol>\n",
            escape_markup(&volume.name)
        ));
        for chapter in &volume.chapters {
            toc.push_str(&format!(
                "                    <li><a href=\"content/{}.xhtml\">{}</a></li>\n",
                volume.chapter_key(chapter),
                escape_markup(&chapter.title)
            ));
        }
        toc.push_str("                </ol>\n            </li>\n");
    }

    toc.push_str("        </ol>\n    </nav>\n</body>\n</html>");
    toc
}

fn generate_chapter_xhtml(chapter: &Chapter) -> String {
    let paragraphs: Vec<String> = split_paragraphs(&chapter.content)
        .iter()
        .map(|p| format!("<p>{}</p>", escape_markup(p)))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
    <title>{}</title>
    <link rel="stylesheet" href="../styles/style.css"/>
</head>
<body>
    <h1>{}</h1>
    {}
</body>
</html>"#,
        escape_markup(&chapter.title),
        escape_markup(&chapter.title),
        paragraphs.join("\n    ")
    )
}

const EPUB_CSS: &str = r#"body {
    font-family: Georgia, serif;
    line-height: 1.6;
    margin: 2em;
    color: #333;
}

h1 {
    color: #2c3e50;
    font-size: 2em;
    margin-bottom: 1em;
    text-align: center;
    border-bottom: 2px solid #3498db;
    padding-bottom: 0.5em;
}

h2 {
    color: #34495e;
    font-size: 1.5em;
    margin-top: 2em;
    margin-bottom: 1em;
}

h3 {
    color: #2c3e50;
    font-size: 1.2em;
    margin-top: 1.5em;
    margin-bottom: 0.75em;
}

p {
    margin-bottom: 1em;
    text-align: justify;
    text-indent: 2em;
}

p:first-child {
    text-indent: 0;
}

/* Table of Contents */
nav#toc ol {
    list-style-type: none;
    padding-left: 0;
}

nav#toc ol ol {
    padding-left: 2em;
    list-style-type: decimal;
}

nav#toc a {
    color: #3498db;
    text-decoration: none;
    padding: 0.2em 0;
    display: block;
}

nav#toc a:hover {
    color: #2980b9;
    text-decoration: underline;
}

nav#toc span {
    font-weight: bold;
    color: #2c3e50;
    font-size: 1.1em;
}

@media screen and (max-width: 600px) {
    body {
        margin: 1em;
        font-size: 0.9em;
    }

    h1 {
        font-size: 1.5em;
    }

    h2 {
        font-size: 1.3em;
    }

    h3 {
        font-size: 1.1em;
    }
}"#;

const AZW3_CSS: &str = r#"@namespace h "http://www.w3.org/1999/xhtml";

body {
    font-family: serif;
    line-height: 1.6;
    margin: 0;
    padding: 10px;
    text-align: justify;
}

h1, h2, h3 {
    text-align: center;
    font-weight: bold;
    page-break-after: avoid;
}

h1 {
    font-size: 1.8em;
    margin: 2em 0 1em 0;
    page-break-before: always;
}

h2 {
    font-size: 1.5em;
    margin: 2em 0 1em 0;
    page-break-before: always;
}

h3 {
    font-size: 1.3em;
    margin: 1.5em 0 1em 0;
}

p {
    text-align: justify;
    text-indent: 1.5em;
    margin: 0 0 1em 0;
    orphans: 2;
    widows: 2;
}

.no-indent {
    text-indent: 0;
}

.author {
    text-align: center;
    font-style: italic;
    margin-bottom: 2em;
}

.description {
    font-style: italic;
    margin-bottom: 2em;
}

.chapter {
    page-break-before: always;
    margin-bottom: 2em;
}

/* Kindle-specific improvements */
@media amzn-kf8 {
    body {
        font-size: 1em;
    }

    h1 {
        font-size: 1.6em;
    }

    h2 {
        font-size: 1.4em;
    }

    h3 {
        font-size: 1.2em;
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::CoverImage;
    use crate::progress::NullProgress;

    fn sample_book() -> Book {
        Book::from_json_str(
            r#"{
                "title": "A & B",
                "author": "C",
                "content": [
                    {"volume_index": 1, "volume_name": "V1", "chapters": [
                        {"chapter_index": 1, "chapter_title": "One", "chapter_content": "P1\n\nP2"},
                        {"chapter_index": 2, "chapter_title": "Two", "chapter_content": "P3"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_opf_epub_flavor() {
        let opf = generate_opf(&sample_book(), &EPUB_OPTIONS);

        assert!(opf.contains("<dc:title>A &amp; B</dc:title>"));
        assert!(opf.contains("<dc:creator>C</dc:creator>"));
        assert!(opf.contains("<dc:publisher>JSON2EPUB Converter</dc:publisher>"));
        assert!(!opf.contains("prefix=\"calibre"));
        assert!(!opf.contains("calibre:series_index"));
        // No cover attached, no cover meta
        assert!(!opf.contains("meta name=\"cover\""));
        assert!(opf.contains("<item id=\"vol1_ch1\" href=\"content/vol1_ch1.xhtml\""));
        assert!(opf.contains("<itemref idref=\"nav\"/>"));
        assert!(opf.contains("<itemref idref=\"vol1_ch2\"/>"));
    }

    #[test]
    fn test_opf_azw3_flavor() {
        let opf = generate_opf(&sample_book(), &AZW3_OPTIONS);

        assert!(opf.contains("prefix=\"calibre: https://calibre-ebook.com\""));
        assert!(opf.contains("<dc:creator opf:role=\"aut\">C</dc:creator>"));
        assert!(opf.contains("<dc:publisher>JSON2eBook Converter</dc:publisher>"));
        assert!(opf.contains("<meta name=\"cover\" content=\"cover-image\"/>"));
        assert!(opf.contains("<meta name=\"calibre:series_index\" content=\"1\"/>"));
        assert!(opf.contains("<meta name=\"calibre:title_sort\" content=\"A &amp; B\"/>"));
        assert!(opf.contains("<meta name=\"calibre:author_link_map\" content=\"{}\"/>"));
    }

    #[test]
    fn test_opf_cover_manifest_item() {
        let book = sample_book()
            .with_cover_image(CoverImage::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap());
        let opf = generate_opf(&book, &EPUB_OPTIONS);

        assert!(opf.contains("<meta name=\"cover\" content=\"cover-image\"/>"));
        assert!(opf.contains(
            "<item id=\"cover-image\" href=\"images/cover.jpeg\" media-type=\"image/jpeg\" properties=\"cover-image\"/>"
        ));
    }

    #[test]
    fn test_ncx_play_order() {
        let ncx = generate_ncx(&sample_book());

        assert!(ncx.contains("<navPoint id=\"navPoint-1\" playOrder=\"1\">"));
        assert!(ncx.contains("<text>Table of Contents</text>"));
        assert!(ncx.contains("<content src=\"toc.xhtml\"/>"));
        assert!(ncx.contains("<navPoint id=\"navPoint-2\" playOrder=\"2\">"));
        assert!(ncx.contains("<text>V1 - One</text>"));
        assert!(ncx.contains("<content src=\"content/vol1_ch1.xhtml\"/>"));
        assert!(ncx.contains("<navPoint id=\"navPoint-3\" playOrder=\"3\">"));
        assert!(!ncx.contains("navPoint-4"));
    }

    #[test]
    fn test_chapter_xhtml_paragraphs() {
        let book = sample_book();
        let xhtml = generate_chapter_xhtml(&book.volumes[0].chapters[0]);

        assert!(xhtml.contains("<title>One</title>"));
        assert!(xhtml.contains("<h1>One</h1>"));
        assert!(xhtml.contains("<p>P1</p>"));
        assert!(xhtml.contains("<p>P2</p>"));
    }

    #[test]
    fn test_epub_mimetype_first() {
        let bytes = EpubEncoder.encode(&sample_book(), &mut NullProgress).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), zip::CompressionMethod::Stored);
    }

    #[test]
    fn test_azw3_has_no_mimetype_entry() {
        let bytes = Azw3Encoder.encode(&sample_book(), &mut NullProgress).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("mimetype").is_err());
        assert!(archive.by_name("OEBPS/content.opf").is_ok());
    }
}
