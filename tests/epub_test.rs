use std::collections::BTreeSet;
use std::io::{Cursor, Read};

use bindery::{Book, Format, NullProgress, encode_book};

fn sample_json() -> &'static str {
    r#"{
        "title": "The Great Adventure",
        "author": "Jane Doe",
        "description": "An epic tale.",
        "content": [
            {"volume_index": 1, "volume_name": "Part One", "chapters": [
                {"chapter_index": 1, "chapter_title": "Setting Out", "chapter_content": "First paragraph.\n\nSecond paragraph."},
                {"chapter_index": 2, "chapter_title": "The Road", "chapter_content": "On the road."}
            ]},
            {"volume_index": 2, "volume_name": "Part Two", "chapters": [
                {"chapter_index": 1, "chapter_title": "Arrival", "chapter_content": "They arrived."}
            ]}
        ]
    }"#
}

fn encode_epub() -> zip::ZipArchive<Cursor<Vec<u8>>> {
    let book = Book::from_json_str(sample_json()).expect("valid book");
    let artifact = encode_book(Format::Epub, &book, &mut NullProgress).expect("encode epub");
    assert_eq!(artifact.file_name, "the_great_adventure.epub");
    assert_eq!(artifact.mime_type, "application/epub+zip");
    zip::ZipArchive::new(Cursor::new(artifact.data)).expect("valid zip")
}

fn entry_text(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut entry = archive.by_name(name).expect(name);
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("utf-8 entry");
    text
}

#[test]
fn test_package_carries_directory_entries() {
    let book = Book::from_json_str(sample_json()).expect("valid book");

    for format in [Format::Epub, Format::Azw3] {
        let artifact = encode_book(format, &book, &mut NullProgress).expect("encode");
        let mut archive =
            zip::ZipArchive::new(Cursor::new(artifact.data)).expect("valid zip");
        for dir in ["META-INF/", "OEBPS/"] {
            let entry = archive.by_name(dir).expect(dir);
            assert!(entry.is_dir(), "{format}: {dir} should be a directory entry");
        }
    }
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let mut archive = encode_epub();

    let mut first = archive.by_index(0).expect("first entry");
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), zip::CompressionMethod::Stored);

    let mut contents = String::new();
    first.read_to_string(&mut contents).expect("read mimetype");
    assert_eq!(contents, "application/epub+zip");
}

#[test]
fn test_container_points_at_opf() {
    let mut archive = encode_epub();
    let container = entry_text(&mut archive, "META-INF/container.xml");
    assert!(container.contains("full-path=\"OEBPS/content.opf\""));

    // and the OPF actually exists
    assert!(archive.by_name("OEBPS/content.opf").is_ok());
}

#[test]
fn test_manifest_and_spine_agree() {
    let mut archive = encode_epub();
    let opf = entry_text(&mut archive, "OEBPS/content.opf");

    let manifest_ids: BTreeSet<&str> = opf
        .lines()
        .filter(|l| l.contains("<item id=\"vol"))
        .filter_map(|l| l.split("id=\"").nth(1))
        .filter_map(|l| l.split('"').next())
        .collect();
    let spine_ids: Vec<&str> = opf
        .lines()
        .filter(|l| l.contains("<itemref idref=\"vol"))
        .filter_map(|l| l.split("idref=\"").nth(1))
        .filter_map(|l| l.split('"').next())
        .collect();

    assert_eq!(
        manifest_ids,
        ["vol1_ch1", "vol1_ch2", "vol2_ch1"].into_iter().collect()
    );
    // Spine preserves document order
    assert_eq!(spine_ids, vec!["vol1_ch1", "vol1_ch2", "vol2_ch1"]);
    assert_eq!(
        manifest_ids,
        spine_ids.iter().copied().collect::<BTreeSet<&str>>()
    );
}

#[test]
fn test_every_spine_chapter_is_packaged() {
    let mut archive = encode_epub();
    for name in [
        "OEBPS/content/vol1_ch1.xhtml",
        "OEBPS/content/vol1_ch2.xhtml",
        "OEBPS/content/vol2_ch1.xhtml",
        "OEBPS/toc.xhtml",
        "OEBPS/styles/style.css",
    ] {
        assert!(archive.by_name(name).is_ok(), "missing {name}");
    }
}

#[test]
fn test_ncx_play_order_is_gapless() {
    let mut archive = encode_epub();
    let ncx = entry_text(&mut archive, "OEBPS/toc.ncx");

    let orders: Vec<usize> = ncx
        .lines()
        .filter(|l| l.contains("playOrder=\""))
        .filter_map(|l| l.split("playOrder=\"").nth(1))
        .filter_map(|l| l.split('"').next())
        .filter_map(|n| n.parse().ok())
        .collect();

    // TOC entry plus one per chapter, strictly increasing from 1
    assert_eq!(orders, vec![1, 2, 3, 4]);
    assert!(ncx.contains("<text>Table of Contents</text>"));
    assert!(ncx.contains("<text>Part One - Setting Out</text>"));
    assert!(ncx.contains("<content src=\"content/vol2_ch1.xhtml\"/>"));
}

#[test]
fn test_chapter_xhtml_content() {
    let mut archive = encode_epub();
    let chapter = entry_text(&mut archive, "OEBPS/content/vol1_ch1.xhtml");

    assert!(chapter.contains("<h1>Setting Out</h1>"));
    assert!(chapter.contains("<p>First paragraph.</p>"));
    assert!(chapter.contains("<p>Second paragraph.</p>"));
}

#[test]
fn test_azw3_carries_calibre_metadata() {
    let book = Book::from_json_str(sample_json()).expect("valid book");
    let artifact = encode_book(Format::Azw3, &book, &mut NullProgress).expect("encode azw3");
    assert_eq!(artifact.file_name, "the_great_adventure.azw3");
    assert_eq!(artifact.mime_type, "application/vnd.amazon.mobi8-ebook");

    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.data)).expect("valid zip");
    assert!(archive.by_name("mimetype").is_err(), "azw3 has no mimetype entry");

    let opf = entry_text(&mut archive, "OEBPS/content.opf");
    assert!(opf.contains("prefix=\"calibre: https://calibre-ebook.com\""));
    assert!(opf.contains("<dc:creator opf:role=\"aut\">Jane Doe</dc:creator>"));
    assert!(opf.contains("calibre:title_sort"));
    assert!(opf.contains("<dc:publisher>JSON2eBook Converter</dc:publisher>"));
}

#[test]
fn test_cover_image_round_trips_into_package() {
    let book = Book::from_json_str(sample_json()).expect("valid book");
    // Minimal JPEG-looking payload; only the magic bytes matter
    let cover = bindery::CoverImage::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]).expect("cover");
    let book = book.with_cover_image(cover);

    let artifact = encode_book(Format::Epub, &book, &mut NullProgress).expect("encode epub");
    let mut archive = zip::ZipArchive::new(Cursor::new(artifact.data)).expect("valid zip");

    let mut entry = archive.by_name("OEBPS/images/cover.jpeg").expect("cover entry");
    let mut data = Vec::new();
    entry.read_to_end(&mut data).expect("read cover");
    assert_eq!(data, vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]);
    drop(entry);

    let opf = entry_text(&mut archive, "OEBPS/content.opf");
    assert!(opf.contains("<meta name=\"cover\" content=\"cover-image\"/>"));
    assert!(opf.contains("properties=\"cover-image\""));
}
