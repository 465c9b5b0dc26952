//! Output formats and the top-level encoding entry point.

use std::fmt;
use std::str::FromStr;

use crate::book::Book;
use crate::error::{Error, Result};
use crate::progress::ProgressSink;
use crate::util::sanitize_title;

pub mod epub;
pub mod html;
pub mod mobi;
pub mod pdf;
pub mod rtf;
pub mod text;

pub use epub::{Azw3Encoder, EpubEncoder};
pub use html::HtmlEncoder;
pub use mobi::{AzwEncoder, MobiEncoder};
pub use pdf::PdfEncoder;
pub use rtf::RtfEncoder;
pub use text::TxtEncoder;

/// The closed set of output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Epub,
    Mobi,
    Azw,
    Azw3,
    Pdf,
    Html,
    Txt,
    Rtf,
}

impl Format {
    pub const ALL: [Format; 8] = [
        Format::Epub,
        Format::Mobi,
        Format::Azw,
        Format::Azw3,
        Format::Pdf,
        Format::Html,
        Format::Txt,
        Format::Rtf,
    ];

    /// Lowercase tag, also the `FromStr` spelling.
    pub fn tag(&self) -> &'static str {
        match self {
            Format::Epub => "epub",
            Format::Mobi => "mobi",
            Format::Azw => "azw",
            Format::Azw3 => "azw3",
            Format::Pdf => "pdf",
            Format::Html => "html",
            Format::Txt => "txt",
            Format::Rtf => "rtf",
        }
    }

    /// Filename extension. The HTML bundle is a ZIP, so its downloads carry a
    /// combined `_html.zip` suffix instead of a plain extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Html => "_html.zip",
            Format::Epub => ".epub",
            Format::Mobi => ".mobi",
            Format::Azw => ".azw",
            Format::Azw3 => ".azw3",
            Format::Pdf => ".pdf",
            Format::Txt => ".txt",
            Format::Rtf => ".rtf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Epub => "application/epub+zip",
            Format::Mobi => "application/x-mobipocket-ebook",
            Format::Azw => "application/vnd.amazon.ebook",
            Format::Azw3 => "application/vnd.amazon.mobi8-ebook",
            Format::Pdf => "application/pdf",
            Format::Html => "application/zip",
            Format::Txt => "text/plain",
            Format::Rtf => "application/rtf",
        }
    }

    /// Download filename for a book: sanitized title plus extension.
    pub fn file_name(&self, title: &str) -> String {
        format!("{}{}", sanitize_title(title), self.extension())
    }

    /// The encoder for this format.
    pub fn encoder(&self) -> Box<dyn Encoder> {
        match self {
            Format::Epub => Box::new(EpubEncoder),
            Format::Mobi => Box::new(MobiEncoder),
            Format::Azw => Box::new(AzwEncoder),
            Format::Azw3 => Box::new(Azw3Encoder),
            Format::Pdf => Box::new(PdfEncoder),
            Format::Html => Box::new(HtmlEncoder),
            Format::Txt => Box::new(TxtEncoder),
            Format::Rtf => Box::new(RtfEncoder),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epub" => Ok(Format::Epub),
            "mobi" => Ok(Format::Mobi),
            "azw" => Ok(Format::Azw),
            "azw3" => Ok(Format::Azw3),
            "pdf" => Ok(Format::Pdf),
            "html" => Ok(Format::Html),
            "txt" => Ok(Format::Txt),
            "rtf" => Ok(Format::Rtf),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// One encoded output: bytes plus the name and MIME type to serve them under.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Serializes a validated [`Book`] into one output format.
///
/// Encoders are stateless and independent; none of them calls another.
pub trait Encoder {
    fn format(&self) -> Format;

    fn encode(&self, book: &Book, progress: &mut dyn ProgressSink) -> Result<Vec<u8>>;
}

/// Encode a book into the given format.
///
/// Dispatches to the format's encoder, wraps any runtime failure as a
/// conversion error (validation errors pass through unchanged), and emits the
/// final 100% progress event. No partial output on failure.
pub fn encode_book(
    format: Format,
    book: &Book,
    progress: &mut dyn ProgressSink,
) -> Result<Artifact> {
    let encoder = format.encoder();
    let data = encoder.encode(book, progress).map_err(|e| match e {
        Error::Validation(_) => e,
        Error::Conversion(_) => e,
        other => Error::Conversion(other.to_string()),
    })?;

    progress.progress(100, "Download ready!");

    Ok(Artifact {
        file_name: format.file_name(&book.title),
        mime_type: format.mime_type().to_string(),
        data,
    })
}
