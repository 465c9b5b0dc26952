//! The book data model and JSON input validation.
//!
//! Input is a single JSON document: `title`, `author`, optional `description`
//! and `cover`, and a `content` array of volumes, each carrying its chapters.
//! Validation walks the raw value and collects every defect before failing,
//! so a malformed document reports all of its problems at once.

use base64::Engine;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::util::detect_image_mime;

/// A book ready for encoding. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    /// Source URL or path of the cover, informational only. The actual image
    /// is attached separately via [`with_cover_image`](Book::with_cover_image).
    pub cover: Option<String>,
    pub cover_image: Option<CoverImage>,
    /// Volumes in document order (the input's `content` array). Never sorted
    /// by index.
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone)]
pub struct Volume {
    /// Display and filename index (`volume_index`). Not required to be unique
    /// or ordered.
    pub index: i64,
    pub name: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub index: i64,
    pub title: String,
    pub content: String,
}

/// A cover image resolved into a base64 data URL.
#[derive(Debug, Clone)]
pub struct CoverImage {
    /// Full data URL, `data:image/...;base64,...`.
    pub data: String,
    /// e.g. `image/jpeg`.
    pub mime_type: String,
    /// MIME subtype verbatim (`jpeg` stays `jpeg`, never shortened to `jpg`).
    pub extension: String,
}

impl CoverImage {
    /// Build a cover from raw image bytes, sniffing the format from magic
    /// bytes. Anything that is not a recognized image is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mime = detect_image_mime(bytes).ok_or_else(|| {
            Error::Conversion("cover data is not a recognized image format".to_string())
        })?;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let extension = mime
            .split('/')
            .nth(1)
            .unwrap_or("bin")
            .to_string();
        Ok(CoverImage {
            data: format!("data:{};base64,{}", mime, payload),
            mime_type: mime.to_string(),
            extension,
        })
    }

    /// The base64 payload with the data-URL prefix stripped.
    pub fn base64_payload(&self) -> &str {
        match self.data.split_once(',') {
            Some((_, payload)) => payload,
            None => &self.data,
        }
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn index_or_zero(value: Option<&Value>) -> i64 {
    value.and_then(Value::as_i64).unwrap_or(0)
}

impl Book {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Validate a parsed JSON value and build the book.
    ///
    /// Collects every structural defect (missing fields, wrong types, empty
    /// strings) before failing; volume and chapter positions in the messages
    /// are 1-based. An empty `content` array is valid and yields a book with
    /// no chapters.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let mut errors = Vec::new();

        let title = non_empty_string(value.get("title"));
        if title.is_none() {
            errors.push("Missing or invalid \"title\" field".to_string());
        }

        let author = non_empty_string(value.get("author"));
        if author.is_none() {
            errors.push("Missing or invalid \"author\" field".to_string());
        }

        let mut volumes = Vec::new();
        match value.get("content").and_then(Value::as_array) {
            Some(raw_volumes) => {
                for (vi, raw_volume) in raw_volumes.iter().enumerate() {
                    let v = vi + 1;

                    let name = non_empty_string(raw_volume.get("volume_name"));
                    if name.is_none() {
                        errors.push(format!("Volume {}: Missing or invalid \"volume_name\"", v));
                    }

                    let mut chapters = Vec::new();
                    match raw_volume.get("chapters").and_then(Value::as_array) {
                        Some(raw_chapters) => {
                            for (ci, raw_chapter) in raw_chapters.iter().enumerate() {
                                let c = ci + 1;

                                let chapter_title =
                                    non_empty_string(raw_chapter.get("chapter_title"));
                                if chapter_title.is_none() {
                                    errors.push(format!(
                                        "Volume {}, Chapter {}: Missing or invalid \"chapter_title\"",
                                        v, c
                                    ));
                                }

                                let chapter_content =
                                    non_empty_string(raw_chapter.get("chapter_content"));
                                if chapter_content.is_none() {
                                    errors.push(format!(
                                        "Volume {}, Chapter {}: Missing or invalid \"chapter_content\"",
                                        v, c
                                    ));
                                }

                                if let (Some(title), Some(content)) =
                                    (chapter_title, chapter_content)
                                {
                                    chapters.push(Chapter {
                                        index: index_or_zero(raw_chapter.get("chapter_index")),
                                        title,
                                        content,
                                    });
                                }
                            }
                        }
                        None => {
                            errors.push(format!(
                                "Volume {}: Missing or invalid \"chapters\" field",
                                v
                            ));
                        }
                    }

                    if let Some(name) = name {
                        volumes.push(Volume {
                            index: index_or_zero(raw_volume.get("volume_index")),
                            name,
                            chapters,
                        });
                    }
                }
            }
            None => {
                errors.push("Missing or invalid \"content\" field (must be an array)".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        // title/author are Some here; errors is empty only when both parsed
        Ok(Book {
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            description: non_empty_string(value.get("description")),
            cover: non_empty_string(value.get("cover")),
            cover_image: None,
            volumes,
        })
    }

    /// Attach a resolved cover image.
    pub fn with_cover_image(mut self, cover_image: CoverImage) -> Self {
        self.cover_image = Some(cover_image);
        self
    }

    /// Total chapter count across all volumes.
    pub fn total_chapters(&self) -> usize {
        self.volumes.iter().map(|v| v.chapters.len()).sum()
    }
}

impl Volume {
    /// The file stem shared by a chapter's XHTML/HTML entries,
    /// `vol{volume_index}_ch{chapter_index}`.
    pub fn chapter_key(&self, chapter: &Chapter) -> String {
        format!("vol{}_ch{}", self.index, chapter.index)
    }
}
