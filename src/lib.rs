//! # bindery
//!
//! A library for turning a JSON book description into downloadable documents:
//! EPUB, MOBI, AZW, AZW3, PDF, a zipped HTML bundle, plain text, or RTF.
//!
//! ## Quick Start
//!
//! ```
//! use bindery::{Book, Format, encode_book, NullProgress};
//!
//! let json = r#"{
//!     "title": "My Book",
//!     "author": "Me",
//!     "content": [
//!         {"volume_index": 1, "volume_name": "Volume One", "chapters": [
//!             {"chapter_index": 1, "chapter_title": "Beginnings",
//!              "chapter_content": "It was a dark and stormy night."}
//!         ]}
//!     ]
//! }"#;
//!
//! let book = Book::from_json_str(json).unwrap();
//! let artifact = encode_book(Format::Epub, &book, &mut NullProgress).unwrap();
//! assert_eq!(artifact.file_name, "my_book.epub");
//! assert_eq!(artifact.mime_type, "application/epub+zip");
//! ```
//!
//! ## Progress reporting
//!
//! Encoders report progress through a [`ProgressSink`]; any `FnMut(u8, &str)`
//! closure works:
//!
//! ```
//! use bindery::{Book, Format, encode_book};
//!
//! # let json = r#"{"title": "T", "author": "A", "content": []}"#;
//! let book = Book::from_json_str(json).unwrap();
//! let mut sink = |pct: u8, msg: &str| eprintln!("[{:3}%] {}", pct, msg);
//! encode_book(Format::Txt, &book, &mut sink).unwrap();
//! ```
//!
//! Validation collects every problem in the input before failing, so a
//! malformed document reports all of its defects at once.

pub mod archive;
pub mod book;
pub mod encode;
pub mod error;
pub mod escape;
pub mod palm;
pub mod progress;
pub(crate) mod util;

pub use book::{Book, Chapter, CoverImage, Volume};
pub use encode::{Artifact, Encoder, Format, encode_book};
pub use error::{Error, Result};
pub use progress::{NullProgress, ProgressSink};
pub use util::{sanitize_title, uuid_v4};
