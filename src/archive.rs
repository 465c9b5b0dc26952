//! In-memory ZIP assembly for the packaged formats (EPUB, AZW3, HTML bundle).

use std::io::{Cursor, Write};

use base64::Engine;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;

/// Builds a ZIP archive in memory, preserving insertion order.
///
/// Entry order matters for EPUB: the `mimetype` entry must be the first in the
/// archive and stored without compression, so it goes through
/// [`add_stored_text`](ArchiveBuilder::add_stored_text) before anything else.
pub struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        ArchiveBuilder {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn deflate_options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
    }

    /// Add a DEFLATE-compressed text entry.
    pub fn add_text(&mut self, path: &str, text: &str) -> Result<()> {
        self.zip.start_file(path, Self::deflate_options())?;
        self.zip.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Add an uncompressed (STOREd) text entry.
    pub fn add_stored_text(&mut self, path: &str, text: &str) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        self.zip.start_file(path, options)?;
        self.zip.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Add a DEFLATE-compressed binary entry.
    pub fn add_bytes(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(path, Self::deflate_options())?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Decode a base64 payload (data-URL prefix already stripped) and add the
    /// raw bytes as a compressed entry.
    pub fn add_base64(&mut self, path: &str, payload: &str) -> Result<()> {
        let data = base64::engine::general_purpose::STANDARD.decode(payload)?;
        self.add_bytes(path, &data)
    }

    /// Add an explicit directory entry. Purely path namespacing: file entries
    /// under the path work with or without it.
    pub fn add_folder(&mut self, path: &str) -> Result<()> {
        self.zip.add_directory(path, SimpleFileOptions::default())?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
