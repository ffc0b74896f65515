use bytes::Bytes;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::{DocgenError, DocgenResult};

/// Bundles generated documents into a single deflate-compressed zip.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Bytes)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        ArchiveBuilder::default()
    }

    /// Adds an entry. A repeated name replaces the earlier bytes but keeps its position.
    pub fn add(&mut self, name: impl Into<String>, bytes: Bytes) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = bytes,
            None => self.entries.push((name, bytes)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the archive off the async executor.
    pub async fn finish(self) -> DocgenResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || Self::write_zip(self.entries))
            .await
            .map_err(|e| DocgenError::Archive(e.to_string()))?
    }

    fn write_zip(entries: Vec<(String, Bytes)>) -> DocgenResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in entries {
            writer.start_file(name, options)?;
            writer
                .write_all(&bytes)
                .map_err(|e| DocgenError::Archive(e.to_string()))?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut file = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn test_entries_are_written() {
        let mut builder = ArchiveBuilder::new();
        builder.add("A.docx", Bytes::from_static(b"first"));
        builder.add("B.docx", Bytes::from_static(b"second"));

        let zipped = builder.finish().await.unwrap();
        let mut archive = ZipArchive::new(Cursor::new(zipped)).unwrap();

        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&mut archive, "A.docx"), b"first");
        assert_eq!(read_entry(&mut archive, "B.docx"), b"second");
    }

    #[tokio::test]
    async fn test_duplicate_name_last_writer_wins() {
        let mut builder = ArchiveBuilder::new();
        builder.add("A.docx", Bytes::from_static(b"old"));
        builder.add("B.docx", Bytes::from_static(b"b"));
        builder.add("A.docx", Bytes::from_static(b"new"));
        assert_eq!(builder.len(), 2);

        let zipped = builder.finish().await.unwrap();
        let mut archive = ZipArchive::new(Cursor::new(zipped)).unwrap();

        assert_eq!(archive.by_index(0).unwrap().name(), "A.docx");
        assert_eq!(read_entry(&mut archive, "A.docx"), b"new");
    }

    #[tokio::test]
    async fn test_empty_archive_is_valid() {
        let zipped = ArchiveBuilder::new().finish().await.unwrap();
        let archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
