//! Sources handed to the dispatcher

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::error::ParseError;
use crate::sqlite::{SqliteDatabase, SQLITE_MAGIC};

/// A byte stream to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk
    File(PathBuf),
    /// In-memory content with a display name
    Bytes {
        /// Name reported on events
        name: String,
        /// Content
        data: Vec<u8>,
    },
}

impl Source {
    /// A source backed by a file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Source::File(path.into())
    }

    /// A source backed by memory
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Source::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Name reported on events and in summaries
    pub fn display_name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Bytes { name, .. } => name.clone(),
        }
    }

    /// Path of a file-backed source
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File(path) => Some(path),
            Source::Bytes { .. } => None,
        }
    }

    /// Open a fresh buffered reader positioned at the start
    pub fn open(&self) -> Result<Box<dyn BufRead + '_>, ParseError> {
        match self {
            Source::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Source::Bytes { data, .. } => Ok(Box::new(Cursor::new(data.as_slice()))),
        }
    }

    /// Whether the source starts with the SQLite file header
    pub fn is_sqlite(&self) -> Result<bool, ParseError> {
        match self {
            Source::File(path) => {
                let mut header = [0u8; 16];
                match File::open(path)?.read_exact(&mut header) {
                    Ok(()) => Ok(&header == SQLITE_MAGIC),
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
                    Err(e) => Err(e.into()),
                }
            }
            Source::Bytes { data, .. } => Ok(data.starts_with(SQLITE_MAGIC)),
        }
    }

    /// Open the source as a read-only database
    pub fn open_database(&self) -> Result<SqliteDatabase, ParseError> {
        match self {
            Source::File(path) => SqliteDatabase::open(path),
            Source::Bytes { name, .. } => Err(ParseError::FormatMismatch(format!(
                "{}: relational sources must be files",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bytes_source() {
        let source = Source::bytes("history", "#1609459200\nls\n");
        assert_eq!(source.display_name(), "history");
        assert!(!source.is_sqlite().unwrap());

        let mut content = String::new();
        source.open().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "#1609459200\nls\n");
    }

    #[test]
    fn test_sqlite_header_detection() {
        let mut data = SQLITE_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 84]);
        assert!(Source::bytes("db", data).is_sqlite().unwrap());
    }

    #[test]
    fn test_short_file_is_not_sqlite() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"SQLite").unwrap();

        let source = Source::file(file.path());
        assert!(!source.is_sqlite().unwrap());
    }

    #[test]
    fn test_real_database_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.sqlite");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();
        drop(conn);

        let source = Source::file(&path);
        assert!(source.is_sqlite().unwrap());
        assert!(source.open_database().is_ok());
    }

    #[test]
    fn test_in_memory_database_rejected() {
        let source = Source::bytes("db", SQLITE_MAGIC.to_vec());
        assert!(matches!(
            source.open_database(),
            Err(ParseError::FormatMismatch(_))
        ));
    }
}
