use std::fs;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::debug;

use super::file::IniFile;
use super::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// An [`IniFile`] bound to the path it is read from and written to.
#[derive(Debug, Default, PartialEq)]
pub struct IniFileStore {
    path: PathBuf,
    file: IniFile,
}

impl Deref for IniFileStore {
    type Target = IniFile;

    fn deref(&self) -> &Self::Target {
        &self.file
    }
}

impl DerefMut for IniFileStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.file
    }
}

impl IniFileStore {
    /// An empty document for `path`; nothing is read.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        IniFileStore {
            path: path.into(),
            file: IniFile::new(),
        }
    }

    /// Reads and parses `path`. A missing file is an empty document.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path = path.as_ref();

        let buf = match fs::read_to_string(path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{path:?} does not exist, starting with an empty document");
                return Ok(Self::new(path));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loading {path:?}");

        Ok(IniFileStore {
            path: path.into(),
            file: IniFile::load_from_str(&buf)?,
        })
    }

    /// Serializes the current document over the file at `path`.
    pub fn write_file(&self) -> io::Result<()> {
        debug!("Writing {:?}", self.path);
        fs::write(&self.path, self.file.to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> IniFile {
        self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod impl_default {
        use super::*;

        #[test]
        fn values() {
            let store = IniFileStore::default();

            assert_eq!(store.path(), Path::new(""));
            assert_eq!(*store, IniFile::new());
        }
    }

    mod read_file {
        use super::*;

        #[test]
        fn missing_file_is_empty_document() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("missing.ini");

            let store = IniFileStore::read_file(&path).unwrap();

            assert!(store.is_empty());
            assert_eq!(store.path(), path);
            assert!(!path.exists());
        }

        #[test]
        fn parses_existing_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.ini");
            fs::write(&path, "a=1\r\n[s]\r\nb=2\r\n").unwrap();

            let store = IniFileStore::read_file(&path).unwrap();

            assert_eq!(store.get_value("a"), Some("1"));
            assert_eq!(store.get_value("s.b"), Some("2"));
        }

        #[test]
        fn fails_on_malformed_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("broken.ini");
            fs::write(&path, "[bad\r\n").unwrap();

            let err = IniFileStore::read_file(&path).unwrap_err();

            assert!(matches!(err, IoError::Parse(_)));
            assert_eq!(err.to_string(), "1:1 expected ']' as end of section header");
        }

        #[test]
        fn fails_on_directory() {
            let dir = tempfile::tempdir().unwrap();

            let err = IniFileStore::read_file(dir.path()).unwrap_err();

            assert!(matches!(err, IoError::Io(_)));
        }
    }

    mod write_file {
        use super::*;

        #[test]
        fn unchanged_document_is_written_byte_for_byte() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.ini");
            let content = "; keep me\r\na=1\n\n[s]\rb = 2 \r\n\u{1a}";
            fs::write(&path, content).unwrap();

            IniFileStore::read_file(&path).unwrap().write_file().unwrap();

            assert_eq!(fs::read_to_string(&path).unwrap(), content);
        }

        #[test]
        fn set_value_then_write() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.ini");
            fs::write(&path, "[s]\r\n;note\r\nx=1\r\n").unwrap();

            let mut store = IniFileStore::read_file(&path).unwrap();
            store.set_value("s.x", Some("2")).unwrap();
            store.set_value("t.y", Some("3")).unwrap();
            store.write_file().unwrap();

            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                "[s]\r\n;note\r\nx=2\r\n[t]\r\ny=3\r\n"
            );
        }

        #[test]
        fn creates_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("new.ini");

            let mut store = IniFileStore::read_file(&path).unwrap();
            store.write_data([("k", Some("v"))]).unwrap();
            store.write_file().unwrap();

            assert_eq!(fs::read_to_string(&path).unwrap(), "k=v\r\n");
        }

        #[test]
        fn fails_when_directory_is_missing() {
            let dir = tempfile::tempdir().unwrap();
            let store = IniFileStore::new(dir.path().join("nope").join("x.ini"));

            let err = store.write_file().unwrap_err();

            assert_eq!(err.kind(), io::ErrorKind::NotFound);
        }
    }
}
