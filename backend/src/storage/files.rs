//! On-disk storage for uploaded PDF files.
//!
//! Files live flat in a single upload directory under a generated name
//! (`{uuid}_{sanitized original name}`), so two uploads with the same
//! original name never collide and no client-supplied path component ever
//! reaches the filesystem.

use regex::Regex;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

pub const MAX_FILENAME_CHARS: usize = 100;
/// How far into the file the `%PDF-` marker may appear.
pub const SIGNATURE_WINDOW: usize = 1024;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]").unwrap_or_else(|e| panic!("invalid filename pattern: {}", e))
});

#[derive(Error, Debug)]
pub enum FileStoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Refusing to touch path outside the upload directory: {0}")]
    OutsideUploadDir(String),
}

impl FileStoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        FileStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Creates the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| FileStoreError::io(&dir, e))?;
        let dir = dir.canonicalize().map_err(|e| FileStoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for a stored name produced by [`stored_name_for`].
    pub fn path_for(&self, stored_name: &str) -> Result<PathBuf, FileStoreError> {
        let mut components = Path::new(stored_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(stored_name)),
            _ => Err(FileStoreError::OutsideUploadDir(stored_name.to_string())),
        }
    }

    /// Creates the destination file for an upload. Fails if it already exists.
    pub fn create(&self, path: &Path) -> Result<std::fs::File, FileStoreError> {
        self.ensure_inside(path)?;
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| FileStoreError::io(path, e))
    }

    pub fn write_all<W: Write>(
        &self,
        writer: &mut W,
        path: &Path,
        bytes: &[u8],
    ) -> Result<(), FileStoreError> {
        writer.write_all(bytes).map_err(|e| FileStoreError::io(path, e))
    }

    pub fn flush<W: Write>(&self, writer: &mut W, path: &Path) -> Result<(), FileStoreError> {
        writer.flush().map_err(|e| FileStoreError::io(path, e))
    }

    /// Deletes a stored file. A file that is already gone is reported as
    /// `Ok(false)` rather than an error.
    pub fn remove(&self, path: &Path) -> Result<bool, FileStoreError> {
        self.ensure_inside(path)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileStoreError::io(path, e)),
        }
    }

    fn ensure_inside(&self, path: &Path) -> Result<(), FileStoreError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(&self.dir) {
            return Err(FileStoreError::OutsideUploadDir(path.display().to_string()));
        }
        Ok(())
    }
}

/// Reduces a client filename to its final component made of
/// `[A-Za-z0-9._-]`, with whitespace runs turned into `_` and leading or
/// trailing dots and underscores removed. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned
        .trim_matches(|c| c == '.' || c == '_')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Lowercased extension after the last dot, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn stored_name_for(sanitized: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), sanitized)
}

/// True when `%PDF-` occurs within the first [`SIGNATURE_WINDOW`] bytes.
pub fn has_pdf_signature(head: &[u8]) -> bool {
    let window = &head[..head.len().min(SIGNATURE_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("C:\\docs\\My Report (final).pdf"), "My_Report_final.pdf");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("résumé.pdf"), "rsum.pdf");
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn extension_requires_a_stem() {
        assert_eq!(extension_of("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("archive.tar.pdf").as_deref(), Some("pdf"));
        assert_eq!(extension_of("pdf"), None);
        assert_eq!(extension_of(".pdf"), None);
        assert_eq!(extension_of("report."), None);
    }

    #[test]
    fn stored_names_are_unique() {
        let a = stored_name_for("a.pdf");
        let b = stored_name_for("a.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("_a.pdf"));
        assert_eq!(a.len(), 32 + 1 + "a.pdf".len());
    }

    #[test]
    fn signature_must_be_near_the_start() {
        assert!(has_pdf_signature(b"%PDF-1.7\n..."));

        let mut late = vec![b' '; 100];
        late.extend_from_slice(b"%PDF-1.4");
        assert!(has_pdf_signature(&late));

        let mut too_late = vec![b' '; SIGNATURE_WINDOW];
        too_late.extend_from_slice(b"%PDF-1.4");
        assert!(!has_pdf_signature(&too_late));

        assert!(!has_pdf_signature(b"hello world"));
    }

    #[test]
    fn path_for_rejects_nested_names() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();
        assert!(store.path_for("abc_report.pdf").is_ok());
        assert!(store.path_for("../escape.pdf").is_err());
        assert!(store.path_for("a/b.pdf").is_err());
    }

    #[test]
    fn remove_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();
        let path = store.path_for("x_doc.pdf").unwrap();

        let mut file = store.create(&path).unwrap();
        store.write_all(&mut file, &path, b"%PDF-1.4").unwrap();
        drop(file);

        assert!(store.remove(&path).unwrap());
        assert!(!store.remove(&path).unwrap());
    }

    #[test]
    fn remove_refuses_paths_outside_the_directory() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();
        let outside = dir.path().join("other.pdf");
        assert!(matches!(
            store.remove(&outside),
            Err(FileStoreError::OutsideUploadDir(_))
        ));
    }
}
