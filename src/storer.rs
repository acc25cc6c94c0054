use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use bytes::Bytes;
use sha2::{Digest, Sha256};

// Writes run inside web::block, which needs a Send result; io::Error is,
// the crate error is not.
pub trait FileStorer {
    fn write(&self, name: &str, bytes: &Bytes) -> Result<String, io::Error>;
}

#[derive(Debug, Clone)]
pub struct LocalStorer {
    path: PathBuf,
}

impl LocalStorer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FileStorer for LocalStorer {
    // Content-addressed prefix plus the sanitized original name, so repeated
    // uploads of the same file land on the same key.
    fn write(&self, name: &str, bytes: &Bytes) -> Result<String, io::Error> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let key = format!("{}_{}", hex::encode(&digest[..8]), sanitize_file_name(name));
        let mut file = File::create(self.path.join(&key))?;
        file.write_all(bytes)?;
        Ok(key)
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_awkward_names() {
        assert_eq!(sanitize_file_name("cv 2025.pdf"), "cv_2025.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_file_name("???"), "upload");
    }

    #[test]
    fn writes_content_addressed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storer = LocalStorer::new(dir.path());
        let key = storer.write("cv.pdf", &Bytes::from_static(b"hello")).unwrap();
        assert!(key.ends_with("_cv.pdf"));
        assert_eq!(std::fs::read(dir.path().join(&key)).unwrap(), b"hello");
        let again = storer.write("cv.pdf", &Bytes::from_static(b"hello")).unwrap();
        assert_eq!(key, again);
    }

    #[test]
    fn missing_directory_surfaces_as_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let storer = LocalStorer::new(dir.path().join("nowhere"));
        let err = storer.write("cv.pdf", &Bytes::from_static(b"hello")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn write_results_cross_thread_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let storer = LocalStorer::new(dir.path());
        let handle =
            std::thread::spawn(move || storer.write("cv.pdf", &Bytes::from_static(b"hello")));
        assert!(handle.join().unwrap().is_ok());
    }
}
