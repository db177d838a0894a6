//! Loads fragment shader text from disk.
//!
//! The loader returns a typed error instead of terminating the process; the
//! binary escalates it before any window exists, so a missing shader file
//! still fails the whole run with a non-zero exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Classifies shader source loading failures for the entry point.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("shader source not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read shader source at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a shader file fully into memory, newlines preserved.
///
/// Every line is normalised to end in `\n` (a missing final newline is
/// appended, CRLF endings are collapsed); content and line count are
/// otherwise untouched.
pub fn load_shader_source(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;

    let mut text = String::with_capacity(raw.len() + 1);
    for line in raw.lines() {
        text.push_str(line);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_shader(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write shader fixture");
        path
    }

    #[test]
    fn preserves_lines_and_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_shader(
            temp.path(),
            "frag.glsl",
            "uniform float iTime;\nvoid main() {}\n",
        );

        let text = load_shader_source(&path).expect("load shader");
        assert_eq!(text, "uniform float iTime;\nvoid main() {}\n");
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn appends_missing_final_newline() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_shader(temp.path(), "frag.glsl", "void main() {}");

        let text = load_shader_source(&path).expect("load shader");
        assert_eq!(text, "void main() {}\n");
    }

    #[test]
    fn normalises_crlf_endings() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_shader(temp.path(), "frag.glsl", "a\r\nb\r\n");

        let text = load_shader_source(&path).expect("load shader");
        assert_eq!(text, "a\nb\n");
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let err = load_shader_source(temp.path().join("absent.glsl")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
