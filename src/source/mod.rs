//! Text sources split into lines
//!
//! Decoding is the only place where input can fail; everything downstream
//! works on already-validated lines.

use crate::domain::violations::{StyleError, StyleResult};
use std::fs;
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// A sequence of lines to evaluate, optionally tied to a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub path: Option<PathBuf>,
    pub lines: Vec<String>,
}

impl Source {
    /// In-memory source
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { path: None, lines: lines.into_iter().map(Into::into).collect() }
    }

    /// Decode raw bytes as UTF-8 text
    pub fn from_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> StyleResult<Self> {
        let path = path.as_ref();
        let text = std::str::from_utf8(bytes).map_err(|e| {
            StyleError::input_decode(path.display().to_string(), format!("invalid UTF-8: {e}"))
        })?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        Ok(Self {
            path: Some(path.to_path_buf()),
            lines: text.lines().map(str::to_string).collect(),
        })
    }

    /// Read and decode a file
    pub fn read(path: impl AsRef<Path>) -> StyleResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            StyleError::input_decode(path.display().to_string(), format!("failed to read: {e}"))
        })?;
        Self::from_bytes(path, &bytes)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
