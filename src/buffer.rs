//! Buffer representation - the lines of a file and its name

use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

/// A read-only buffer of text lines
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text, without line terminators
    lines: Vec<String>,
    /// Buffer name (e.g., "init.el", "*scratch*")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
}

impl Buffer {
    /// Create a buffer from text
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        // Always have at least one line
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            name: name.into(),
            filename: None,
        }
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ViewerError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let mut buffer = Self::from_text(name, &content);
        buffer.filename = Some(path.to_path_buf());
        Ok(buffer)
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// All lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
