use std::{fmt, path::Path};

use tokio::fs;

mod docx;
mod pdf;

pub use docx::to_docx;
pub use pdf::{layout_pages, to_pdf, wrap_lines};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("character {ch:?} cannot be written to {format}")]
    UnsupportedCharacter { ch: char, format: &'static str },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Text,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Text, ExportFormat::Docx, ExportFormat::Pdf];

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(ExportFormat::Text),
            "docx" | "word" => Some(ExportFormat::Docx),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn encode(&self, text: &str) -> Result<ExportArtifact, ExportError> {
        let bytes = match self {
            ExportFormat::Text => to_text(text),
            ExportFormat::Docx => to_docx(text)?,
            ExportFormat::Pdf => to_pdf(text)?,
        };
        Ok(ExportArtifact {
            format: *self,
            bytes,
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result text encoded in one file format.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

/// Plain text export: the UTF-8 bytes as-is.
pub fn to_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}
