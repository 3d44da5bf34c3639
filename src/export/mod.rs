//! Export of the visible user set to CSV and PDF, and delivery of the
//! resulting file into the export directory.
//!
//! Serializers only ever receive what the table currently shows: callers
//! pass `AppState::users` (sorted and filtered), never the full list.

mod csvfile;
mod pdfdoc;

pub use csvfile::{CSV_HEADER, export_to_csv};
pub use pdfdoc::{PDF_TITLE, PdfTable, export_to_pdf};

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::model::UserRecord;

/// Output format offered by the export actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `users.csv` / `users.pdf`.
    pub fn default_filename(self) -> String {
        format!("users.{}", self.extension())
    }
}

/// Serialized export ready to be written out.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: String,
    pub rows: usize,
}

/// Serialize `visible` in the requested format.
pub fn build_artifact(
    format: ExportFormat,
    visible: &[UserRecord],
) -> Result<ExportArtifact, ExportError> {
    let data = match format {
        ExportFormat::Csv => export_to_csv(visible)?.into_bytes(),
        ExportFormat::Pdf => export_to_pdf(visible)?,
    };
    Ok(ExportArtifact {
        data,
        mime_type: format.mime_type(),
        filename: format.default_filename(),
        rows: visible.len(),
    })
}

/// Write `artifact` under `dir` (created if missing) and return the path.
///
/// # Arguments
///
/// * `dir` - Export directory; created along with its parents.
/// * `artifact` - Payload plus the filename it is offered under.
///
/// # Returns
///
/// The full path of the written file, or an [`ExportError::Io`] when the
/// directory or file cannot be written.
pub fn save_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.data)?;
    info!(
        path = %path.display(),
        mime = artifact.mime_type,
        rows = artifact.rows,
        bytes = artifact.data.len(),
        "export written"
    );
    Ok(path)
}

/// Serialize and save in one step.
pub fn export_visible(
    format: ExportFormat,
    visible: &[UserRecord],
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let artifact = build_artifact(format, visible)?;
    save_artifact(dir, &artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str) -> UserRecord {
        UserRecord {
            id,
            name: name.into(),
            username: format!("u{id}"),
            email: format!("{id}@x.com"),
            phone: format!("{id}{id}{id}"),
        }
    }

    #[test]
    fn artifact_metadata_matches_format() {
        let users = vec![user(1, "Bob")];
        let csv = build_artifact(ExportFormat::Csv, &users).unwrap();
        assert_eq!(csv.filename, "users.csv");
        assert_eq!(csv.mime_type, "text/csv");
        assert_eq!(csv.rows, 1);

        let pdf = build_artifact(ExportFormat::Pdf, &users).unwrap();
        assert_eq!(pdf.filename, "users.pdf");
        assert_eq!(pdf.mime_type, "application/pdf");
        assert!(pdf.data.starts_with(b"%PDF"));
    }

    #[test]
    fn save_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let path = export_visible(ExportFormat::Csv, &[user(7, "Amy")], &dir).unwrap();
        assert_eq!(path, dir.join("users.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Name,Username,Email,Phone\nAmy,u7,7@x.com,777");
    }
}
