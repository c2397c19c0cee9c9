//! Plain-text export of a result's diagnostic report.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::models::ProcessingResult;

pub const DEFAULT_REPORT_NAME: &str = "diagnostic_report";

/// File-system safe stem for exports derived from an uploaded file name.
/// Path separators are replaced so exports stay inside their folder; an empty
/// name becomes `diagnostic_report`.
pub fn export_stem(file_name: &str) -> String {
    let cleaned: String = file_name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        DEFAULT_REPORT_NAME.to_string()
    } else {
        cleaned
    }
}

/// `<file name>.txt`, or `diagnostic_report.txt` when the result has no usable
/// name.
pub fn report_file_name(file_name: &str) -> String {
    format!("{}.txt", export_stem(file_name))
}

/// Writes the report of a successful result into `dir`. Returns `None` when
/// the result has no report to export.
pub fn export_report(result: &ProcessingResult, dir: &Path) -> io::Result<Option<PathBuf>> {
    let Some(report) = result.report() else {
        return Ok(None);
    };
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(&result.file_name));
    fs::write(&path, report)?;
    log::info!("exported report to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisPayload, ResultState};
    use uuid::Uuid;

    fn succeeded(file_name: &str, report: &str) -> ProcessingResult {
        ProcessingResult {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            state: ResultState::Success(AnalysisPayload {
                image_url: "http://localhost:8000/static/out.png".into(),
                predictions: Vec::new(),
                image_dimensions: None,
                report: report.into(),
            }),
        }
    }

    #[test]
    fn names_follow_the_uploaded_file() {
        assert_eq!(report_file_name("scan01.dcm"), "scan01.dcm.txt");
        assert_eq!(report_file_name(""), "diagnostic_report.txt");
        assert_eq!(report_file_name("  "), "diagnostic_report.txt");
        assert_eq!(report_file_name("../etc/passwd"), ".._etc_passwd.txt");
    }

    #[test]
    fn writes_raw_report_text() {
        let dir = tempfile::tempdir().unwrap();
        let result = succeeded("scan01.dcm", "Detected 1 cavity.\nNo lesions.");

        let path = export_report(&result, dir.path()).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "scan01.dcm.txt");
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Detected 1 cavity.\nNo lesions."
        );
    }

    #[test]
    fn results_without_report_export_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pending = ProcessingResult::pending(Uuid::new_v4(), "scan01.dcm");
        assert_eq!(export_report(&pending, dir.path()).unwrap(), None);
    }
}
