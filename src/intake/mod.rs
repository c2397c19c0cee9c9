//! File intake: validation, deduplication and previews for newly selected
//! files. Produces the pending upload queue; nothing here touches results.

pub mod notice;
pub mod preview;
pub mod validation;

use std::sync::Arc;

pub use notice::Notice;
pub use validation::validate_file;

use crate::{
    error::ValidationError,
    models::{FilePreview, SelectedFile, UploadItem},
    settings::Settings,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Everything one selection event produced. Merged into the session in a
/// single update.
#[derive(Debug, Default)]
pub struct SelectionOutcome {
    pub accepted: Vec<UploadItem>,
    pub previews: Vec<FilePreview>,
    /// Size and format rejections; shown together as the banner.
    pub errors: Vec<ValidationError>,
    /// Names rejected as already uploaded; shown as a short-lived notice.
    pub duplicates: Vec<String>,
}

impl SelectionOutcome {
    /// Batch errors joined the way the banner shows them.
    pub fn banner_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Some(messages.join(" "))
    }

    /// The notice for the last duplicate in the selection; each duplicate
    /// replaces the previous notice.
    pub fn duplicate_notice(&self) -> Option<String> {
        self.duplicates
            .last()
            .map(|name| ValidationError::Duplicate(name.clone()).to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FileIntake {
    settings: Arc<Settings>,
}

impl FileIntake {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validates `new_files` against the already queued `existing` uploads,
    /// assigns ids to the accepted ones and resolves their previews.
    pub async fn select(
        &self,
        new_files: Vec<SelectedFile>,
        existing: &[UploadItem],
    ) -> SelectionOutcome {
        let mut outcome = SelectionOutcome::default();

        for file in new_files {
            match validate_file(&file, existing, &outcome.accepted, &self.settings) {
                Ok(()) => outcome.accepted.push(UploadItem::new(file)),
                Err(ValidationError::Duplicate(name)) => {
                    log_info!("skipping duplicate selection {name}");
                    outcome.duplicates.push(name);
                }
                Err(err) => {
                    log_warn!("rejected selection: {err}");
                    outcome.errors.push(err);
                }
            }
        }

        let preview_requests = outcome
            .accepted
            .iter()
            .map(|item| (item.id, item.file.clone()))
            .collect();
        outcome.previews = preview::generate_previews(preview_requests, &self.settings).await;

        log_info!(
            "selection accepted {} file(s), {} rejected, {} duplicate(s)",
            outcome.accepted.len(),
            outcome.errors.len(),
            outcome.duplicates.len()
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> FileIntake {
        FileIntake::new(Arc::new(Settings::default()))
    }

    #[tokio::test]
    async fn mixed_selection_splits_into_accepted_errors_and_duplicates() {
        let intake = intake();
        let existing = vec![UploadItem::new(SelectedFile::from_bytes("old.dcm", vec![0; 4]))];

        let outcome = intake
            .select(
                vec![
                    SelectedFile::from_bytes("new.rvg", vec![0; 8]),
                    SelectedFile::from_bytes("old.dcm", vec![9; 4]),
                    SelectedFile::from_bytes("photo.jpg", vec![0; 8]),
                    SelectedFile::from_bytes("other.dcm", vec![0; 2]),
                ],
                &existing,
            )
            .await;

        let names: Vec<&str> = outcome.accepted.iter().map(|item| item.name()).collect();
        assert_eq!(names, vec!["new.rvg", "other.dcm"]);
        assert_eq!(outcome.previews.len(), 2);
        assert_eq!(outcome.previews[0].id, outcome.accepted[0].id);
        assert_eq!(outcome.previews[1].id, outcome.accepted[1].id);
        assert!(outcome.previews.iter().all(|p| p.thumbnail_url.is_none()));
        assert_eq!(outcome.duplicates, vec!["old.dcm".to_string()]);
        assert_eq!(
            outcome.duplicate_notice().as_deref(),
            Some("old.dcm is already uploaded")
        );
        assert_eq!(
            outcome.banner_message().as_deref(),
            Some("photo.jpg: Unsupported file format. Please upload .dcm, .rvg")
        );
    }

    #[tokio::test]
    async fn accepted_ids_are_unique() {
        let intake = intake();
        let outcome = intake
            .select(
                vec![
                    SelectedFile::from_bytes("a.dcm", vec![0; 1]),
                    SelectedFile::from_bytes("b.dcm", vec![0; 1]),
                ],
                &[],
            )
            .await;
        assert_ne!(outcome.accepted[0].id, outcome.accepted[1].id);
        assert!(outcome.banner_message().is_none());
    }
}
