use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    intake::{Notice, SelectionOutcome},
    models::{FilePreview, ProcessingResult, UploadItem},
    settings::Settings,
    store::{ResultStore, StoreAction},
};

/// Everything the user sees in one session. Only ever mutated behind the
/// controller's lock.
#[derive(Debug, Default)]
pub struct SessionState {
    pub uploads: Vec<UploadItem>,
    pub previews: Vec<FilePreview>,
    pub results: ResultStore,
    pub selected: Option<Uuid>,
    pub is_loading: bool,
    /// Short-lived duplicate-file notice.
    pub notice: Option<Notice>,
    /// Validation banner (size/format rejections, empty submission).
    pub banner: Option<Notice>,
    /// Which batch owns `results`; completions from older batches are dropped.
    pub batch_generation: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub files: Vec<FilePreview>,
    pub results: Vec<ProcessingResult>,
    pub selected_id: Option<Uuid>,
    pub is_loading: bool,
    pub notice: Option<String>,
    pub banner: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one selection event: all accepted files and all previews land in
    /// a single update. A file that became a duplicate while previews were
    /// being generated is dropped together with its preview.
    pub fn merge_selection(&mut self, outcome: &SelectionOutcome, settings: &Settings) {
        let now = Instant::now();

        if let Some(message) = outcome.duplicate_notice() {
            self.notice = Some(Notice::raised_at(message, settings.duplicate_notice_ttl(), now));
        }
        if let Some(message) = outcome.banner_message() {
            self.banner = Some(Notice::raised_at(message, settings.banner_ttl(), now));
        }

        for item in &outcome.accepted {
            if self
                .uploads
                .iter()
                .any(|existing| existing.file.same_upload_as(&item.file))
            {
                continue;
            }
            self.uploads.push(item.clone());
            if let Some(preview) = outcome.previews.iter().find(|p| p.id == item.id) {
                self.previews.push(preview.clone());
            }
        }
    }

    /// Drops the upload, preview and result for `id`.
    ///
    /// The selection is cleared whether or not `id` was the selected result.
    pub fn remove_file(&mut self, id: Uuid) -> bool {
        let before = self.uploads.len();
        self.uploads.retain(|item| item.id != id);
        self.previews.retain(|preview| preview.id != id);
        let removed_result = self.results.apply(StoreAction::Remove(id));
        self.selected = None;
        self.uploads.len() != before || removed_result
    }

    /// Selects a result for the detail view; ignores ids with no result.
    pub fn select_result(&mut self, id: Uuid) -> bool {
        if self.results.contains(id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected_result(&self) -> Option<&ProcessingResult> {
        self.selected.and_then(|id| self.results.get(id))
    }

    pub fn raise_banner(&mut self, message: impl Into<String>, settings: &Settings) {
        self.banner = Some(Notice::new(message, settings.banner_ttl()));
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Clears every collection. The generation keeps counting so in-flight
    /// completions from the old batch cannot land.
    pub fn reset(&mut self) {
        let generation = self.batch_generation + 1;
        *self = Self {
            batch_generation: generation,
            ..Self::default()
        };
    }

    pub fn snapshot_at(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            files: self.previews.clone(),
            results: self.results.to_vec(),
            selected_id: self.selected,
            is_loading: self.is_loading,
            notice: self
                .notice
                .as_ref()
                .and_then(|n| n.visible_at(now))
                .map(str::to_string),
            banner: self
                .banner
                .as_ref()
                .and_then(|n| n.visible_at(now))
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ValidationError,
        models::{ResultStatus, SelectedFile},
    };
    use std::time::Duration;

    fn upload(name: &str) -> UploadItem {
        UploadItem::new(SelectedFile::from_bytes(name, vec![0; 8]))
    }

    fn state_with_batch(names: &[&str]) -> SessionState {
        let uploads: Vec<UploadItem> = names.iter().map(|n| upload(n)).collect();
        let mut state = SessionState::new();
        state.previews = uploads
            .iter()
            .map(|item| FilePreview::placeholder(item.id, item.name()))
            .collect();
        state.results = ResultStore::for_batch(&uploads);
        state.uploads = uploads;
        state
    }

    #[test]
    fn removing_an_unselected_file_still_clears_selection() {
        let mut state = state_with_batch(&["a.dcm", "b.dcm", "c.dcm"]);
        let (a, b, c) = (state.uploads[0].id, state.uploads[1].id, state.uploads[2].id);
        assert!(state.select_result(a));

        assert!(state.remove_file(b));
        assert_eq!(state.selected, None);
        assert_eq!(state.uploads.len(), 2);
        assert_eq!(state.previews.len(), 2);
        assert!(state.results.contains(a));
        assert!(state.results.contains(c));
        assert!(!state.results.contains(b));
        assert_eq!(state.results.get(c).unwrap().status(), ResultStatus::Loading);
    }

    #[test]
    fn removing_an_unknown_id_changes_nothing_but_selection() {
        let mut state = state_with_batch(&["a.dcm"]);
        let a = state.uploads[0].id;
        state.select_result(a);

        assert!(!state.remove_file(Uuid::new_v4()));
        assert_eq!(state.uploads.len(), 1);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn selecting_requires_an_existing_result() {
        let mut state = state_with_batch(&["a.dcm"]);
        assert!(!state.select_result(Uuid::new_v4()));
        assert_eq!(state.selected, None);
        assert!(state.selected_result().is_none());
    }

    #[test]
    fn merge_is_atomic_and_skips_late_duplicates() {
        let settings = Settings::default();
        let mut state = SessionState::new();
        state.uploads.push(upload("a.dcm"));

        let late_duplicate = upload("a.dcm");
        let fresh = upload("b.dcm");
        let outcome = SelectionOutcome {
            previews: vec![
                FilePreview::placeholder(late_duplicate.id, "a.dcm"),
                FilePreview::placeholder(fresh.id, "b.dcm"),
            ],
            accepted: vec![late_duplicate, fresh.clone()],
            errors: vec![ValidationError::UnsupportedFormat {
                name: "x.png".into(),
                allowed: ".dcm, .rvg".into(),
            }],
            duplicates: vec!["c.dcm".into()],
        };

        state.merge_selection(&outcome, &settings);
        assert_eq!(state.uploads.len(), 2);
        assert_eq!(state.uploads[1].id, fresh.id);
        assert_eq!(state.previews.len(), 1);
        assert_eq!(state.previews[0].id, fresh.id);

        let snapshot = state.snapshot_at(Instant::now());
        assert_eq!(snapshot.notice.as_deref(), Some("c.dcm is already uploaded"));
        assert!(snapshot.banner.unwrap().starts_with("x.png"));

        let later = state.snapshot_at(Instant::now() + Duration::from_secs(2));
        assert_eq!(later.notice, None);
        assert!(later.banner.is_some());
    }

    #[test]
    fn reset_clears_everything_and_advances_generation() {
        let mut state = state_with_batch(&["a.dcm"]);
        state.is_loading = true;
        state.batch_generation = 3;

        state.reset();
        assert!(state.uploads.is_empty());
        assert!(state.previews.is_empty());
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.batch_generation, 4);
    }
}
