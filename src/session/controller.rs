use std::{sync::Arc, time::Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    batch::{BatchProcessor, BatchSummary},
    client::PredictionService,
    error::{TransportError, ValidationError},
    intake::FileIntake,
    models::{ProcessingResult, SelectedFile, UploadItem},
    settings::Settings,
    store::StoreAction,
};

use super::{SessionSnapshot, SessionState};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Entry point for everything the user can do in a session.
///
/// Cloning is cheap; clones share the same state and batch slot.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    intake: FileIntake,
    processor: BatchProcessor,
    settings: Arc<Settings>,
    /// Token of the batch currently allowed to run. Taken on cancel so a new
    /// batch can start while the old one winds down.
    batch_cancel: Arc<Mutex<Option<CancellationToken>>>,
}

impl SessionController {
    pub fn new(settings: Arc<Settings>, service: Arc<dyn PredictionService>) -> Self {
        let state = Arc::new(Mutex::new(SessionState::new()));
        Self {
            intake: FileIntake::new(Arc::clone(&settings)),
            processor: BatchProcessor::new(service, Arc::clone(&state), Arc::clone(&settings)),
            state,
            settings,
            batch_cancel: Arc::new(Mutex::new(None)),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn select_files(&self, files: Vec<SelectedFile>) -> SessionSnapshot {
        let existing = self.state.lock().await.uploads.clone();
        let outcome = self.intake.select(files, &existing).await;

        let mut state = self.state.lock().await;
        state.merge_selection(&outcome, &self.settings);
        state.snapshot_at(Instant::now())
    }

    pub async fn remove_file(&self, id: Uuid) -> bool {
        let removed = self.state.lock().await.remove_file(id);
        if removed {
            log_info!("removed upload {id}");
        }
        removed
    }

    /// Submits every queued upload and waits for the whole batch to settle.
    pub async fn analyze(&self) -> Result<BatchSummary, ValidationError> {
        let token = {
            let mut slot = self.batch_cancel.lock().await;
            if slot.is_some() {
                return Err(ValidationError::BatchInProgress);
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        let items = self.state.lock().await.uploads.clone();
        let result = self.processor.run_batch(items, token.clone()).await;

        // A cancelled token was already taken out of the slot, which may now
        // hold a newer batch.
        if !token.is_cancelled() {
            self.batch_cancel.lock().await.take();
        }
        result
    }

    /// Cancels the running batch. Results still loading are failed right away;
    /// returns how many.
    pub async fn cancel_batch(&self) -> usize {
        let Some(token) = self.batch_cancel.lock().await.take() else {
            return 0;
        };
        token.cancel();

        let mut state = self.state.lock().await;
        let loading = state.results.loading_ids();
        let message = TransportError::Cancelled.user_message();
        for id in &loading {
            state.results.apply(StoreAction::Fail(*id, message.clone()));
        }
        log_warn!("batch cancelled with {} request(s) in flight", loading.len());
        loading.len()
    }

    /// Starts over: cancels any running batch and clears the session.
    pub async fn reanalyze(&self) -> SessionSnapshot {
        if let Some(token) = self.batch_cancel.lock().await.take() {
            token.cancel();
        }
        let mut state = self.state.lock().await;
        state.reset();
        log_info!("session reset");
        state.snapshot_at(Instant::now())
    }

    pub async fn select_result(&self, id: Uuid) -> bool {
        self.state.lock().await.select_result(id)
    }

    pub async fn selected_result(&self) -> Option<ProcessingResult> {
        self.state.lock().await.selected_result().cloned()
    }

    pub async fn dismiss_banner(&self) {
        self.state.lock().await.dismiss_banner();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot_at(Instant::now())
    }

    pub async fn results(&self) -> Vec<ProcessingResult> {
        self.state.lock().await.results.to_vec()
    }

    pub async fn uploads(&self) -> Vec<UploadItem> {
        self.state.lock().await.uploads.clone()
    }
}
