use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    client::PredictionService,
    error::{ValidationError, GENERIC_FAILURE},
    models::{ProcessingResult, ResultStatus, UploadItem},
    session::SessionState,
    settings::Settings,
    store::{ResultStore, StoreAction},
};

use super::worker::{process_upload, record_outcome};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub generation: u64,
    /// Results in selection order. Empty when the batch was cancelled before
    /// staging or the session was reset before it settled.
    pub results: Vec<ProcessingResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub superseded: bool,
}

impl BatchSummary {
    fn settled(generation: u64, results: Vec<ProcessingResult>) -> Self {
        let succeeded = count_status(&results, ResultStatus::Success);
        let failed = count_status(&results, ResultStatus::Failed);
        Self {
            generation,
            results,
            succeeded,
            failed,
            superseded: false,
        }
    }

    fn superseded(generation: u64) -> Self {
        Self {
            generation,
            results: Vec::new(),
            succeeded: 0,
            failed: 0,
            superseded: true,
        }
    }
}

fn count_status(results: &[ProcessingResult], status: ResultStatus) -> usize {
    results.iter().filter(|r| r.status() == status).count()
}

/// Fans a batch of uploads out to the prediction service, one request per
/// file, and folds each completion back into the shared session state.
#[derive(Clone)]
pub struct BatchProcessor {
    service: Arc<dyn PredictionService>,
    state: Arc<Mutex<SessionState>>,
    settings: Arc<Settings>,
}

impl BatchProcessor {
    pub fn new(
        service: Arc<dyn PredictionService>,
        state: Arc<Mutex<SessionState>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service,
            state,
            settings,
        }
    }

    pub async fn run_batch(
        &self,
        items: Vec<UploadItem>,
        cancel_token: CancellationToken,
    ) -> Result<BatchSummary, ValidationError> {
        // Cancellation, validation and staging share one lock so a reset that
        // lands before staging cannot be overwritten by this batch.
        let generation = {
            let mut state = self.state.lock().await;
            if cancel_token.is_cancelled() {
                log_info!("batch cancelled before it was staged");
                return Ok(BatchSummary::superseded(state.batch_generation));
            }
            if items.is_empty() {
                let err = ValidationError::NoFilesSelected;
                state.raise_banner(err.to_string(), &self.settings);
                log_warn!("analysis requested with no files selected");
                return Err(err);
            }
            if state.is_loading {
                return Err(ValidationError::BatchInProgress);
            }

            // Every placeholder exists before the first request goes out.
            state.batch_generation += 1;
            state.results = ResultStore::for_batch(&items);
            state.selected = None;
            state.banner = None;
            state.is_loading = true;
            state.batch_generation
        };

        log_info!("batch {generation}: dispatching {} upload(s)", items.len());

        let handles: Vec<(Uuid, JoinHandle<()>)> = items
            .iter()
            .cloned()
            .map(|item| {
                let id = item.id;
                let service = Arc::clone(&self.service);
                let state = Arc::clone(&self.state);
                let token = cancel_token.clone();

                let handle = tokio::spawn(async move {
                    let outcome = process_upload(&item, service.as_ref(), &token).await;
                    record_outcome(&state, generation, &item, outcome).await;
                });
                (id, handle)
            })
            .collect();

        for (id, handle) in handles {
            if let Err(err) = handle.await {
                log_error!("batch {generation}: worker for {id} failed to join: {err}");
                let mut state = self.state.lock().await;
                if state.batch_generation == generation {
                    state
                        .results
                        .apply(StoreAction::Fail(id, GENERIC_FAILURE.to_string()));
                }
            }
        }

        let mut state = self.state.lock().await;
        if state.batch_generation != generation {
            log_info!("batch {generation}: session was reset before the batch settled");
            return Ok(BatchSummary::superseded(generation));
        }

        state.is_loading = false;
        let first_present = items
            .iter()
            .map(|item| item.id)
            .find(|id| state.results.contains(*id));
        state.selected = first_present;

        let summary = BatchSummary::settled(generation, state.results.to_vec());
        log_info!(
            "batch {generation}: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        Ok(summary)
    }
}
