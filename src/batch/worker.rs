use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    client::PredictionService,
    error::TransportError,
    models::{AnalysisPayload, UploadItem},
    session::SessionState,
    store::StoreAction,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Runs the single request for one upload, racing it against the batch's
/// cancellation token.
pub async fn process_upload(
    item: &UploadItem,
    service: &dyn PredictionService,
    cancel_token: &CancellationToken,
) -> Result<AnalysisPayload, TransportError> {
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => Err(TransportError::Cancelled),
        result = submit(item, service) => result,
    }
}

async fn submit(
    item: &UploadItem,
    service: &dyn PredictionService,
) -> Result<AnalysisPayload, TransportError> {
    let bytes = item.file.read().await.map_err(|source| TransportError::Read {
        name: item.name().to_string(),
        source,
    })?;
    service.predict(item.name(), bytes).await
}

/// Writes one upload's terminal state into the current session.
///
/// Read-modify-write under the lock, scoped to this item's id. Dropped when the
/// session has moved on to another batch or the file was removed meanwhile.
pub async fn record_outcome(
    state: &Mutex<SessionState>,
    generation: u64,
    item: &UploadItem,
    outcome: Result<AnalysisPayload, TransportError>,
) {
    let action = match outcome {
        Ok(payload) => {
            log_info!(
                "{} analysed: {} finding(s)",
                item.name(),
                payload.predictions.len()
            );
            StoreAction::Succeed(item.id, payload)
        }
        Err(err) => {
            log_warn!("{} failed: {err}", item.name());
            StoreAction::Fail(item.id, err.user_message())
        }
    };

    let mut guard = state.lock().await;
    if guard.batch_generation != generation {
        log_debug!(
            "dropping result for {} from superseded batch {generation}",
            item.name()
        );
        return;
    }
    if !guard.results.apply(action) {
        log_debug!("{} is no longer awaiting a result", item.name());
    }
}
