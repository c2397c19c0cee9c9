//! In-memory result store keyed by upload id.
//!
//! All mutation goes through [`ResultStore::apply`], which only ever touches
//! the entry named by the action. Entries keep selection order.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{AnalysisPayload, ProcessingResult, ResultState, UploadItem};

#[derive(Debug, Clone)]
pub enum StoreAction {
    /// Replace the store with one Pending entry per item.
    Stage(Vec<(Uuid, String)>),
    /// Pending -> Loading for one id.
    Start(Uuid),
    /// Loading -> Success.
    Succeed(Uuid, AnalysisPayload),
    /// Loading -> Failed.
    Fail(Uuid, String),
    Remove(Uuid),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultStore {
    entries: Vec<ProcessingResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store for a fresh batch: every item staged, then moved to Loading so
    /// all placeholders exist before the first request goes out.
    pub fn for_batch(items: &[UploadItem]) -> Self {
        let mut store = Self::new();
        store.apply(StoreAction::Stage(
            items
                .iter()
                .map(|item| (item.id, item.name().to_string()))
                .collect(),
        ));
        for item in items {
            store.apply(StoreAction::Start(item.id));
        }
        store
    }

    /// Applies one action. Returns whether the store changed; transitions that
    /// are not allowed from the entry's current state, and ids that are no
    /// longer present, leave the store untouched.
    pub fn apply(&mut self, action: StoreAction) -> bool {
        match action {
            StoreAction::Stage(items) => {
                self.entries = items
                    .into_iter()
                    .map(|(id, file_name)| ProcessingResult::pending(id, file_name))
                    .collect();
                true
            }
            StoreAction::Start(id) => self.transition(id, |state| match state {
                ResultState::Pending => Some(ResultState::Loading),
                _ => None,
            }),
            StoreAction::Succeed(id, payload) => self.transition(id, move |state| match state {
                ResultState::Loading => Some(ResultState::Success(payload)),
                _ => None,
            }),
            StoreAction::Fail(id, message) => self.transition(id, move |state| match state {
                ResultState::Loading => Some(ResultState::Failed(message)),
                _ => None,
            }),
            StoreAction::Remove(id) => {
                let before = self.entries.len();
                self.entries.retain(|entry| entry.id != id);
                self.entries.len() != before
            }
            StoreAction::Clear => {
                let changed = !self.entries.is_empty();
                self.entries.clear();
                changed
            }
        }
    }

    fn transition(
        &mut self,
        id: Uuid,
        next: impl FnOnce(&ResultState) -> Option<ResultState>,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        match next(&entry.state) {
            Some(state) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&ProcessingResult> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_terminal(&self) -> bool {
        self.entries.iter().all(|entry| entry.status().is_terminal())
    }

    pub fn loading_ids(&self) -> Vec<Uuid> {
        self.entries
            .iter()
            .filter(|entry| entry.is_loading())
            .map(|entry| entry.id)
            .collect()
    }

    pub fn to_vec(&self) -> Vec<ProcessingResult> {
        self.entries.clone()
    }
}
