//! Resolution use-case service.
//!
//! # Responsibility
//! - Provide create/edit/delete, milestone toggle, "what's next" and
//!   journal entry points for UI callers.
//! - Own the completion stamp: detect the incomplete-to-complete edge and
//!   persist `completed_at`.
//!
//! # Invariants
//! - Input validation (non-empty title, non-empty journal text) happens
//!   here, never in model constructors.
//! - The completion stamp is a second save after the mutation save. A
//!   crash between the two leaves a complete resolution without
//!   `completed_at`; later saves do not repair it because the freshly
//!   loaded state already counts as complete.
//! - `completed_at` is never cleared when a resolution regresses.

use crate::kv::KeyValueStore;
use crate::model::id::now_timestamp;
use crate::model::resolution::{JournalEntry, Milestone, Resolution};
use crate::storage::store::{ResolutionStore, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for resolution use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Journal text is empty after trimming.
    EmptyJournalText,
    /// Target resolution does not exist.
    NotFound(String),
    /// Target milestone does not exist on the resolution.
    MilestoneNotFound {
        resolution_id: String,
        milestone_id: String,
    },
    /// Persistence-layer failure.
    Storage(StorageError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "resolution title cannot be empty"),
            Self::EmptyJournalText => write!(f, "journal entry text cannot be empty"),
            Self::NotFound(id) => write!(f, "resolution not found: {id}"),
            Self::MilestoneNotFound {
                resolution_id,
                milestone_id,
            } => write!(
                f,
                "milestone {milestone_id} not found on resolution {resolution_id}"
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Form input for creating or editing a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionDraft {
    pub title: String,
    pub description: String,
    /// Milestones with blank titles are dropped on save.
    pub milestones: Vec<Milestone>,
}

impl ResolutionDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            milestones: Vec::new(),
        }
    }

    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }

    fn normalize(self) -> ServiceResult<Self> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::EmptyTitle);
        }

        Ok(Self {
            title,
            description: self.description.trim().to_string(),
            milestones: self
                .milestones
                .into_iter()
                .filter(|milestone| !milestone.title.trim().is_empty())
                .collect(),
        })
    }
}

/// Result of a mutation that may complete a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Resolution as persisted, including any completion stamp.
    pub resolution: Resolution,
    /// True when this call moved the resolution to complete. UIs use it to
    /// trigger their celebration.
    pub became_complete: bool,
}

/// Resolution service facade over a key-value store.
pub struct ResolutionService<S: KeyValueStore> {
    store: ResolutionStore<S>,
}

impl<S: KeyValueStore> ResolutionService<S> {
    pub fn new(kv: S) -> Self {
        Self {
            store: ResolutionStore::new(kv),
        }
    }

    /// Lists all resolutions in stored order.
    pub fn list(&self) -> Vec<Resolution> {
        self.store.load()
    }

    pub fn get(&self, id: &str) -> Option<Resolution> {
        self.store.load().into_iter().find(|r| r.id == id)
    }

    /// Creates a resolution from a validated draft and appends it.
    pub fn create(&self, draft: ResolutionDraft) -> ServiceResult<Resolution> {
        let draft = draft.normalize()?;
        let mut resolutions = self.store.load();

        let mut resolution = Resolution::new(draft.title, draft.description);
        resolution.milestones = draft.milestones;
        resolutions.push(resolution.clone());

        self.store.save(&resolutions)?;
        Ok(resolution)
    }

    /// Replaces title, description and milestones of an existing
    /// resolution. Journal, "what's next" and stamps are kept.
    pub fn update(&self, id: &str, draft: ResolutionDraft) -> ServiceResult<Resolution> {
        let draft = draft.normalize()?;
        let mut resolutions = self.store.load();
        let index = position(&resolutions, id)?;

        let resolution = &mut resolutions[index];
        resolution.title = draft.title;
        resolution.description = draft.description;
        resolution.milestones = draft.milestones;
        let updated = resolution.clone();

        self.store.save(&resolutions)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut resolutions = self.store.load();
        let index = position(&resolutions, id)?;
        resolutions.remove(index);
        self.store.save(&resolutions)?;
        Ok(())
    }

    /// Flips one milestone and stamps the resolution if that completes it.
    pub fn toggle_milestone(&self, id: &str, milestone_id: &str) -> ServiceResult<SaveOutcome> {
        let mut resolutions = self.store.load();
        let index = position(&resolutions, id)?;
        let was_complete = resolutions[index].is_complete();

        if !resolutions[index].toggle_milestone(milestone_id, &now_timestamp()) {
            return Err(ServiceError::MilestoneNotFound {
                resolution_id: id.to_string(),
                milestone_id: milestone_id.to_string(),
            });
        }

        self.save_and_check(resolutions, index, was_complete)
    }

    /// Stores the "what's next" prompt verbatim. Unchanged text skips the
    /// write entirely.
    pub fn set_whats_next(&self, id: &str, text: &str) -> ServiceResult<SaveOutcome> {
        let mut resolutions = self.store.load();
        let index = position(&resolutions, id)?;

        if resolutions[index].whats_next == text {
            return Ok(SaveOutcome {
                resolution: resolutions.swap_remove(index),
                became_complete: false,
            });
        }

        let was_complete = resolutions[index].is_complete();
        resolutions[index].whats_next = text.to_string();
        self.save_and_check(resolutions, index, was_complete)
    }

    /// Prepends a journal entry with trimmed text.
    pub fn add_journal_entry(&self, id: &str, text: &str) -> ServiceResult<SaveOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyJournalText);
        }

        let mut resolutions = self.store.load();
        let index = position(&resolutions, id)?;
        let was_complete = resolutions[index].is_complete();

        resolutions[index].add_journal_entry(JournalEntry::new(text));
        self.save_and_check(resolutions, index, was_complete)
    }

    /// Saves the mutated collection, then stamps and saves again when the
    /// resolution at `index` just became complete.
    fn save_and_check(
        &self,
        mut resolutions: Vec<Resolution>,
        index: usize,
        was_complete: bool,
    ) -> ServiceResult<SaveOutcome> {
        self.store.save(&resolutions)?;

        if was_complete || !resolutions[index].is_complete() {
            return Ok(SaveOutcome {
                resolution: resolutions.swap_remove(index),
                became_complete: false,
            });
        }

        resolutions[index].mark_completed(&now_timestamp());
        self.store.save(&resolutions)?;

        let resolution = resolutions.swap_remove(index);
        info!(
            "event=resolution_complete module=service status=ok milestones={}",
            resolution.milestones.len()
        );
        Ok(SaveOutcome {
            resolution,
            became_complete: true,
        })
    }
}

fn position(resolutions: &[Resolution], id: &str) -> ServiceResult<usize> {
    resolutions
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| ServiceError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ResolutionDraft, ServiceError};
    use crate::model::resolution::Milestone;

    #[test]
    fn normalize_trims_and_drops_blank_milestones() {
        let draft = ResolutionDraft::new("  Read more  ", " twelve books ")
            .with_milestone(Milestone::new("   ", None))
            .with_milestone(Milestone::new("first book", None))
            .normalize()
            .unwrap();

        assert_eq!(draft.title, "Read more");
        assert_eq!(draft.description, "twelve books");
        assert_eq!(draft.milestones.len(), 1);
        assert_eq!(draft.milestones[0].title, "first book");
    }

    #[test]
    fn normalize_rejects_blank_title() {
        let err = ResolutionDraft::new(" \t", "desc").normalize().unwrap_err();
        assert!(matches!(err, ServiceError::EmptyTitle));
    }
}
