//! Photo and video lists of the business form.

use crate::domain::media::{
    BatchTicket, MediaFile, MediaItem, MediaKind, MediaPolicy, PreparedBatch,
};
use crate::domain::types::MediaUrl;
use crate::forms::FormError;

/// Result of committing a prepared batch.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Items were appended; `error` describes rejected or flagged files.
    Applied { added: usize, error: Option<String> },
    /// The field was cleared after the batch started; its items were released.
    Stale { dropped: usize },
}

/// Media attached to one field, new and already persisted.
#[derive(Debug)]
pub struct MediaIntake {
    policy: MediaPolicy,
    items: Vec<MediaItem>,
    generation: u64,
}

impl MediaIntake {
    pub fn new(policy: MediaPolicy) -> Self {
        Self {
            policy,
            items: Vec::new(),
            generation: 0,
        }
    }

    /// Starts with media already stored by the backend.
    pub fn with_existing(policy: MediaPolicy, urls: Vec<MediaUrl>) -> Self {
        Self {
            policy,
            items: urls
                .into_iter()
                .map(|url| MediaItem::Existing { url })
                .collect(),
            generation: 0,
        }
    }

    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    pub fn kind(&self) -> MediaKind {
        self.policy.kind
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stamp to hand to a batch that is about to be prepared.
    pub fn ticket(&self) -> BatchTicket {
        BatchTicket(self.generation)
    }

    /// Appends a prepared batch unless the field was cleared in the meantime.
    pub fn apply_batch(&mut self, batch: PreparedBatch) -> Result<BatchOutcome, FormError> {
        if batch.kind != self.policy.kind {
            return Err(FormError::MediaKindMismatch);
        }

        if batch.ticket != self.ticket() {
            let dropped = batch.items.len();
            log::debug!("Discarding stale {} batch of {dropped} item(s)", batch.kind.label());
            return Ok(BatchOutcome::Stale { dropped });
        }

        let added = batch.items.len();
        self.items.extend(batch.items);

        Ok(BatchOutcome::Applied {
            added,
            error: batch.error.or_else(|| self.field_error()),
        })
    }

    /// Removes the new item at `index`, releasing its preview.
    ///
    /// Remaining items keep their relative order. Persisted items are only
    /// dropped through [`Self::remove_existing`] once the backend deleted them.
    pub fn remove_file(&mut self, index: usize) -> Result<(), FormError> {
        match self.items.get(index) {
            None => return Err(FormError::MediaIndex(index)),
            Some(MediaItem::Existing { .. }) => return Err(FormError::PersistedMedia(index)),
            Some(MediaItem::New { .. }) => {}
        }
        let removed = self.items.remove(index);
        drop(removed);
        Ok(())
    }

    /// Forgets a persisted item after the backend deleted it.
    pub fn remove_existing(&mut self, url: &MediaUrl) -> bool {
        let position = self
            .items
            .iter()
            .position(|item| matches!(item, MediaItem::Existing { url: existing } if existing == url));
        match position {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops new items, releasing their previews, and invalidates pending
    /// batches. Persisted items stay listed. Returns how many were dropped.
    pub fn release_new(&mut self) -> usize {
        self.generation += 1;
        let before = self.items.len();
        self.items.retain(|item| !item.is_new());
        before - self.items.len()
    }

    pub fn new_files(&self) -> impl Iterator<Item = &MediaFile> {
        self.items.iter().filter_map(MediaItem::file)
    }

    pub fn invalid_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.is_valid())
            .filter_map(|item| item.file().map(|file| file.name.as_str()))
            .collect()
    }

    /// Message for an empty mandatory field.
    pub fn field_error(&self) -> Option<String> {
        if self.policy.required && self.items.is_empty() {
            Some(format!("Add at least one {}", self.policy.kind.label()))
        } else {
            None
        }
    }
}
