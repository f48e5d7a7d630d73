//! In-process preview URL allocator.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::media::{MediaFile, PreviewRegistry};

/// Hands out `blob:` URLs and tracks which are still live.
#[derive(Debug)]
pub struct BlobUrlRegistry {
    origin: String,
    live: Mutex<HashSet<String>>,
}

impl BlobUrlRegistry {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            live: Mutex::new(HashSet::new()),
        }
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        match self.live.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PreviewRegistry for BlobUrlRegistry {
    fn create(&self, file: &MediaFile) -> String {
        let url = format!("blob:{}/{}", self.origin, Uuid::new_v4());
        log::debug!("Allocated preview {url} for {}", file.name);
        self.lock().insert(url.clone());
        url
    }

    fn revoke(&self, url: &str) {
        if !self.lock().remove(url) {
            log::warn!("Preview {url} was not live when revoked");
        }
    }
}
