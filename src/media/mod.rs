//! Preparing selected files for a media field.
//!
//! Photos are compressed, then every file is checked against the field's
//! [`MediaPolicy`]. The work happens off the form state and produces a
//! [`PreparedBatch`]; committing it is a separate, synchronous step on the
//! [`MediaIntake`], so a field cleared in the meantime simply discards it.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::media::{
    BatchTicket, MediaFile, MediaItem, MediaKind, MediaPolicy, OversizePolicy, PreparedBatch,
    PreviewRegistry, PreviewUrl,
};
use crate::forms::FormError;
use crate::forms::media::{BatchOutcome, MediaIntake};

pub mod compression;
pub mod preview;

use compression::ImageCompressor;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Compressor and preview allocator shared by both media fields.
#[derive(Clone)]
pub struct MediaPipeline {
    registry: Arc<dyn PreviewRegistry>,
    compressor: Arc<dyn ImageCompressor>,
}

impl MediaPipeline {
    pub fn new(registry: Arc<dyn PreviewRegistry>, compressor: Arc<dyn ImageCompressor>) -> Self {
        Self {
            registry,
            compressor,
        }
    }

    pub fn registry(&self) -> &Arc<dyn PreviewRegistry> {
        &self.registry
    }

    /// Compresses and checks `files` without touching any form state.
    pub async fn prepare(
        &self,
        policy: &MediaPolicy,
        ticket: BatchTicket,
        files: Vec<MediaFile>,
    ) -> PreparedBatch {
        let mut items = Vec::with_capacity(files.len());
        let mut rejected = Vec::new();
        let mut flagged = Vec::new();

        for file in files {
            let file = match policy.kind {
                MediaKind::Image => self.compress_or_keep(file).await,
                MediaKind::Video => file,
            };

            let valid = policy.accepts_mime(&file.mime) && policy.within_size(&file);
            if !valid {
                match policy.oversize {
                    OversizePolicy::Exclude => {
                        log::info!(
                            "Rejected {} {} ({} bytes)",
                            policy.kind.label(),
                            file.name,
                            file.size()
                        );
                        rejected.push(file.name);
                        continue;
                    }
                    OversizePolicy::Flag => flagged.push(file.name.clone()),
                }
            }

            let preview = PreviewUrl::allocate(&self.registry, &file);
            items.push(MediaItem::New {
                file,
                preview,
                valid,
            });
        }

        let error = batch_message(policy, &rejected, &flagged);
        PreparedBatch {
            kind: policy.kind,
            ticket,
            items,
            rejected,
            flagged,
            error,
        }
    }

    /// Prepares `files` and appends them to `intake` in one call.
    pub async fn add_files(
        &self,
        intake: &mut MediaIntake,
        files: Vec<MediaFile>,
    ) -> Result<BatchOutcome, FormError> {
        let policy = intake.policy().clone();
        let ticket = intake.ticket();
        let batch = self.prepare(&policy, ticket, files).await;
        intake.apply_batch(batch)
    }

    async fn compress_or_keep(&self, file: MediaFile) -> MediaFile {
        match self.compressor.compress(file.clone()).await {
            Ok(compressed) => compressed,
            Err(err) => {
                log::warn!("Failed to compress {}, keeping original: {err}", file.name);
                file
            }
        }
    }
}

fn batch_message(policy: &MediaPolicy, rejected: &[String], flagged: &[String]) -> Option<String> {
    let label = policy.kind.label();
    let limit = policy.max_megabytes();
    let mut parts = Vec::new();

    if !rejected.is_empty() {
        parts.push(format!(
            "Some {label}s were not added (max {limit} MB, accepted formats: {}): {}",
            policy.accepted_mime.join(", "),
            rejected.join(", ")
        ));
    }
    if !flagged.is_empty() {
        parts.push(format!(
            "Some {label}s exceed {limit} MB or have an unsupported format: {}",
            flagged.join(", ")
        ));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}
