//! Form state, validation and submission pipeline of the business marketplace.
//!
//! The `data` feature compiles the form layer only. The `client` feature
//! adds media preparation, the HTTP API and the form controller.

#[cfg(feature = "client")]
use std::sync::Arc;

#[cfg(feature = "client")]
use crate::api::{ApiClient, ApiResult};
#[cfg(feature = "client")]
use crate::domain::media::PreviewRegistry;
#[cfg(feature = "client")]
use crate::domain::session::Session;
#[cfg(feature = "client")]
use crate::media::MediaPipeline;
#[cfg(feature = "client")]
use crate::media::compression::JpegCompressor;
#[cfg(feature = "client")]
use crate::media::preview::BlobUrlRegistry;
#[cfg(feature = "client")]
use crate::models::config::ClientConfig;
#[cfg(feature = "client")]
use crate::services::business_form::FormContext;
#[cfg(feature = "client")]
use crate::services::ui::FormUi;

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod formatting;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod validation;

#[cfg(feature = "client")]
pub mod api;
#[cfg(feature = "client")]
mod error_conversions;
#[cfg(feature = "client")]
pub mod media;
#[cfg(feature = "client")]
pub mod models;
#[cfg(feature = "client")]
pub mod services;

/// Builds the HTTP client for the configured backend.
#[cfg(feature = "client")]
pub fn build_api_client(config: &ClientConfig, session: Arc<Session>) -> ApiResult<ApiClient> {
    ApiClient::new(&config.api_base_url, session, config.request_timeout())
}

/// Wires the media pipeline and settings shared by every business form.
#[cfg(feature = "client")]
pub fn build_form_context(config: &ClientConfig, ui: Arc<dyn FormUi>) -> FormContext {
    let registry: Arc<dyn PreviewRegistry> =
        Arc::new(BlobUrlRegistry::new(config.preview_origin.as_str()));
    let compressor = Arc::new(JpegCompressor::new(config.compression_options()));

    FormContext {
        settings: config.form_settings(),
        media: MediaPipeline::new(registry, compressor),
        ui,
    }
}
