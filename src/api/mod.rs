//! Backend contract of the marketplace and its HTTP implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::business::Business;
use crate::domain::media::MediaKind;
use crate::domain::session::UserProfile;
use crate::domain::types::{BusinessId, MediaUrl};
use crate::forms::account::{PasswordChangeForm, ProfileUpdate, SignInForm};
use crate::forms::message::{ContactMessageForm, InquiryForm};

pub mod client;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod payload;

pub use client::ApiClient;
pub use errors::{ApiError, ApiResult};
pub use payload::{BusinessPayload, PayloadPart};

/// Acknowledgement of a listing create or update.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<BusinessId>,
}

/// Credentials issued on sign-in.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Plain acknowledgement carrying an optional message.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Operations the marketplace backend exposes to the forms.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Primes the anti-forgery cookie before a state-changing request.
    async fn fetch_csrf_cookie(&self) -> ApiResult<()>;

    async fn get_business(&self, id: BusinessId) -> ApiResult<Business>;

    async fn submit_business(&self, payload: BusinessPayload) -> ApiResult<SubmitResponse>;

    async fn update_business(
        &self,
        id: BusinessId,
        payload: BusinessPayload,
    ) -> ApiResult<SubmitResponse>;

    /// Deletes one persisted photo or video of a listing.
    async fn delete_media(&self, id: BusinessId, kind: MediaKind, url: MediaUrl)
    -> ApiResult<()>;

    async fn sign_in(&self, form: SignInForm) -> ApiResult<SignInResponse>;

    async fn change_password(&self, form: PasswordChangeForm) -> ApiResult<MessageResponse>;

    async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<UserProfile>;

    async fn send_contact_message(&self, form: ContactMessageForm) -> ApiResult<MessageResponse>;

    async fn send_inquiry(&self, id: BusinessId, form: InquiryForm) -> ApiResult<MessageResponse>;
}
