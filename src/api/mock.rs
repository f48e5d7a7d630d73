//! Mock backend for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::api::{
    ApiResult, BusinessPayload, MarketplaceApi, MessageResponse, SignInResponse, SubmitResponse,
};
use crate::domain::business::Business;
use crate::domain::media::MediaKind;
use crate::domain::session::UserProfile;
use crate::domain::types::{BusinessId, MediaUrl};
use crate::forms::account::{PasswordChangeForm, ProfileUpdate, SignInForm};
use crate::forms::message::{ContactMessageForm, InquiryForm};

mock! {
    pub MarketplaceApi {}

    #[async_trait]
    impl MarketplaceApi for MarketplaceApi {
        async fn fetch_csrf_cookie(&self) -> ApiResult<()>;
        async fn get_business(&self, id: BusinessId) -> ApiResult<Business>;
        async fn submit_business(&self, payload: BusinessPayload) -> ApiResult<SubmitResponse>;
        async fn update_business(
            &self,
            id: BusinessId,
            payload: BusinessPayload,
        ) -> ApiResult<SubmitResponse>;
        async fn delete_media(
            &self,
            id: BusinessId,
            kind: MediaKind,
            url: MediaUrl,
        ) -> ApiResult<()>;
        async fn sign_in(&self, form: SignInForm) -> ApiResult<SignInResponse>;
        async fn change_password(&self, form: PasswordChangeForm) -> ApiResult<MessageResponse>;
        async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<UserProfile>;
        async fn send_contact_message(
            &self,
            form: ContactMessageForm,
        ) -> ApiResult<MessageResponse>;
        async fn send_inquiry(
            &self,
            id: BusinessId,
            form: InquiryForm,
        ) -> ApiResult<MessageResponse>;
    }
}
