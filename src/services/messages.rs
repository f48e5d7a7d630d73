//! Contact-us messages and listing inquiries.

use crate::api::MarketplaceApi;
use crate::domain::types::BusinessId;
use crate::forms::message::{ContactMessageForm, InquiryForm};
use crate::services::ServiceResult;

/// Sends a message to the marketplace team.
pub async fn send_contact_message<A>(api: &A, form: &ContactMessageForm) -> ServiceResult<Option<String>>
where
    A: MarketplaceApi + ?Sized,
{
    let cleaned = form.clean()?;
    let response = api.send_contact_message(cleaned).await.map_err(|err| {
        log::error!("Failed to send contact message: {err}");
        err
    })?;
    Ok(response.message)
}

/// Sends an inquiry to the seller of listing `id`.
pub async fn send_inquiry<A>(api: &A, id: BusinessId, form: &InquiryForm) -> ServiceResult<Option<String>>
where
    A: MarketplaceApi + ?Sized,
{
    let cleaned = form.clean()?;
    let response = api.send_inquiry(id, cleaned).await.map_err(|err| {
        log::error!("Failed to send inquiry for business {id}: {err}");
        err
    })?;
    Ok(response.message)
}
