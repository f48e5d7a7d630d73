//! HTTP client for the marketplace backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::errors::ErrorBody;
use crate::api::{
    ApiError, ApiResult, BusinessPayload, MarketplaceApi, MessageResponse, PayloadPart,
    SignInResponse, SubmitResponse,
};
use crate::domain::business::Business;
use crate::domain::media::MediaKind;
use crate::domain::session::{Session, UserProfile};
use crate::domain::types::{BusinessId, MediaUrl};
use crate::forms::account::{PasswordChangeForm, ProfileUpdate, SignInForm};
use crate::forms::message::{ContactMessageForm, InquiryForm};

const CSRF_COOKIE: &str = "XSRF-TOKEN";
const CSRF_HEADER: &str = "X-XSRF-TOKEN";

/// reqwest-backed [`MarketplaceApi`] authenticating with the session token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
    session: Arc<Session>,
    csrf_token: Arc<Mutex<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<Session>, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|err| {
            log::error!("Failed to parse API base url {base_url}: {err}");
            ApiError::Network(format!("invalid base url: {err}"))
        })?;
        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            cookies,
            session,
            csrf_token: Arc::new(Mutex::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(csrf) = self.current_csrf_token() {
            request = request.header(CSRF_HEADER, csrf);
        }
        request
    }

    fn current_csrf_token(&self) -> Option<String> {
        match self.csrf_token.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = self.decorate(request).send().await.map_err(|err| {
            log::error!("Failed to send request: {err}");
            ApiError::from(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| ErrorBody {
            message: (!text.trim().is_empty()).then_some(text),
            errors: None,
        });
        log::warn!("API request failed with status {status}");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response.json::<T>().await.map_err(|err| {
            log::error!("Failed to parse response as JSON: {err}");
            ApiError::Decode(err.to_string())
        })
    }

    async fn post_multipart(
        &self,
        path: &str,
        payload: BusinessPayload,
    ) -> ApiResult<SubmitResponse> {
        let form = multipart_form(payload)?;
        let request = self.client.post(self.build_url(path)).multipart(form);
        self.send_json(request).await
    }
}

/// Converts payload entries into a multipart form, preserving order.
fn multipart_form(payload: BusinessPayload) -> ApiResult<Form> {
    let mut form = Form::new();
    for (key, part) in payload.into_parts() {
        form = match part {
            PayloadPart::Text(value) => form.text(key, value),
            PayloadPart::File(file) => {
                let part = Part::bytes(file.data.to_vec())
                    .file_name(file.name)
                    .mime_str(&file.mime)?;
                form.part(key, part)
            }
        };
    }
    Ok(form)
}

/// Extracts a cookie value from a `Cookie` header and undoes URL encoding.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

#[async_trait]
impl MarketplaceApi for ApiClient {
    async fn fetch_csrf_cookie(&self) -> ApiResult<()> {
        let request = self.client.get(self.build_url("/sanctum/csrf-cookie"));
        self.execute(request).await?;

        let token = self
            .cookies
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .and_then(|header| cookie_value(&header, CSRF_COOKIE));
        if token.is_none() {
            log::warn!("CSRF cookie missing from response");
        }

        let mut guard = match self.csrf_token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = token;
        Ok(())
    }

    async fn get_business(&self, id: BusinessId) -> ApiResult<Business> {
        let request = self.client.get(self.build_url(&format!("/api/businesses/{id}")));
        self.send_json(request).await
    }

    async fn submit_business(&self, payload: BusinessPayload) -> ApiResult<SubmitResponse> {
        self.post_multipart("/api/businesses", payload).await
    }

    async fn update_business(
        &self,
        id: BusinessId,
        payload: BusinessPayload,
    ) -> ApiResult<SubmitResponse> {
        // Multipart bodies go through POST; the payload carries `_method=PUT`.
        self.post_multipart(&format!("/api/businesses/{id}"), payload)
            .await
    }

    async fn delete_media(
        &self,
        id: BusinessId,
        kind: MediaKind,
        url: MediaUrl,
    ) -> ApiResult<()> {
        let collection = match kind {
            MediaKind::Image => "photos",
            MediaKind::Video => "videos",
        };
        let request = self
            .client
            .delete(self.build_url(&format!("/api/businesses/{id}/{collection}")))
            .json(&json!({ "url": url.as_str() }));
        self.execute(request).await?;
        Ok(())
    }

    async fn sign_in(&self, form: SignInForm) -> ApiResult<SignInResponse> {
        let request = self.client.post(self.build_url("/api/login")).json(&form);
        self.send_json(request).await
    }

    async fn change_password(&self, form: PasswordChangeForm) -> ApiResult<MessageResponse> {
        if !self.session.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        let request = self
            .client
            .put(self.build_url("/api/user/password"))
            .json(&form);
        self.send_json(request).await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> ApiResult<UserProfile> {
        if !self.session.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        let request = self
            .client
            .put(self.build_url("/api/user/profile"))
            .json(&update);
        self.send_json(request).await
    }

    async fn send_contact_message(&self, form: ContactMessageForm) -> ApiResult<MessageResponse> {
        let request = self.client.post(self.build_url("/api/contact")).json(&form);
        self.send_json(request).await
    }

    async fn send_inquiry(&self, id: BusinessId, form: InquiryForm) -> ApiResult<MessageResponse> {
        let request = self
            .client
            .post(self.build_url(&format!("/api/businesses/{id}/inquiries")))
            .json(&form);
        self.send_json(request).await
    }
}
