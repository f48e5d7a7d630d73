//! Controller owning the business submission and edit form.
//!
//! The controller holds the draft, the per-field error set and the dirty
//! flag. Every mutation goes through it so that errors, dirty tracking and
//! the unload guard stay consistent with the draft.

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;

use crate::api::{ApiResult, BusinessPayload, MarketplaceApi, SubmitResponse};
use crate::domain::media::{BatchTicket, MediaFile, MediaPolicy, PreparedBatch};
use crate::domain::session::UserProfile;
use crate::domain::types::{BusinessId, MediaUrl};
use crate::formatting::sanitize_text;
use crate::forms::FormError;
use crate::forms::business::{BusinessDraft, BusinessField, FieldValue, FormMode};
use crate::forms::media::BatchOutcome;
use crate::media::MediaPipeline;
use crate::services::submission::{GENERIC_FAILURE, SubmitOutcome, classify, toast_for};
use crate::services::ui::{FormUi, Toast, ToastStatus};
use crate::services::{ServiceError, ServiceResult};
use crate::validation::FieldErrors;
use crate::validation::schemas;

/// Lifecycle of the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormState {
    Clean,
    Dirty,
    Validating,
    Submitting,
    SubmitSucceeded,
    /// The backend rejected fields; the form stays editable and dirty.
    SubmitFailed(FieldErrors),
}

/// Behaviour knobs coming from configuration.
#[derive(Clone, Debug)]
pub struct FormSettings {
    /// Where to go after a successful submit.
    pub listing_path: String,
    /// Pause before leaving so the confirmation can be read.
    pub success_redirect_delay: Duration,
    /// Whether the anti-forgery cookie must be fetched before submitting.
    pub require_csrf: bool,
    pub photo_policy: MediaPolicy,
    pub video_policy: MediaPolicy,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            listing_path: "/my-businesses".to_string(),
            success_redirect_delay: Duration::from_millis(1500),
            require_csrf: true,
            photo_policy: MediaPolicy::photos(),
            video_policy: MediaPolicy::videos(),
        }
    }
}

/// Collaborators shared by every form instance of a screen.
#[derive(Clone)]
pub struct FormContext {
    pub settings: FormSettings,
    pub media: MediaPipeline,
    pub ui: Arc<dyn FormUi>,
}

pub struct BusinessFormController {
    mode: FormMode,
    draft: BusinessDraft,
    errors: FieldErrors,
    state: FormState,
    dirty: bool,
    guard_active: bool,
    new_asset: String,
    new_advantage: String,
    current_year: u64,
    context: FormContext,
}

impl BusinessFormController {
    pub fn new(mode: FormMode, draft: BusinessDraft, context: FormContext) -> Self {
        let current_year = u64::try_from(chrono::Local::now().year()).unwrap_or_default();
        Self {
            mode,
            draft,
            errors: FieldErrors::new(),
            state: FormState::Clean,
            dirty: false,
            guard_active: false,
            new_asset: String::new(),
            new_advantage: String::new(),
            current_year,
            context,
        }
    }

    /// Empty form for a new listing, contact fields taken from the profile.
    pub fn create(profile: Option<&UserProfile>, context: FormContext) -> Self {
        let mut draft = BusinessDraft::with_media_policies(
            context.settings.photo_policy.clone(),
            context.settings.video_policy.clone(),
        );
        if let Some(profile) = profile {
            draft.prefill_contact(profile);
        }
        Self::new(FormMode::Create, draft, context)
    }

    /// Fetches a listing and opens it for editing.
    pub async fn load_for_edit<A>(api: &A, id: BusinessId, context: FormContext) -> ServiceResult<Self>
    where
        A: MarketplaceApi + ?Sized,
    {
        let business = api.get_business(id).await.map_err(|err| {
            log::error!("Failed to load business {id}: {err}");
            err
        })?;
        let draft = BusinessDraft::from_business(
            &business,
            context.settings.photo_policy.clone(),
            context.settings.video_policy.clone(),
        );
        Ok(Self::new(FormMode::Edit { id }, draft, context))
    }

    /// Overrides the year used as the upper bound of `year_established`.
    pub fn with_current_year(mut self, year: u64) -> Self {
        self.current_year = year;
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &BusinessDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error shown under `field`, looked up with the mode's naming.
    pub fn error(&self, field: BusinessField) -> Option<&str> {
        self.errors.get(self.mode.field_key(field))
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stores a sanitized value and clears that field's error only.
    pub fn change_field(&mut self, field: BusinessField, value: FieldValue) -> Result<(), FormError> {
        self.draft.set_field(field, value)?;
        self.errors.remove(self.mode.field_key(field));
        self.mark_dirty();
        Ok(())
    }

    /// Same as [`Self::change_field`] for an input name in either convention.
    pub fn change_field_by_name(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        let field =
            BusinessField::from_name(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.change_field(field, value)
    }

    /// Text typed into the "new asset" or "new advantage" input.
    pub fn list_input(&self, field: BusinessField) -> Option<&str> {
        match field {
            BusinessField::Assets => Some(&self.new_asset),
            BusinessField::Advantages => Some(&self.new_advantage),
            _ => None,
        }
    }

    /// Updates the pending entry buffer; the draft is untouched.
    pub fn set_list_input(&mut self, field: BusinessField, text: &str) -> Result<(), FormError> {
        let buffer = self
            .list_buffer_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        *buffer = text.to_string();
        Ok(())
    }

    /// Appends the pending buffer to the list; blank input is ignored.
    pub fn add_list_entry(&mut self, field: BusinessField) -> Result<bool, FormError> {
        let raw = self
            .list_input(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        let entry = sanitize_text(raw).trim().to_string();
        if entry.is_empty() {
            return Ok(false);
        }

        self.draft
            .list_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?
            .push(entry);
        if let Some(buffer) = self.list_buffer_mut(field) {
            buffer.clear();
        }
        self.errors.remove(self.mode.field_key(field));
        self.mark_dirty();
        Ok(true)
    }

    pub fn remove_list_entry(&mut self, field: BusinessField, index: usize) -> Result<String, FormError> {
        let list = self
            .draft
            .list_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        if index >= list.len() {
            return Err(FormError::ListIndex(index));
        }
        let removed = list.remove(index);
        self.mark_dirty();
        Ok(removed)
    }

    /// Policy and generation stamp for a batch that is about to be prepared.
    pub fn begin_media_batch(&self, field: BusinessField) -> Result<(MediaPolicy, BatchTicket), FormError> {
        let intake = self
            .draft
            .media(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        Ok((intake.policy().clone(), intake.ticket()))
    }

    /// Commits a prepared batch; stale batches leave the form untouched.
    pub fn commit_media_batch(
        &mut self,
        field: BusinessField,
        batch: PreparedBatch,
    ) -> Result<BatchOutcome, FormError> {
        let intake = self
            .draft
            .media_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        let outcome = intake.apply_batch(batch)?;

        if let BatchOutcome::Applied { added, error } = &outcome {
            let key = self.mode.field_key(field);
            match error.clone().or_else(|| self.media_error(field)) {
                Some(message) => self.errors.insert(key, message),
                None => {
                    self.errors.remove(key);
                }
            }
            if *added > 0 {
                self.mark_dirty();
            }
        }
        Ok(outcome)
    }

    /// Compresses, checks and attaches newly selected files.
    pub async fn add_files(
        &mut self,
        field: BusinessField,
        files: Vec<MediaFile>,
    ) -> Result<BatchOutcome, FormError> {
        let (policy, ticket) = self.begin_media_batch(field)?;
        if files.is_empty() {
            return Ok(BatchOutcome::Applied {
                added: 0,
                error: None,
            });
        }
        let batch = self.context.media.prepare(&policy, ticket, files).await;
        self.commit_media_batch(field, batch)
    }

    /// Detaches a new file, releasing its preview.
    ///
    /// Persisted media is refused with [`FormError::PersistedMedia`]; use
    /// [`Self::remove_existing`] so the backend deletes it too.
    pub fn remove_file(&mut self, field: BusinessField, index: usize) -> Result<(), FormError> {
        self.draft
            .media_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?
            .remove_file(index)?;
        self.refresh_media_error(field);
        self.mark_dirty();
        Ok(())
    }

    /// Detaches every new item of a media field; batches still being
    /// prepared for it will be discarded when they complete. Persisted media
    /// stays until removed with [`Self::remove_existing`].
    pub fn clear_media(&mut self, field: BusinessField) -> Result<(), FormError> {
        let released = self
            .draft
            .media_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?
            .release_new();
        self.refresh_media_error(field);
        if released > 0 {
            self.mark_dirty();
        }
        Ok(())
    }

    /// Deletes persisted media on the backend, then forgets it locally.
    ///
    /// On failure a notification is shown and the form is left as it was.
    pub async fn remove_existing<A>(
        &mut self,
        api: &A,
        field: BusinessField,
        url: &MediaUrl,
    ) -> ServiceResult<()>
    where
        A: MarketplaceApi + ?Sized,
    {
        let FormMode::Edit { id } = self.mode else {
            return Err(ServiceError::NotEditing);
        };
        let kind = self
            .draft
            .media(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?
            .kind();

        if let Err(err) = api.delete_media(id, kind, url.clone()).await {
            log::error!("Failed to delete media {url}: {err}");
            self.context.ui.show_toast(Toast::new(
                "Could not delete file",
                err.server_message().unwrap_or(GENERIC_FAILURE),
                ToastStatus::Error,
            ));
            return Err(err.into());
        }

        if let Some(intake) = self.draft.media_mut(field) {
            intake.remove_existing(url);
        }
        self.refresh_media_error(field);
        self.mark_dirty();
        Ok(())
    }

    /// Runs every client-side check and returns errors keyed for this mode.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = schemas::business_draft(self.current_year)
            .validate(&self.draft)
            .err()
            .unwrap_or_default();

        if self.draft.assets.is_empty() {
            errors.insert(BusinessField::Assets.wire_name(), "Add at least one asset");
        }
        if self.draft.advantages.is_empty() {
            errors.insert(BusinessField::Advantages.wire_name(), "Add at least one advantage");
        }
        for field in [BusinessField::Photos, BusinessField::Videos] {
            if let Some(message) = self.media_error(field) {
                errors.insert(field.wire_name(), message);
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        let mode = self.mode;
        Err(errors.map_keys(|key| match BusinessField::from_name(key) {
            Some(field) => mode.field_key(field).to_string(),
            None => key.to_string(),
        }))
    }

    /// Validates, sends the listing and applies the outcome to the form.
    pub async fn submit<A>(&mut self, api: &A) -> SubmitOutcome
    where
        A: MarketplaceApi + ?Sized,
    {
        self.state = FormState::Validating;
        if let Err(errors) = self.validate() {
            self.errors = errors.clone();
            self.focus_first_error();
            self.state = self.editing_state();
            let outcome = SubmitOutcome::Invalid(errors);
            self.context.ui.show_toast(toast_for(&outcome, self.mode));
            return outcome;
        }
        self.errors.clear();

        let payload = match BusinessPayload::from_draft(&self.draft, self.mode) {
            Ok(payload) => payload,
            Err(err) => {
                log::error!("Failed to assemble business payload: {err}");
                let outcome = SubmitOutcome::Failed {
                    message: GENERIC_FAILURE.to_string(),
                };
                self.context.ui.show_toast(toast_for(&outcome, self.mode));
                self.state = self.editing_state();
                return outcome;
            }
        };

        self.state = FormState::Submitting;
        if self.context.settings.require_csrf {
            if let Err(err) = api.fetch_csrf_cookie().await {
                log::error!("Failed to fetch CSRF cookie: {err}");
                return self.settle(Err(err)).await;
            }
        }

        let result = match self.mode {
            FormMode::Create => api.submit_business(payload).await,
            FormMode::Edit { id } => api.update_business(id, payload).await,
        };
        self.settle(result).await
    }

    async fn settle(&mut self, result: ApiResult<SubmitResponse>) -> SubmitOutcome {
        let outcome = classify(result, self.mode);
        self.context.ui.show_toast(toast_for(&outcome, self.mode));

        match &outcome {
            SubmitOutcome::Succeeded { .. } => {
                self.errors.clear();
                self.dirty = false;
                self.draft.release_media();
                self.set_guard(false);
                self.state = FormState::SubmitSucceeded;

                let delay = self.context.settings.success_redirect_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                self.context.ui.navigate(&self.context.settings.listing_path);
            }
            SubmitOutcome::Rejected(errors) => {
                self.errors = errors.clone();
                self.focus_first_error();
                self.state = FormState::SubmitFailed(errors.clone());
            }
            SubmitOutcome::Invalid(_) | SubmitOutcome::Failed { .. } => {
                self.state = self.editing_state();
            }
        }
        outcome
    }

    /// Navigates to `path`, asking first when there are unsaved changes.
    ///
    /// Returns `false` when the user chose to stay.
    pub fn request_leave(&mut self, path: &str) -> bool {
        if self.dirty && !self.context.ui.confirm_leave() {
            return false;
        }
        self.discard();
        self.context.ui.navigate(path);
        true
    }

    /// Throws away unsaved changes and releases every new preview.
    pub fn discard(&mut self) {
        self.draft.release_media();
        self.dirty = false;
        self.state = FormState::Clean;
        self.set_guard(false);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.state = FormState::Dirty;
        self.set_guard(true);
    }

    fn editing_state(&self) -> FormState {
        if self.dirty {
            FormState::Dirty
        } else {
            FormState::Clean
        }
    }

    fn set_guard(&mut self, active: bool) {
        if self.guard_active != active {
            self.context.ui.set_unload_guard(active);
            self.guard_active = active;
        }
    }

    fn focus_first_error(&self) {
        let order: Vec<&str> = BusinessField::ALL
            .iter()
            .map(|field| self.mode.field_key(*field))
            .collect();
        if let Some(field) = self.errors.first_field(&order) {
            self.context.ui.focus_field(field);
        }
    }

    fn list_buffer_mut(&mut self, field: BusinessField) -> Option<&mut String> {
        match field {
            BusinessField::Assets => Some(&mut self.new_asset),
            BusinessField::Advantages => Some(&mut self.new_advantage),
            _ => None,
        }
    }

    fn media_error(&self, field: BusinessField) -> Option<String> {
        let intake = self.draft.media(field)?;
        if let Some(message) = intake.field_error() {
            return Some(message);
        }
        let invalid = intake.invalid_names();
        (!invalid.is_empty()).then(|| {
            format!(
                "Remove the {}s that exceed {} MB or have an unsupported format: {}",
                intake.kind().label(),
                intake.policy().max_megabytes(),
                invalid.join(", ")
            )
        })
    }

    fn refresh_media_error(&mut self, field: BusinessField) {
        let key = self.mode.field_key(field);
        match self.media_error(field) {
            Some(message) => self.errors.insert(key, message),
            None => {
                self.errors.remove(key);
            }
        }
    }
}

impl Drop for BusinessFormController {
    fn drop(&mut self) {
        self.set_guard(false);
    }
}
