use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::eq;

use pushkind_market::api::errors::{ErrorBody, ErrorMessages};
use pushkind_market::api::mock::MockMarketplaceApi;
use pushkind_market::api::{ApiError, SubmitResponse};
use pushkind_market::domain::business::Business;
use pushkind_market::domain::media::{MediaFile, MediaKind, PreviewRegistry};
use pushkind_market::domain::types::{BusinessId, MediaUrl};
use pushkind_market::forms::FormError;
use pushkind_market::forms::business::{BusinessField, FieldValue, FormMode};
use pushkind_market::forms::media::BatchOutcome;
use pushkind_market::media::compression::ImageCompressor;
use pushkind_market::media::preview::BlobUrlRegistry;
use pushkind_market::media::{MediaError, MediaPipeline};
use pushkind_market::services::ServiceError;
use pushkind_market::services::business_form::{
    BusinessFormController, FormContext, FormSettings, FormState,
};
use pushkind_market::services::submission::{GENERIC_FAILURE, SubmitOutcome};
use pushkind_market::services::ui::ToastStatus;
use pushkind_market::services::ui::recording::RecordingUi;

const MB: usize = 1024 * 1024;

/// Leaves files as they are.
struct NoCompression;

#[async_trait]
impl ImageCompressor for NoCompression {
    async fn compress(&self, file: MediaFile) -> Result<MediaFile, MediaError> {
        Ok(file)
    }
}

struct Harness {
    ui: Arc<RecordingUi>,
    previews: Arc<BlobUrlRegistry>,
    context: FormContext,
}

fn harness() -> Harness {
    let ui = Arc::new(RecordingUi::default());
    let previews = Arc::new(BlobUrlRegistry::new("http://localhost"));
    let registry: Arc<dyn PreviewRegistry> = previews.clone();
    let context = FormContext {
        settings: FormSettings {
            success_redirect_delay: Duration::ZERO,
            ..FormSettings::default()
        },
        media: MediaPipeline::new(registry, Arc::new(NoCompression)),
        ui: ui.clone(),
    };
    Harness {
        ui,
        previews,
        context,
    }
}

fn photo(name: &str) -> MediaFile {
    MediaFile::new(name, "image/jpeg", vec![7u8; 2 * MB])
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

async fn fill_valid(form: &mut BusinessFormController, description: &str) {
    let values = [
        (BusinessField::ContactName, "Awa K."),
        (BusinessField::ContactPhone, "+226 70 00 00 00"),
        (BusinessField::ContactEmail, "a@k.com"),
        (BusinessField::Name, "Restaurant Le Soleil"),
        (BusinessField::Category, "RESTAURANT"),
        (BusinessField::Location, "Ouagadougou"),
        (BusinessField::Description, description),
        (BusinessField::Price, "2500000"),
        (BusinessField::YearEstablished, "2015"),
    ];
    for (field, value) in values {
        form.change_field(field, text(value)).unwrap();
    }
    form.set_list_input(BusinessField::Assets, "Kitchen").unwrap();
    form.add_list_entry(BusinessField::Assets).unwrap();
    form.set_list_input(BusinessField::Advantages, "Central location")
        .unwrap();
    form.add_list_entry(BusinessField::Advantages).unwrap();
    form.add_files(BusinessField::Photos, vec![photo("front.jpg")])
        .await
        .unwrap();
}

fn listing() -> Business {
    serde_json::from_value(serde_json::json!({
        "id": 42,
        "name": "Restaurant Le Soleil",
        "category": "RESTAURANT",
        "location": "Ouagadougou",
        "full_address": "Avenue Kwame Nkrumah",
        "description": "A".repeat(80),
        "price": 2500000,
        "year_established": 2015,
        "assets": ["Kitchen"],
        "advantages": ["Central location"],
        "contact_name": "Awa K.",
        "contact_phone": "22670000000",
        "contact_email": "a@k.com",
        "photos": ["https://cdn.example.com/front.jpg"]
    }))
    .unwrap()
}

fn rejected(field: &str, message: &str) -> ApiError {
    let mut errors = BTreeMap::new();
    errors.insert(
        field.to_string(),
        ErrorMessages::Many(vec![message.to_string()]),
    );
    ApiError::Rejected {
        status: 422,
        body: ErrorBody {
            message: Some("The given data was invalid.".into()),
            errors: Some(errors),
        },
    }
}

#[tokio::test]
async fn successful_submission_clears_state_and_navigates() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, &"A".repeat(60)).await;
    assert_eq!(h.previews.live_count(), 1);

    let mut api = MockMarketplaceApi::new();
    api.expect_fetch_csrf_cookie().times(1).returning(|| Ok(()));
    api.expect_submit_business()
        .withf(|payload| {
            payload.text("price") == Some("2500000")
                && payload.text("year_established") == Some("2015")
                && payload.text("contact_phone") == Some("22670000000")
                && payload.files("photos[]").len() == 1
        })
        .times(1)
        .returning(|_| Ok(SubmitResponse::default()));

    let outcome = form.submit(&api).await;

    assert!(outcome.is_success());
    assert_eq!(form.state(), &FormState::SubmitSucceeded);
    assert!(form.errors().is_empty());
    assert!(!form.is_dirty());
    assert_eq!(h.previews.live_count(), 0);
    assert!(!h.ui.guard_active());
    assert_eq!(h.ui.navigations(), vec!["/my-businesses".to_string()]);
    let toasts = h.ui.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].status, ToastStatus::Success);
}

#[tokio::test]
async fn short_description_blocks_submission() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, "Too short.").await;

    let mut api = MockMarketplaceApi::new();
    api.expect_fetch_csrf_cookie().times(0);
    api.expect_submit_business().times(0);

    let outcome = form.submit(&api).await;

    assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
    assert_eq!(
        form.errors().get("description"),
        Some("Description must be at least 50 characters")
    );
    assert_eq!(form.errors().len(), 1);
    assert_eq!(form.state(), &FormState::Dirty);
    assert_eq!(h.ui.focused(), vec!["description".to_string()]);
    assert!(h.ui.navigations().is_empty());
}

#[tokio::test]
async fn focus_goes_to_first_invalid_field_in_layout_order() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    form.change_field(BusinessField::Price, text("100")).unwrap();

    let api = MockMarketplaceApi::new();
    let outcome = form.submit(&api).await;

    let errors = outcome.field_errors().unwrap();
    assert!(errors.contains("contact_name"));
    assert!(errors.contains("name"));
    assert!(!errors.contains("price"));
    assert_eq!(h.ui.focused(), vec!["contact_name".to_string()]);
}

#[tokio::test]
async fn oversized_video_is_dropped_but_valid_one_kept() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone());

    let outcome = form
        .add_files(
            BusinessField::Videos,
            vec![
                MediaFile::new("tour.mp4", "video/mp4", vec![0u8; 10 * MB]),
                MediaFile::new("big.mp4", "video/mp4", vec![0u8; 60 * MB]),
            ],
        )
        .await
        .unwrap();

    assert!(matches!(outcome, BatchOutcome::Applied { added: 1, .. }));
    assert_eq!(form.draft().videos.len(), 1);
    assert!(form.error(BusinessField::Videos).unwrap().contains("big.mp4"));
    assert!(form.is_dirty());
}

#[tokio::test]
async fn batch_for_a_cleared_field_is_discarded() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone());
    form.add_files(BusinessField::Photos, vec![photo("first.jpg")])
        .await
        .unwrap();

    let (policy, ticket) = form.begin_media_batch(BusinessField::Photos).unwrap();
    let pending = h
        .context
        .media
        .prepare(&policy, ticket, vec![photo("late.jpg")])
        .await;
    form.clear_media(BusinessField::Photos).unwrap();
    assert_eq!(h.previews.live_count(), 1);

    let outcome = form
        .commit_media_batch(BusinessField::Photos, pending)
        .unwrap();

    assert_eq!(outcome, BatchOutcome::Stale { dropped: 1 });
    assert!(form.draft().photos.is_empty());
    assert_eq!(h.previews.live_count(), 0);
    assert_eq!(
        form.error(BusinessField::Photos),
        Some("Add at least one photo")
    );
}

#[tokio::test]
async fn server_field_errors_are_renamed_in_edit_mode() {
    let h = harness();
    let id = BusinessId::new(42).unwrap();

    let mut api = MockMarketplaceApi::new();
    api.expect_get_business()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(listing()));
    api.expect_fetch_csrf_cookie().returning(|| Ok(()));
    api.expect_update_business()
        .withf(move |target, payload| {
            *target == id
                && payload.text("_method") == Some("PUT")
                && payload.files("photos[]").is_empty()
        })
        .times(1)
        .returning(|_, _| Err(rejected("year_established", "Invalid year")));

    let mut form = BusinessFormController::load_for_edit(&api, id, h.context.clone())
        .await
        .unwrap()
        .with_current_year(2026);
    assert_eq!(form.mode(), FormMode::Edit { id });
    assert!(!form.is_dirty());

    form.change_field(BusinessField::Employees, text("12")).unwrap();
    let outcome = form.submit(&api).await;

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(form.errors().get("yearEstablished"), Some("Invalid year"));
    assert!(matches!(form.state(), FormState::SubmitFailed(_)));
    assert!(form.is_dirty());
    assert_eq!(h.ui.focused(), vec!["yearEstablished".to_string()]);
    assert_eq!(h.ui.toasts().last().unwrap().title, "Check the form");
    assert!(h.ui.navigations().is_empty());

    form.change_field(BusinessField::YearEstablished, text("2016"))
        .unwrap();
    assert!(form.errors().is_empty());
    assert_eq!(form.state(), &FormState::Dirty);
}

#[tokio::test]
async fn network_failure_keeps_form_editable() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, &"A".repeat(60)).await;

    let mut api = MockMarketplaceApi::new();
    api.expect_fetch_csrf_cookie().returning(|| Ok(()));
    api.expect_submit_business()
        .times(1)
        .returning(|_| Err(ApiError::Network("connection refused".into())));

    let outcome = form.submit(&api).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: GENERIC_FAILURE.to_string()
        }
    );
    assert_eq!(form.state(), &FormState::Dirty);
    assert!(form.errors().is_empty());
    assert_eq!(form.draft().name, "Restaurant Le Soleil");
    assert_eq!(h.previews.live_count(), 1);
    let toast = h.ui.toasts().pop().unwrap();
    assert_eq!(toast.status, ToastStatus::Error);
    assert_eq!(toast.description, GENERIC_FAILURE);
}

#[tokio::test]
async fn csrf_failure_stops_before_submitting() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, &"A".repeat(60)).await;

    let mut api = MockMarketplaceApi::new();
    api.expect_fetch_csrf_cookie()
        .times(1)
        .returning(|| Err(ApiError::Network("offline".into())));
    api.expect_submit_business().times(0);

    let outcome = form.submit(&api).await;

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert!(form.is_dirty());
}

#[tokio::test]
async fn removing_persisted_media_goes_through_backend() {
    let h = harness();
    let id = BusinessId::new(42).unwrap();
    let url = MediaUrl::new("https://cdn.example.com/front.jpg").unwrap();

    let mut api = MockMarketplaceApi::new();
    api.expect_get_business().returning(|_| Ok(listing()));
    let expected = url.clone();
    api.expect_delete_media()
        .withf(move |target, kind, removed| {
            *target == id && *kind == MediaKind::Image && *removed == expected
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut form = BusinessFormController::load_for_edit(&api, id, h.context.clone())
        .await
        .unwrap();

    form.remove_existing(&api, BusinessField::Photos, &url)
        .await
        .unwrap();

    assert!(form.draft().photos.is_empty());
    assert!(form.is_dirty());
    assert_eq!(
        form.error(BusinessField::Photos),
        Some("Add at least one photo")
    );
}

#[tokio::test]
async fn failed_media_deletion_leaves_form_untouched() {
    let h = harness();
    let id = BusinessId::new(42).unwrap();
    let url = MediaUrl::new("https://cdn.example.com/front.jpg").unwrap();

    let mut api = MockMarketplaceApi::new();
    api.expect_get_business().returning(|_| Ok(listing()));
    api.expect_delete_media().times(1).returning(|_, _, _| {
        Err(ApiError::Rejected {
            status: 403,
            body: ErrorBody {
                message: Some("Forbidden".into()),
                errors: None,
            },
        })
    });

    let mut form = BusinessFormController::load_for_edit(&api, id, h.context.clone())
        .await
        .unwrap();

    let result = form
        .remove_existing(&api, BusinessField::Photos, &url)
        .await;

    assert!(matches!(result, Err(ServiceError::Api(_))));
    assert_eq!(form.draft().photos.len(), 1);
    assert!(!form.is_dirty());
    let toast = h.ui.toasts().pop().unwrap();
    assert_eq!(toast.status, ToastStatus::Error);
    assert_eq!(toast.description, "Forbidden");
}

#[tokio::test]
async fn flagged_photo_blocks_submission() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, &"A".repeat(60)).await;
    form.add_files(
        BusinessField::Photos,
        vec![MediaFile::new("huge.jpg", "image/jpeg", vec![0u8; 6 * MB])],
    )
    .await
    .unwrap();
    assert_eq!(form.draft().photos.len(), 2);

    let mut api = MockMarketplaceApi::new();
    api.expect_submit_business().times(0);

    let outcome = form.submit(&api).await;

    let errors = outcome.field_errors().unwrap();
    assert!(errors.get("photos").unwrap().contains("huge.jpg"));

    form.remove_file(BusinessField::Photos, 1).unwrap();
    assert!(form.validate().is_ok());
}

async fn hydrated(h: &Harness) -> BusinessFormController {
    let mut api = MockMarketplaceApi::new();
    api.expect_get_business().returning(|_| Ok(listing()));
    let form = BusinessFormController::load_for_edit(&api, BusinessId::new(42).unwrap(), h.context.clone())
        .await
        .unwrap()
        .with_current_year(2026);
    assert_eq!(form.state(), &FormState::Clean);
    assert!(!form.is_dirty());
    form
}

fn assert_dirty(h: &Harness, form: &BusinessFormController) {
    assert_eq!(form.state(), &FormState::Dirty);
    assert!(form.is_dirty());
    assert!(h.ui.guard_active());
}

#[tokio::test]
async fn persisted_photo_is_not_removed_by_index() {
    let h = harness();
    let mut form = hydrated(&h).await;
    let mut api = MockMarketplaceApi::new();
    api.expect_delete_media().times(0);

    let result = form.remove_file(BusinessField::Photos, 0);

    assert!(matches!(result, Err(FormError::PersistedMedia(0))));
    assert_eq!(form.draft().photos.len(), 1);
    assert_eq!(form.state(), &FormState::Clean);
    assert!(!h.ui.guard_active());
}

#[tokio::test]
async fn clearing_media_keeps_persisted_items() {
    let h = harness();
    let mut form = hydrated(&h).await;

    form.clear_media(BusinessField::Photos).unwrap();
    assert_eq!(form.draft().photos.len(), 1);
    assert!(!form.is_dirty());

    form.add_files(BusinessField::Photos, vec![photo("new.jpg")])
        .await
        .unwrap();
    form.clear_media(BusinessField::Photos).unwrap();

    assert_eq!(form.draft().photos.len(), 1);
    assert!(!form.draft().photos.items()[0].is_new());
    assert_eq!(h.previews.live_count(), 0);
}

#[tokio::test]
async fn field_change_dirties_a_clean_form() {
    let h = harness();
    let mut form = hydrated(&h).await;
    form.change_field(BusinessField::Name, text("Bakery")).unwrap();
    assert_dirty(&h, &form);
}

#[tokio::test]
async fn media_add_dirties_a_clean_form() {
    let h = harness();
    let mut form = hydrated(&h).await;
    form.add_files(BusinessField::Photos, vec![photo("new.jpg")])
        .await
        .unwrap();
    assert_dirty(&h, &form);
}

#[tokio::test]
async fn media_remove_dirties_a_clean_form() {
    let h = harness();
    let mut form = hydrated(&h).await;
    let url = MediaUrl::new("https://cdn.example.com/front.jpg").unwrap();
    let mut api = MockMarketplaceApi::new();
    api.expect_delete_media().times(1).returning(|_, _, _| Ok(()));

    form.remove_existing(&api, BusinessField::Photos, &url)
        .await
        .unwrap();

    assert_dirty(&h, &form);
}

#[tokio::test]
async fn asset_add_dirties_a_clean_form() {
    let h = harness();
    let mut form = hydrated(&h).await;
    form.set_list_input(BusinessField::Assets, "Oven").unwrap();
    assert_eq!(form.state(), &FormState::Clean);

    assert!(form.add_list_entry(BusinessField::Assets).unwrap());
    assert_dirty(&h, &form);
}

#[tokio::test]
async fn advantage_remove_dirties_a_clean_form() {
    let h = harness();
    let mut form = hydrated(&h).await;

    let removed = form
        .remove_list_entry(BusinessField::Advantages, 0)
        .unwrap();

    assert_eq!(removed, "Central location");
    assert_dirty(&h, &form);
}

#[tokio::test]
async fn earlier_flagged_photo_keeps_its_error_after_a_clean_batch() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone());
    form.add_files(
        BusinessField::Photos,
        vec![MediaFile::new("huge.jpg", "image/jpeg", vec![0u8; 6 * MB])],
    )
    .await
    .unwrap();
    assert!(form.error(BusinessField::Photos).unwrap().contains("huge.jpg"));

    let outcome = form
        .add_files(BusinessField::Photos, vec![photo("ok.jpg")])
        .await
        .unwrap();

    assert_eq!(outcome, BatchOutcome::Applied { added: 1, error: None });
    assert!(form.error(BusinessField::Photos).unwrap().contains("huge.jpg"));

    form.remove_file(BusinessField::Photos, 0).unwrap();
    assert_eq!(form.error(BusinessField::Photos), None);
}

#[tokio::test]
async fn create_mode_submitter_errors_focus_contact_inputs() {
    let h = harness();
    let mut form = BusinessFormController::create(None, h.context.clone()).with_current_year(2026);
    fill_valid(&mut form, &"A".repeat(60)).await;

    let mut api = MockMarketplaceApi::new();
    api.expect_fetch_csrf_cookie().returning(|| Ok(()));
    api.expect_submit_business()
        .times(1)
        .returning(|_| Err(rejected("submitter_phone", "Invalid phone")));

    let outcome = form.submit(&api).await;

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(form.error(BusinessField::ContactPhone), Some("Invalid phone"));
    assert!(!form.errors().contains("submitter_phone"));
    assert_eq!(h.ui.focused(), vec!["contact_phone".to_string()]);
}
