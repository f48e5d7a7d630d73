//! Headless submitter: fills the business form from a JSON listing and sends it.
//!
//! Credentials are read from `MARKET_EMAIL` and `MARKET_PASSWORD`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use pushkind_market::api::MarketplaceApi;
use pushkind_market::domain::business::Business;
use pushkind_market::domain::media::MediaFile;
use pushkind_market::domain::session::Session;
use pushkind_market::domain::types::BusinessId;
use pushkind_market::forms::account::SignInForm;
use pushkind_market::forms::business::{BusinessField, FieldValue};
use pushkind_market::forms::media::BatchOutcome;
use pushkind_market::models::config::ClientConfig;
use pushkind_market::services::account::sign_in;
use pushkind_market::services::business_form::BusinessFormController;
use pushkind_market::services::ui::{FieldFocus, Navigator, Notifier, Toast, ToastStatus};
use pushkind_market::{build_api_client, build_form_context};

/// Prints notifications to the log instead of rendering them.
struct ConsoleUi;

impl Notifier for ConsoleUi {
    fn show_toast(&self, toast: Toast) {
        match toast.status {
            ToastStatus::Error => log::error!("{}: {}", toast.title, toast.description),
            ToastStatus::Warning => log::warn!("{}: {}", toast.title, toast.description),
            ToastStatus::Success | ToastStatus::Info => {
                log::info!("{}: {}", toast.title, toast.description)
            }
        }
    }
}

impl Navigator for ConsoleUi {
    fn navigate(&self, path: &str) {
        log::info!("Done, listing available at {path}");
    }

    fn set_unload_guard(&self, active: bool) {
        log::debug!("Unsaved changes guard {}", if active { "on" } else { "off" });
    }

    fn confirm_leave(&self) -> bool {
        true
    }
}

impl FieldFocus for ConsoleUi {
    fn focus_field(&self, field: &str) {
        log::warn!("First field to fix: {field}");
    }
}

#[derive(Debug, Parser)]
#[command(name = "submit_business", about = "Submit or update a business listing")]
struct Args {
    /// Listing JSON in the shape returned by the API
    listing: PathBuf,
    /// Update the listing with this id instead of creating one
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    edit: Option<i64>,
    /// Photo to attach (repeatable)
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
    /// Video to attach (repeatable)
    #[arg(long = "video")]
    videos: Vec<PathBuf>,
}

/// Non-empty scalar values of the listing, as if typed into the form.
fn listing_values(business: &Business) -> Vec<(BusinessField, FieldValue)> {
    let text = |value: &str| (!value.trim().is_empty()).then(|| FieldValue::Text(value.to_string()));
    let number = |value: Option<u64>| value.map(|v| FieldValue::Text(v.to_string()));

    [
        (BusinessField::ContactName, text(&business.contact_name)),
        (BusinessField::ContactPhone, text(&business.contact_phone)),
        (
            BusinessField::ContactEmail,
            business.contact_email.as_deref().and_then(text),
        ),
        (BusinessField::Name, text(&business.name)),
        (BusinessField::Category, text(&business.category)),
        (BusinessField::Location, text(&business.location)),
        (BusinessField::FullAddress, text(&business.full_address)),
        (BusinessField::Description, text(&business.description)),
        (
            BusinessField::AdditionalInfo,
            business.additional_info.as_deref().and_then(text),
        ),
        (BusinessField::Price, number(business.price)),
        (
            BusinessField::PriceNegotiable,
            Some(FieldValue::Flag(business.price_negotiable)),
        ),
        (BusinessField::YearEstablished, number(business.year_established)),
        (BusinessField::Employees, number(business.employees)),
        (BusinessField::MonthlyRevenue, number(business.monthly_revenue)),
        (BusinessField::YearlyRevenue, number(business.yearly_revenue)),
        (BusinessField::Reasons, business.reasons.as_deref().and_then(text)),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|value| (field, value)))
    .collect()
}

async fn read_media(paths: &[PathBuf]) -> Result<Vec<MediaFile>, String> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        files.push(MediaFile::new(name, mime.essence_str(), data));
    }
    Ok(files)
}

async fn sign_in_from_env<A>(api: &A, session: &Session)
where
    A: MarketplaceApi + ?Sized,
{
    let (Ok(email), Ok(password)) = (env::var("MARKET_EMAIL"), env::var("MARKET_PASSWORD")) else {
        log::warn!("MARKET_EMAIL or MARKET_PASSWORD not set, continuing signed out");
        return;
    };
    match sign_in(api, session, SignInForm { email, password }).await {
        Ok(user) => log::info!("Signed in as {}", user.name),
        Err(err) => log::error!("Failed to sign in: {err}"),
    }
}

async fn attach(
    form: &mut BusinessFormController,
    field: BusinessField,
    paths: &[PathBuf],
) -> Result<(), String> {
    if paths.is_empty() {
        return Ok(());
    }
    let files = read_media(paths).await?;
    match form.add_files(field, files).await {
        Ok(BatchOutcome::Applied { added, error }) => {
            log::info!("Attached {added} file(s) to {}", field.wire_name());
            if let Some(error) = error {
                log::warn!("{error}");
            }
            Ok(())
        }
        Ok(BatchOutcome::Stale { dropped }) => {
            log::warn!("Discarded {dropped} file(s) for {}", field.wire_name());
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}

async fn run(config: ClientConfig, args: Args) -> Result<(), String> {
    let listing = std::fs::read_to_string(&args.listing)
        .map_err(|err| format!("cannot read {}: {err}", args.listing.display()))?;
    let business: Business =
        serde_json::from_str(&listing).map_err(|err| format!("invalid listing JSON: {err}"))?;

    let session = Arc::new(Session::new());
    let api = build_api_client(&config, Arc::clone(&session)).map_err(|err| err.to_string())?;
    sign_in_from_env(&api, &session).await;

    let context = build_form_context(&config, Arc::new(ConsoleUi));
    let edit = args
        .edit
        .map(BusinessId::new)
        .transpose()
        .map_err(|err| err.to_string())?;
    let mut form = match edit {
        Some(id) => BusinessFormController::load_for_edit(&api, id, context)
            .await
            .map_err(|err| err.to_string())?,
        None => BusinessFormController::create(session.user().as_ref(), context),
    };

    for (field, value) in listing_values(&business) {
        form.change_field(field, value).map_err(|err| err.to_string())?;
    }
    for (field, entries) in [
        (BusinessField::Assets, &business.assets),
        (BusinessField::Advantages, &business.advantages),
    ] {
        for entry in entries {
            form.set_list_input(field, entry).map_err(|err| err.to_string())?;
            form.add_list_entry(field).map_err(|err| err.to_string())?;
        }
    }
    attach(&mut form, BusinessField::Photos, &args.photos).await?;
    attach(&mut form, BusinessField::Videos, &args.videos).await?;

    let outcome = form.submit(&api).await;
    if outcome.is_success() {
        return Ok(());
    }
    if let Some(errors) = outcome.field_errors() {
        for (field, message) in errors.iter() {
            log::error!("{field}: {message}");
        }
    }
    Err("listing was not accepted".to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let config = match ClientConfig::load(Path::new("config"), &app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_with_repeated_media() {
        let args = Args::try_parse_from([
            "submit_business",
            "listing.json",
            "--photo",
            "a.jpg",
            "--video",
            "tour.mp4",
            "--photo",
            "b.jpg",
        ])
        .unwrap();

        assert_eq!(args.listing, PathBuf::from("listing.json"));
        assert_eq!(args.edit, None);
        assert_eq!(args.photos, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
        assert_eq!(args.videos, vec![PathBuf::from("tour.mp4")]);
    }

    #[test]
    fn parses_edit_id() {
        let args = Args::try_parse_from(["submit_business", "listing.json", "--edit", "42"]).unwrap();
        assert_eq!(args.edit, Some(42));
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(Args::try_parse_from(["submit_business"]).is_err());
        assert!(Args::try_parse_from(["submit_business", "a.json", "b.json"]).is_err());
        assert!(Args::try_parse_from(["submit_business", "a.json", "--photo"]).is_err());
        assert!(Args::try_parse_from(["submit_business", "a.json", "--edit", "x"]).is_err());
        assert!(Args::try_parse_from(["submit_business", "a.json", "--edit", "0"]).is_err());
    }

    #[test]
    fn listing_values_skip_blank_text() {
        let business: Business = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Bakery",
            "category": "RESTAURANT",
            "location": "Ouagadougou",
            "description": "",
            "price": 2500000,
            "contact_name": "Awa K.",
            "contact_phone": "+22670000000"
        }))
        .unwrap();

        let values = listing_values(&business);

        assert!(values.contains(&(BusinessField::Name, FieldValue::Text("Bakery".into()))));
        assert!(values.contains(&(BusinessField::Price, FieldValue::Text("2500000".into()))));
        assert!(!values.iter().any(|(field, _)| *field == BusinessField::Description));
    }
}
