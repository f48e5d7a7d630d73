//! Multipart body for creating or updating a listing.

use crate::domain::media::MediaFile;
use crate::formatting::parse_formatted_int;
use crate::forms::FormError;
use crate::forms::business::{BusinessDraft, BusinessField, FormMode};
use crate::forms::media::MediaIntake;

/// Value of one multipart entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadPart {
    Text(String),
    File(MediaFile),
}

/// Ordered multipart entries; keys such as `photos[]` may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusinessPayload {
    parts: Vec<(String, PayloadPart)>,
}

impl BusinessPayload {
    /// Assembles the request body from a validated draft.
    ///
    /// Optional numeric fields are only sent when filled in. Persisted media
    /// is never re-sent; only new files travel with the request.
    pub fn from_draft(draft: &BusinessDraft, mode: FormMode) -> Result<Self, FormError> {
        let mut payload = BusinessPayload::default();

        if mode.is_edit() {
            payload.push_text("_method", "PUT");
        }

        payload.push_text("submitter_name", draft.contact_name.trim());
        payload.push_text("submitter_email", draft.contact_email.trim());
        payload.push_text("submitter_phone", draft.contact_phone.trim());

        for field in [
            BusinessField::Name,
            BusinessField::Category,
            BusinessField::Location,
            BusinessField::FullAddress,
            BusinessField::Description,
        ] {
            payload.push_field(draft, field);
        }
        for field in [BusinessField::AdditionalInfo, BusinessField::Reasons] {
            if draft.text(field).is_some_and(|value| !value.trim().is_empty()) {
                payload.push_field(draft, field);
            }
        }

        for field in [BusinessField::Price, BusinessField::YearEstablished] {
            let value = required_number(draft, field)?;
            payload.push_text(field.wire_name(), value.to_string());
        }
        for field in [
            BusinessField::Employees,
            BusinessField::MonthlyRevenue,
            BusinessField::YearlyRevenue,
        ] {
            if let Some(value) = optional_number(draft, field)? {
                payload.push_text(field.wire_name(), value.to_string());
            }
        }

        payload.push_text(
            BusinessField::PriceNegotiable.wire_name(),
            if draft.price_negotiable { "1" } else { "0" },
        );
        payload.push_text(
            BusinessField::Assets.wire_name(),
            serde_json::to_string(&draft.assets)?,
        );
        payload.push_text(
            BusinessField::Advantages.wire_name(),
            serde_json::to_string(&draft.advantages)?,
        );

        for field in [
            BusinessField::ContactName,
            BusinessField::ContactPhone,
            BusinessField::ContactEmail,
        ] {
            payload.push_field(draft, field);
        }

        payload.push_media(&draft.photos);
        payload.push_media(&draft.videos);

        Ok(payload)
    }

    pub fn parts(&self) -> &[(String, PayloadPart)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, PayloadPart)> {
        self.parts
    }

    /// First text value stored under `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.parts.iter().find_map(|(name, part)| match part {
            PayloadPart::Text(value) if name == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Every file stored under `key`, in order.
    pub fn files(&self, key: &str) -> Vec<&MediaFile> {
        self.parts
            .iter()
            .filter_map(|(name, part)| match part {
                PayloadPart::File(file) if name == key => Some(file),
                _ => None,
            })
            .collect()
    }

    fn push_text(&mut self, key: &str, value: impl Into<String>) {
        self.parts
            .push((key.to_string(), PayloadPart::Text(value.into())));
    }

    fn push_field(&mut self, draft: &BusinessDraft, field: BusinessField) {
        let value = draft.text(field).unwrap_or_default().trim();
        self.push_text(field.wire_name(), value);
    }

    fn push_media(&mut self, intake: &MediaIntake) {
        let key = intake.kind().multipart_key();
        for file in intake.new_files() {
            self.parts
                .push((key.to_string(), PayloadPart::File(file.clone())));
        }
    }
}

fn optional_number(draft: &BusinessDraft, field: BusinessField) -> Result<Option<u64>, FormError> {
    let raw = draft.text(field).unwrap_or_default();
    parse_formatted_int(raw).map_err(|err| {
        log::error!("Failed to parse {}: {err}", field.wire_name());
        FormError::InvalidNumber {
            field: field.wire_name().to_string(),
            value: raw.to_string(),
        }
    })
}

fn required_number(draft: &BusinessDraft, field: BusinessField) -> Result<u64, FormError> {
    optional_number(draft, field)?.ok_or_else(|| FormError::InvalidNumber {
        field: field.wire_name().to_string(),
        value: String::new(),
    })
}
