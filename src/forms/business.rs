//! Business submission / edit form record.

use crate::domain::business::Business;
use crate::domain::media::MediaPolicy;
use crate::domain::session::UserProfile;
use crate::domain::types::{BusinessId, MediaUrl};
use crate::formatting::{format_currency, sanitize_phone_digits, sanitize_text, strip_formatting};
use crate::forms::FormError;
use crate::forms::media::MediaIntake;
use crate::validation::FieldSource;

/// How a field's raw input is normalized before storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, HTML-sanitized.
    Text,
    /// Digits only.
    Phone,
    /// Digits grouped by three for display.
    Currency,
    /// Digits only, no grouping (years, counts).
    Digits,
    /// Checkbox, stored as-is.
    Flag,
    /// Ordered list edited through add/remove.
    List,
    /// Photos or videos.
    Media,
}

/// Fields of the business form in layout order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusinessField {
    ContactName,
    ContactPhone,
    ContactEmail,
    Name,
    Category,
    Location,
    FullAddress,
    Description,
    AdditionalInfo,
    Price,
    PriceNegotiable,
    YearEstablished,
    Employees,
    MonthlyRevenue,
    YearlyRevenue,
    Assets,
    Advantages,
    Reasons,
    Photos,
    Videos,
}

impl BusinessField {
    pub const ALL: [BusinessField; 20] = [
        BusinessField::ContactName,
        BusinessField::ContactPhone,
        BusinessField::ContactEmail,
        BusinessField::Name,
        BusinessField::Category,
        BusinessField::Location,
        BusinessField::FullAddress,
        BusinessField::Description,
        BusinessField::AdditionalInfo,
        BusinessField::Price,
        BusinessField::PriceNegotiable,
        BusinessField::YearEstablished,
        BusinessField::Employees,
        BusinessField::MonthlyRevenue,
        BusinessField::YearlyRevenue,
        BusinessField::Assets,
        BusinessField::Advantages,
        BusinessField::Reasons,
        BusinessField::Photos,
        BusinessField::Videos,
    ];

    /// snake_case name used on the wire and by the create form.
    pub const fn wire_name(self) -> &'static str {
        match self {
            BusinessField::ContactName => "contact_name",
            BusinessField::ContactPhone => "contact_phone",
            BusinessField::ContactEmail => "contact_email",
            BusinessField::Name => "name",
            BusinessField::Category => "category",
            BusinessField::Location => "location",
            BusinessField::FullAddress => "full_address",
            BusinessField::Description => "description",
            BusinessField::AdditionalInfo => "additional_info",
            BusinessField::Price => "price",
            BusinessField::PriceNegotiable => "price_negotiable",
            BusinessField::YearEstablished => "year_established",
            BusinessField::Employees => "employees",
            BusinessField::MonthlyRevenue => "monthly_revenue",
            BusinessField::YearlyRevenue => "yearly_revenue",
            BusinessField::Assets => "assets",
            BusinessField::Advantages => "advantages",
            BusinessField::Reasons => "reasons",
            BusinessField::Photos => "photos",
            BusinessField::Videos => "videos",
        }
    }

    /// camelCase name used by the edit form inputs.
    pub const fn edit_name(self) -> &'static str {
        match self {
            BusinessField::ContactName => "contactName",
            BusinessField::ContactPhone => "contactPhone",
            BusinessField::ContactEmail => "contactEmail",
            BusinessField::FullAddress => "fullAddress",
            BusinessField::AdditionalInfo => "additionalInfo",
            BusinessField::PriceNegotiable => "priceNegotiable",
            BusinessField::YearEstablished => "yearEstablished",
            BusinessField::MonthlyRevenue => "monthlyRevenue",
            BusinessField::YearlyRevenue => "yearlyRevenue",
            other => other.wire_name(),
        }
    }

    /// Resolves either naming convention.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == name || field.edit_name() == name)
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            BusinessField::ContactPhone => FieldKind::Phone,
            BusinessField::Price | BusinessField::MonthlyRevenue | BusinessField::YearlyRevenue => {
                FieldKind::Currency
            }
            BusinessField::YearEstablished | BusinessField::Employees => FieldKind::Digits,
            BusinessField::PriceNegotiable => FieldKind::Flag,
            BusinessField::Assets | BusinessField::Advantages => FieldKind::List,
            BusinessField::Photos | BusinessField::Videos => FieldKind::Media,
            _ => FieldKind::Text,
        }
    }
}

/// Raw value coming from an input element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// Whether the form creates a listing or edits an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: BusinessId },
}

impl FormMode {
    /// Key under which errors for `field` are shown in this mode.
    pub const fn field_key(self, field: BusinessField) -> &'static str {
        match self {
            FormMode::Create => field.wire_name(),
            FormMode::Edit { .. } => field.edit_name(),
        }
    }

    pub const fn is_edit(self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }
}

/// In-progress business-for-sale listing.
#[derive(Debug)]
pub struct BusinessDraft {
    pub name: String,
    pub category: String,
    pub location: String,
    pub full_address: String,
    pub description: String,
    pub additional_info: String,
    /// Grouped display value, e.g. `2 500 000`.
    pub price: String,
    pub price_negotiable: bool,
    pub year_established: String,
    pub employees: String,
    pub monthly_revenue: String,
    pub yearly_revenue: String,
    pub assets: Vec<String>,
    pub advantages: Vec<String>,
    pub reasons: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub photos: MediaIntake,
    pub videos: MediaIntake,
}

impl Default for BusinessDraft {
    fn default() -> Self {
        Self::with_media_policies(MediaPolicy::photos(), MediaPolicy::videos())
    }
}

impl BusinessDraft {
    /// Empty draft whose media fields follow the given policies.
    pub fn with_media_policies(photos: MediaPolicy, videos: MediaPolicy) -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            location: String::new(),
            full_address: String::new(),
            description: String::new(),
            additional_info: String::new(),
            price: String::new(),
            price_negotiable: false,
            year_established: String::new(),
            employees: String::new(),
            monthly_revenue: String::new(),
            yearly_revenue: String::new(),
            assets: Vec::new(),
            advantages: Vec::new(),
            reasons: String::new(),
            contact_name: String::new(),
            contact_phone: String::new(),
            contact_email: String::new(),
            photos: MediaIntake::new(photos),
            videos: MediaIntake::new(videos),
        }
    }

    /// Draft populated from a fetched listing for edit mode.
    pub fn from_business(business: &Business, photos: MediaPolicy, videos: MediaPolicy) -> Self {
        let number = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_default();
        let currency = |value: Option<u64>| format_currency(&number(value));

        Self {
            name: business.name.clone(),
            category: business.category.clone(),
            location: business.location.clone(),
            full_address: business.full_address.clone(),
            description: business.description.clone(),
            additional_info: business.additional_info.clone().unwrap_or_default(),
            price: currency(business.price),
            price_negotiable: business.price_negotiable,
            year_established: number(business.year_established),
            employees: number(business.employees),
            monthly_revenue: currency(business.monthly_revenue),
            yearly_revenue: currency(business.yearly_revenue),
            assets: business.assets.clone(),
            advantages: business.advantages.clone(),
            reasons: business.reasons.clone().unwrap_or_default(),
            contact_name: business.contact_name.clone(),
            contact_phone: business.contact_phone.clone(),
            contact_email: business.contact_email.clone().unwrap_or_default(),
            photos: MediaIntake::with_existing(photos, persisted_urls(&business.photos)),
            videos: MediaIntake::with_existing(videos, persisted_urls(&business.videos)),
        }
    }

    /// Fills blank contact fields from the signed-in profile.
    pub fn prefill_contact(&mut self, profile: &UserProfile) {
        if self.contact_name.is_empty() {
            self.contact_name = profile.name.to_string();
        }
        if self.contact_email.is_empty() {
            self.contact_email = profile.email.to_string();
        }
        if self.contact_phone.is_empty() {
            if let Some(phone) = &profile.phone {
                self.contact_phone = sanitize_phone_digits(phone);
            }
        }
    }

    /// Normalizes `value` according to the field kind and stores it.
    pub fn set_field(&mut self, field: BusinessField, value: FieldValue) -> Result<(), FormError> {
        match (field.kind(), value) {
            (FieldKind::Flag, FieldValue::Flag(checked)) => {
                self.price_negotiable = checked;
                Ok(())
            }
            (FieldKind::Text, FieldValue::Text(raw)) => self.store_text(field, sanitize_text(&raw)),
            (FieldKind::Phone, FieldValue::Text(raw)) => {
                self.store_text(field, sanitize_phone_digits(&raw))
            }
            (FieldKind::Currency, FieldValue::Text(raw)) => {
                self.store_text(field, format_currency(&sanitize_text(&raw)))
            }
            (FieldKind::Digits, FieldValue::Text(raw)) => {
                self.store_text(field, strip_formatting(&raw))
            }
            _ => Err(FormError::InvalidValue(field.wire_name().to_string())),
        }
    }

    fn store_text(&mut self, field: BusinessField, value: String) -> Result<(), FormError> {
        let slot = self
            .text_mut(field)
            .ok_or_else(|| FormError::InvalidValue(field.wire_name().to_string()))?;
        *slot = value;
        Ok(())
    }

    /// Current string value of a scalar field.
    pub fn text(&self, field: BusinessField) -> Option<&str> {
        let value = match field {
            BusinessField::ContactName => &self.contact_name,
            BusinessField::ContactPhone => &self.contact_phone,
            BusinessField::ContactEmail => &self.contact_email,
            BusinessField::Name => &self.name,
            BusinessField::Category => &self.category,
            BusinessField::Location => &self.location,
            BusinessField::FullAddress => &self.full_address,
            BusinessField::Description => &self.description,
            BusinessField::AdditionalInfo => &self.additional_info,
            BusinessField::Price => &self.price,
            BusinessField::YearEstablished => &self.year_established,
            BusinessField::Employees => &self.employees,
            BusinessField::MonthlyRevenue => &self.monthly_revenue,
            BusinessField::YearlyRevenue => &self.yearly_revenue,
            BusinessField::Reasons => &self.reasons,
            BusinessField::PriceNegotiable
            | BusinessField::Assets
            | BusinessField::Advantages
            | BusinessField::Photos
            | BusinessField::Videos => return None,
        };
        Some(value.as_str())
    }

    fn text_mut(&mut self, field: BusinessField) -> Option<&mut String> {
        let value = match field {
            BusinessField::ContactName => &mut self.contact_name,
            BusinessField::ContactPhone => &mut self.contact_phone,
            BusinessField::ContactEmail => &mut self.contact_email,
            BusinessField::Name => &mut self.name,
            BusinessField::Category => &mut self.category,
            BusinessField::Location => &mut self.location,
            BusinessField::FullAddress => &mut self.full_address,
            BusinessField::Description => &mut self.description,
            BusinessField::AdditionalInfo => &mut self.additional_info,
            BusinessField::Price => &mut self.price,
            BusinessField::YearEstablished => &mut self.year_established,
            BusinessField::Employees => &mut self.employees,
            BusinessField::MonthlyRevenue => &mut self.monthly_revenue,
            BusinessField::YearlyRevenue => &mut self.yearly_revenue,
            BusinessField::Reasons => &mut self.reasons,
            _ => return None,
        };
        Some(value)
    }

    /// Mutable access to the list behind `Assets` or `Advantages`.
    pub fn list_mut(&mut self, field: BusinessField) -> Option<&mut Vec<String>> {
        match field {
            BusinessField::Assets => Some(&mut self.assets),
            BusinessField::Advantages => Some(&mut self.advantages),
            _ => None,
        }
    }

    pub fn media(&self, field: BusinessField) -> Option<&MediaIntake> {
        match field {
            BusinessField::Photos => Some(&self.photos),
            BusinessField::Videos => Some(&self.videos),
            _ => None,
        }
    }

    pub fn media_mut(&mut self, field: BusinessField) -> Option<&mut MediaIntake> {
        match field {
            BusinessField::Photos => Some(&mut self.photos),
            BusinessField::Videos => Some(&mut self.videos),
            _ => None,
        }
    }

    /// Releases every new media preview held by the draft.
    pub fn release_media(&mut self) {
        self.photos.release_new();
        self.videos.release_new();
    }
}

impl FieldSource for BusinessDraft {
    fn field_value(&self, field: &str) -> Option<&str> {
        BusinessField::from_name(field).and_then(|field| self.text(field))
    }
}

fn persisted_urls(urls: &[String]) -> Vec<MediaUrl> {
    urls.iter()
        .filter_map(|url| match MediaUrl::new(url.as_str()) {
            Ok(url) => Some(url),
            Err(err) => {
                log::warn!("Skipping persisted media with invalid url {url}: {err}");
                None
            }
        })
        .collect()
}
