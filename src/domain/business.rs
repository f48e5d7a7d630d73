//! Business listing as returned by the marketplace backend.

use serde::Deserialize;

use crate::domain::types::BusinessId;

/// Persisted business-for-sale listing, used to hydrate the edit form.
#[derive(Clone, Debug, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Business {
    pub id: Option<BusinessId>,
    pub name: String,
    pub category: String,
    pub location: String,
    pub full_address: String,
    pub description: String,
    pub additional_info: Option<String>,
    pub price: Option<u64>,
    pub price_negotiable: bool,
    pub year_established: Option<u64>,
    pub employees: Option<u64>,
    pub monthly_revenue: Option<u64>,
    pub yearly_revenue: Option<u64>,
    pub assets: Vec<String>,
    pub advantages: Vec<String>,
    pub reasons: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    /// URLs of photos already stored by the backend.
    pub photos: Vec<String>,
    /// URLs of videos already stored by the backend.
    pub videos: Vec<String>,
}
