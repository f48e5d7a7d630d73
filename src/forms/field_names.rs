//! Translation of backend validation keys to edit-form input names.

/// snake_case backend key and the camelCase key used by the edit form.
pub const BACKEND_TO_EDIT: &[(&str, &str)] = &[
    ("full_address", "fullAddress"),
    ("additional_info", "additionalInfo"),
    ("price_negotiable", "priceNegotiable"),
    ("year_established", "yearEstablished"),
    ("monthly_revenue", "monthlyRevenue"),
    ("yearly_revenue", "yearlyRevenue"),
    ("contact_name", "contactName"),
    ("submitter_name", "contactName"),
    ("contact_phone", "contactPhone"),
    ("submitter_phone", "contactPhone"),
    ("contact_email", "contactEmail"),
    ("submitter_email", "contactEmail"),
];

/// Maps a backend key to its edit-form key; unmapped keys pass through.
pub fn edit_field_name(backend: &str) -> &str {
    BACKEND_TO_EDIT
        .iter()
        .find(|(from, _)| *from == backend)
        .map(|(_, to)| *to)
        .unwrap_or(backend)
}

/// Strips array notation so `photos.0` or `photos[]` report on `photos`.
pub fn base_field_name(backend: &str) -> &str {
    let end = backend
        .find(['.', '['])
        .unwrap_or(backend.len());
    &backend[..end]
}
