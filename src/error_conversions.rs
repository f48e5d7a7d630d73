//! Error conversion glue between the form layer and the client services.
//!
//! The domain layer must not depend on service error types, so the
//! conversions live here and are only compiled with the `client` feature.

use crate::domain::types::TypeConstraintError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}
