//! Session validation.
//!
//! Records read from storage are untrusted: they are parsed from raw JSON,
//! checked against the session invariants, and have their derived values
//! recomputed. Callers substitute a default session on failure.

use serde_json::Value;

use super::aggregate::Session;
use crate::domain::foundation::ValidationError;

impl Session {
    /// Checks the session invariants.
    ///
    /// # Errors
    ///
    /// - `MissingRequired` if registered without a phone
    /// - `OutOfRange` for non-positive catalog references
    /// - any cart validation error
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.registered && self.phone.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(ValidationError::missing_required("phone", "registered is true"));
        }

        if let Some(city) = self.selected_city {
            if city.0 <= 0 {
                return Err(ValidationError::out_of_range("selected_city", 1, i64::MAX, city.0));
            }
        }

        if let Some(branch) = self.selected_branch {
            if branch.0 <= 0 {
                return Err(ValidationError::out_of_range(
                    "selected_branch",
                    1,
                    i64::MAX,
                    branch.0,
                ));
            }
        }

        self.cart.validate()
    }

    /// Recomputes derived values that are never trusted from storage.
    pub fn normalize(&mut self) {
        self.cart.recompute_total();
    }

    /// Parses, validates and normalizes a stored session document.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the document does not match the session shape
    ///   (including unknown language codes)
    /// - any error from [`Session::validate`]
    pub fn from_stored(value: Value) -> Result<Self, ValidationError> {
        let mut session: Session = serde_json::from_value(value)
            .map_err(|e| ValidationError::invalid_format("session", e.to_string()))?;
        session.validate()?;
        session.normalize();
        Ok(session)
    }
}
