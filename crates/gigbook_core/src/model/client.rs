//! Client domain model.
//!
//! # Responsibility
//! - Define the billing counterpart record every project and invoice can
//!   point at.
//! - Validate the contact fields the rest of the system relies on.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another client.
//! - `email` always matches the accepted format after a successful
//!   `validate()`.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a client.
pub type ClientId = Uuid;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid e-mail regex")
});

/// Relationship state of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
    Prospect,
}

/// Canonical client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub uuid: ClientId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub status: ClientStatus,
    /// Net payment terms in days, applied when dating new invoices.
    pub payment_terms_days: u32,
}

impl Client {
    /// Creates an active client with default 30-day payment terms.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: None,
            company: None,
            notes: None,
            status: ClientStatus::default(),
            payment_terms_days: 30,
        }
    }

    /// Checks the fields repositories require before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyClientName);
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ValidationError::InvalidClientEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, ClientStatus};
    use crate::model::ValidationError;

    #[test]
    fn new_client_defaults() {
        let client = Client::new("Acme Studio", "billing@acme.example");
        assert!(!client.uuid.is_nil());
        assert_eq!(client.status, ClientStatus::Active);
        assert_eq!(client.payment_terms_days, 30);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_email() {
        let mut client = Client::new("  ", "billing@acme.example");
        assert_eq!(client.validate(), Err(ValidationError::EmptyClientName));

        client.name = "Acme Studio".to_string();
        client.email = "not-an-address".to_string();
        assert!(matches!(
            client.validate(),
            Err(ValidationError::InvalidClientEmail(_))
        ));
    }
}
