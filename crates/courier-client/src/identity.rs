//! Client identity state and registration-form validation.
//!
//! The identity is all-or-nothing: the engine holds an
//! `Option<ClientIdentity>`, so a half-populated registration is not
//! representable. A [`Registration`] form is validated locally before
//! any network traffic and only becomes a [`ClientIdentity`] once the
//! server accepts it.

use chrono::{Days, NaiveDate};
use courier_proto::{ALIAS_MAX, USERNAME_MAX};
use thiserror::Error;

/// Local rejections of the registration form.
///
/// These never reach the transport; the shell surfaces them as its
/// generic fill-in-the-fields notice.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Username empty or longer than 62 encoded bytes.
    #[error("username must be non-empty and at most 62 bytes")]
    BadUsername,

    /// Alias empty or longer than 30 encoded bytes.
    #[error("alias must be non-empty and at most 30 bytes")]
    BadAlias,

    /// Birth date not strictly before yesterday.
    #[error("birth date must be strictly before yesterday")]
    BadBirthDate,
}

/// Registered identity of this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Full name of the user.
    pub username: String,
    /// Unique handle used for every post-registration operation.
    pub alias: String,
    /// Birth date supplied at registration.
    pub birth_date: NaiveDate,
}

impl ClientIdentity {
    /// Birth date in the slash-separated wire form (`dd/mm/yyyy`).
    pub fn wire_birth_date(&self) -> String {
        self.birth_date.format("%d/%m/%Y").to_string()
    }
}

/// Registration form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Full name of the user.
    pub username: String,
    /// Requested alias.
    pub alias: String,
    /// Birth date.
    pub birth_date: NaiveDate,
}

impl Registration {
    /// Validate against the current local date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(chrono::Local::now().date_naive())
    }

    /// Validate with an explicit "today", for deterministic tests.
    pub fn validate_at(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.username.is_empty() || self.username.len() > USERNAME_MAX {
            return Err(ValidationError::BadUsername);
        }
        if self.alias.is_empty() || self.alias.len() > ALIAS_MAX {
            return Err(ValidationError::BadAlias);
        }

        let yesterday = today - Days::new(1);
        if self.birth_date >= yesterday {
            return Err(ValidationError::BadBirthDate);
        }

        Ok(())
    }

    /// Convert the accepted form into the identity it registers.
    pub fn into_identity(self) -> ClientIdentity {
        ClientIdentity {
            username: self.username,
            alias: self.alias,
            birth_date: self.birth_date,
        }
    }
}
