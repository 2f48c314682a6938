//! Customer details collected at checkout, and their validation.
//!
//! Validation is per field and all-or-nothing: every rule is checked, every
//! failure is reported, and the record is only accepted when none fail.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// The customer details record.
///
/// All fields are free text as typed into the form. Serialized with
/// camelCase keys, which is also the form's field naming. A missing key
/// deserializes as an empty string and is left for [`UserDetails::validate`]
/// to reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub country: String,
    pub zip_code: String,
}

/// A field of [`UserDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailField {
    FirstName,
    LastName,
    Phone,
    Email,
    Address,
    Country,
    ZipCode,
}

impl DetailField {
    /// All fields in form order.
    pub const ALL: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Phone,
        Self::Email,
        Self::Address,
        Self::Country,
        Self::ZipCode,
    ];

    /// The field's key in the serialized record and in the form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::Country => "country",
            Self::ZipCode => "zipCode",
        }
    }

    /// Minimum length in characters, for the length-checked fields.
    #[must_use]
    pub const fn min_length(self) -> Option<usize> {
        match self {
            Self::FirstName | Self::LastName | Self::Country => Some(2),
            Self::Phone => Some(10),
            Self::Address | Self::ZipCode => Some(5),
            Self::Email => None,
        }
    }

    /// Message shown next to the field when it fails validation.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FirstName => "First name must be at least 2 characters",
            Self::LastName => "Last name must be at least 2 characters",
            Self::Phone => "Invalid phone number",
            Self::Email => "Invalid email address",
            Self::Address => "Invalid address",
            Self::Country => "Invalid country",
            Self::ZipCode => "Invalid zip code",
        }
    }
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Field-to-message map for a rejected record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<DetailField, String>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: DetailField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: DetailField) -> bool {
        self.0.contains_key(&field)
    }

    /// Failed fields and their messages, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (DetailField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: DetailField) {
        self.0.insert(field, field.message().to_owned());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl UserDetails {
    /// The value the visitor entered for a field.
    #[must_use]
    pub fn field(&self, field: DetailField) -> &str {
        match field {
            DetailField::FirstName => &self.first_name,
            DetailField::LastName => &self.last_name,
            DetailField::Phone => &self.phone,
            DetailField::Email => &self.email,
            DetailField::Address => &self.address,
            DetailField::Country => &self.country,
            DetailField::ZipCode => &self.zip_code,
        }
    }

    /// Check every field rule.
    ///
    /// Lengths count characters, not bytes, and values are checked as
    /// entered (no trimming).
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message; the record is not
    /// returned in that case.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in DetailField::ALL {
            let value = self.field(field);
            let ok = field.min_length().map_or_else(
                || Email::parse(value).is_ok(),
                |min| value.chars().count() >= min,
            );
            if !ok {
                errors.insert(field);
            }
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}
