//! Field identities for the registration form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mask::InputMask;

/// Every field on the registration form, in display order.
///
/// `Ord` follows declaration order, so ordered collections keyed by
/// `FieldName` iterate top-to-bottom as the form is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "cpf")]
    Cpf,
    #[serde(rename = "zipcode")]
    Zipcode,
    #[serde(rename = "address")]
    Address,
    #[serde(rename = "addressNumber")]
    AddressNumber,
    #[serde(rename = "city")]
    City,
    #[serde(rename = "state")]
    State,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "password_confirmation")]
    PasswordConfirmation,
    #[serde(rename = "terms")]
    Terms,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown form field: {0}")]
pub struct FieldParseError(pub String);

/// Visual grouping of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fieldset {
    PersonalData,
    Credentials,
    Terms,
}

impl Fieldset {
    pub const ALL: [Self; 3] = [Self::PersonalData, Self::Credentials, Self::Terms];

    #[must_use]
    pub const fn legend(self) -> &'static str {
        match self {
            Self::PersonalData => "Personal data",
            Self::Credentials => "Credentials",
            Self::Terms => "Terms of use",
        }
    }
}

impl FieldName {
    pub const ALL: [Self; 13] = [
        Self::Name,
        Self::LastName,
        Self::Phone,
        Self::Cpf,
        Self::Zipcode,
        Self::Address,
        Self::AddressNumber,
        Self::City,
        Self::State,
        Self::Email,
        Self::Password,
        Self::PasswordConfirmation,
        Self::Terms,
    ];

    /// Key used by the registration endpoint for this field.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::LastName => "lastName",
            Self::Phone => "phone",
            Self::Cpf => "cpf",
            Self::Zipcode => "zipcode",
            Self::Address => "address",
            Self::AddressNumber => "addressNumber",
            Self::City => "city",
            Self::State => "state",
            Self::Email => "email",
            Self::Password => "password",
            Self::PasswordConfirmation => "password_confirmation",
            Self::Terms => "terms",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, FieldParseError> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == raw)
            .ok_or_else(|| FieldParseError(raw.to_string()))
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::LastName => "Last name",
            Self::Phone => "Mobile phone",
            Self::Cpf => "CPF",
            Self::Zipcode => "Zip code",
            Self::Address => "Address",
            Self::AddressNumber => "Number",
            Self::City => "City",
            Self::State => "State",
            Self::Email => "E-mail",
            Self::Password => "Password",
            Self::PasswordConfirmation => "Confirm password",
            Self::Terms => "Terms of use",
        }
    }

    #[must_use]
    pub const fn fieldset(self) -> Fieldset {
        match self {
            Self::Email | Self::Password | Self::PasswordConfirmation => Fieldset::Credentials,
            Self::Terms => Fieldset::Terms,
            _ => Fieldset::PersonalData,
        }
    }

    /// Whether the field carries a required marker on the form.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::AddressNumber)
    }

    /// City and state are filled by the zip lookup only.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::City | Self::State)
    }

    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::PasswordConfirmation)
    }

    #[must_use]
    pub const fn is_checkbox(self) -> bool {
        matches!(self, Self::Terms)
    }

    /// Whether the user can place the cursor on this field.
    #[must_use]
    pub const fn is_focusable(self) -> bool {
        !self.is_read_only()
    }

    #[must_use]
    pub const fn mask(self) -> Option<InputMask> {
        match self {
            Self::Phone => Some(InputMask::PHONE),
            Self::Cpf => Some(InputMask::CPF),
            Self::Zipcode => Some(InputMask::ZIPCODE),
            _ => None,
        }
    }

    /// Hard cap on typed characters, mirroring an input's `maxLength`.
    #[must_use]
    pub const fn max_input_chars(self) -> Option<usize> {
        match self {
            Self::Name => Some(40),
            Self::LastName | Self::Address | Self::Email => Some(100),
            Self::Phone => Some(15),
            Self::Cpf => Some(14),
            Self::Zipcode => Some(9),
            Self::AddressNumber => Some(6),
            Self::Password | Self::PasswordConfirmation => Some(24),
            Self::City | Self::State | Self::Terms => None,
        }
    }

    /// Placeholder shown in an empty masked input.
    #[must_use]
    pub const fn placeholder(self) -> Option<&'static str> {
        match self.mask() {
            Some(mask) => Some(mask.placeholder()),
            None => None,
        }
    }

    /// Next focusable field after `self`, wrapping around.
    #[must_use]
    pub fn next_focusable(self) -> Self {
        let start = self.index();
        (1..=Self::ALL.len())
            .map(|step| Self::ALL[(start + step) % Self::ALL.len()])
            .find(|field| field.is_focusable())
            .unwrap_or(self)
    }

    /// Previous focusable field before `self`, wrapping around.
    #[must_use]
    pub fn prev_focusable(self) -> Self {
        let len = Self::ALL.len();
        let start = self.index();
        (1..=len)
            .map(|step| Self::ALL[(start + len - step) % len])
            .find(|field| field.is_focusable())
            .unwrap_or(self)
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
