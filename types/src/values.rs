//! Form values and their wire representation.

use serde::{Deserialize, Serialize};

use crate::field::FieldName;

/// Current value of every form field.
///
/// Serializes to the JSON body the registration endpoint expects; field keys
/// match [`FieldName::wire_name`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub phone: String,
    pub cpf: String,
    pub zipcode: String,
    pub address: String,
    #[serde(rename = "addressNumber")]
    pub address_number: String,
    pub city: String,
    pub state: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub terms: bool,
}

impl FormValues {
    /// Text value of `field`. `None` for the terms checkbox.
    #[must_use]
    pub fn text(&self, field: FieldName) -> Option<&str> {
        let value = match field {
            FieldName::Name => &self.name,
            FieldName::LastName => &self.last_name,
            FieldName::Phone => &self.phone,
            FieldName::Cpf => &self.cpf,
            FieldName::Zipcode => &self.zipcode,
            FieldName::Address => &self.address,
            FieldName::AddressNumber => &self.address_number,
            FieldName::City => &self.city,
            FieldName::State => &self.state,
            FieldName::Email => &self.email,
            FieldName::Password => &self.password,
            FieldName::PasswordConfirmation => &self.password_confirmation,
            FieldName::Terms => return None,
        };
        Some(value.as_str())
    }

    pub fn text_mut(&mut self, field: FieldName) -> Option<&mut String> {
        let value = match field {
            FieldName::Name => &mut self.name,
            FieldName::LastName => &mut self.last_name,
            FieldName::Phone => &mut self.phone,
            FieldName::Cpf => &mut self.cpf,
            FieldName::Zipcode => &mut self.zipcode,
            FieldName::Address => &mut self.address,
            FieldName::AddressNumber => &mut self.address_number,
            FieldName::City => &mut self.city,
            FieldName::State => &mut self.state,
            FieldName::Email => &mut self.email,
            FieldName::Password => &mut self.password,
            FieldName::PasswordConfirmation => &mut self.password_confirmation,
            FieldName::Terms => return None,
        };
        Some(value)
    }

    /// Replace a text field's value. Ignored for the terms checkbox.
    pub fn set_text(&mut self, field: FieldName, value: impl Into<String>) {
        if let Some(slot) = self.text_mut(field) {
            *slot = value.into();
        }
    }

    /// True when every field holds its default value.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }
}
