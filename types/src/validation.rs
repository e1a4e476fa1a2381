//! Declarative per-field validation rules.
//!
//! Each field owns an ordered rule list; the first failing rule produces the
//! field's error message. Empty optional fields skip every rule after
//! `Required`.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::FieldErrors;
use crate::field::FieldName;
use crate::values::FormValues;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d{2}\) \d{5}-\d{4}$").expect("phone pattern is valid"));
static CPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("cpf pattern is valid"));
static ZIPCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-\d{3}$").expect("zipcode pattern is valid"));
static ADDRESS_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{0,6}$").expect("address number pattern is valid"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Named patterns used by [`Rule::Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Phone,
    Cpf,
    Zipcode,
    AddressNumber,
    Email,
}

impl Pattern {
    #[must_use]
    pub fn is_match(self, value: &str) -> bool {
        let re: &Regex = match self {
            Self::Phone => &PHONE_RE,
            Self::Cpf => &CPF_RE,
            Self::Zipcode => &ZIPCODE_RE,
            Self::AddressNumber => &ADDRESS_NUMBER_RE,
            Self::Email => &EMAIL_RE,
        };
        re.is_match(value)
    }
}

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Text must be non-empty; the terms checkbox must be checked.
    Required,
    MinChars(usize),
    MaxChars(usize),
    Pattern(Pattern),
    /// Value must equal the password field.
    MatchesPassword,
}

impl Rule {
    /// Message shown when this rule fails on `field`.
    #[must_use]
    pub fn message(self, field: FieldName) -> String {
        match self {
            Self::Required => match field {
                FieldName::City | FieldName::State => {
                    format!("Get the {} from the zip code.", field.label().to_lowercase())
                }
                FieldName::Terms => "You must accept the terms of use.".to_string(),
                _ => format!("{} is required.", field.label()),
            },
            Self::MinChars(n) => format!("{} must be at least {n} characters.", field.label()),
            Self::MaxChars(n) => format!("{} must be at most {n} characters.", field.label()),
            Self::Pattern(_) => format!("Invalid {}.", field.label().to_lowercase()),
            Self::MatchesPassword => "Passwords do not match.".to_string(),
        }
    }

    fn passes(self, value: &str, values: &FormValues) -> bool {
        match self {
            Self::Required => !value.is_empty(),
            Self::MinChars(n) => value.chars().count() >= n,
            Self::MaxChars(n) => value.chars().count() <= n,
            Self::Pattern(pattern) => pattern.is_match(value),
            Self::MatchesPassword => value == values.password,
        }
    }
}

/// Ordered rules for `field`.
#[must_use]
pub const fn rules(field: FieldName) -> &'static [Rule] {
    use Rule::{MatchesPassword, MaxChars, MinChars, Pattern as P, Required};

    match field {
        FieldName::Name => &[Required, MinChars(2), MaxChars(40)],
        FieldName::LastName | FieldName::Address => &[Required, MinChars(2), MaxChars(100)],
        FieldName::Phone => &[Required, P(Pattern::Phone)],
        FieldName::Cpf => &[Required, P(Pattern::Cpf)],
        FieldName::Zipcode => &[Required, P(Pattern::Zipcode)],
        FieldName::AddressNumber => &[MaxChars(6), P(Pattern::AddressNumber)],
        FieldName::City | FieldName::State | FieldName::Terms => &[Required],
        FieldName::Email => &[Required, MaxChars(100), P(Pattern::Email)],
        FieldName::Password => &[Required, MinChars(8), MaxChars(24)],
        FieldName::PasswordConfirmation => {
            &[Required, MinChars(8), MaxChars(24), MatchesPassword]
        }
    }
}

/// Validate one field; returns the first failing rule's message.
#[must_use]
pub fn validate_field(field: FieldName, values: &FormValues) -> Option<String> {
    if field == FieldName::Terms {
        return (!values.terms).then(|| Rule::Required.message(field));
    }

    let value = values.text(field).unwrap_or_default();
    for rule in rules(field) {
        if value.is_empty() && *rule != Rule::Required {
            // Optional and empty: nothing else applies.
            return None;
        }
        if !rule.passes(value, values) {
            return Some(rule.message(field));
        }
    }
    None
}

/// Validate every field, collecting one message per failing field.
#[must_use]
pub fn validate_all(values: &FormValues) -> FieldErrors {
    FieldName::ALL
        .into_iter()
        .filter_map(|field| validate_field(field, values).map(|message| (field, message)))
        .collect()
}
