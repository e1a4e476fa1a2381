//! Core domain types for Signup.
//!
//! This crate contains the registration form's pure domain: field identities,
//! values, error maps, declarative validation rules and input masks. No IO, no
//! async. Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod errors;
mod field;
mod mask;
mod sanitize;
pub mod validation;
mod values;

pub use errors::FieldErrors;
pub use field::{FieldName, FieldParseError, Fieldset};
pub use mask::{InputMask, apply_mask};
pub use sanitize::sanitize_server_text;
pub use validation::{Rule, validate_all, validate_field};
pub use values::FormValues;
