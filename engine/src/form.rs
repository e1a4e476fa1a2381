//! Form state: values, errors, submission bookkeeping.

use signup_types::{FieldErrors, FieldName, FormValues, validate_all, validate_field};

/// Outcome banner shown above the form after a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Success,
    Failure,
}

impl Banner {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Success => "User registered successfully!",
            Self::Failure => "Could not register the user. Please try again.",
        }
    }
}

/// Owns everything the user has typed and every message attached to it.
#[derive(Debug, Default)]
pub struct FormStore {
    values: FormValues,
    errors: FieldErrors,
    submit_count: u32,
    banner: Option<Banner>,
    /// Bumped every time a banner is raised, even when it repeats.
    banner_serial: u64,
}

impl FormStore {
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut FormValues {
        &mut self.values
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: FieldName) -> Option<&str> {
        self.errors.get(field)
    }

    pub(crate) fn set_error(&mut self, field: FieldName, message: impl Into<String>) {
        self.errors.set(field, message);
    }

    pub(crate) fn clear_error(&mut self, field: FieldName) {
        self.errors.clear(field);
    }

    pub(crate) fn merge_errors(&mut self, errors: FieldErrors) {
        self.errors.merge(errors);
    }

    /// Submit attempts since the last successful registration.
    #[must_use]
    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    #[must_use]
    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    #[must_use]
    pub fn banner_serial(&self) -> u64 {
        self.banner_serial
    }

    pub(crate) fn set_banner(&mut self, banner: Banner) {
        self.banner = Some(banner);
        self.banner_serial = self.banner_serial.wrapping_add(1);
    }

    pub(crate) fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Count a submit attempt and run every rule. Returns true when the form
    /// may be sent.
    pub(crate) fn begin_submit(&mut self) -> bool {
        self.submit_count = self.submit_count.saturating_add(1);
        self.errors = validate_all(&self.values);
        self.errors.is_empty()
    }

    /// Re-run `field`'s rules once the form has been submitted at least once.
    pub(crate) fn revalidate(&mut self, field: FieldName) {
        if self.submit_count == 0 {
            return;
        }
        match validate_field(field, &self.values) {
            Some(message) => self.errors.set(field, message),
            None => self.errors.clear(field),
        }
    }

    /// Clear values, errors and the submit counter; keep the banner.
    pub(crate) fn reset(&mut self) {
        self.values = FormValues::default();
        self.errors.clear_all();
        self.submit_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use signup_types::{FieldName, FormValues};

    use super::{Banner, FormStore};

    #[test]
    fn revalidation_waits_for_first_submit() {
        let mut form = FormStore::default();
        form.revalidate(FieldName::Name);
        assert!(form.errors().is_empty());

        assert!(!form.begin_submit());
        assert_eq!(form.submit_count(), 1);
        assert_eq!(form.error(FieldName::Name), Some("Name is required."));

        form.values_mut().name = "Ana".to_string();
        form.revalidate(FieldName::Name);
        assert_eq!(form.error(FieldName::Name), None);
    }

    #[test]
    fn reset_keeps_banner_but_clears_everything_else() {
        let mut form = FormStore::default();
        form.values_mut().email = "a@b.co".to_string();
        form.begin_submit();
        form.set_banner(Banner::Success);
        form.reset();

        assert_eq!(form.values(), &FormValues::default());
        assert!(form.errors().is_empty());
        assert_eq!(form.submit_count(), 0);
        assert_eq!(form.banner(), Some(Banner::Success));
    }

    #[test]
    fn repeated_banner_bumps_serial() {
        let mut form = FormStore::default();
        form.set_banner(Banner::Failure);
        form.set_banner(Banner::Failure);
        assert_eq!(form.banner_serial(), 2);
        form.dismiss_banner();
        assert_eq!(form.banner(), None);
        assert_eq!(form.banner_serial(), 2);
    }
}
