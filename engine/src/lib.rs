//! Core engine for Signup - form state machine and request orchestration.
//!
//! This crate contains the App state machine without TUI dependencies. The
//! frame loop calls [`App::tick`] once per frame; network work runs in
//! spawned tokio tasks whose results are drained there.

mod form;
mod lookup;
mod submission;
pub mod ui;

use std::{collections::BTreeSet, mem};

use tokio::task::JoinError;

pub use form::{Banner, FormStore};
pub use signup_config::Settings;
pub use signup_providers::{
    ClientBuildError, LookupError, PostalClient, RegistrationClient, RegistrationReceipt,
    SubmitError,
};
pub use signup_types::{FieldErrors, FieldName, Fieldset, FormValues, InputMask};
pub use ui::{FieldCursor, ScrollState, UiOptions};

use lookup::{LookupOutcome, ZipLookup};
use signup_types::sanitize_server_text;
use submission::{SubmissionTask, SubmitResult};

pub const LOOKUP_TIMEOUT_MESSAGE: &str = "Lookup took too long, please try again.";
pub const LOOKUP_NOT_FOUND_MESSAGE: &str = "Zip code not found.";

const SCROLL_STEP: u16 = 3;

#[derive(Debug)]
pub struct App {
    form: FormStore,
    focus: FieldName,
    cursor: FieldCursor,
    /// Secret fields currently shown in clear text.
    revealed: BTreeSet<FieldName>,
    lookup: ZipLookup,
    /// Zip code city and state were last looked up for.
    looked_up_zipcode: Option<String>,
    registration: RegistrationClient,
    submission: Option<SubmissionTask>,
    scroll: ScrollState,
    scroll_max: u16,
    scroll_rendered: u16,
    tick: usize,
    ui_options: UiOptions,
    should_quit: bool,
}

impl App {
    /// Build the app with HTTP clients for the configured endpoints.
    pub fn new(settings: &Settings) -> Result<Self, ClientBuildError> {
        let postal = PostalClient::new(&settings.postal_lookup_base, settings.request_timeout)?;
        let registration =
            RegistrationClient::new(&settings.registration_url, settings.request_timeout)?;
        let mut app = Self::with_clients(postal, registration);
        app.ui_options = UiOptions {
            ascii_only: settings.ascii_only,
            high_contrast: settings.high_contrast,
            reduced_motion: settings.reduced_motion,
        };
        Ok(app)
    }

    #[must_use]
    pub fn with_clients(postal: PostalClient, registration: RegistrationClient) -> Self {
        Self {
            form: FormStore::default(),
            focus: FieldName::Name,
            cursor: FieldCursor::default(),
            revealed: BTreeSet::new(),
            lookup: ZipLookup::new(postal),
            looked_up_zipcode: None,
            registration,
            submission: None,
            scroll: ScrollState::default(),
            scroll_max: 0,
            scroll_rendered: 0,
            tick: 0,
            ui_options: UiOptions::default(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }

    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    pub fn set_ui_options(&mut self, options: UiOptions) {
        self.ui_options = options;
    }

    /// Increment animation tick and poll background tasks.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.poll_lookup();
        self.poll_submission();
    }

    pub fn form(&self) -> &FormStore {
        &self.form
    }

    pub fn values(&self) -> &FormValues {
        self.form.values()
    }

    pub fn error(&self, field: FieldName) -> Option<&str> {
        self.form.error(field)
    }

    pub fn banner(&self) -> Option<Banner> {
        self.form.banner()
    }

    pub fn dismiss_banner(&mut self) {
        self.form.dismiss_banner();
    }

    /// True while the latest zip lookup has not settled.
    pub fn is_loading_zipcode(&self) -> bool {
        self.lookup.is_pending()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_some()
    }

    pub fn focus(&self) -> FieldName {
        self.focus
    }

    /// Cursor position in the focused field, in grapheme clusters.
    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    pub fn is_revealed(&self, field: FieldName) -> bool {
        self.revealed.contains(&field)
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next_focusable());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev_focusable());
    }

    /// Move focus to `field`. Leaving the zip code field counts as a blur and
    /// triggers a lookup.
    pub fn set_focus(&mut self, field: FieldName) {
        if !field.is_focusable() || field == self.focus {
            return;
        }
        let previous = mem::replace(&mut self.focus, field);
        self.cursor = FieldCursor::at_end(self.values().text(field).unwrap_or_default());
        self.scroll = ScrollState::FollowFocus;

        if previous == FieldName::Zipcode {
            self.blur_zipcode();
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        let field = self.focus;
        if c.is_control() {
            return;
        }
        if field.is_checkbox() {
            if c == ' ' {
                self.toggle_terms();
            }
            return;
        }
        if field.is_read_only() {
            return;
        }
        let Some(text) = self.form.values_mut().text_mut(field) else {
            return;
        };

        let changed = if let Some(mask) = field.mask() {
            let digits = text.chars().filter(char::is_ascii_digit).count();
            if c.is_ascii_digit() && digits < mask.capacity() {
                text.push(c);
                *text = mask.apply(text);
                self.cursor = FieldCursor::at_end(text);
                true
            } else {
                false
            }
        } else if field
            .max_input_chars()
            .is_some_and(|max| text.chars().count() >= max)
        {
            false
        } else {
            self.cursor.insert_char(text, c);
            true
        };

        if changed {
            self.after_edit(field);
        }
    }

    /// Insert pasted text. Line breaks are dropped; every character goes
    /// through the same filters as typing.
    pub fn insert_text(&mut self, text: &str) {
        if self.focus.is_checkbox() {
            return;
        }
        for c in text.chars().filter(|c| !matches!(c, '\n' | '\r')) {
            self.insert_char(c);
        }
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        let field = self.focus;
        if field.is_read_only() {
            return;
        }
        let Some(text) = self.form.values_mut().text_mut(field) else {
            return;
        };

        let changed = if let Some(mask) = field.mask() {
            let before = text.len();
            *text = mask.pop_digit(text);
            self.cursor = FieldCursor::at_end(text);
            text.len() != before
        } else {
            self.cursor.delete_char(text)
        };

        if changed {
            self.after_edit(field);
        }
    }

    pub fn delete_char_forward(&mut self) {
        let field = self.focus;
        if field.is_read_only() || field.mask().is_some() {
            return;
        }
        let Some(text) = self.form.values_mut().text_mut(field) else {
            return;
        };
        if self.cursor.delete_char_forward(text) {
            self.after_edit(field);
        }
    }

    pub fn delete_word_backwards(&mut self) {
        let field = self.focus;
        if field.mask().is_some() {
            self.clear_field();
            return;
        }
        if field.is_read_only() {
            return;
        }
        let Some(text) = self.form.values_mut().text_mut(field) else {
            return;
        };
        if self.cursor.delete_word_backwards(text) {
            self.after_edit(field);
        }
    }

    pub fn clear_field(&mut self) {
        let field = self.focus;
        if field.is_read_only() {
            return;
        }
        let Some(text) = self.form.values_mut().text_mut(field) else {
            return;
        };
        if text.is_empty() {
            return;
        }
        text.clear();
        self.cursor = FieldCursor::default();
        self.after_edit(field);
    }

    pub fn cursor_left(&mut self) {
        if self.focus.mask().is_none() {
            self.cursor.move_left();
        }
    }

    pub fn cursor_right(&mut self) {
        if self.focus.mask().is_none() {
            let text = self.form.values().text(self.focus).unwrap_or_default();
            self.cursor.move_right(text);
        }
    }

    pub fn cursor_home(&mut self) {
        if self.focus.mask().is_none() {
            self.cursor.move_home();
        }
    }

    pub fn cursor_end(&mut self) {
        let text = self.form.values().text(self.focus).unwrap_or_default();
        self.cursor.move_end(text);
    }

    pub fn toggle_terms(&mut self) {
        let values = self.form.values_mut();
        values.terms = !values.terms;
        self.after_edit(FieldName::Terms);
    }

    /// Show or hide the focused password field.
    pub fn toggle_password_visibility(&mut self) {
        let field = self.focus;
        if !field.is_secret() {
            return;
        }
        if !self.revealed.remove(&field) {
            self.revealed.insert(field);
        }
    }

    fn after_edit(&mut self, field: FieldName) {
        self.scroll = ScrollState::FollowFocus;
        if field == FieldName::Zipcode {
            // City and state only ever describe the zip code that was looked up.
            let values = self.form.values_mut();
            values.city.clear();
            values.state.clear();
        }
        self.form.revalidate(field);
        if field == FieldName::Password && !self.values().password_confirmation.is_empty() {
            self.form.revalidate(FieldName::PasswordConfirmation);
        }
    }

    // ------------------------------------------------------------------
    // Zip lookup
    // ------------------------------------------------------------------

    /// Handle the zip code field losing focus.
    ///
    /// City and state are cleared right away. An empty zip code issues no
    /// request but still cancels whatever lookup is in flight.
    pub fn blur_zipcode(&mut self) {
        let values = self.form.values_mut();
        values.city.clear();
        values.state.clear();
        self.form.clear_error(FieldName::Zipcode);

        let zipcode = self.values().zipcode.clone();
        self.looked_up_zipcode = Some(zipcode.clone());
        if zipcode.is_empty() {
            if self.lookup.cancel() {
                tracing::debug!("Zip code cleared; pending lookup cancelled");
            }
            return;
        }
        self.lookup.start(&zipcode);
    }

    fn poll_lookup(&mut self) {
        while let Some(outcome) = self.lookup.try_next() {
            self.apply_lookup(outcome);
        }
    }

    fn apply_lookup(&mut self, outcome: LookupOutcome) {
        let LookupOutcome {
            generation,
            zipcode,
            result,
        } = outcome;

        if zipcode != self.values().zipcode {
            tracing::debug!(generation, %zipcode, "Zip code edited since lookup; result dropped");
            return;
        }

        match result {
            Ok(address) => {
                let (city, state) = address.into_city_state();
                let values = self.form.values_mut();
                values.city = sanitize_server_text(&city).into_owned();
                values.state = sanitize_server_text(&state).into_owned();
                for field in [FieldName::Zipcode, FieldName::City, FieldName::State] {
                    self.form.clear_error(field);
                }
                tracing::info!(generation, %zipcode, "Zip lookup resolved");
            }
            Err(err) => {
                tracing::warn!(generation, %zipcode, "Zip lookup failed: {err}");
                let message = if err.is_timeout() {
                    LOOKUP_TIMEOUT_MESSAGE
                } else {
                    LOOKUP_NOT_FOUND_MESSAGE
                };
                self.form.set_error(FieldName::Zipcode, message);
            }
        }
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validate and, when the form is clean, send it.
    ///
    /// Ignored while a previous submission is still in flight. Submitting
    /// from an edited zip code field blurs it first, so the form never goes
    /// out with a city and state that belong to another zip code.
    pub fn submit(&mut self) {
        if self.submission.is_some() {
            tracing::debug!("Submit ignored; registration already in flight");
            return;
        }

        if self.focus == FieldName::Zipcode
            && self.looked_up_zipcode.as_deref() != Some(self.values().zipcode.as_str())
        {
            self.blur_zipcode();
        }

        if !self.form.begin_submit() {
            tracing::debug!(
                errors = self.form.errors().len(),
                "Submit blocked by validation"
            );
            self.form.set_banner(Banner::Failure);
            self.scroll_to_top();
            return;
        }

        self.submission = Some(SubmissionTask::spawn(
            self.registration.clone(),
            self.form.values().clone(),
        ));
    }

    fn poll_submission(&mut self) {
        let finished = match &self.submission {
            Some(task) => task.is_finished(),
            None => return,
        };
        if !finished {
            return;
        }

        let Some(task) = self.submission.take() else {
            return;
        };
        let result = match task.try_complete_now() {
            Ok(result) => result,
            Err(task) => {
                self.submission = Some(task);
                return;
            }
        };

        self.finish_submit(result);
        self.scroll_to_top();
    }

    fn finish_submit(&mut self, result: Result<SubmitResult, JoinError>) {
        match result {
            Ok(Ok(receipt)) => {
                tracing::info!(message = ?receipt.message, "Registration succeeded");
                // A lookup still in flight would refill the blank form.
                self.lookup.cancel();
                self.looked_up_zipcode = None;
                self.form.reset();
                self.form.set_banner(Banner::Success);
                self.focus = FieldName::Name;
                self.cursor = FieldCursor::default();
                self.revealed.clear();
            }
            Ok(Err(SubmitError::Rejected { status, errors })) => {
                tracing::info!(%status, "Registration rejected by server");
                self.form.merge_errors(errors);
                self.form.set_banner(Banner::Failure);
            }
            Ok(Err(err)) => {
                tracing::warn!("Registration failed: {err}");
                self.form.set_banner(Banner::Failure);
            }
            Err(err) => {
                tracing::error!("Registration task failed: {err}");
                self.form.set_banner(Banner::Failure);
            }
        }
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    /// Record where the form was actually drawn and how far it can scroll.
    pub fn record_scroll(&mut self, rendered_offset: u16, max: u16) {
        self.scroll_max = max;
        self.scroll_rendered = rendered_offset.min(max);
        if let ScrollState::Manual { offset_from_top } = self.scroll
            && offset_from_top > max
        {
            self.scroll = ScrollState::Manual {
                offset_from_top: max,
            };
        }
    }

    /// Offset used by the last draw.
    pub fn rendered_scroll(&self) -> u16 {
        self.scroll_rendered
    }

    /// Requested manual offset, or `None` when the view follows focus.
    pub fn scroll_offset_from_top(&self) -> Option<u16> {
        match self.scroll {
            ScrollState::FollowFocus => None,
            ScrollState::Manual { offset_from_top } => Some(offset_from_top.min(self.scroll_max)),
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = ScrollState::Manual {
            offset_from_top: self.scroll_rendered.saturating_sub(SCROLL_STEP),
        };
    }

    pub fn scroll_down(&mut self) {
        self.scroll = ScrollState::Manual {
            offset_from_top: self
                .scroll_rendered
                .saturating_add(SCROLL_STEP)
                .min(self.scroll_max),
        };
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = ScrollState::Manual { offset_from_top: 0 };
    }
}
