//! Line layout of the registration form.
//!
//! The form is laid out as unwrapped lines so a row index is also a screen
//! row once the scroll offset is subtracted. Both the full-screen and inline
//! views render from the same [`FormView`].

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use signup_engine::{App, Banner, FieldName, Fieldset};

use crate::theme::{Glyphs, Palette, spinner_frame, styles};

pub const LOOKUP_IN_PROGRESS: &str = "Looking up zip code...";
pub const SUBMIT_LABEL: &str = "Register";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const TERMS_LABEL: &str = "I accept the terms of use";
const READ_ONLY_HINT: &str = "filled from the zip code";

/// Columns before a field value: indent, focus marker, space.
const VALUE_INDENT: u16 = 4;
const LEGEND_RULE_WIDTH: usize = 32;

#[derive(Debug)]
pub struct FormView {
    pub lines: Vec<Line<'static>>,
    /// First row belonging to the focused field.
    pub focus_top: usize,
    /// Last row belonging to the focused field.
    pub focus_bottom: usize,
    /// Row and column of the text cursor inside the focused input.
    pub cursor: Option<(usize, u16)>,
}

#[must_use]
pub fn build(app: &App, palette: &Palette, glyphs: &Glyphs) -> FormView {
    let mut view = FormView {
        lines: Vec::new(),
        focus_top: 0,
        focus_bottom: 0,
        cursor: None,
    };

    if let Some(banner) = app.banner() {
        view.lines.push(banner_line(banner, palette, glyphs));
        view.lines.push(Line::default());
    }

    for fieldset in Fieldset::ALL {
        view.lines.push(legend_line(fieldset, palette, glyphs));
        for field in FieldName::ALL
            .into_iter()
            .filter(|field| field.fieldset() == fieldset)
        {
            let top = view.lines.len();
            push_field(&mut view, app, field, palette, glyphs);
            if field == app.focus() {
                view.focus_top = top;
                view.focus_bottom = view.lines.len().saturating_sub(1);
            }
            view.lines.push(Line::default());
        }
    }

    view.lines.push(button_line(app, palette));
    if app.focus() == FieldName::Terms {
        // Enter on the checkbox submits, so keep the button in view with it.
        view.focus_bottom = view.lines.len() - 1;
    }
    view
}

fn banner_line(banner: Banner, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let (glyph, color) = match banner {
        Banner::Success => (glyphs.success, palette.success),
        Banner::Failure => (glyphs.failure, palette.warning),
    };
    Line::from(Span::styled(
        format!(" {glyph} {}", banner.text()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn legend_line(fieldset: Fieldset, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let legend = fieldset.legend();
    let tail = LEGEND_RULE_WIDTH.saturating_sub(legend.width() + 4);
    Line::from(vec![
        Span::styled(glyphs.rule.repeat(2), styles::placeholder(palette)),
        Span::styled(format!(" {legend} "), styles::legend(palette)),
        Span::styled(glyphs.rule.repeat(tail), styles::placeholder(palette)),
    ])
}

fn push_field(view: &mut FormView, app: &App, field: FieldName, palette: &Palette, glyphs: &Glyphs) {
    let focused = app.focus() == field;
    let marker = if focused { glyphs.selected } else { " " };

    if field.is_checkbox() {
        let checkbox = if app.values().terms {
            glyphs.checkbox_on
        } else {
            glyphs.checkbox_off
        };
        let label_style = if focused {
            styles::label_focused(palette)
        } else {
            styles::label(palette)
        };
        view.lines.push(Line::from(vec![
            Span::styled(format!("  {marker} "), styles::label_focused(palette)),
            Span::styled(format!("{checkbox} {TERMS_LABEL}"), label_style),
            Span::styled(" *", styles::required_marker(palette)),
        ]));
    } else {
        view.lines.push(label_line(field, focused, palette));

        let text = app.values().text(field).unwrap_or_default();
        let (shown, style) = display_value(app, field, text, focused, palette, glyphs);
        if focused {
            let column = VALUE_INDENT.saturating_add(cursor_column(app, field, text));
            view.cursor = Some((view.lines.len(), column));
        }
        view.lines.push(Line::from(vec![
            Span::styled(format!("  {marker} "), styles::label_focused(palette)),
            Span::styled(shown, style),
        ]));

        if field == FieldName::Zipcode && app.is_loading_zipcode() {
            let spinner = spinner_frame(app.tick_count(), app.ui_options());
            view.lines.push(Line::from(Span::styled(
                format!("    {spinner} {LOOKUP_IN_PROGRESS}"),
                Style::default().fg(palette.accent),
            )));
        }
    }

    if let Some(message) = app.error(field) {
        view.lines.push(Line::from(Span::styled(
            format!("    {} {message}", glyphs.error),
            styles::field_error(palette),
        )));
    }
}

fn label_line(field: FieldName, focused: bool, palette: &Palette) -> Line<'static> {
    let style = if focused {
        styles::label_focused(palette)
    } else {
        styles::label(palette)
    };
    let mut spans = vec![Span::styled(format!("    {}", field.label()), style)];
    if field.is_required() {
        spans.push(Span::styled(" *", styles::required_marker(palette)));
    }
    Line::from(spans)
}

fn display_value(
    app: &App,
    field: FieldName,
    text: &str,
    focused: bool,
    palette: &Palette,
    glyphs: &Glyphs,
) -> (String, Style) {
    let value_style = if focused {
        styles::value_focused(palette)
    } else {
        styles::value(palette)
    };

    if text.is_empty() {
        let hint = if field.is_read_only() {
            Some(READ_ONLY_HINT)
        } else {
            field.placeholder()
        };
        return match hint {
            Some(hint) => (hint.to_string(), styles::placeholder(palette)),
            None => (" ".to_string(), value_style),
        };
    }

    if field.is_secret() && !app.is_revealed(field) {
        return (glyphs.secret.repeat(text.chars().count()), value_style);
    }
    if field.is_read_only() {
        return (text.to_string(), styles::placeholder(palette).fg(palette.text_secondary));
    }
    (text.to_string(), value_style)
}

/// Display column of the cursor relative to the start of the value.
fn cursor_column(app: &App, field: FieldName, text: &str) -> u16 {
    let cursor = app.cursor();
    let width: usize = if field.is_secret() && !app.is_revealed(field) {
        text.graphemes(true).take(cursor).map(|g| g.chars().count()).sum()
    } else {
        text.graphemes(true).take(cursor).map(UnicodeWidthStr::width).sum()
    };
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn button_line(app: &App, palette: &Palette) -> Line<'static> {
    let (label, style) = if app.is_submitting() {
        (SUBMITTING_LABEL, styles::button_busy(palette))
    } else {
        (SUBMIT_LABEL, styles::button(palette))
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!(" {label} "), style),
    ])
}
