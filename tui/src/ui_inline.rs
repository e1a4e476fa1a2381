//! Inline TUI mode - minimal viewport for shell integration.

use ratatui::prelude::{Backend, Terminal};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget, Wrap},
};

use signup_engine::{App, Banner, FieldName};

use crate::theme::{glyphs, palette};
use crate::{form_view, key_hints, render_scrolled};

/// Rows of form shown in the inline viewport, plus the hint line.
pub const INLINE_VIEWPORT_HEIGHT: u16 = 14;

/// Tracks which outcome banners have already been written to scrollback.
#[derive(Default)]
pub struct InlineOutput {
    last_serial: u64,
}

impl InlineOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Print any banner raised since the last flush above the viewport.
    pub fn flush<B>(&mut self, terminal: &mut Terminal<B>, app: &App) -> Result<(), B::Error>
    where
        B: Backend,
    {
        let serial = app.form().banner_serial();
        if serial == self.last_serial {
            return Ok(());
        }
        self.last_serial = serial;
        let Some(banner) = app.banner() else {
            return Ok(());
        };

        let lines = outcome_lines(app, banner);
        let width = terminal.size()?.width.max(1);
        let height = wrapped_line_count(&lines, width);

        terminal.insert_before(height, |buf| {
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(buf.area, buf);
        })?;
        Ok(())
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let area = frame.area();
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let view = form_view::build(app, &palette, &glyphs);
    render_scrolled(frame, app, &view, chunks[0]);
    frame.render_widget(Paragraph::new(key_hints(app, &palette, &glyphs)), chunks[1]);
}

fn outcome_lines(app: &App, banner: Banner) -> Vec<Line<'static>> {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let (glyph, color) = match banner {
        Banner::Success => (glyphs.success, palette.success),
        Banner::Failure => (glyphs.failure, palette.warning),
    };
    let mut lines = vec![Line::from(Span::styled(
        format!("{glyph} {}", banner.text()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];

    for field in FieldName::ALL {
        if let Some(message) = app.error(field) {
            lines.push(Line::from(Span::styled(
                format!("  {}: {message}", field.label()),
                Style::default().fg(palette.error),
            )));
        }
    }
    lines
}

fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut total: u16 = 0;

    for line in lines {
        let line_width = line.width();
        let rows = if line_width == 0 {
            1
        } else {
            ((line_width - 1) / width) + 1
        };
        total = total.saturating_add(u16::try_from(rows).unwrap_or(u16::MAX));
    }

    total
}
