//! TUI rendering for Signup using ratatui.

mod form_view;
mod input;
mod theme;
mod ui_inline;

pub use form_view::{
    FormView, LOOKUP_IN_PROGRESS, SUBMIT_LABEL, SUBMITTING_LABEL, TERMS_LABEL, build as build_form,
};
pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};
pub use ui_inline::{INLINE_VIEWPORT_HEIGHT, InlineOutput, draw as draw_inline};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Margin, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Padding, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
};

use signup_engine::{App, FieldName};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Form
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    draw_form(frame, app, chunks[0], &palette, &glyphs);
    draw_key_hints(frame, app, chunks[1], &palette, &glyphs);
}

fn draw_form(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.text_muted))
        .title(Span::styled(" Sign up ", styles::legend(palette)))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);

    let view = form_view::build(app, palette, glyphs);
    let offset = render_scrolled(frame, app, &view, inner);
    frame.render_widget(block, area);

    let total = u16::try_from(view.lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    if max_scroll > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .track_symbol(Some(glyphs.track))
            .thumb_symbol(glyphs.thumb)
            .style(Style::default().fg(palette.text_muted));

        // content_length = scrollable range, so the thumb reaches the bottom at max_scroll
        let mut state = ScrollbarState::new(usize::from(max_scroll)).position(usize::from(offset));
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

/// Render `view` into `area` at the current scroll offset and place the
/// terminal cursor. Returns the offset used.
pub(crate) fn render_scrolled(
    frame: &mut Frame,
    app: &mut App,
    view: &FormView,
    area: Rect,
) -> u16 {
    let total = u16::try_from(view.lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(area.height);

    let offset = match app.scroll_offset_from_top() {
        Some(offset) => offset.min(max_scroll),
        None => follow_focus(
            app.rendered_scroll(),
            view.focus_top,
            view.focus_bottom,
            area.height,
        )
        .min(max_scroll),
    };
    app.record_scroll(offset, max_scroll);

    let paragraph = Paragraph::new(view.lines.clone()).scroll((offset, 0));
    frame.render_widget(paragraph, area);

    if let Some((row, col)) = view.cursor {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        if row >= offset && row - offset < area.height && col < area.width {
            frame.set_cursor_position(Position::new(area.x + col, area.y + (row - offset)));
        }
    }
    offset
}

/// Smallest scroll change that keeps the focused field's rows visible.
fn follow_focus(current: u16, top: usize, bottom: usize, visible: u16) -> u16 {
    let top = u16::try_from(top).unwrap_or(u16::MAX);
    let bottom = u16::try_from(bottom).unwrap_or(u16::MAX);
    if visible == 0 || top < current {
        return top;
    }
    let last_visible = current.saturating_add(visible - 1);
    if bottom > last_visible {
        // Tall fields keep their label on screen.
        return bottom.saturating_add(1).saturating_sub(visible).min(top);
    }
    current
}

pub(crate) fn key_hints(app: &App, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let mut hints: Vec<(&str, &str)> = vec![("Tab", "next"), ("S-Tab", "prev")];
    match app.focus() {
        FieldName::Terms => {
            hints.push(("Space", "toggle"));
            hints.push(("Enter", "register"));
        }
        field if field.is_secret() => {
            hints.push(("^R", "reveal"));
            hints.push(("^S", "register"));
        }
        _ => hints.push(("^S", "register")),
    }
    hints.push(("Esc", "quit"));

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in hints.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(glyphs.separator, styles::key_hint(palette)));
        }
        spans.push(Span::styled(key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }
    Line::from(spans)
}

fn draw_key_hints(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    frame.render_widget(Paragraph::new(key_hints(app, palette, glyphs)), area);
}
