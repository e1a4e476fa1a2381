//! Scroll state for the form view.

/// Scroll position for the form view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    /// Keep the focused field visible.
    #[default]
    FollowFocus,
    /// Manual scroll offset from the top of the rendered form.
    Manual { offset_from_top: u16 },
}
