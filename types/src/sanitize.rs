//! Sanitization of server-provided text before it reaches the terminal.
//!
//! Registration error messages come from a remote endpoint and are rendered
//! inline under a single form field. They must not carry escape sequences
//! (cursor movement, OSC 52 clipboard writes, hyperlinks) and must fit on one
//! line.

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Strip escape sequences and control characters, then collapse all
/// whitespace runs (including newlines) into single spaces.
///
/// Returns `Cow::Borrowed` when the input is already clean.
#[must_use]
pub fn sanitize_server_text(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim();
    if !needs_rewrite(trimmed) {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if c == ESC {
            skip_sequence(&mut chars);
            continue;
        }
        if c == '\u{009b}' {
            skip_csi(&mut chars);
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

fn needs_rewrite(input: &str) -> bool {
    let mut prev_space = false;
    input.chars().any(|c| {
        let space = c == ' ';
        let bad = (c.is_whitespace() && !space) || c.is_control() || (space && prev_space);
        prev_space = space;
        bad
    })
}

fn skip_sequence<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            skip_csi(chars);
        }
        Some(']' | 'P' | '^' | '_') => {
            chars.next();
            // String sequences end at BEL or ST (ESC \).
            while let Some(c) = chars.next() {
                if c == BEL {
                    break;
                }
                if c == ESC && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

fn skip_csi<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        chars.next();
        if ('\x40'..='\x7e').contains(&c) {
            return;
        }
        if !('\x20'..='\x3f').contains(&c) {
            return;
        }
    }
}
