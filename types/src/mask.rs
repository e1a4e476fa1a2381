//! Digit input masks (`(99) 99999-9999` style).
//!
//! A mask is a template where `9` is a digit slot and every other character is
//! a literal. Literals are only emitted once a digit follows them, so a value
//! built by typing never ends in a dangling separator and backspace always
//! removes a digit.

/// A digit mask template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMask {
    template: &'static str,
    placeholder: &'static str,
}

const SLOT: char = '9';

impl InputMask {
    pub const PHONE: Self = Self::new("(99) 99999-9999", "(__) _____-____");
    pub const CPF: Self = Self::new("999.999.999-99", "___.___.___-__");
    pub const ZIPCODE: Self = Self::new("99999-999", "_____-___");

    #[must_use]
    pub const fn new(template: &'static str, placeholder: &'static str) -> Self {
        Self {
            template,
            placeholder,
        }
    }

    #[must_use]
    pub const fn template(self) -> &'static str {
        self.template
    }

    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        self.placeholder
    }

    /// Number of digit slots in the template.
    #[must_use]
    pub fn capacity(self) -> usize {
        self.template.chars().filter(|c| *c == SLOT).count()
    }

    /// Reformat `raw` through this mask. See [`apply_mask`].
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        apply_mask(self.template, raw)
    }

    /// Remove the last digit of a masked value and reformat.
    #[must_use]
    pub fn pop_digit(self, masked: &str) -> String {
        let mut digits: String = masked.chars().filter(char::is_ascii_digit).collect();
        digits.pop();
        self.apply(&digits)
    }
}

/// Format the digits of `raw` into `template`.
///
/// Non-digit characters in `raw` are ignored; digits past the template's
/// capacity are dropped.
#[must_use]
pub fn apply_mask(template: &str, raw: &str) -> String {
    let mut digits = raw.chars().filter(char::is_ascii_digit).peekable();
    let mut out = String::with_capacity(template.len());

    for slot in template.chars() {
        if digits.peek().is_none() {
            break;
        }
        if slot == SLOT {
            if let Some(digit) = digits.next() {
                out.push(digit);
            }
        } else {
            out.push(slot);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{InputMask, apply_mask};

    #[test]
    fn full_phone_number() {
        assert_eq!(InputMask::PHONE.apply("11987654321"), "(11) 98765-4321");
    }

    #[test]
    fn partial_input_stops_before_trailing_literal() {
        assert_eq!(InputMask::PHONE.apply("11"), "(11");
        assert_eq!(InputMask::PHONE.apply("119"), "(11) 9");
        assert_eq!(InputMask::ZIPCODE.apply("01310"), "01310");
        assert_eq!(InputMask::ZIPCODE.apply("013101"), "01310-1");
    }

    #[test]
    fn non_digits_ignored_and_overflow_dropped() {
        assert_eq!(InputMask::CPF.apply("123a456b789c0099"), "123.456.789-00");
        assert_eq!(apply_mask("99-9", "x"), "");
    }

    #[test]
    fn remasking_is_stable() {
        let once = InputMask::CPF.apply("12345678900");
        assert_eq!(InputMask::CPF.apply(&once), once);
    }

    #[test]
    fn pop_digit_removes_separator_with_digit() {
        assert_eq!(InputMask::ZIPCODE.pop_digit("01310-1"), "01310");
        assert_eq!(InputMask::PHONE.pop_digit("(1"), "");
        assert_eq!(InputMask::PHONE.pop_digit(""), "");
    }

    #[test]
    fn capacity_counts_slots() {
        assert_eq!(InputMask::PHONE.capacity(), 11);
        assert_eq!(InputMask::CPF.capacity(), 11);
        assert_eq!(InputMask::ZIPCODE.capacity(), 8);
    }
}
