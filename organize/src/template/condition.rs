//! Condition evaluation over a tag set.
//!
//! Tests are OR-combined. A bare test is true when the tag is present and
//! non-empty. A comparison is false when the tag is absent or empty;
//! otherwise both sides are compared as numbers if both are all-digit
//! strings (any Unicode decimal digits), and as strings if not.
//! Evaluation never prompts.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use super::ast::{Condition, Test};
use crate::models::TagSet;

static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").expect("valid regex"));

impl Condition {
    /// True when any test holds; stops at the first one that does.
    pub fn evaluate(&self, tags: &TagSet) -> bool {
        self.tests.iter().any(|test| test.evaluate(tags))
    }
}

impl Test {
    pub fn evaluate(&self, tags: &TagSet) -> bool {
        let Some(value) = tags.get(&self.tag).filter(|v| !v.is_empty()) else {
            return false;
        };

        match &self.comparison {
            None => true,
            Some(comparison) => comparison.op.holds(compare_values(value, &comparison.value)),
        }
    }
}

/// Numeric ordering when both sides are all digits, lexical otherwise.
pub fn compare_values(left: &str, right: &str) -> Ordering {
    if ALL_DIGITS.is_match(left) && ALL_DIGITS.is_match(right) {
        compare_digits(&to_ascii_digits(left), &to_ascii_digits(right))
    } else {
        left.cmp(right)
    }
}

/// Exact numeric ordering of two ASCII digit strings of any length.
fn compare_digits(left: &str, right: &str) -> Ordering {
    let left = significant(left);
    let right = significant(right);
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

/// Rewrite any decimal digits as ASCII `0-9`.
fn to_ascii_digits(digits: &str) -> String {
    digits
        .chars()
        .filter_map(digit_value)
        .filter_map(|value| char::from_digit(value, 10))
        .collect()
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a decimal digit character.
///
/// Decimal digits come in contiguous runs of ten starting at zero, so
/// the offset from the start of the run gives the value.
fn digit_value(c: char) -> Option<u32> {
    if c.is_ascii_digit() {
        return c.to_digit(10);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

fn significant(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
