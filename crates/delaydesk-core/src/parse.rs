// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient integer parsing for values that arrive as free-form text.

/// Reads the leading integer of `input`, ignoring surrounding whitespace.
///
/// An optional sign followed by at least one digit is required; anything
/// after the digits is ignored, so `"15 min"` reads as 15. Returns `None`
/// when no digits lead the string or the value overflows `i64`.
pub fn leading_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first().copied() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
