//! # Decimal Text Codec
//!
//! Value encoding at the exposure boundary: field values travel as
//! unsigned decimal text. Reads render the value followed by a newline;
//! writes parse leading decimal digits and tolerate at most one
//! trailing whitespace character, rejecting anything else.

use alloc::format;
use alloc::string::String;

use crate::error::{Error, Result};

/// Render a field value as its decimal text representation.
pub fn render(value: u32) -> String {
    format!("{value}\n")
}

/// Parse a decimal field value from user input.
///
/// The input must consist of at least one decimal digit, optionally
/// followed by a single whitespace or terminator character. Any other
/// shape, or a value exceeding 32 bits, is rejected.
pub fn parse(input: &str) -> Result<u32> {
    let bytes = input.as_bytes();
    let mut idx = 0;
    let mut value: u64 = 0;

    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        value = value * 10 + u64::from(bytes[idx] - b'0');
        if value > u64::from(u32::MAX) {
            return Err(Error::InvalidArgument {
                param: "input",
                reason: "value exceeds 32 bits",
            });
        }
        idx += 1;
    }

    if idx == 0 {
        return Err(Error::InvalidArgument {
            param: "input",
            reason: "no leading decimal digits",
        });
    }

    // One trailing terminator is fine; sysfs-style writes end in '\n'.
    if idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }

    if idx != bytes.len() {
        return Err(Error::InvalidArgument {
            param: "input",
            reason: "trailing characters after value",
        });
    }

    Ok(value as u32)
}
