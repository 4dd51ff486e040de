// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! Splits one logical config line into tokens.
//!
//! The rules are the classic rEFIt ones:
//!
//! - Outside quotes, any run of spaces, tabs, `=`, or `,` separates tokens.
//! - A `#` outside quotes starts a comment running to the end of the line.
//! - A `"` toggles quoted mode and is not part of the token.
//! - Outside quotes, `/` in a token is rewritten to `\`, so Unix-style
//!   loader paths work unchanged.
//! - Inside quotes, separators and `#` are ordinary characters.
//! - A quote left open at the end of the line closes implicitly.

use alloc::{string::String, vec::Vec};

/// Characters that split tokens outside quoted regions.
const fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '=' | ',')
}

/// Splits `line` into owned tokens.
///
/// Empty and comment-only lines yield an empty list; callers skip those
/// and keep reading.
#[must_use = "Has no effect if the result is unused"]
pub fn tokenize(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut quoted = false;
    let mut pos = 0;

    loop {
        while !quoted && pos < chars.len() && is_separator(chars[pos]) {
            pos += 1;
        }
        if pos >= chars.len() || chars[pos] == '#' {
            break;
        }

        if chars[pos] == '"' {
            quoted = !quoted;
            pos += 1;
        }

        let mut token = String::new();
        while pos < chars.len()
            && chars[pos] != '"'
            && (quoted || (!is_separator(chars[pos]) && chars[pos] != '#'))
        {
            if chars[pos] == '/' && !quoted {
                token.push('\\');
            } else {
                token.push(chars[pos]);
            }
            pos += 1;
        }

        if pos < chars.len() && chars[pos] == '"' {
            quoted = !quoted;
        }
        let finished = pos >= chars.len() || chars[pos] == '#';
        pos += 1; // consume the terminator
        tokens.push(token);
        if finished {
            break;
        }
    }

    tokens
}
