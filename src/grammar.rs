//! Tokenizer for the parameter list of a `Digest` credentials header.
//!
//! The grammar is deliberately small: `name=value` pairs separated by commas,
//! where a value is either bare or wrapped in double quotes. Inside quotes a
//! backslash escapes the next character (an RFC 7230 quoted-pair). A comma
//! only separates pairs when it is followed by a balanced number of quotes,
//! so quoted values may contain commas. Pairs that do not fit the shape are
//! dropped instead of failing the whole header.

use std::collections::HashMap;

/// Parse the part of an `Authorization` header that follows the `Digest`
/// scheme token into a parameter map. Later duplicates overwrite earlier ones.
pub fn parse_digest_params(input: &str) -> HashMap<String, String> {
    let mut parsed = HashMap::new();

    for token in split_params(input) {
        if let Some((name, value)) = parse_pair(token) {
            parsed.insert(name.to_string(), value);
        }
    }

    parsed
}

/// Byte offsets of the quote characters that open or close a quoted value.
/// Escaped quotes inside a value are skipped.
fn quote_positions(input: &str) -> Vec<usize> {
    let mut positions = vec![];
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => {
                in_quotes = !in_quotes;
                positions.push(idx);
            }
            _ => {}
        }
    }

    positions
}

/// Split on commas that sit outside quoted values.
fn split_params(input: &str) -> Vec<&str> {
    let quotes = quote_positions(input);
    let mut start = 0;
    let mut tokens = vec![];

    for (idx, c) in input.char_indices() {
        // only a separator if the rest of the input has balanced quotes
        if c == ',' && quotes.iter().filter(|&&q| q > idx).count() % 2 == 0 {
            tokens.push(&input[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    tokens.push(&input[start..]);

    tokens
}

/// Match a single `name=value` or `name="value"` token.
fn parse_pair(token: &str) -> Option<(&str, String)> {
    let (name, value) = token.trim().split_once('=')?;

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let value = match value.strip_prefix('"') {
        Some(quoted) => unquote(quoted)?,
        None if value.contains('"') => return None,
        None => value.to_string(),
    };

    if value.is_empty() {
        return None;
    }

    Some((name, value))
}

/// Undo quoted-pair escaping. `quoted` is everything after the opening
/// quote and has to end with the only unescaped closing quote.
fn unquote(quoted: &str) -> Option<String> {
    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next()?),
            '"' => return chars.next().is_none().then_some(value),
            c => value.push(c),
        }
    }

    // no closing quote
    None
}
