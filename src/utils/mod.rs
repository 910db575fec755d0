//! Utility functions and helpers.

pub mod http;

/// Collapse a text into one physical line.
///
/// Line breaks become spaces and runs of spaces shrink to one. Leading and
/// trailing single spaces are kept.
pub fn single_line(text: &str) -> String {
    let replaced = text.replace(['\r', '\n'], " ");
    let mut result = String::with_capacity(replaced.len());
    let mut previous_space = false;
    for ch in replaced.chars() {
        if ch == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        result.push(ch);
    }
    result
}

/// Shorten a text to at most `max_len` characters, cutting at a word boundary.
pub fn shorten(text: &str, max_len: usize, trailing: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    match cut.rfind(' ') {
        Some(idx) => format!("{}{}", &cut[..=idx], trailing),
        None => format!("{cut}{trailing}"),
    }
}
