//! Description layout
//!
//! Descriptions keep their own line breaks. Long single-line text is wrapped
//! into a folded block so it reads back unchanged, and text that would not
//! survive as a plain YAML scalar is put in a block as well.

use oas2tosca_common::{Description, TextStyle};

/// Choose a layout for `text`
pub fn describe(text: &str, width: usize) -> Description {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() > 1 {
        return Description {
            style: TextStyle::Literal,
            lines: lines.iter().map(|line| line.trim().to_string()).collect(),
        };
    }

    let wrapped = wrap(text, width);
    let style = if wrapped.len() > 1 || !plain_safe(text) {
        TextStyle::Folded
    } else {
        TextStyle::Plain
    };
    Description {
        style,
        lines: wrapped,
    }
}

/// Greedy word wrap at `width` columns
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut columns = 0;
    for word in text.split_whitespace() {
        let word_columns = word.chars().count();
        if !current.is_empty() && columns + 1 + word_columns > width {
            lines.push(std::mem::take(&mut current));
            columns = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            columns += 1;
        }
        current.push_str(word);
        columns += word_columns;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// True when `text` reads back as the same string from a plain YAML scalar
fn plain_safe(text: &str) -> bool {
    const SENSITIVE: &[char] = &[':', '#', '\'', '"', '`'];
    const INDICATORS: &[char] = &[
        '-', '?', '[', ']', '{', '}', ',', '&', '*', '!', '|', '>', '%', '@',
    ];

    let Some(first) = text.chars().next() else {
        return false;
    };
    if text.contains(SENSITIVE) || INDICATORS.contains(&first) {
        return false;
    }
    if text.trim() != text {
        return false;
    }
    let lowered = text.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
    ) {
        return false;
    }
    // Numbers in any YAML 1.2 form (0x1F, .inf, ...) would change type
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(text),
        Ok(serde_yaml::Value::String(back)) if back == text
    )
}
