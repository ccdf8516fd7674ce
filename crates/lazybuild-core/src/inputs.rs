//! Recognized docker inputs and the helpers used to read and render them.

use std::fmt::Write as _;

use serde::Deserialize;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Names of the inputs that affect how an image would be built.
///
/// Kept in the order they are documented for users. The fingerprint never
/// relies on this order: it always visits the names sorted.
pub const DOCKER_INPUTS: [&str; 6] = [
    "annotations",
    "build-args",
    "build-contexts",
    "target",
    "ulimit",
    "labels",
];

/// Values of the recognized docker inputs. Absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DockerInputs {
    pub annotations: String,
    pub build_args: String,
    pub build_contexts: String,
    pub target: String,
    pub ulimit: String,
    pub labels: String,
}

impl DockerInputs {
    /// Builds the inputs by asking `lookup` for every recognized name.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> String) -> Self {
        let mut inputs = Self::default();
        for name in DOCKER_INPUTS {
            if let Some(slot) = inputs.slot_mut(name) {
                *slot = lookup(name);
            }
        }
        inputs
    }

    /// Returns the value of a recognized input, `None` for any other name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "annotations" => &self.annotations,
            "build-args" => &self.build_args,
            "build-contexts" => &self.build_contexts,
            "target" => &self.target,
            "ulimit" => &self.ulimit,
            "labels" => &self.labels,
            _ => return None,
        };
        Some(value)
    }

    /// Name/value pairs sorted by name, the order they are hashed in.
    pub fn sorted_entries(&self) -> Vec<(&'static str, &str)> {
        let mut names = DOCKER_INPUTS;
        names.sort_unstable();
        names
            .into_iter()
            .map(|name| (name, self.get(name).unwrap_or_default()))
            .collect()
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "annotations" => &mut self.annotations,
            "build-args" => &mut self.build_args,
            "build-contexts" => &mut self.build_contexts,
            "target" => &mut self.target,
            "ulimit" => &mut self.ulimit,
            "labels" => &mut self.labels,
            _ => return None,
        };
        Some(slot)
    }
}

/// Splits a list-valued input on line breaks, then on commas, trimming each
/// item.
///
/// Any Unicode line boundary counts as a break (`\r`, vertical tab, form
/// feed, file/group/record separators, NEL, U+2028 and U+2029 as well as
/// `\n`), with `\r\n` read as one. There is no quoting or escaping: a comma
/// always separates two items.
pub fn split_list(value: &str) -> Vec<String> {
    split_lines(value)
        .flat_map(|line| line.split(','))
        .map(|item| item.trim().to_string())
        .collect()
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Lines of `value` without their terminators. A trailing break does not
/// start an empty line.
fn split_lines(value: &str) -> impl Iterator<Item = &str> {
    let mut rest = value;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, ch)| is_line_break(ch)) {
            Some((at, ch)) => {
                let line = &rest[..at];
                let mut next = at + ch.len_utf8();
                if ch == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

/// Renders `value` as a quoted string literal.
///
/// The rendering is part of the fingerprint layout, so it must stay stable:
/// single quotes unless the value holds a `'` and no `"`, backslash escapes
/// for the quote, `\\`, `\n`, `\r` and `\t`, and hex escapes for any other
/// non-printable character.
pub fn quoted(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => {
                let code = c as u32;
                // Writing to a String cannot fail.
                let _ = if code <= 0xff {
                    write!(out, "\\x{code:02x}")
                } else if code <= 0xffff {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
        }
    }
    out.push(quote);
    out
}

fn is_printable(ch: char) -> bool {
    match get_general_category(ch) {
        GeneralCategory::SpaceSeparator => ch == ' ',
        GeneralCategory::Control
        | GeneralCategory::Format
        | GeneralCategory::Surrogate
        | GeneralCategory::PrivateUse
        | GeneralCategory::Unassigned
        | GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator => false,
        _ => true,
    }
}
