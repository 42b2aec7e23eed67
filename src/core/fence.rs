//! # Code Fences
//!
//! Splits message text into plain runs and fenced code blocks for display.
//! Only the single triple-backtick form is recognized: an optional language
//! tag, a newline, the body, and a closing fence. Anything else (including an
//! unclosed fence) stays plain text.

use regex::Regex;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)```").expect("fence pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Code { lang: Option<&'a str>, code: &'a str },
}

/// Segments `text` in order. Code bodies are trimmed; plain runs are left
/// untouched and empty runs are skipped.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in FENCE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            out.push(Segment::Plain(&text[last..whole.start()]));
        }
        out.push(Segment::Code {
            lang: caps.get(1).map(|m| m.as_str()),
            code: caps.get(2).map_or("", |m| m.as_str().trim()),
        });
        last = whole.end();
    }

    if last < text.len() {
        out.push(Segment::Plain(&text[last..]));
    }
    out
}
