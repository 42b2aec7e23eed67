//! Message text → ratatui `Text` renderer.
//!
//! Plain runs are passed through line by line, blank lines included. Fenced code blocks get a
//! bordered frame with the language tag in the top edge, and syntect
//! highlighting when the tag names a known syntax.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::core::fence::{Segment, segments};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

/// Renders message text using the given color for plain runs.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut text = Text::default();
    let plain = Style::default().fg(base_fg);

    let segments = segments(content);
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            Segment::Plain(run) => {
                // A fence sits on its own rows, so the break touching it is not a blank line
                let mut run = run;
                if i > 0 {
                    run = run.strip_prefix('\n').unwrap_or(run);
                }
                if i + 1 < segments.len() {
                    run = run.strip_suffix('\n').unwrap_or(run);
                }
                if run.is_empty() {
                    continue;
                }
                for line in run.split('\n') {
                    text.lines
                        .push(Line::from(Span::styled(expand_tabs(line), plain)));
                }
            }
            Segment::Code { lang, code } => {
                text.lines.extend(code_block(lang, code));
            }
        }
    }

    text
}

fn expand_tabs(s: &str) -> String {
    // ratatui renders \t as zero-width
    s.replace('\t', "    ")
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let token = match lang.to_ascii_lowercase().as_str() {
        "shell" | "bash" | "zsh" => "sh".to_string(),
        // No TypeScript grammar ships with the defaults
        "typescript" | "ts" | "tsx" => "js".to_string(),
        other => other.to_string(),
    };
    SYNTAX_SET.find_syntax_by_token(&token)
}

/// Top border, `│ `-prefixed body lines, bottom border.
fn code_block(lang: Option<&str>, code: &str) -> Vec<Line<'static>> {
    let bs = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    lines.push(match lang {
        Some(lang) => Line::from(vec![
            Span::styled("╭── ", bs),
            Span::styled(lang.to_owned(), bs.add_modifier(Modifier::BOLD)),
            Span::styled(" ──", bs),
        ]),
        None => Line::from(Span::styled("╭──", bs)),
    });

    let mut highlighter = lang
        .and_then(find_syntax)
        .and_then(|syn| THEME_SET.themes.get(THEME).map(|t| HighlightLines::new(syn, t)));

    for raw in LinesWithEndings::from(code) {
        let mut spans = vec![Span::styled("│ ", bs)];
        match highlighter.as_mut() {
            Some(hl) => match hl.highlight_line(raw, &SYNTAX_SET) {
                Ok(ranges) => {
                    spans.extend(ranges.into_iter().filter_map(|(hl_style, frag)| {
                        let content = expand_tabs(frag.trim_end_matches(['\n', '\r']));
                        if content.is_empty() {
                            return None;
                        }
                        let fg = Color::Rgb(
                            hl_style.foreground.r,
                            hl_style.foreground.g,
                            hl_style.foreground.b,
                        );
                        Some(Span::styled(content, Style::default().fg(fg)))
                    }));
                }
                Err(e) => {
                    log::debug!("Highlighting failed, falling back to plain: {}", e);
                    spans.push(plain_code(raw));
                }
            },
            None => spans.push(plain_code(raw)),
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled("╰──", bs)));
    lines
}

fn plain_code(raw: &str) -> Span<'static> {
    Span::styled(
        expand_tabs(raw.trim_end_matches(['\n', '\r'])),
        Style::default().fg(Color::White),
    )
}
