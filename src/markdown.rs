use once_cell::sync::Lazy;
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::theme::Theme;

// Fenced blocks are lifted out before any other substitution runs, so their
// contents never go through the inline or header passes.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[A-Za-z0-9_+-]*\n)?(.*?)```").unwrap());

// Bold and inline code in one pass, leftmost match wins.
static INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|`([^`]+)`").unwrap());

/// Best-effort markdown-lite renderer. Handles bold, `##`/`###` headers,
/// inline code, fenced code blocks and line breaks; anything else passes
/// through verbatim. Unclosed or nested constructs are not guaranteed to
/// render correctly.
pub fn render(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut cursor = 0;
    let mut after_fence = false;

    for caps in FENCE_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        push_text_chunk(&text[cursor..whole.start()], after_fence, theme, &mut lines);

        let contents = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        for code_line in contents.trim_end_matches('\n').split('\n') {
            lines.push(Line::styled(code_line.to_string(), theme.md_code_block));
        }

        cursor = whole.end();
        after_fence = true;
    }
    push_text_chunk(&text[cursor..], after_fence, theme, &mut lines);

    lines
}

/// Line count of the rendered output, used to clamp overlay scrolling.
pub fn rendered_line_count(text: &str) -> usize {
    render(text, &Theme::default()).len()
}

fn push_text_chunk(chunk: &str, after_fence: bool, theme: &Theme, out: &mut Vec<Line<'static>>) {
    let mut chunk = chunk;
    if after_fence {
        chunk = chunk.strip_prefix('\n').unwrap_or(chunk);
    }
    // The fence (or the end of input) already breaks the line.
    chunk = chunk.strip_suffix('\n').unwrap_or(chunk);
    if chunk.is_empty() {
        return;
    }

    for raw in chunk.split('\n') {
        if let Some(heading) = raw.strip_prefix("### ") {
            out.push(Line::styled(heading.to_string(), theme.md_heading3));
        } else if let Some(heading) = raw.strip_prefix("## ") {
            out.push(Line::styled(heading.to_string(), theme.md_heading2));
        } else {
            out.push(inline_line(raw, theme));
        }
    }
}

fn inline_line(raw: &str, theme: &Theme) -> Line<'static> {
    let mut spans = vec![];
    let mut last = 0;
    for caps in INLINE_RE.captures_iter(raw) {
        let whole = caps.get(0).unwrap();
        if whole.start() > last {
            spans.push(Span::raw(raw[last..whole.start()].to_string()));
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Span::styled(bold.as_str().to_string(), theme.md_bold));
        } else if let Some(code) = caps.get(2) {
            spans.push(Span::styled(code.as_str().to_string(), theme.md_inline_code));
        }
        last = whole.end();
    }
    if last < raw.len() {
        spans.push(Span::raw(raw[last..].to_string()));
    }
    Line::from(spans)
}
