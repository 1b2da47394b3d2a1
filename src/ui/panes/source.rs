//! Program pane rendering with syntax highlighting
//!
//! Shows the program text with line numbers. Valid lines carry the result of
//! their last evaluation on the right, lines that failed to parse are marked
//! in the error colour together with the error key and the column it was
//! raised at.

use crate::interpreter::engine::Logic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustc_hash::FxHashMap;

/// Per-line note shown after the source text
enum Annotation {
    Result(i32),
    Error { key: String, column: usize },
}

/// Simple syntax highlighting for one program line
fn highlight_line(line: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            push_word(&mut spans, &line[start..i], Some(c));
        }
        if c == '#' {
            spans.push(Span::styled(
                &line[i..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            return spans;
        }
        let style = match c {
            '(' | ')' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(&line[i..i + c.len_utf8()], style));
    }

    if let Some(start) = word_start {
        push_word(&mut spans, &line[start..], None);
    }
    spans
}

fn push_word<'a>(spans: &mut Vec<Span<'a>>, word: &'a str, next: Option<char>) {
    spans.push(Span::styled(word, word_style(word, next == Some('('))));
}

fn word_style(word: &str, is_function: bool) -> Style {
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        return Style::default().fg(DEFAULT_THEME.number);
    }
    match word.to_ascii_lowercase().as_str() {
        "and" | "or" | "xor" | "not" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

fn annotations(logic: &Logic) -> FxHashMap<usize, Annotation> {
    let program = logic.program();
    let mut notes = FxHashMap::default();
    for entry in &program.entries {
        notes.insert(entry.line_index, Annotation::Result(entry.last_result));
    }
    for invalid in &program.invalid_entries {
        notes.insert(
            invalid.line_index,
            Annotation::Error {
                key: invalid.kind().to_string(),
                column: invalid.error.offset + 1,
            },
        );
    }
    notes
}

/// Render the program pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    logic: &Logic,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = if logic.valid() {
        Span::raw(" Program ")
    } else {
        Span::styled(
            format!(" Program ({} errors) ", logic.errors().len()),
            Style::default().fg(DEFAULT_THEME.error),
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = logic.code().lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    if total_lines > visible_height {
        *scroll_offset = (*scroll_offset).min(total_lines - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let notes = annotations(logic);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let note = notes.get(&idx);
            let num_style = match note {
                Some(Annotation::Error { .. }) => Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
                _ => Style::default().fg(DEFAULT_THEME.comment),
            };

            let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
            spans.extend(highlight_line(line));

            match note {
                Some(Annotation::Result(value)) => spans.push(Span::styled(
                    format!("  → {}", value),
                    Style::default().fg(DEFAULT_THEME.success),
                )),
                Some(Annotation::Error { key, column }) => spans.push(Span::styled(
                    format!("  ✗ {} (col {})", key, column),
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                )),
                None => {}
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        highlight_line(line)
            .into_iter()
            .map(|s| s.content.into_owned())
            .collect()
    }

    #[test]
    fn test_highlight_splits_words_and_comment() {
        assert_eq!(
            texts("r = ton1(u.re, 3) # delay"),
            vec!["r", " ", "=", " ", "ton1", "(", "u.re", ",", " ", "3", ")", " ", "# delay"]
        );
    }

    #[test]
    fn test_function_and_keyword_styles() {
        assert_eq!(
            word_style("max", true).fg,
            Some(DEFAULT_THEME.function)
        );
        assert_eq!(word_style("AND", false).fg, Some(DEFAULT_THEME.keyword));
        assert_eq!(word_style("12", false).fg, Some(DEFAULT_THEME.number));
    }
}
