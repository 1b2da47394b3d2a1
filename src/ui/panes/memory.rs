//! Memory pane rendering

use crate::memory::Memory;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the memory pane.
///
/// Without `show_all` only user variables and timer values are listed; ports,
/// edges and control symbols are hidden.
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    memory: &Memory,
    show_all: bool,
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

    let title = if show_all { " Memory (all) " } else { " Memory " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let symbols = if show_all {
        memory.sorted()
    } else {
        memory.user_symbols()
    };

    if symbols.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let name_width = symbols.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let total_items = symbols.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1
    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = symbols
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(name, value)| {
            let name_style = if name.starts_with('.') {
                Style::default().fg(DEFAULT_THEME.comment)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<width$}", name, width = name_width), name_style),
                Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(value.to_string(), Style::default().fg(DEFAULT_THEME.number)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
