//! Port and bus pane rendering
//!
//! One row per port with its direction, the level present at the port and
//! the level the device drives. Bus channels used by the program follow
//! below the ports.

use crate::device::ControlBox;
use crate::interpreter::constants::{PORT_NAMES, RCA_CHANNELS};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

/// Direction labels, in port order
const PORT_LABELS: [&str; 6] = ["down", "up", "north", "south", "west", "east"];

fn level_cell(level: i32) -> Cell<'static> {
    let color = if level > 0 {
        DEFAULT_THEME.signal_on
    } else {
        DEFAULT_THEME.signal_off
    };
    Cell::from(Span::styled(
        format!("{:>2} {}", level, "▮".repeat(level.clamp(0, 15) as usize)),
        Style::default().fg(color),
    ))
}

fn nibble(data: u64, index: usize) -> i32 {
    ((data >> (4 * index)) & 0xf) as i32
}

/// Render the port pane
pub fn render_ports_pane(
    frame: &mut Frame,
    area: Rect,
    device: &ControlBox,
    selected_port: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Ports ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let logic = device.logic();
    let mut rows: Vec<Row> = PORT_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mask = 0xf_u32 << (4 * i);
            let (direction, dir_color) = if logic.port_output_mask() & mask != 0 {
                ("out", DEFAULT_THEME.secondary)
            } else if logic.port_input_mask() & mask != 0 {
                ("in", DEFAULT_THEME.primary)
            } else {
                ("-", DEFAULT_THEME.comment)
            };
            let mut row = Row::new(vec![
                Cell::from(Span::styled(
                    name.to_string(),
                    Style::default()
                        .fg(DEFAULT_THEME.function)
                        .add_modifier(Modifier::BOLD),
                )),
                Cell::from(Span::styled(PORT_LABELS[i], Style::default().fg(DEFAULT_THEME.comment))),
                Cell::from(Span::styled(direction, Style::default().fg(dir_color))),
                level_cell(device.input(i)),
                level_cell(device.output(i)),
            ]);
            if i == selected_port {
                row = row.style(Style::default().bg(DEFAULT_THEME.current_line_bg));
            }
            row
        })
        .collect();

    for channel in 0..RCA_CHANNELS {
        let mask = 0xf_u64 << (4 * channel);
        if logic.rca_input_mask() & mask != 0 {
            rows.push(Row::new(vec![
                Cell::from(format!("di{}", channel)),
                Cell::from(Span::styled("bus", Style::default().fg(DEFAULT_THEME.comment))),
                Cell::from(Span::styled("in", Style::default().fg(DEFAULT_THEME.primary))),
                level_cell(nibble(logic.rca_input_data, channel)),
                Cell::from(""),
            ]));
        }
        if logic.rca_output_mask() & mask != 0 {
            rows.push(Row::new(vec![
                Cell::from(format!("do{}", channel)),
                Cell::from(Span::styled("bus", Style::default().fg(DEFAULT_THEME.comment))),
                Cell::from(Span::styled("out", Style::default().fg(DEFAULT_THEME.secondary))),
                Cell::from(""),
                level_cell(nibble(logic.rca_output_data, channel)),
            ]));
        }
    }

    let header = Row::new(vec!["port", "side", "dir", "input", "output"])
        .style(Style::default().fg(Color::Black).bg(DEFAULT_THEME.comment));

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}
