//! Main TUI application state and logic

use crate::device::ControlBox;
use crate::interpreter::constants::{NIBBLE_MAX, PORT_NAMES};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::info;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Ports,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> ports -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Ports,
            FocusedPane::Ports => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The simulated device running the program
    pub device: ControlBox,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub memory_scroll: usize,

    /// Port whose input level the arrow keys adjust
    pub selected_port: usize,

    /// Whether the memory pane lists control and edge symbols too
    pub show_all_symbols: bool,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Game tick period while playing
    pub play_interval: Duration,

    /// Last time a game tick was taken in play mode
    pub last_play_time: Instant,
}

impl App {
    pub fn new(device: ControlBox, play_interval: Duration) -> Self {
        let status_message = if device.logic().valid() {
            String::from("Ready!")
        } else {
            format!("{} line(s) not executable", device.logic().errors().len())
        };
        App {
            device,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            memory_scroll: 0,
            selected_port: 0,
            show_all_symbols: false,
            should_quit: false,
            status_message,
            is_playing: false,
            play_interval,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= self.play_interval {
                self.device.step();
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            let timeout = self.play_interval.min(Duration::from_millis(50));
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Program on the left, device state on the right
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(columns[1]);

        super::panes::render_source_pane(
            frame,
            columns[0],
            self.device.logic(),
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_ports_pane(
            frame,
            right_rows[0],
            &self.device,
            self.selected_port,
            self.focused_pane == FocusedPane::Ports,
        );

        super::panes::render_memory_pane(
            frame,
            right_rows[1],
            self.device.logic().symbols(),
            self.show_all_symbols,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            &self.device,
            self.is_playing,
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Right => {
                self.is_playing = false;
                let ran = self.device.step();
                self.status_message = if ran {
                    "Game tick, logic ran".to_string()
                } else {
                    "Game tick".to_string()
                };
            }
            // Number keys advance N game ticks directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = u64::from(c as u8 - b'0');
                let runs = self.device.advance(n);
                self.status_message = format!("Advanced {} tick(s), {} run(s)", n, runs);
            }
            KeyCode::Char('n') => {
                self.is_playing = false;
                let mut ticks = 1;
                while !self.device.step() {
                    ticks += 1;
                }
                self.status_message = format!("Logic ran after {} tick(s)", ticks);
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                self.last_play_time = Instant::now();
                self.status_message = if self.is_playing {
                    "Playing...".to_string()
                } else {
                    "Paused".to_string()
                };
            }
            KeyCode::Char('e') => {
                let enabled = !self.device.enabled();
                self.device.set_enabled(enabled);
                info!(enabled, "device power toggled");
                self.status_message = if enabled {
                    "Device enabled".to_string()
                } else {
                    "Device disabled, memory cleared".to_string()
                };
            }
            KeyCode::Char('h') => {
                self.show_all_symbols = !self.show_all_symbols;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_input(1),
            KeyCode::Char('-') => self.adjust_input(-1),
            KeyCode::Enter => {
                let level = if self.device.input(self.selected_port) > 0 {
                    0
                } else {
                    NIBBLE_MAX
                };
                self.set_input(level);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_sub(1);
                }
                FocusedPane::Ports => {
                    self.selected_port = self.selected_port.saturating_sub(1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_add(1);
                }
                FocusedPane::Ports => {
                    self.selected_port = (self.selected_port + 1).min(PORT_NAMES.len() - 1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_add(1);
                }
            },
            _ => {}
        }
    }

    fn adjust_input(&mut self, delta: i32) {
        let level = (self.device.input(self.selected_port) + delta).clamp(0, NIBBLE_MAX);
        self.set_input(level);
    }

    fn set_input(&mut self, level: i32) {
        self.device.set_input(self.selected_port, level);
        self.status_message = format!("Input {} = {}", PORT_NAMES[self.selected_port], level);
    }
}
