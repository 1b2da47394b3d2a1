//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: program text with highlighting, last results and error markers
//! - [`ports`]: port directions and levels, plus bus channels in use
//! - [`memory`]: symbol table of the running program
//! - [`status`]: status bar with keybindings and device state
//!
//! Each pane module exports a primary `render_*` function that draws from
//! borrowed device state; panes keep no state of their own besides scroll
//! offsets owned by the app.

pub mod memory;
pub mod ports;
pub mod source;
pub mod status;

pub use memory::render_memory_pane;
pub use ports::render_ports_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
