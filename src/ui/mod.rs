//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, input ports
//! - **[`panes`]**: stateless render functions for each visible pane (program,
//!   ports, memory, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`ControlBox`] and call [`App::run`] to start the event loop.
//!
//! [`ControlBox`]: crate::device::ControlBox
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
