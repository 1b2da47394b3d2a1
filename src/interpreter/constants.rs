// Constants for the control box logic language

/// Port symbol names, in nibble order of the port masks (down, up, north,
/// south, west, east). The letters are the historical wire colours.
pub const PORT_NAMES: [&str; 6] = ["d", "u", "r", "y", "g", "b"];

/// Number of extended bus (RCA) channels, addressed as `di<N>` / `do<N>`
pub const RCA_CHANNELS: usize = 16;

/// Boolean true as produced by comparisons and logical operators
pub const SIGNAL_TRUE: i32 = 15;

/// Boolean false
pub const SIGNAL_FALSE: i32 = 0;

/// Upper bound of a redstone signal nibble
pub const NIBBLE_MAX: i32 = 15;

/// Value `.deadline` is reset to at the start of every tick
pub const DEFAULT_DEADLINE: i32 = 40;

/// Symbol suffixes a referenced name may carry
pub const ALLOWED_SUFFIXES: [&str; 8] = ["", ".re", ".fe", ".co", ".co.re", ".co.fe", ".pt", ".et"];

/// Suffixes that mark a port as an input when referenced
pub const PORT_INPUT_SUFFIXES: [&str; 6] = ["", ".re", ".fe", ".co", ".co.re", ".co.fe"];

/// Control symbols written by the embedding device
pub const CLOCK_SYMBOL: &str = ".clock";
pub const TIME_SYMBOL: &str = ".time";
pub const DEADLINE_SYMBOL: &str = ".deadline";

/// Returns the nibble index of a port name, if `name` is one
pub fn port_index(name: &str) -> Option<usize> {
    PORT_NAMES.iter().position(|p| *p == name)
}

/// Clamp that tolerates `lo > hi` (checks `lo` first), unlike `i32::clamp`
pub fn clamp(x: i32, lo: i32, hi: i32) -> i32 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Maps a truth value onto the signal levels
pub fn signal(b: bool) -> i32 {
    if b {
        SIGNAL_TRUE
    } else {
        SIGNAL_FALSE
    }
}
