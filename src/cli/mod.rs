pub mod doctor;
pub mod export;
pub mod import;
pub mod list;
pub mod prune;
pub mod search;
pub mod show;
pub mod stats;
pub mod sync;

// ANSI styles for terminal output.
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const CYAN: &str = "\x1b[36m";
pub const YELLOW: &str = "\x1b[33m";
pub const RESET: &str = "\x1b[0m";
