//! Presentation logic shared by the CLI and the studio: render-item grouping,
//! display formatting, title generation, and exports.

pub mod export;
pub mod format;
pub mod render;
pub mod title;
