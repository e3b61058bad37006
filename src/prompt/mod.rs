//! Interactive terminal front end for the option resolver

pub mod render;
pub mod terminal;

pub use render::{display_auto_selected, display_stage_header, prompt_render_config};
pub use terminal::TerminalPrompter;
