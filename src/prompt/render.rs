//! Shared rendering for interactive prompts

use colored::Colorize;
use inquire::ui::{Color, IndexPrefix, RenderConfig, StyleSheet, Styled};

/// Standard render config for provisioning prompts
pub fn prompt_render_config() -> RenderConfig<'static> {
    RenderConfig::default()
        .with_highlighted_option_prefix(Styled::new("▸ ").with_fg(Color::LightCyan))
        .with_option_index_prefix(IndexPrefix::Simple)
        .with_selected_option(Some(StyleSheet::new().with_fg(Color::LightCyan)))
        .with_scroll_up_prefix(Styled::new("▲ "))
        .with_scroll_down_prefix(Styled::new("▼ "))
}

/// Boxed header shown when the pipeline enters a stage
pub fn display_stage_header(stage_number: usize, stage_name: &str, description: &str) {
    let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);
    let box_width = term_width.clamp(24, 70);
    let inner_width = box_width - 4;

    println!();
    let header = format!("─ {} · {} ", stage_number, stage_name);
    println!(
        "{}{}{}",
        "┌".bright_cyan(),
        header.bright_cyan(),
        "─".repeat(inner_width.saturating_sub(header.chars().count())).bright_cyan()
    );

    if !description.is_empty() {
        for line in textwrap::wrap(description, inner_width - 2) {
            println!("{}  {}", "│".dimmed(), line.white());
        }
    }

    println!("{}{}", "└".dimmed(), "─".repeat(box_width - 1).dimmed());
}

/// One line summary of a value picked without asking
pub fn display_auto_selected(label: &str, choice: &str) {
    println!("  {} {}: {}", "✓".green(), label.dimmed(), choice.cyan());
}
