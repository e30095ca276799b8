//! Terminal UI utilities

use colored::Colorize;
use console::Term;
use gpuflow_lib::rates::{flow_rate_wei_to_tokens_per_hour, DEFAULT_DECIMALS};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a badge-style status line, green when `ok`
pub fn status_line(label: &str, state: &str, ok: bool) {
    let state = if ok {
        state.green().bold()
    } else {
        state.yellow().bold()
    };
    println!("  {:<12} {}", label, state);
}

/// Create a spinner progress indicator
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prompt for user confirmation
pub fn confirm(prompt: &str, default: bool) -> anyhow::Result<bool> {
    use dialoguer::Confirm;
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Prompt for text input
pub fn input(prompt: &str) -> anyhow::Result<String> {
    use dialoguer::Input;
    Ok(Input::new().with_prompt(prompt).interact_text()?)
}

/// Prompt for text input with default
pub fn input_with_default(prompt: &str, default: &str) -> anyhow::Result<String> {
    use dialoguer::Input;
    Ok(Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?)
}

/// Clear the terminal
pub fn clear() {
    let term = Term::stdout();
    let _ = term.clear_screen();
}

/// Print a separator line
pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Format a wei-per-second rate as tokens per hour
pub fn format_rate(flow_rate: u128, token: &str) -> String {
    format!(
        "{:.4} {}/hr",
        flow_rate_wei_to_tokens_per_hour(flow_rate, DEFAULT_DECIMALS),
        token
    )
}

/// Shorten a long hex string to `0x1234…abcd`
pub fn abbreviate(value: &str) -> String {
    let hex_like = value.starts_with("0x") && value[2..].chars().all(|c| c.is_ascii_hexdigit());
    if !hex_like || value.len() <= 14 {
        return value.to_string();
    }
    format!("{}…{}", &value[..6], &value[value.len() - 4..])
}

/// Print JSON prettily
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviate_keeps_short_and_demo_values() {
        assert_eq!(abbreviate("0xabc"), "0xabc");
        assert_eq!(abbreviate("0xDemoSessionStartHash"), "0xDemoSessionStartHash");
        assert_eq!(
            abbreviate("0x00000000000000000000000000000000000000e1"),
            "0x0000…00e1"
        );
    }

    #[test]
    fn format_rate_shows_hourly_tokens() {
        assert_eq!(format_rate(277_777_777_777_777, "fDAIx"), "1.0000 fDAIx/hr");
    }
}
