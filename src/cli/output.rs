//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, commands, keys, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use console::{style, StyledObject};
use std::fmt::Display;

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn styled<D>(value: D) -> StyledObject<D> {
    let styled = style(value);
    if colors_enabled() {
        styled
    } else {
        styled.force_styling(false)
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ invited bob@example.com`
pub fn success(msg: &str) {
    println!("{} {}", styled("✓").green(), msg);
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    eprintln!("{} {}", styled("✗").red(), msg);
}

/// Print a warning message to stderr (yellow).
pub fn warn(msg: &str) {
    eprintln!("{} {}", styled("⚠").yellow(), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run: lockbox team reissue bob@example.com`
pub fn hint(msg: &str) {
    eprintln!("{} {}", styled("→").cyan(), styled(msg).cyan());
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", styled(title).bold());
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  public key:  age1...`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", styled(label).dim(), styled(value.to_string()).bold());
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a horizontal rule separator.
pub fn rule() {
    println!("{}", styled("─".repeat(RULE_WIDTH)).dim());
}

/// Format a command string in green.
pub fn cmd(c: &str) -> String {
    styled(c).green().to_string()
}

/// Format a key, path or email in cyan.
pub fn key(k: &str) -> String {
    styled(k).cyan().to_string()
}

/// Print raw data to stdout, unstyled, for piping.
pub fn data(text: &str) {
    println!("{}", text);
}

pub fn blank() {
    println!();
}

/// Format a count in bold.
pub fn count(n: usize) -> String {
    styled(n).bold().to_string()
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", styled(msg).dim());
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Mask a secret for display, keeping a short prefix when it is long
/// enough not to give much away.
pub fn mask(value: &str) -> String {
    let count = value.chars().count();
    if count < 12 {
        return "••••••••".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{}••••••••", prefix)
}
