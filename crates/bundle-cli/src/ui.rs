//! Terminal output helpers for bundlegen.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const AMBER: Color = Color::Color256(214);
    pub const NEON_GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
}

const BOX_WIDTH: usize = 55;

pub fn error(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA),
        style(msg).fg(colors::MAGENTA)
    );
}

pub fn info(msg: &str) {
    println!(
        "  {} {}",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        msg
    );
}

pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// Formats one report line for a member left out of serialization.
pub fn skipped_member_line(record: &str, member: &str, type_name: &str, reason: &str) -> String {
    format!(
        "{}.{}: {} {} {}",
        record,
        member,
        type_name,
        symbols::DOT,
        reason
    )
}

pub fn skipped_member(record: &str, member: &str, type_name: &str, reason: &str) {
    println!(
        "  {} {}",
        style(symbols::TRIANGLE).fg(colors::AMBER),
        style(skipped_member_line(record, member, type_name, reason)).fg(colors::AMBER)
    );
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    // The template is a literal, so parsing cannot fail in practice.
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}")
        .template("  {spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
}

fn box_header_text(title: &str) -> String {
    let title_padded = format!(" {} ", title);
    let dashes = BOX_WIDTH.saturating_sub(title_padded.chars().count() + 4);
    format!("\u{256D}\u{2500}{}{}\u{256E}", title_padded, "\u{2500}".repeat(dashes))
}

pub fn box_header(title: &str) {
    println!("  {}", style(box_header_text(title)).fg(colors::CYAN).bold());
}

pub fn box_line(content: &str) {
    let width = BOX_WIDTH - 2;
    let padding = width.saturating_sub(content.chars().count());
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::CYAN), // │
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::CYAN)
    );
}

pub fn box_footer() {
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::CYAN), // ╰
        style("\u{2500}".repeat(BOX_WIDTH - 2)).fg(colors::CYAN),
        style("\u{256F}").fg(colors::CYAN) // ╯
    );
}

pub fn timing(label: &str, duration_ms: u128) {
    println!(
        "  {} {} in {}ms",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        label,
        duration_ms
    );
}

/// Header printed before a failed check's diagnostics.
pub fn nope_header() {
    println!();
    println!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        style("Nope.").fg(colors::MAGENTA).bold()
    );
    println!();
}

pub fn looking_good() {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        style("Looking good.").bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_member_line() {
        let line = skipped_member_line("Player", "handle", "std::time::Instant", "no shape matcher accepts this type");
        assert_eq!(
            line,
            "Player.handle: std::time::Instant \u{00B7} no shape matcher accepts this type"
        );
    }

    #[test]
    fn test_box_header_width() {
        let header = box_header_text("bundlegen");
        assert_eq!(header.chars().count(), BOX_WIDTH - 1);
        assert!(header.starts_with("\u{256D}\u{2500} bundlegen "));

        // Titles wider than the box do not underflow.
        let wide = box_header_text(&"x".repeat(80));
        assert!(wide.ends_with("\u{256E}"));
    }
}
