//! Terminal rendering of console state

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pilot_core::{ConsoleSnapshot, Notice, NoticeLevel, TakeoverState};
use pilot_types::{ChatMessage, DerivedDisplayState, SandboxFile, SessionState, ToolStatus};
use std::time::Duration;

const RESPONSE_PREVIEW: usize = 400;

pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn notice_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("{} {}", "✓".green(), notice.text),
        NoticeLevel::Info => format!("{} {}", "ℹ".blue(), notice.text),
        NoticeLevel::Error => format!("{} {}", "✗".red(), notice.text.red()),
    }
}

pub fn session(state: &SessionState, takeover: TakeoverState) {
    let status = if state.can_chat() {
        "● active".green()
    } else if state.active {
        "● starting".yellow()
    } else {
        "○ inactive".dimmed()
    };
    println!("{} {}", "Session:".cyan().bold(), status);
    println!("  Tool:     {}", tool_label(state.tool_status()));
    match state.live_stream_url() {
        Some(url) => println!("  Stream:   {}", url.underline()),
        None => println!("  Stream:   {}", "-".dimmed()),
    }
    let control = if takeover.is_loading {
        "switching...".yellow()
    } else if takeover.is_active {
        "you (takeover on)".magenta()
    } else {
        "agent".normal()
    };
    println!("  Control:  {}", control);
}

fn tool_label(status: ToolStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        ToolStatus::Browser => label.green(),
        ToolStatus::Ready => label.cyan(),
        ToolStatus::Loading => label.yellow(),
        ToolStatus::Waiting => label.dimmed(),
    }
}

pub fn message(message: &ChatMessage) {
    let time = message.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S");
    println!("{} {} {}", time.to_string().dimmed(), ">".cyan().bold(), message.message);

    if message.is_pending() {
        println!("         {}", "…".dimmed());
        return;
    }

    let text = truncate(&message.response, RESPONSE_PREVIEW);
    let marker = if message.success { "✓".green() } else { "✗".red() };
    for (i, line) in text.lines().enumerate() {
        if i == 0 {
            println!("         {} {}", marker, line);
        } else {
            println!("           {}", line);
        }
    }
}

pub fn messages(log: &[ChatMessage]) {
    if log.is_empty() {
        println!("  {}", "No messages yet".dimmed());
        return;
    }
    for m in log {
        message(m);
    }
}

pub fn preview(display: &DerivedDisplayState) {
    println!(
        "{} {}/{}  {}",
        "Step".cyan().bold(),
        display.current_step,
        display.total_steps,
        progress_bar(display.current_step, display.total_steps).dimmed()
    );
    if !display.current_command.is_empty() {
        println!("  Command:  {}", display.current_command);
    }
    if !display.current_browser_url.is_empty() {
        println!("  Page:     {}", display.current_browser_url.underline());
    }
    if !display.current_file_path.is_empty() {
        println!("  File:     {}", display.current_file_path);
    }
}

fn progress_bar(step: usize, total: usize) -> String {
    const WIDTH: usize = 20;
    let total = total.max(1);
    let filled = (step.min(total) * WIDTH) / total;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

pub fn files(files: &[SandboxFile]) {
    println!("{}", "Sandbox Files:".cyan().bold());
    if files.is_empty() {
        println!("  {}", "No files".dimmed());
        return;
    }
    for file in files {
        println!(
            "  {:<32} {:>9}  {:<6} {}",
            file.name,
            file.display_size(),
            file.file_type,
            file.path.dimmed()
        );
    }
}

pub fn dashboard(snapshot: &ConsoleSnapshot) {
    session(&snapshot.session, snapshot.takeover);
    println!();
    preview(&snapshot.display);
    if snapshot.sending {
        println!("  {}", "Agent is working...".yellow());
    }
}

pub fn quick_messages(items: &[String]) {
    println!("{}", "Quick commands:".cyan().bold());
    for (i, text) in items.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), text);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("打开网页并搜索", 4), "打开网页…");
    }

    #[test]
    fn progress_bar_is_clamped() {
        assert_eq!(progress_bar(1, 1), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(1, 2), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(5, 0), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn notice_line_keeps_text() {
        colored::control::set_override(false);
        let line = notice_line(&Notice {
            level: NoticeLevel::Error,
            text: "Failed to connect to backend".to_string(),
        });
        assert_eq!(line, "✗ Failed to connect to backend");
    }
}
