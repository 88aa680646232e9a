//! Terminal output formatting.

use std::time::Duration;

use colored::{ColoredString, Colorize};
use mdc_core::activity::ActivityLog;
use mdc_core::call::model::{Call, CallPriority, CallStatus};
use mdc_core::crew::model::{Crew, CrewStatus};
use mdc_core::emergency::model::Signal100;
use mdc_core::shift::model::{ShiftSession, ShiftStatistics, ShiftStatus};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Print crews as a table.
pub fn print_crews_table(crews: &[Crew]) {
    if crews.is_empty() {
        println!("{}", "No crews found.".dimmed());
        return;
    }

    let location_width = term_width().saturating_sub(48).clamp(12, 40);
    println!(
        "{} {} {} {}",
        pad_right("ID", 5),
        pad_right("Unit", 14),
        pad_right("Status", 14),
        "Location"
    );
    println!("{}", "─".repeat(35 + location_width));

    for crew in crews {
        let flags = match (crew.panic_active, crew.signal100_active) {
            (true, _) => " PANIC".red().bold(),
            (_, true) => " S100".magenta().bold(),
            _ => "".normal(),
        };
        println!(
            "{} {} {} {}{}",
            pad_right(&crew.id.to_string(), 5),
            pad_right(&truncate_visual(&crew.unit_name, 14), 14),
            crew_status_colored(crew.status, 14),
            truncate_visual(crew.location.as_deref().unwrap_or("-"), location_width),
            flags
        );
    }

    println!();
    println!("{} crew(s) total", crews.len());
}

/// Print calls as a table.
pub fn print_calls_table(calls: &[Call]) {
    if calls.is_empty() {
        println!("{}", "No calls found.".dimmed());
        return;
    }

    let address_width = term_width().saturating_sub(52).clamp(16, 48);
    println!(
        "{} {} {} {} {} {}",
        pad_right("ID", 8),
        pad_right("Time", 6),
        pad_right("Pri", 4),
        pad_right("Status", 11),
        pad_right("Unit", 10),
        "Address"
    );
    println!("{}", "─".repeat(42 + address_width));

    for call in calls {
        println!(
            "{} {} {} {} {} {}",
            pad_right(&call.id, 8),
            pad_right(&call.time, 6),
            priority_indicator(call.priority),
            pad_colored(call_status_colored(call.status), call.status.as_str(), 11),
            pad_right(call.assigned_unit.as_deref().unwrap_or("-"), 10),
            truncate_visual(&call.address, address_width)
        );
    }

    println!();
    println!("{} call(s) total", calls.len());
}

/// Print the Signal 100 state.
pub fn print_signal100(signal: Option<&Signal100>, remaining: Option<Duration>) {
    match (signal, remaining) {
        (Some(signal), Some(remaining)) => {
            println!("{}", "SIGNAL 100 ACTIVE".red().bold());
            println!("{}: {}", "Declared by".bold(), signal.triggered_by);
            println!("{}: {}", "Declared at".bold(), signal.triggered_at);
            if let Some(crew_id) = signal.crew_id {
                println!("{}: {}", "Crew".bold(), crew_id);
            }
            println!("{}: {}", "Expires in".bold(), format_duration(remaining));
        }
        _ => println!("{}", "No active Signal 100.".dimmed()),
    }
}

/// Print one user's shift session and statistics.
pub fn print_shift(session: Option<&ShiftSession>, stats: &ShiftStatistics) {
    let status = session.map(|s| s.status).unwrap_or_default();
    let status_colored = match status {
        ShiftStatus::OnShift => status.as_str().green(),
        ShiftStatus::OnBreak => status.as_str().yellow(),
        ShiftStatus::OffShift => status.as_str().dimmed(),
    };
    println!("{} {}", stats.user_id.cyan().bold(), status_colored);

    if let Some(session) = session {
        let now = chrono::Utc::now();
        println!(
            "  {}: {}",
            "Worked".bold(),
            format_duration(Duration::from_millis(session.work_time_at(now).max(0) as u64))
        );
        println!(
            "  {}: {}",
            "On break".bold(),
            format_duration(Duration::from_millis(session.break_time_at(now).max(0) as u64))
        );
    }

    println!();
    println!("{}", "Totals".bold());
    println!("  {}: {}", "Shifts".bold(), stats.total_shifts);
    println!(
        "  {}: {}",
        "Work".bold(),
        format_duration(Duration::from_millis(stats.total_work_time.max(0) as u64))
    );
    println!(
        "  {}: {}",
        "Breaks".bold(),
        format_duration(Duration::from_millis(stats.total_break_time.max(0) as u64))
    );
}

/// Print activity log entries, newest first.
pub fn print_activity(entries: &[ActivityLog]) {
    if entries.is_empty() {
        println!("{}", "No activity recorded.".dimmed());
        return;
    }

    let width = term_width().saturating_sub(40).max(20);
    for entry in entries {
        let time = chrono::DateTime::parse_from_rfc3339(&entry.timestamp)
            .map(|t| t.with_timezone(&chrono::Local).format("%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| entry.timestamp.clone());
        println!(
            "{} {} {}",
            time.dimmed(),
            pad_right(&truncate_visual(&entry.user_name, 18), 18),
            truncate_visual(&entry.description, width)
        );
        if let Some(details) = &entry.details {
            println!("{}  {}", " ".repeat(30), truncate_visual(details, width).dimmed());
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else {
        format!("{}m {:02}s", m, s)
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Pad a colored label, measuring the plain text.
fn pad_colored(colored: ColoredString, plain: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(plain);
    format!("{}{}", colored, " ".repeat(width.saturating_sub(visual)))
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

fn crew_status_colored(status: CrewStatus, width: usize) -> String {
    let label = status.as_str();
    let colored = match status {
        CrewStatus::Available => label.green(),
        CrewStatus::EnRoute => label.yellow().bold(),
        CrewStatus::OnScene => label.red(),
        CrewStatus::Unavailable => label.dimmed(),
    };
    pad_colored(colored, label, width)
}

fn call_status_colored(status: CallStatus) -> ColoredString {
    match status {
        CallStatus::Pending => status.as_str().yellow(),
        CallStatus::Dispatched => status.as_str().cyan(),
        CallStatus::Completed => status.as_str().green(),
    }
}

/// Get priority indicator.
fn priority_indicator(priority: CallPriority) -> ColoredString {
    match priority {
        CallPriority::Urgent => "!!  ".red().bold(),
        CallPriority::High => "!   ".yellow(),
        CallPriority::Medium => "·   ".dimmed(),
        CallPriority::Low => "    ".normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_visual_keeps_short_strings() {
        assert_eq!(truncate_visual("Medic 7", 10), "Medic 7");
        assert_eq!(truncate_visual("1200 Elm Street", 8), "1200 E..");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 120)), "3h 02m");
    }
}
