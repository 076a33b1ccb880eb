use colored::{ColoredString, Colorize};
use vaskit::{Severity, StepRecord, StepResult};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Color a step result by how bad it is
pub fn result_label(result: &StepResult) -> ColoredString {
    let label = result.label();
    match result {
        StepResult::Success => label.green(),
        StepResult::Information | StepResult::Skipped => label.blue(),
        StepResult::Advisory | StepResult::Unknown => label.yellow(),
        r if r.is_failure() => label.red().bold(),
        _ => label.normal(),
    }
}

/// Color a health-check severity
pub fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Warning => label.yellow(),
        Severity::Failure => label.red(),
        Severity::CriticalFailure => label.red().bold(),
    }
}

/// Print one classified step
pub fn step(record: &StepRecord) {
    match &record.description {
        Some(description) => println!(
            "  {:<12} {} {}",
            result_label(&record.result),
            description,
            record.message.dimmed()
        ),
        None => println!("  {:<12} {}", result_label(&record.result), record.message),
    }
}

/// Print a list of steps, or a note if there are none
pub fn steps(records: &[StepRecord]) {
    if records.is_empty() {
        dim("(no steps reported)");
        return;
    }
    for record in records {
        step(record);
    }
}

/// Print a simple table with padded columns
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!(
        "  {}",
        line(headers.iter().map(ToString::to_string).collect()).bold()
    );
    for row in rows {
        println!("  {}", line(row.clone()).trim_end());
    }
}

/// Pluralize a count: `1 user`, `2 users`
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Tests
// ============================================================================
