//! Terminal output helpers for consistent CLI formatting

/// Check if color output is enabled
pub(crate) fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

fn success_line(message: &str, color: bool) -> String {
    if color {
        format!("\x1b[32m✓\x1b[0m {}", message)
    } else {
        format!("OK: {}", message)
    }
}

fn warning_line(message: &str, color: bool) -> String {
    if color {
        format!("\x1b[33mWarning:\x1b[0m {}", message)
    } else {
        format!("Warning: {}", message)
    }
}

fn key_value_line(key: &str, value: &str, color: bool) -> String {
    if color {
        format!("  \x1b[1m{}:\x1b[0m {}", key, value)
    } else {
        format!("  {}: {}", key, value)
    }
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    println!("{}", success_line(message, use_color()));
}

/// Print a warning message (yellow) to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}", warning_line(message, use_color()));
}

/// Print a header with decorative border
pub fn print_header(title: &str) {
    let border = "═".repeat(59);
    println!();
    println!("{}", border);
    println!("{:^59}", title);
    println!("{}", border);
    println!();
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    println!("{}", key_value_line(key, value, use_color()));
}
