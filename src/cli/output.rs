//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Line followed by a green checkmark or a red X
pub fn marked(msg: &(impl std::fmt::Display + ?Sized), ok: bool) -> String {
    let mark = if ok { "✓".green() } else { "✗".red() };
    format!("{msg} {mark}")
}

/// Print a correct prediction (green checkmark after the line)
pub fn hit(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", marked(msg, true));
}

/// Print a wrong prediction (red X after the line)
pub fn miss(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", marked(msg, false));
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_log_line_when_marking_then_line_comes_first_and_intact() {
        colored::control::set_override(false);
        let line = "Point 3: Predicted sg, Actual SF";

        assert_eq!(marked(line, true), "Point 3: Predicted sg, Actual SF ✓");
        assert_eq!(marked(line, false), "Point 3: Predicted sg, Actual SF ✗");
    }
}
